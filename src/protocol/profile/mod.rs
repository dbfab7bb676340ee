//! Profile commands
//!
//! Each command takes its arguments as bulk strings and replies with the
//! affected profile as a JSON bulk string.

pub mod follow;
pub mod read;
pub mod write;

pub use follow::{FollowProfileCmd, UnfollowProfileCmd};
pub use read::{GetProfileCmd, ListProfilesCmd};
pub use write::{CreateProfileCmd, DeleteProfileCmd, UpdateProfileCmd};
