//! User profiles and the follow graph between them
//!
//! `ProfileStore` owns the persistent map of profiles and implements the
//! list/get/create/update/delete operations plus the follow/unfollow
//! dual-write that keeps `following` and `followers` in step.

pub mod error;
pub mod model;
pub mod service;

pub use error::ProfileError;
pub use model::{ProfilePayload, UserProfile};
pub use service::ProfileStore;
