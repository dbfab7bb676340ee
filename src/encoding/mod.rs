//! Value encoding/decoding for storage
//!
//! This module provides encoding and decoding for the records stored in
//! the database.

pub mod profile;

/// Current format version for all encoded types
pub const CURRENT_VERSION: u8 = 1;

pub use profile::{DecodeError, ProfileValue};
