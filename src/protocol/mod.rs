//! Redis protocol implementation
//!
//! This module provides RESP (REdis Serialization Protocol) parsing and
//! the profile commands served over it.

pub mod command;
pub mod ping;
pub mod profile;
pub mod resp;

pub use command::CommandFactory;
pub use resp::{Parser, Value};
