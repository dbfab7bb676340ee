//! Profile record encoding/decoding for storage

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::UserProfile;

/// Profile record as laid out on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileValue {
  /// Format version
  pub version: u8,
  pub profile: UserProfile,
}

impl ProfileValue {
  /// Wrap a profile with the current format version
  pub fn new(profile: UserProfile) -> Self {
    Self {
      version: super::CURRENT_VERSION,
      profile,
    }
  }

  /// Serialize to bytes using serde_json
  pub fn serialize(&self) -> Result<Vec<u8>, DecodeError> {
    serde_json::to_vec(self).map_err(|e| DecodeError::Encode(e.to_string()))
  }

  /// Deserialize from bytes using serde_json
  pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
    if bytes.is_empty() {
      return Err(DecodeError::InvalidData);
    }
    serde_json::from_slice(bytes).map_err(|_| DecodeError::InvalidData)
  }

  pub fn into_profile(self) -> UserProfile {
    self.profile
  }
}

/// Errors that can occur during encoding or decoding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
  /// Input data is invalid or corrupted
  #[error("invalid data for decoding")]
  InvalidData,
  #[error("failed to encode record: {0}")]
  Encode(String),
}
