use thiserror::Error;

use crate::encoding::DecodeError;
use crate::store::StoreError;

/// Failure of a profile operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
  /// A required text field was empty
  #[error("{0}")]
  InvalidPayload(String),

  /// The referenced profile does not exist
  #[error("{0}")]
  NotFound(String),

  /// Storage or codec fault
  #[error("{0}")]
  Internal(String),
}

impl ProfileError {
  /// Short tag used as the error prefix on the wire
  pub fn kind(&self) -> &'static str {
    match self {
      ProfileError::InvalidPayload(_) => "INVALIDPAYLOAD",
      ProfileError::NotFound(_) => "NOTFOUND",
      ProfileError::Internal(_) => "ERR",
    }
  }
}

impl From<StoreError> for ProfileError {
  fn from(e: StoreError) -> Self {
    ProfileError::Internal(e.to_string())
  }
}

impl From<DecodeError> for ProfileError {
  fn from(e: DecodeError) -> Self {
    ProfileError::Internal(format!("corrupt profile record: {}", e))
  }
}
