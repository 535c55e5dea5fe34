//! Error types for `tutela-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown document kind: {0:?}")]
  UnknownDocumentKind(String),

  #[error("unknown council-member role: {0:?}")]
  UnknownCargo(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
