//! Error types for the tutela-pdf renderer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to write {path}: {source}")]
  Write {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("image is not valid base64: {0}")]
  Base64(#[from] base64::DecodeError),

  #[error("malformed PNG: {0}")]
  Png(&'static str),

  #[error("unsupported PNG: {0}")]
  UnsupportedPng(String),

  #[error("zlib stream error: {0}")]
  Zlib(#[source] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
