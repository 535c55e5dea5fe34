//! Request-body extraction that never rejects.

use axum::{
  body::Bytes,
  extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Like [`axum::Json`], but an empty or malformed body yields
/// `T::default()` instead of a 4xx. Bodies are not required to carry a JSON
/// content type. Field-level leniency is the job of `T`'s `Deserialize` impl.
#[derive(Debug, Clone, Default)]
pub struct LenientJson<T>(pub T);

impl<S, T> FromRequest<S> for LenientJson<T>
where
  T: DeserializeOwned + Default,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let bytes = Bytes::from_request(req, state)
      .await
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
      return Ok(Self(T::default()));
    }
    match serde_json::from_slice(&bytes) {
      Ok(v) => Ok(Self(v)),
      Err(e) => {
        tracing::warn!(error = %e, "unreadable request body; using defaults");
        Ok(Self(T::default()))
      }
    }
  }
}
