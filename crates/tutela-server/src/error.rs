//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("authentication required")]
  Unauthorized,
  #[error("invalid username or password")]
  InvalidCredentials,
  #[error("insufficient role")]
  Forbidden,
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
  #[error("password hashing failed: {0}")]
  Hash(String),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Autenticação necessária"),
      Error::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Usuário ou senha inválidos"),
      Error::Forbidden => (StatusCode::FORBIDDEN, "Permissão insuficiente"),
      Error::Config(_) | Error::Hash(_) => {
        tracing::error!(error = %self, "server error");
        (StatusCode::INTERNAL_SERVER_ERROR, "Erro interno do servidor")
      }
    };
    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"tutela\""),
      );
    }
    res
  }
}
