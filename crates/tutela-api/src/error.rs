//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tutela_core::store::{ErrorDetail, FailureDetail};

/// Generic message for failed reads.
pub const ERRO_INTERNO: &str = "Erro interno do servidor";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A store failure. `context` is the user-facing summary; `message` and
  /// `detail` describe the underlying database error.
  #[error("{context}: {message}")]
  Store {
    context: &'static str,
    message: String,
    detail:  FailureDetail,
  },
}

impl ApiError {
  /// `map_err` adapter that logs the failure and keeps its vendor detail.
  ///
  /// ```rust,ignore
  /// store.list_denuncias(None).await.map_err(ApiError::store(ERRO_INTERNO))?;
  /// ```
  pub fn store<E>(context: &'static str) -> impl FnOnce(E) -> ApiError
  where
    E: std::error::Error + ErrorDetail,
  {
    move |e| {
      let detail = e.detail();
      tracing::error!(error = %e, code = ?detail.code, "{context}");
      ApiError::Store { context, message: e.to_string(), detail }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response(),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Store { context, message, detail } => {
        let mut body = json!({ "error": context, "details": message });
        if let Some(code) = detail.code {
          body["code"] = code.into();
        }
        if let Some(state) = detail.sql_state {
          body["sqlState"] = state.into();
        }
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
      }
    }
  }
}
