//! `POST /login`

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tutela_api::LenientJson;
use tutela_core::store::CaseStore;

use crate::{AppState, auth, error::Error};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credenciais {
  pub username: String,
  pub password: String,
}

pub async fn handler<S: CaseStore>(
  State(state): State<AppState<S>>,
  LenientJson(body): LenientJson<Credenciais>,
) -> Result<impl IntoResponse, Error> {
  let user = auth::verify_credentials(&state.config.users, &body.username, &body.password)
    .inspect_err(|_| tracing::info!(username = %body.username, "login rejected"))?;

  let session = state.sessions.issue(user.into()).await;
  tracing::info!(username = %session.usuario.username, "login");

  Ok(Json(json!({
    "message": "Login realizado com sucesso",
    "token": session.token,
    "expiresAt": session.expires_at,
    "usuario": session.usuario,
  })))
}
