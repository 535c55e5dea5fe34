//! `POST /logout`

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};
use tutela_core::store::CaseStore;

use crate::{AppState, session::Session};

pub async fn handler<S: CaseStore>(
  State(state): State<AppState<S>>,
  Extension(session): Extension<Session>,
) -> Json<Value> {
  state.sessions.revoke(&session.token).await;
  tracing::info!(username = %session.usuario.username, "logout");
  Json(json!({ "message": "Sessão encerrada" }))
}
