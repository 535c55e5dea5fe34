//! Handlers for `/notificacoes`.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tutela_core::{
  input::NovaNotificacao,
  record::{Notificacao, NotificacaoCriada},
  store::CaseStore,
};

use crate::{
  ApiState,
  error::{ApiError, ERRO_INTERNO},
  extract::LenientJson,
};

/// `GET /notificacoes`
pub async fn list<S: CaseStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Notificacao>>, ApiError> {
  let rows = state
    .store
    .list_notificacoes(None)
    .await
    .map_err(ApiError::store(ERRO_INTERNO))?;
  Ok(Json(rows))
}

/// `POST /notificacoes`. Failures carry `code` and `sqlState`.
pub async fn create<S: CaseStore>(
  State(state): State<ApiState<S>>,
  LenientJson(body): LenientJson<NovaNotificacao>,
) -> Result<impl IntoResponse, ApiError> {
  let assinatura = body.assinatura.clone();
  let row = state
    .store
    .create_notificacao(body)
    .await
    .map_err(ApiError::store("Erro ao criar notificação"))?;
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "message": "Notificação criada com sucesso",
      "notificacao": NotificacaoCriada::new(row, assinatura),
    })),
  ))
}
