//! Handlers for `/atendimentos` and the `/direitos-violados` lookup list.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tutela_core::{
  input::NovoAtendimento,
  record::{Atendimento, AtendimentoCriado, DireitoViolado},
  store::CaseStore,
};

use crate::{
  ApiState,
  error::{ApiError, ERRO_INTERNO},
  extract::LenientJson,
};

/// `GET /atendimentos`, joined with the violated-right description.
pub async fn list<S: CaseStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Atendimento>>, ApiError> {
  let rows = state
    .store
    .list_atendimentos(None)
    .await
    .map_err(ApiError::store(ERRO_INTERNO))?;
  Ok(Json(rows))
}

/// `POST /atendimentos`
pub async fn create<S: CaseStore>(
  State(state): State<ApiState<S>>,
  LenientJson(body): LenientJson<NovoAtendimento>,
) -> Result<impl IntoResponse, ApiError> {
  let assinatura = body.assinatura.clone();
  let atendimento = state
    .store
    .create_atendimento(body)
    .await
    .map_err(ApiError::store("Erro ao criar atendimento"))?;
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "message": "Atendimento criado com sucesso",
      "atendimento": AtendimentoCriado { atendimento, assinatura },
    })),
  ))
}

/// `GET /direitos-violados`
pub async fn list_direitos<S: CaseStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<DireitoViolado>>, ApiError> {
  let rows = state
    .store
    .list_direitos_violados()
    .await
    .map_err(ApiError::store(ERRO_INTERNO))?;
  Ok(Json(rows))
}
