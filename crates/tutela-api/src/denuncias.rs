//! Handlers for `/denuncias`.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tutela_core::{input::NovaDenuncia, record::Denuncia, store::CaseStore};

use crate::{
  ApiState,
  error::{ApiError, ERRO_INTERNO},
  extract::LenientJson,
};

/// `GET /denuncias`
pub async fn list<S: CaseStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Denuncia>>, ApiError> {
  let rows = state
    .store
    .list_denuncias(None)
    .await
    .map_err(ApiError::store(ERRO_INTERNO))?;
  Ok(Json(rows))
}

/// `POST /denuncias`
pub async fn create<S: CaseStore>(
  State(state): State<ApiState<S>>,
  LenientJson(body): LenientJson<NovaDenuncia>,
) -> Result<impl IntoResponse, ApiError> {
  let denuncia = state
    .store
    .create_denuncia(body)
    .await
    .map_err(ApiError::store("Erro ao criar denúncia"))?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Denúncia criada com sucesso", "denuncia": denuncia })),
  ))
}
