//! Handlers for `/marcadores-mapa`.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tutela_core::{input::NovoMarcador, record::Marcador, store::CaseStore};

use crate::{
  ApiState,
  error::{ApiError, ERRO_INTERNO},
  extract::LenientJson,
};

/// `GET /marcadores-mapa`
pub async fn list<S: CaseStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Marcador>>, ApiError> {
  let rows = state
    .store
    .list_marcadores()
    .await
    .map_err(ApiError::store(ERRO_INTERNO))?;
  Ok(Json(rows))
}

/// `POST /marcadores-mapa`; coordinates are required.
pub async fn create<S: CaseStore>(
  State(state): State<ApiState<S>>,
  LenientJson(body): LenientJson<NovoMarcador>,
) -> Result<impl IntoResponse, ApiError> {
  let valid = |v: Option<f64>, max: f64| v.is_some_and(|v| v.is_finite() && v.abs() <= max);
  if !valid(body.latitude, 90.0) || !valid(body.longitude, 180.0) {
    return Err(ApiError::BadRequest(
      "latitude e longitude válidas são obrigatórias".into(),
    ));
  }
  let marcador = state
    .store
    .create_marcador(body)
    .await
    .map_err(ApiError::store("Erro ao criar marcador"))?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Marcador criado com sucesso", "marcador": marcador })),
  ))
}
