//! Handlers for `/conselheiros` endpoints.
//!
//! | Method   | Path                 | Notes |
//! |----------|----------------------|-------|
//! | `GET`    | `/conselheiros`      | Newest first |
//! | `POST`   | `/conselheiros`      | Body: [`NovoConselheiro`] |
//! | `GET`    | `/conselheiros/{id}` | 404 if not found |
//! | `PUT`    | `/conselheiros/{id}` | Absent fields keep their value; 404 if not found |
//! | `DELETE` | `/conselheiros/{id}` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::{Value, json};
use tutela_core::{input::NovoConselheiro, record::Conselheiro, store::CaseStore};

use crate::{
  ApiState,
  error::{ApiError, ERRO_INTERNO},
  extract::LenientJson,
};

fn not_found(id: i64) -> ApiError {
  ApiError::NotFound(format!("Conselheiro {id} não encontrado"))
}

/// `GET /conselheiros`
pub async fn list<S: CaseStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Conselheiro>>, ApiError> {
  let rows = state
    .store
    .list_conselheiros()
    .await
    .map_err(ApiError::store(ERRO_INTERNO))?;
  Ok(Json(rows))
}

/// `GET /conselheiros/{id}`
pub async fn get_one<S: CaseStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Conselheiro>, ApiError> {
  let row = state
    .store
    .get_conselheiro(id)
    .await
    .map_err(ApiError::store(ERRO_INTERNO))?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(row))
}

/// `POST /conselheiros`
pub async fn create<S: CaseStore>(
  State(state): State<ApiState<S>>,
  LenientJson(body): LenientJson<NovoConselheiro>,
) -> Result<impl IntoResponse, ApiError> {
  let conselheiro = state
    .store
    .create_conselheiro(body)
    .await
    .map_err(ApiError::store("Erro ao cadastrar conselheiro"))?;
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "message": "Conselheiro cadastrado com sucesso",
      "conselheiro": conselheiro,
    })),
  ))
}

/// `PUT /conselheiros/{id}`
pub async fn update<S: CaseStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
  LenientJson(body): LenientJson<NovoConselheiro>,
) -> Result<Json<Value>, ApiError> {
  let conselheiro = state
    .store
    .update_conselheiro(id, body)
    .await
    .map_err(ApiError::store("Erro ao atualizar conselheiro"))?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(json!({
    "message": "Conselheiro atualizado com sucesso",
    "conselheiro": conselheiro,
  })))
}

/// `DELETE /conselheiros/{id}`
pub async fn delete<S: CaseStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
  let removed = state
    .store
    .delete_conselheiro(id)
    .await
    .map_err(ApiError::store("Erro ao excluir conselheiro"))?;
  if !removed {
    return Err(not_found(id));
  }
  Ok(Json(json!({ "message": "Conselheiro excluído com sucesso" })))
}
