//! Handlers for `/termos-medidas-menor` and `/termos-medidas-responsavel`.
//!
//! Both kinds share one handler pair, parameterised by [`TermoAlvo`].

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tutela_core::{
  input::NovoTermo,
  medidas::TermoAlvo,
  record::{TermoCriado, TermoMedidas},
  store::CaseStore,
};

use crate::{
  ApiState,
  error::{ApiError, ERRO_INTERNO},
  extract::LenientJson,
};

async fn list<S: CaseStore>(
  state: ApiState<S>,
  alvo: TermoAlvo,
) -> Result<Json<Vec<TermoMedidas>>, ApiError> {
  let rows = state
    .store
    .list_termos(alvo, None)
    .await
    .map_err(ApiError::store(ERRO_INTERNO))?;
  Ok(Json(rows))
}

async fn create<S: CaseStore>(
  state: ApiState<S>,
  alvo: TermoAlvo,
  body: NovoTermo,
) -> Result<impl IntoResponse, ApiError> {
  let assinatura = body.assinatura.clone();
  let (termo, medidas_selecionadas) = state
    .store
    .create_termo(alvo, body)
    .await
    .map_err(ApiError::store("Erro ao criar termo de medidas"))?;
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "message": "Termo de medidas criado com sucesso",
      "termo": TermoCriado { termo, medidas_selecionadas, assinatura },
    })),
  ))
}

/// `GET /termos-medidas-menor`
pub async fn list_menor<S: CaseStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<TermoMedidas>>, ApiError> {
  list(state, TermoAlvo::Menor).await
}

/// `POST /termos-medidas-menor`, flags `medidaI`..`medidaVI`.
pub async fn create_menor<S: CaseStore>(
  State(state): State<ApiState<S>>,
  LenientJson(body): LenientJson<NovoTermo>,
) -> Result<impl IntoResponse, ApiError> {
  create(state, TermoAlvo::Menor, body).await
}

/// `GET /termos-medidas-responsavel`
pub async fn list_responsavel<S: CaseStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<TermoMedidas>>, ApiError> {
  list(state, TermoAlvo::Responsavel).await
}

/// `POST /termos-medidas-responsavel`, flags `medidaI`..`medidaVIII`.
pub async fn create_responsavel<S: CaseStore>(
  State(state): State<ApiState<S>>,
  LenientJson(body): LenientJson<NovoTermo>,
) -> Result<impl IntoResponse, ApiError> {
  create(state, TermoAlvo::Responsavel, body).await
}
