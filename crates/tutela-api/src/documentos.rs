//! `GET /documentos`: every kind at once, capped per kind.

use axum::{Json, extract::State};
use tutela_core::{
  document::{DOCUMENT_LIMIT, DocumentSet},
  medidas::TermoAlvo,
  store::CaseStore,
};

use crate::{
  ApiState,
  error::{ApiError, ERRO_INTERNO},
};

/// The five reads run concurrently. The first failure fails the request.
pub async fn list<S: CaseStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<DocumentSet>, ApiError> {
  let store = &state.store;
  let limit = Some(DOCUMENT_LIMIT);

  let (denuncias, atendimentos, notificacoes, menor, responsavel) = tokio::try_join!(
    store.list_denuncias(limit),
    store.list_atendimentos(limit),
    store.list_notificacoes(limit),
    store.list_termos(TermoAlvo::Menor, limit),
    store.list_termos(TermoAlvo::Responsavel, limit),
  )
  .map_err(ApiError::store(ERRO_INTERNO))?;

  Ok(Json(DocumentSet::new(
    denuncias,
    atendimentos,
    notificacoes,
    menor,
    responsavel,
  )))
}
