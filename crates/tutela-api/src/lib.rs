//! JSON REST API for the Tutela case-record service.
//!
//! Exposes an axum [`Router`] backed by any [`tutela_core::store::CaseStore`].
//! Auth, CORS, tracing and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = tutela_api::api_router(store.clone(), db_info).layer(auth);
//! ```

pub mod atendimentos;
pub mod conselheiros;
pub mod denuncias;
pub mod documentos;
pub mod error;
pub mod extract;
pub mod marcadores;
pub mod notificacoes;
pub mod status;
pub mod termos;

use std::sync::Arc;

use axum::{Router, routing::get};
use serde::Serialize;
use tutela_core::store::CaseStore;

pub use error::ApiError;
pub use extract::LenientJson;

/// Connection settings reported by `GET /test-db`. Never includes the
/// password.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DbInfo {
  pub host:     String,
  pub database: String,
  pub user:     String,
}

/// Shared handler state.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub db_info: Arc<DbInfo>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:   self.store.clone(),
      db_info: self.db_info.clone(),
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, db_info: DbInfo) -> Router<()>
where
  S: CaseStore + 'static,
{
  let state = ApiState { store, db_info: Arc::new(db_info) };

  Router::new()
    .route("/", get(status::root))
    .route("/test-db", get(status::test_db::<S>))
    // Council members
    .route(
      "/conselheiros",
      get(conselheiros::list::<S>).post(conselheiros::create::<S>),
    )
    .route(
      "/conselheiros/{id}",
      get(conselheiros::get_one::<S>)
        .put(conselheiros::update::<S>)
        .delete(conselheiros::delete::<S>),
    )
    // Documents
    .route("/denuncias", get(denuncias::list::<S>).post(denuncias::create::<S>))
    .route(
      "/atendimentos",
      get(atendimentos::list::<S>).post(atendimentos::create::<S>),
    )
    .route("/direitos-violados", get(atendimentos::list_direitos::<S>))
    .route(
      "/notificacoes",
      get(notificacoes::list::<S>).post(notificacoes::create::<S>),
    )
    .route(
      "/termos-medidas-menor",
      get(termos::list_menor::<S>).post(termos::create_menor::<S>),
    )
    .route(
      "/termos-medidas-responsavel",
      get(termos::list_responsavel::<S>).post(termos::create_responsavel::<S>),
    )
    .route("/documentos", get(documentos::list::<S>))
    // Map
    .route(
      "/marcadores-mapa",
      get(marcadores::list::<S>).post(marcadores::create::<S>),
    )
    .with_state(state)
}
