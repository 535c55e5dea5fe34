//! HTTP server for the Tutela case-record service.
//!
//! Wraps the [`tutela_api`] router with session authentication, request
//! tracing and permissive CORS, and adds the `/login`, `/logout` and `/me`
//! endpoints.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod session;

pub use error::{Error, Result};

use std::sync::Arc;

use axum::{
  Router, middleware,
  routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tutela_core::store::CaseStore;

use config::ServerConfig;
use session::SessionStore;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the session handlers and the auth layer.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  pub sessions: Arc<SessionStore>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let sessions = SessionStore::new(config.session_ttl_secs);
    Self {
      store,
      config: Arc::new(config),
      sessions: Arc::new(sessions),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      config:   self.config.clone(),
      sessions: self.sessions.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CaseStore + 'static,
{
  let session_routes = Router::new()
    .route("/login",  post(handlers::login::handler::<S>))
    .route("/logout", post(handlers::logout::handler::<S>))
    .route("/me",     get(handlers::me::handler))
    .with_state(state.clone());

  tutela_api::api_router(state.store.clone(), state.config.database.db_info())
    .merge(session_routes)
    .layer(middleware::from_fn_with_state(state, auth::require_session::<S>))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
