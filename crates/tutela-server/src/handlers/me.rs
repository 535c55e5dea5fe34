//! `GET /me`

use axum::{Extension, Json};

use crate::{auth::Usuario, session::Session};

pub async fn handler(Extension(session): Extension<Session>) -> Json<Usuario> {
  Json(session.usuario)
}
