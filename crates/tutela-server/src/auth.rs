//! Credential verification, roles and the bearer-token middleware.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, Method, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tutela_core::store::CaseStore;

use crate::{
  AppState,
  config::UserConfig,
  error::{Error, Result},
  session::Session,
};

/// Paths served without a session.
pub const PUBLIC_PATHS: &[&str] = &["/", "/test-db", "/login"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Secretario,
  Conselheiro,
}

impl Role {
  /// Whether this role may create, edit or remove council members.
  pub fn manages_conselheiros(self) -> bool {
    matches!(self, Role::Admin | Role::Secretario)
  }
}

/// Profile returned by `/login` and `/me`. Never carries the hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
  pub username:  String,
  pub role:      Role,
  pub nome:      Option<String>,
  pub cargo:     Option<String>,
  pub email:     Option<String>,
  pub telefone:  Option<String>,
  pub matricula: Option<String>,
  pub plantao:   Option<String>,
}

impl From<&UserConfig> for Usuario {
  fn from(u: &UserConfig) -> Self {
    Self {
      username:  u.username.clone(),
      role:      u.role,
      nome:      u.nome.clone(),
      cargo:     u.cargo.clone(),
      email:     u.email.clone(),
      telefone:  u.telefone.clone(),
      matricula: u.matricula.clone(),
      plantao:   u.plantao.clone(),
    }
  }
}

/// Produce an argon2 PHC string for `password` with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Hash(e.to_string()))
}

/// Find `username` among `users` and check `password` against its hash.
pub fn verify_credentials<'a>(
  users: &'a [UserConfig],
  username: &str,
  password: &str,
) -> Result<&'a UserConfig> {
  let user = users
    .iter()
    .find(|u| u.username == username)
    .ok_or(Error::InvalidCredentials)?;

  let parsed = PasswordHash::new(&user.password_hash).map_err(|e| {
    tracing::warn!(username, error = %e, "stored password hash is malformed");
    Error::InvalidCredentials
  })?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| Error::InvalidCredentials)?;

  Ok(user)
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

fn mutates_conselheiros(method: &Method, path: &str) -> bool {
  path.starts_with("/conselheiros")
    && matches!(*method, Method::POST | Method::PUT | Method::DELETE)
}

/// Reject requests without a live session, and council-member mutations from
/// roles that may not perform them. The session is left in the request
/// extensions for downstream handlers.
pub async fn require_session<S>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Response
where
  S: CaseStore + 'static,
{
  let path = req.uri().path();
  if PUBLIC_PATHS.contains(&path) {
    return next.run(req).await;
  }

  let Some(token) = bearer_token(req.headers()) else {
    return Error::Unauthorized.into_response();
  };
  let Some(session) = state.sessions.get(token).await else {
    return Error::Unauthorized.into_response();
  };

  if mutates_conselheiros(req.method(), path) && !session.usuario.role.manages_conselheiros() {
    tracing::warn!(
      username = %session.usuario.username,
      method = %req.method(),
      path,
      "role may not modify council members"
    );
    return Error::Forbidden.into_response();
  }

  req.extensions_mut().insert::<Session>(session);
  next.run(req).await
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn user(username: &str, password: &str, role: Role) -> UserConfig {
    UserConfig {
      username: username.into(),
      password_hash: hash_password(password).unwrap(),
      role,
      nome: Some("Ana".into()),
      cargo: None,
      email: None,
      telefone: None,
      matricula: None,
      plantao: None,
    }
  }

  #[test]
  fn correct_credentials() {
    let users = [user("ana", "secret", Role::Admin)];
    let found = verify_credentials(&users, "ana", "secret").unwrap();
    assert_eq!(found.username, "ana");
  }

  #[test]
  fn wrong_password() {
    let users = [user("ana", "secret", Role::Admin)];
    assert!(matches!(
      verify_credentials(&users, "ana", "wrong"),
      Err(Error::InvalidCredentials)
    ));
  }

  #[test]
  fn unknown_user() {
    let users = [user("ana", "secret", Role::Admin)];
    assert!(matches!(
      verify_credentials(&users, "bia", "secret"),
      Err(Error::InvalidCredentials)
    ));
  }

  #[test]
  fn malformed_hash_is_a_failed_login() {
    let mut u = user("ana", "secret", Role::Admin);
    u.password_hash = "not-a-phc-string".into();
    assert!(verify_credentials(&[u], "ana", "secret").is_err());
  }

  #[test]
  fn bearer_parsing() {
    let mut headers = HeaderMap::new();
    assert_eq!(bearer_token(&headers), None);
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert_eq!(bearer_token(&headers), None);
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
    assert_eq!(bearer_token(&headers), Some("abc123"));
  }

  #[test]
  fn roles() {
    assert!(Role::Admin.manages_conselheiros());
    assert!(Role::Secretario.manages_conselheiros());
    assert!(!Role::Conselheiro.manages_conselheiros());
    assert!(mutates_conselheiros(&Method::DELETE, "/conselheiros/3"));
    assert!(!mutates_conselheiros(&Method::GET, "/conselheiros"));
    assert!(!mutates_conselheiros(&Method::POST, "/denuncias"));
  }
}
