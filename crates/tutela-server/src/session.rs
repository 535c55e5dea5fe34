//! In-process session tokens.
//!
//! Tokens are random v4 UUIDs in simple form. Sessions are lost on restart.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::Usuario;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  pub usuario:    Usuario,
}

impl Session {
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    now >= self.expires_at
  }
}

pub struct SessionStore {
  ttl:      Duration,
  sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
  pub fn new(ttl_secs: u64) -> Self {
    let ttl = i64::try_from(ttl_secs)
      .ok()
      .and_then(Duration::try_seconds)
      .unwrap_or(Duration::MAX);
    Self { ttl, sessions: RwLock::new(HashMap::new()) }
  }

  /// Open a session for `usuario`.
  pub async fn issue(&self, usuario: Usuario) -> Session {
    let now = Utc::now();
    let session = Session {
      token: Uuid::new_v4().simple().to_string(),
      expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
      usuario,
    };
    let mut sessions = self.sessions.write().await;
    sessions.retain(|_, s| !s.is_expired_at(now));
    sessions.insert(session.token.clone(), session.clone());
    session
  }

  /// The live session for `token`. An expired one is removed.
  pub async fn get(&self, token: &str) -> Option<Session> {
    self.get_at(token, Utc::now()).await
  }

  async fn get_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
    let found = self.sessions.read().await.get(token).cloned()?;
    if found.is_expired_at(now) {
      self.sessions.write().await.remove(token);
      tracing::debug!(username = %found.usuario.username, "session expired");
      return None;
    }
    Some(found)
  }

  /// End the session for `token`. Returns whether one existed.
  pub async fn revoke(&self, token: &str) -> bool {
    self.sessions.write().await.remove(token).is_some()
  }

  pub async fn len(&self) -> usize {
    self.sessions.read().await.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::auth::Role;

  fn usuario() -> Usuario {
    Usuario {
      username:  "ana".into(),
      role:      Role::Conselheiro,
      nome:      None,
      cargo:     None,
      email:     None,
      telefone:  None,
      matricula: None,
      plantao:   None,
    }
  }

  #[tokio::test]
  async fn issued_token_resolves_until_revoked() {
    let store = SessionStore::new(60);
    let s = store.issue(usuario()).await;
    assert_eq!(s.token.len(), 32);
    assert_eq!(store.get(&s.token).await.unwrap().usuario.username, "ana");
    assert!(store.revoke(&s.token).await);
    assert!(store.get(&s.token).await.is_none());
    assert!(!store.revoke(&s.token).await);
  }

  #[tokio::test]
  async fn expired_sessions_are_rejected_and_purged() {
    let store = SessionStore::new(60);
    let s = store.issue(usuario()).await;
    let later = s.expires_at + Duration::seconds(1);
    assert!(store.get_at(&s.token, later).await.is_none());
    assert_eq!(store.len().await, 0);
  }

  #[tokio::test]
  async fn zero_ttl_expires_immediately() {
    let store = SessionStore::new(0);
    let s = store.issue(usuario()).await;
    assert!(store.get(&s.token).await.is_none());
  }

  #[tokio::test]
  async fn unknown_token() {
    assert!(SessionStore::new(60).get("nope").await.is_none());
  }
}
