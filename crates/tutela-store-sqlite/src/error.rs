//! Error type for `tutela-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;
use tutela_core::store::{ErrorDetail, FailureDetail};

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tutela_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// The pool was closed; no further connections are handed out.
  #[error("connection pool is closed")]
  PoolClosed,

  #[error("invalid pool size: {0}")]
  InvalidPoolSize(usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// SQLSTATE class reported for integrity-constraint violations.
pub const SQLSTATE_CONSTRAINT: &str = "23000";
/// SQLSTATE class reported for every other driver failure.
pub const SQLSTATE_GENERAL: &str = "HY000";

impl Error {
  fn sqlite_failure(&self) -> Option<&rusqlite::ffi::Error> {
    match self {
      Error::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))) => {
        Some(e)
      }
      Error::Database(tokio_rusqlite::Error::Close((_, rusqlite::Error::SqliteFailure(e, _)))) => {
        Some(e)
      }
      _ => None,
    }
  }

  /// Whether this is a primary-key, unique or not-null violation.
  pub fn is_constraint_violation(&self) -> bool {
    self
      .sqlite_failure()
      .is_some_and(|e| e.code == ErrorCode::ConstraintViolation)
  }
}

impl ErrorDetail for Error {
  fn detail(&self) -> FailureDetail {
    if let Some(e) = self.sqlite_failure() {
      let sql_state = if e.code == ErrorCode::ConstraintViolation {
        SQLSTATE_CONSTRAINT
      } else {
        SQLSTATE_GENERAL
      };
      return FailureDetail {
        code:      Some(format!("{:?}", e.code)),
        errno:     Some(i64::from(e.extended_code)),
        sql_state: Some(sql_state.to_owned()),
      };
    }
    match self {
      Error::Database(_) => FailureDetail {
        code:      None,
        errno:     None,
        sql_state: Some(SQLSTATE_GENERAL.to_owned()),
      },
      Error::PoolClosed => FailureDetail {
        code:      Some("PoolClosed".to_owned()),
        errno:     None,
        sql_state: Some(SQLSTATE_GENERAL.to_owned()),
      },
      _ => FailureDetail::default(),
    }
  }
}
