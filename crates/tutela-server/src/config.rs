//! Layered server configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. the TOML file passed with `--config` (optional)
//! 3. `TUTELA_*` environment variables, nested keys split on `__`
//!    (`TUTELA_DATABASE__POOL_SIZE=4`)
//! 4. the legacy `DB_HOST`, `DB_USER`, `DB_PASSWORD` and `DB_NAME` variables
//!
//! ```toml
//! port = 3000
//!
//! [database]
//! name = "conselho_tutelar"
//! id_allocation = "transactional"
//!
//! [[users]]
//! username      = "admin"
//! password_hash = "$argon2id$v=19$..."
//! role          = "admin"
//! nome          = "Administrador"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tutela_api::DbInfo;
use tutela_store_sqlite::{DEFAULT_POOL_SIZE, IdAllocation, StoreOptions};

use crate::{Result, auth::Role};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;
pub const DEFAULT_DATABASE: &str = "conselho_tutelar";

/// Runtime server configuration.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub session_ttl_secs: u64,
  pub database:         DatabaseConfig,
  #[serde(default)]
  pub users:            Vec<UserConfig>,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseConfig {
  pub host:          String,
  pub user:          String,
  #[serde(default)]
  pub password:      String,
  pub name:          String,
  /// Database file; `<name>.sqlite3` in the working directory when unset.
  #[serde(default)]
  pub path:          Option<PathBuf>,
  pub pool_size:     usize,
  #[serde(default)]
  pub id_allocation: IdAllocation,
}

/// A login account. `password_hash` is an argon2 PHC string.
#[derive(Deserialize, Clone)]
pub struct UserConfig {
  pub username:      String,
  pub password_hash: String,
  pub role:          Role,
  #[serde(default)]
  pub nome:          Option<String>,
  #[serde(default)]
  pub cargo:         Option<String>,
  #[serde(default)]
  pub email:         Option<String>,
  #[serde(default)]
  pub telefone:      Option<String>,
  #[serde(default)]
  pub matricula:     Option<String>,
  /// Duty roster shown on the profile screen.
  #[serde(default)]
  pub plantao:       Option<String>,
}

impl ServerConfig {
  /// Read every source and apply the legacy overrides from the process
  /// environment.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", i64::from(DEFAULT_PORT))?
      .set_default("session_ttl_secs", DEFAULT_SESSION_TTL_SECS)?
      .set_default("database.host", "127.0.0.1")?
      .set_default("database.user", "root")?
      .set_default("database.password", "")?
      .set_default("database.name", DEFAULT_DATABASE)?
      .set_default("database.pool_size", DEFAULT_POOL_SIZE as u64)?
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("TUTELA")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?;

    let mut cfg: ServerConfig = settings.try_deserialize()?;
    cfg.database.apply_legacy_env(|key| std::env::var(key).ok());
    Ok(cfg)
  }
}

impl DatabaseConfig {
  /// Let `DB_*` variables override the layered values, then normalise the
  /// host.
  pub fn apply_legacy_env(&mut self, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("DB_HOST") {
      self.host = v;
    }
    if let Some(v) = var("DB_USER") {
      self.user = v;
    }
    if let Some(v) = var("DB_PASSWORD") {
      self.password = v;
    }
    if let Some(v) = var("DB_NAME") {
      self.name = v;
    }
    if self.host == "localhost" {
      self.host = "127.0.0.1".into();
    }
  }

  pub fn file_path(&self) -> PathBuf {
    self
      .path
      .clone()
      .unwrap_or_else(|| PathBuf::from(format!("{}.sqlite3", self.name)))
  }

  /// The password as it may appear in logs.
  pub fn masked_password(&self) -> &'static str {
    if self.password.is_empty() { "(vazio)" } else { "***" }
  }

  pub fn store_options(&self) -> StoreOptions {
    StoreOptions {
      pool_size:     self.pool_size,
      id_allocation: self.id_allocation,
    }
  }

  pub fn db_info(&self) -> DbInfo {
    DbInfo {
      host:     self.host.clone(),
      database: self.name.clone(),
      user:     self.user.clone(),
    }
  }
}
