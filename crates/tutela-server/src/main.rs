//! tutela-server binary.
//!
//! Loads `.env`, reads `config.toml` (or the path given with `--config`),
//! opens the SQLite store and serves the JSON API over HTTP until SIGINT or
//! SIGTERM, then drains the connection pool.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for a `[[users]]` entry:
//!
//! ```text
//! cargo run -p tutela-server -- --hash-password
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tutela_core::store::CaseStore;
use tutela_server::{AppState, auth, config::ServerConfig};
use tutela_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Conselho Tutelar case-record server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, env = "TUTELA_CONFIG", default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // A missing .env is normal.
  let dotenv = dotenvy::dotenv();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  if let Ok(path) = dotenv {
    tracing::debug!(path = %path.display(), "loaded environment file");
  }

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    println!("{}", auth::hash_password(&password)?);
    return Ok(());
  }

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let db = &cfg.database;
  let db_path = db.file_path();
  tracing::info!(
    host = %db.host,
    user = %db.user,
    password = db.masked_password(),
    database = %db.name,
    file = %db_path.display(),
    "database configuration"
  );
  if cfg.users.is_empty() {
    tracing::warn!("no users configured; every protected endpoint will answer 401");
  }

  let store = SqliteStore::open(&db_path, db.store_options())
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;
  tracing::info!(
    pool_size = store.pool_size(),
    id_allocation = ?store.id_allocation(),
    "database ready"
  );
  let store = Arc::new(store);

  let address = format!("{}:{}", cfg.host, cfg.port);
  let app = tutela_server::router(AppState::new(store.clone(), cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shutting down; closing database connections");
  store.close().await.context("failed to close the store")?;

  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for ctrl-c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut s) => {
        s.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {},
    () = terminate => {},
  }
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
