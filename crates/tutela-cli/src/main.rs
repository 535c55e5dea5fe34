//! Terminal client for the Conselho Tutelar record service.
//!
//! # Usage
//!
//! ```text
//! tutela --url http://localhost:3000 --user ana
//! tutela --config ~/.config/tutela/config.toml --output ~/Documentos
//! ```

mod app;
mod client;
mod form;
mod map;
mod ui;

use std::{fs::File, io, path::PathBuf, sync::Mutex, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::ApiClient;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tutela", about = "Terminal client for the Conselho Tutelar record service")]
struct Args {
  /// Path to a TOML config file (url, username, password, output).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the server (default: http://localhost:3000).
  #[arg(long, env = "TUTELA_URL")]
  url: Option<String>,

  /// Username; pre-fills the login screen.
  #[arg(long, env = "TUTELA_USER")]
  user: Option<String>,

  /// Password; with `--user`, logs in on startup.
  #[arg(long, env = "TUTELA_PASSWORD")]
  password: Option<String>,

  /// Directory for generated PDFs (default: current directory).
  #[arg(short, long, env = "TUTELA_OUTPUT", value_name = "DIR")]
  output: Option<PathBuf>,

  /// Write logs to this file; the terminal belongs to the UI.
  #[arg(long, env = "TUTELA_LOG_FILE", value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
  #[serde(default)]
  output:   Option<PathBuf>,
}

fn non_empty(s: &str) -> Option<String> {
  (!s.is_empty()).then(|| s.to_owned())
}

fn init_tracing(path: &std::path::Path) -> Result<()> {
  let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_tracing(path)?;
  }

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| non_empty(&file_cfg.url))
    .unwrap_or_else(|| "http://localhost:3000".to_string());
  let username = args
    .user
    .or_else(|| non_empty(&file_cfg.username))
    .unwrap_or_default();
  let password = args
    .password
    .or_else(|| non_empty(&file_cfg.password))
    .unwrap_or_default();
  let output_dir = args
    .output
    .or(file_cfg.output)
    .unwrap_or_else(|| PathBuf::from("."));
  std::fs::create_dir_all(&output_dir)
    .with_context(|| format!("creating output directory {}", output_dir.display()))?;

  tracing::info!(%base_url, output = %output_dir.display(), "starting");

  let client = ApiClient::new(base_url)?;
  let mut app = App::new(client, output_dir);
  app.login.username = username;
  if !app.login.username.is_empty() {
    app.login.focus = 1;
  }

  // Log in straight away when both credentials were given.
  if !app.login.username.is_empty() && !password.is_empty() {
    app.login.password = password;
    app.login().await;
  }

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key).await? {
          break;
        }
      }
      // Resize and the rest redraw on the next iteration.
      _ => {}
    }
  }

  Ok(())
}
