//! piso server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and serves the JSON API over HTTP.
//!
//! # Accounts
//!
//! Practitioners are created from the command line; the password is read
//! from stdin:
//!
//! ```text
//! piso create-practitioner ana --practice-name "Kine Suelo Pélvico"
//! ```
//!
//! Running the same command for an existing username resets its password.

mod config;

use std::{
  io::{self, BufRead, Write},
  path::PathBuf,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use piso_api::{AppState, auth::hash_password};
use piso_core::{
  practitioner::NewPractitioner,
  store::ClinicStore,
  validate::Validate as _,
};
use piso_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Pelvic-floor physiotherapy records server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
  /// Create a practitioner account, or reset its password if it exists.
  CreatePractitioner {
    username: String,
    #[arg(long, default_value = "")]
    practice_name: String,
    #[arg(long, default_value = "")]
    license_number: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command.unwrap_or(Command::Serve) {
    Command::HashPassword => {
      let password = read_password()?;
      println!("{}", hash(&password)?);
      Ok(())
    }
    Command::CreatePractitioner { username, practice_name, license_number } => {
      let server_cfg = load_config(&cli.config)?;
      let store = open_store(&server_cfg).await?;
      create_practitioner(&store, username, practice_name, license_number).await
    }
    Command::Serve => {
      let server_cfg = load_config(&cli.config)?;
      let store = open_store(&server_cfg).await?;
      serve(store, &server_cfg).await
    }
  }
}

fn load_config(path: &std::path::Path) -> anyhow::Result<ServerConfig> {
  ServerConfig::load(path).context("failed to read configuration")
}

async fn open_store(server_cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store_path = server_cfg.resolved_store_path();
  SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

async fn serve(store: SqliteStore, server_cfg: &ServerConfig) -> anyhow::Result<()> {
  let app = piso_api::router(AppState::new(store));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

async fn create_practitioner(
  store: &SqliteStore,
  username: String,
  practice_name: String,
  license_number: String,
) -> anyhow::Result<()> {
  let password = read_password()?;
  if password.is_empty() {
    anyhow::bail!("password must not be empty");
  }

  let input = NewPractitioner {
    username,
    practice_name,
    license_number,
    password_hash: hash(&password)?,
  }
  .clean(chrono::Local::now().date_naive())
  .context("invalid practitioner")?;

  if store
    .set_password(&input.username, &input.password_hash)
    .await
    .context("failed to update password")?
  {
    tracing::warn!(username = %input.username, "practitioner exists; password updated");
    return Ok(());
  }

  let practitioner = store
    .create_practitioner(input)
    .await
    .context("failed to create practitioner")?;
  println!("{}", practitioner.practitioner_id);
  Ok(())
}

fn hash(password: &str) -> anyhow::Result<String> {
  hash_password(password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  let stdin = io::stdin();
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
