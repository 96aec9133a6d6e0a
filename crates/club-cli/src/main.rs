//! `club` — command-line front end for the club store.
//!
//! Reads `club.toml` (or the path given with `--config`), opens the SQLite
//! store it names and runs one subcommand. Results are printed as JSON on
//! stdout; logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! club sport add --name Football --category Team
//! club member add --first-name Ada --last-name Byron --email ada@example.com \
//!   --date-of-birth 1990-12-10
//! club subscribe <MEMBER_ID> <SPORT_ID>
//! club member show <MEMBER_ID> --sports
//! ```

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use club_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{commands::Command, settings::ClubConfig};

#[derive(Parser, Debug)]
#[command(name = "club", author, version, about = "Manage club sports, members and subscriptions")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "club.toml")]
  config: PathBuf,

  /// Database file; overrides `store_path` from the config.
  #[arg(long, env = "CLUB_STORE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut cfg = ClubConfig::load(&cli.config)?;
  if let Some(store) = cli.store {
    cfg.store_path = settings::expand_tilde(&store);
  }

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  if cfg.seed_sports {
    store.seed_if_empty().await.context("failed to seed starter sports")?;
  }

  let result = commands::run(&store, cli.command).await;
  store.close().await.context("failed to close store")?;
  result
}
