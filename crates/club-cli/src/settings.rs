//! Runtime configuration for the `club` binary.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Deserialised from the optional TOML file layered with `CLUB_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ClubConfig {
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path:  PathBuf,
  /// Write the starter sports into an empty store on startup.
  pub seed_sports: bool,
}

impl ClubConfig {
  /// Load from `path` (missing file is fine) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("store_path", "club.db")?
      .set_default("seed_sports", true)?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CLUB"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let mut cfg: ClubConfig = settings
      .try_deserialize()
      .context("failed to deserialise ClubConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let cfg = ClubConfig::load(Path::new("does-not-exist.toml")).unwrap();
    assert!(cfg.seed_sports);
    assert_eq!(cfg.store_path, PathBuf::from("club.db"));
  }

  #[test]
  fn plain_paths_are_not_expanded() {
    assert_eq!(expand_tilde(Path::new("data/club.db")), PathBuf::from("data/club.db"));
  }
}
