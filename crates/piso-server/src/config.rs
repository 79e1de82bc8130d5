//! Runtime server configuration.
//!
//! Layered from an optional TOML file and `PISO_*` environment variables,
//! the latter taking precedence. Every key has a default so the server starts
//! with no configuration at all.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8000,
      store_path: PathBuf::from("piso.db"),
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::from_sources(config::File::from(path).required(false))
  }

  fn from_sources<F>(file: F) -> Result<Self, config::ConfigError>
  where
    F: config::Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(file)
      .add_source(config::Environment::with_prefix("PISO"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
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
  use config::{File, FileFormat};

  use super::*;

  #[test]
  fn empty_file_yields_defaults() {
    let cfg = ServerConfig::from_sources(File::from_str("", FileFormat::Toml)).unwrap();
    assert_eq!(cfg, ServerConfig::default());
    assert_eq!(cfg.address(), "127.0.0.1:8000");
  }

  #[test]
  fn file_overrides_defaults() {
    let toml = r#"
      host = "0.0.0.0"
      port = 9090
      store_path = "/var/lib/piso/piso.db"
    "#;
    let cfg = ServerConfig::from_sources(File::from_str(toml, FileFormat::Toml)).unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:9090");
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/piso/piso.db"));
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/piso-config.toml")).unwrap();
    assert_eq!(cfg.port, ServerConfig::default().port);
  }

  #[test]
  fn tilde_is_expanded() {
    let home = std::env::var("HOME").unwrap_or_default();
    if home.is_empty() {
      return;
    }
    let expanded = expand_tilde(Path::new("~/data/piso.db"));
    assert_eq!(expanded, PathBuf::from(home).join("data/piso.db"));
    assert_eq!(expand_tilde(Path::new("/abs/piso.db")), PathBuf::from("/abs/piso.db"));
  }
}
