//! Application configuration.
//!
//! Settings and server values come from `config.toml` (or the file named by
//! `VOCAB_SRS_CONFIG`), with environment overrides for the bind address.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::Settings;
use crate::store::LogOnError;

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

// ==================== Query Limits ====================

/// Session size used when a due-card request names no limit
pub const DEFAULT_DUE_LIMIT: usize = 999;

// ==================== Config File ====================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub addr: String,
  pub port: u16,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      addr: SERVER_ADDR.to_string(),
      port: SERVER_PORT,
    }
  }
}

impl ServerConfig {
  /// Get the full server bind address
  pub fn bind_addr(&self) -> String {
    format!("{}:{}", self.addr, self.port)
  }
}

/// Configuration file structure for config.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub server: ServerConfig,
  pub srs: Settings,
}

/// Config loading errors.
#[derive(Debug)]
pub enum ConfigError {
  Io(String, String),
  Parse(String, String),
  Invalid(String),
}

impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ConfigError::Io(path, err) => write!(f, "IO error reading {}: {}", path, err),
      ConfigError::Parse(path, err) => write!(f, "Parse error in {}: {}", path, err),
      ConfigError::Invalid(err) => write!(f, "Invalid srs settings: {}", err),
    }
  }
}

impl std::error::Error for ConfigError {}

/// Parse and validate a config file.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
  let display = path.display().to_string();
  let contents =
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io(display.clone(), e.to_string()))?;
  let config: AppConfig =
    toml::from_str(&contents).map_err(|e| ConfigError::Parse(display, e.to_string()))?;
  config
    .srs
    .validate()
    .map_err(|e| ConfigError::Invalid(e.to_string()))?;
  Ok(config)
}

/// Config file path with priority: VOCAB_SRS_CONFIG > config.toml
pub fn config_path() -> PathBuf {
  std::env::var("VOCAB_SRS_CONFIG")
    .map(PathBuf::from)
    .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Apply VOCAB_SRS_ADDR / VOCAB_SRS_PORT on top of the file values
fn apply_env_overrides(server: &mut ServerConfig) {
  if let Ok(addr) = std::env::var("VOCAB_SRS_ADDR") {
    tracing::info!("Using bind address from VOCAB_SRS_ADDR env: {}", addr);
    server.addr = addr;
  }
  if let Ok(port) = std::env::var("VOCAB_SRS_PORT") {
    match port.parse() {
      Ok(port) => server.port = port,
      Err(e) => tracing::warn!("Ignoring VOCAB_SRS_PORT={}: {}", port, e),
    }
  }
}

/// Load configuration; never fails.
///
/// A missing file means defaults. A file that fails to parse or validate is
/// logged and replaced by defaults (for parse errors) or sanitized settings
/// (for invalid values).
pub fn load_config() -> AppConfig {
  // Load .env file if present
  let _ = dotenvy::dotenv();

  let path = config_path();
  let mut config = if path.exists() {
    match load_config_from(&path) {
      Ok(config) => {
        tracing::info!("Using config from {}", path.display());
        config
      }
      Err(ConfigError::Invalid(e)) => {
        tracing::error!("{}: falling back to sanitized settings", e);
        recover_invalid(&path)
      }
      Err(e) => {
        tracing::warn!("{}: using defaults", e);
        AppConfig::default()
      }
    }
  } else {
    tracing::info!("No config file at {}, using defaults", path.display());
    AppConfig::default()
  };

  apply_env_overrides(&mut config.server);
  config
}

/// Re-read a config whose settings parsed but failed validation
fn recover_invalid(path: &Path) -> AppConfig {
  let parsed = std::fs::read_to_string(path)
    .log_warn("Re-reading config")
    .and_then(|contents| toml::from_str::<AppConfig>(&contents).log_warn("Re-parsing config"))
    .unwrap_or_default();
  AppConfig {
    srs: parsed.srs.sanitized(),
    ..parsed
  }
}
