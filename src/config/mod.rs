use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read config file '{path}': {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse config file '{path}': {source}")]
  Parse {
    path: String,
    #[source]
    source: toml::de::Error,
  },

  #[error("Invalid configuration: {0}")]
  Invalid(String),
}

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
  /// Log file path, if not set, logs will be printed to stdout
  pub file: Option<String>,
  /// Log level, default is "info"
  #[serde(default = "default_log_level")]
  pub level: String,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      file: None,
      level: default_log_level(),
    }
  }
}

/// RocksDB storage configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
  /// Directory holding the profile database
  #[serde(default = "default_data_path")]
  pub data_path: String,
  #[serde(default = "default_create_if_missing")]
  pub create_if_missing: bool,
  #[serde(default = "default_max_open_files")]
  pub max_open_files: i32,
}

fn default_data_path() -> String {
  "./data/socialdb".to_string()
}

fn default_create_if_missing() -> bool {
  true
}

fn default_max_open_files() -> i32 {
  1000
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      data_path: default_data_path(),
      create_if_missing: default_create_if_missing(),
      max_open_files: default_max_open_files(),
    }
  }
}

/// SocialDB configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
  /// Server listening address (RESP protocol)
  #[serde(default = "default_server_addr")]
  pub server_addr: String,

  /// Storage configuration
  #[serde(default)]
  pub storage: StorageConfig,

  /// Log configuration
  #[serde(default)]
  pub log: LogConfig,
}

fn default_server_addr() -> String {
  "0.0.0.0:6380".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      server_addr: default_server_addr(),
      storage: StorageConfig::default(),
      log: LogConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from TOML file. Values are checked by
  /// [`Config::validate`] once command-line overrides are applied.
  pub fn from_file(path: &str) -> Result<Self, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_string(),
      source,
    })?;

    let config: Config = toml::from_str(&config_str).map_err(|source| ConfigError::Parse {
      path: path.to_string(),
      source,
    })?;

    Ok(config)
  }

  /// Check values that serde cannot reject on its own
  pub fn validate(&self) -> Result<(), ConfigError> {
    self.server_addr.parse::<SocketAddr>().map_err(|e| {
      ConfigError::Invalid(format!("server_addr '{}': {}", self.server_addr, e))
    })?;

    if self.storage.data_path.trim().is_empty() {
      return Err(ConfigError::Invalid(
        "storage.data_path must not be empty".to_string(),
      ));
    }

    EnvFilter::try_new(&self.log.level)
      .map_err(|e| ConfigError::Invalid(format!("log level '{}': {}", self.log.level, e)))?;

    Ok(())
  }
}
