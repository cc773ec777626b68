use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{Error, Result};

/// Environment variable naming the storage service the gateway calls
pub const RPC_ADDR_ENV: &str = "GRPC_SERVER_ADDR";

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
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

/// Storage service configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorageConfig {
  /// gRPC listening address
  #[serde(default = "default_storage_addr")]
  pub listen_addr: String,
}

fn default_storage_addr() -> String {
  "0.0.0.0:50000".to_string()
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      listen_addr: default_storage_addr(),
    }
  }
}

/// HTTP gateway configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GatewayConfig {
  /// HTTP listening address
  #[serde(default = "default_gateway_addr")]
  pub listen_addr: String,
  /// Storage service endpoint, e.g. "http://localhost:50000"
  #[serde(default = "default_rpc_addr")]
  pub rpc_addr: String,
}

fn default_gateway_addr() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_rpc_addr() -> String {
  "http://localhost:50000".to_string()
}

impl Default for GatewayConfig {
  fn default() -> Self {
    Self {
      listen_addr: default_gateway_addr(),
      rpc_addr: default_rpc_addr(),
    }
  }
}

/// kvstore configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
  #[serde(default)]
  pub storage: StorageConfig,

  #[serde(default)]
  pub gateway: GatewayConfig,

  /// Log configuration
  #[serde(default)]
  pub log: LogConfig,
}

impl Config {
  /// Load configuration from TOML file
  pub fn from_file(path: &str) -> Result<Self> {
    let config_str = fs::read_to_string(path)
      .map_err(|e| Error::Config(format!("Failed to read config file '{}': {}", path, e)))?;

    Self::parse(&config_str)
      .map_err(|e| Error::Config(format!("Failed to parse config file '{}': {}", path, e)))
  }

  /// Parse configuration from a TOML string
  pub fn parse(config_str: &str) -> std::result::Result<Self, toml::de::Error> {
    toml::from_str(config_str)
  }

  /// Load from `path` if given, otherwise start from defaults, then apply
  /// the environment.
  pub fn load(path: Option<&str>) -> Result<Self> {
    let mut config = match path {
      Some(path) => Self::from_file(path)?,
      None => Self::default(),
    };
    config.apply_env(|name| std::env::var(name).ok());
    Ok(config)
  }

  /// Override file values with environment variables
  pub fn apply_env<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(addr) = lookup(RPC_ADDR_ENV).filter(|a| !a.is_empty()) {
      self.gateway.rpc_addr = normalize_endpoint(&addr);
    }
  }
}

/// tonic endpoints need a scheme; a bare "host:port" gets `http://`
pub fn normalize_endpoint(addr: &str) -> String {
  if addr.contains("://") {
    addr.to_string()
  } else {
    format!("http://{}", addr)
  }
}
