use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;
use tracing::warn;

/// Environment variable overriding the listening port
pub const PORT_ENV: &str = "PORT";

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
    /// Log level, default is "info". `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP listening port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log configuration
    #[serde(default)]
    pub log: LogConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;

        toml::from_str(&config_str).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Load from the optional file, or fall back to defaults
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Overlay the `PORT` environment variable
    pub fn apply_env(self) -> Self {
        self.with_port_var(std::env::var(PORT_ENV).ok())
    }

    /// Apply a raw port override, ignoring values that do not parse
    pub fn with_port_var(mut self, value: Option<String>) -> Self {
        if let Some(value) = value {
            match value.trim().parse() {
                Ok(port) => self.port = port,
                Err(e) => warn!("Invalid {PORT_ENV} value '{value}': {e}, keeping {}", self.port),
            }
        }
        self
    }

    /// Socket address to bind, `host:port`
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
