//! Configuration loading and management
//!
//! Sources, later ones winning: built-in defaults, an optional YAML file named
//! by `CONFIG_FILE`, then the environment (`HOST`, `PORT`, `ALLOWED_ORIGINS`,
//! `DEBUG`, `DATA_DIR`).

use crate::core::RateLimitConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// 1 MiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host (loopback only by default)
    pub host: String,

    /// Listening port
    pub port: u16,

    /// Origins allowed for cross-origin requests; `*` allows any
    pub allowed_origins: Vec<String>,

    /// Verbose logging
    pub debug: bool,

    /// Directory holding `orders.json` and `reviews.json`
    pub data_dir: PathBuf,

    /// Largest accepted request body
    pub max_body_bytes: usize,

    /// Limits for write and admin endpoints
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            debug: false,
            data_dir: PathBuf::from("data"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("parsing config {}", path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from the process environment (and `CONFIG_FILE` when set)
    pub fn load() -> Result<Self> {
        let base = match std::env::var("CONFIG_FILE") {
            Ok(path) if !path.trim().is_empty() => Self::from_yaml_file(path.trim())?,
            _ => Self::default(),
        };
        base.with_env(std::env::vars())
    }

    /// Apply environment overrides from `vars`
    pub fn with_env<I, K, V>(mut self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "HOST" if !value.is_empty() => self.host = value.to_string(),
                "PORT" if !value.is_empty() => {
                    self.port = value
                        .parse()
                        .with_context(|| format!("PORT must be a port number, got '{}'", value))?;
                }
                "ALLOWED_ORIGINS" => self.allowed_origins = parse_origins(value),
                "DEBUG" => self.debug = parse_flag(value),
                "DATA_DIR" if !value.is_empty() => self.data_dir = PathBuf::from(value),
                _ => {}
            }
        }
        Ok(self)
    }

    /// Socket address to bind
    ///
    /// `host` must be an IP literal (IPv4 or IPv6, brackets optional) or
    /// `localhost`.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let host = self.host.trim();
        let ip = match host {
            "localhost" => IpAddr::V4(Ipv4Addr::LOCALHOST),
            other => other
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse()
                .with_context(|| format!("invalid bind host '{}'", self.host))?,
        };
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
