//! Server configuration.
//!
//! Built-in defaults, then an optional YAML file named by `HTTPWIRE_CONFIG`,
//! then individual environment overrides:
//!
//! | variable          | field             |
//! |-------------------|-------------------|
//! | `LISTEN`          | `listen_addr`     |
//! | `MAX_BUFFER_SIZE` | `max_buffer_size` |
//! | `LOG_LEVEL`       | `log.level`       |
//! | `LOG_JSON`        | `log.json`        |

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::http::parser::DEFAULT_MAX_BUFFER_SIZE;

pub const CONFIG_FILE_VAR: &str = "HTTPWIRE_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the server binds to.
    pub listen_addr: String,
    /// Cap on buffered, not yet parsed request bytes per connection.
    pub max_buffer_size: usize,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:42069".to_string(),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` to resolve environment variables.
    pub fn load_from<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(CONFIG_FILE_VAR) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(addr) = lookup("LISTEN") {
            cfg.listen_addr = addr;
        }
        if let Some(size) = lookup("MAX_BUFFER_SIZE") {
            cfg.max_buffer_size = size
                .parse()
                .with_context(|| format!("MAX_BUFFER_SIZE={size:?} is not a number"))?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            cfg.log.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            cfg.log.json = parse_flag(&json)
                .with_context(|| format!("LOG_JSON={json:?} is not a boolean"))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("loading {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(content).context("invalid YAML config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.listen_addr.trim().is_empty(), "listen_addr must not be empty");
        anyhow::ensure!(self.max_buffer_size > 0, "max_buffer_size must be greater than zero");
        self.log
            .level
            .parse::<tracing::Level>()
            .map_err(|_| anyhow::anyhow!("unknown log level {:?}", self.log.level))?;
        Ok(())
    }
}

/// Accepts the usual spellings of a boolean switch, ignoring case.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
