//! Configuration structures for hmsclient.
//!
//! Configuration is loaded from TOML files and can be overridden via CLI flags.
//! The metastore endpoint is resolved from explicit values first, then from an
//! embedded `host:port` form, then from the `HMS_HOST` / `HMS_PORT` environment
//! variables, and finally from the `localhost:9083` default.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Host used when neither an explicit host nor `HMS_HOST` is available.
pub const DEFAULT_HOST: &str = "localhost";

/// Standard Hive Metastore Thrift port.
pub const DEFAULT_PORT: u16 = 9083;

/// Environment variable holding the metastore host (may embed the port).
pub const HMS_HOST_ENV: &str = "HMS_HOST";

/// Environment variable holding the metastore port.
pub const HMS_PORT_ENV: &str = "HMS_PORT";

const THRIFT_SCHEME: &str = "thrift://";

/// Source of environment variables consulted during endpoint resolution.
pub trait EnvSource {
    /// Look up a variable, returning `None` when it is unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A resolved metastore address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host name or IP address, never empty
    pub host: String,
    /// TCP port, never zero
    pub port: u16,
}

impl Endpoint {
    /// Resolve an endpoint from optional explicit values and an environment.
    ///
    /// An empty explicit host counts as absent. A port embedded in the host
    /// (`host:port`, optionally prefixed with `thrift://`) takes precedence over
    /// the explicit `port` argument.
    pub fn resolve(host: Option<&str>, port: Option<u16>, env: &impl EnvSource) -> Result<Self> {
        let raw_host = host
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .or_else(|| env.var(HMS_HOST_ENV).filter(|h| !h.is_empty()))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let trimmed = raw_host
            .strip_prefix(THRIFT_SCHEME)
            .unwrap_or(&raw_host)
            .trim_end_matches('/');

        let (host, port) = match trimmed.split_once(':') {
            Some((host, embedded)) => (host.to_string(), Some(parse_port(embedded)?)),
            None => (trimmed.to_string(), port),
        };

        if host.is_empty() {
            return Err(Error::Config(format!(
                "Invalid Hive Metastore address {}: host is empty",
                raw_host
            )));
        }

        let port = match port {
            Some(0) => {
                return Err(Error::Config("Hive Metastore port must be positive".into()));
            }
            Some(port) => port,
            None => match env.var(HMS_PORT_ENV).filter(|p| !p.is_empty()) {
                Some(value) => parse_port(&value)?,
                None => DEFAULT_PORT,
            },
        };

        Ok(Self { host, port })
    }

    /// Resolve using the process environment.
    pub fn from_env(host: Option<&str>, port: Option<u16>) -> Result<Self> {
        Self::resolve(host, port, &ProcessEnv)
    }

    /// The `host:port` form used for address lookup.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

fn parse_port(value: &str) -> Result<u16> {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(Error::Config(format!(
            "Invalid port in Hive Metastore address: {}",
            value
        ))),
        Ok(port) => Ok(port),
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Metastore connection configuration
    #[serde(default)]
    pub metastore: MetastoreConfig,

    /// Monitoring configuration
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// Metastore connection configuration.
///
/// Both fields are optional; anything left unset falls back to the
/// environment and then to the defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetastoreConfig {
    /// Metastore host, may embed the port (`host:port`) or a `thrift://` prefix
    #[serde(default)]
    pub host: Option<String>,

    /// Metastore port
    #[serde(default)]
    pub port: Option<u16>,
}

impl MetastoreConfig {
    /// Resolve the configured endpoint against an environment.
    pub fn endpoint(&self, env: &impl EnvSource) -> Result<Endpoint> {
        Endpoint::resolve(self.host.as_deref(), self.port, env)
    }
}

/// Monitoring configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MonitoringConfig {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log format
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Plain text format (default)
    #[default]
    Text,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(host) = &self.metastore.host {
            if host.trim().is_empty() {
                return Err(Error::Config("Metastore host must not be empty".into()));
            }
        }

        if self.metastore.port == Some(0) {
            return Err(Error::Config("Metastore port must be positive".into()));
        }

        Ok(())
    }
}
