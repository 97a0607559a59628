//! Configuration for the fabwatch console.
//!
//! TOML file plus `FABWATCH_*` environment overlay, resolved into a
//! [`ConsoleConfig`] for `fabwatch-core`. The file lives in the platform
//! config directory (e.g. `~/.config/fabwatch/config.toml`); every field
//! has a default, so a bare `gateway` entry is a complete configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use fabwatch_api::channel::ReconnectPolicy;
use fabwatch_api::transport::{TlsMode, TransportConfig};
use fabwatch_core::ConsoleConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no gateway configured -- set `gateway` in {path} or FABWATCH_GATEWAY")]
    NoGateway { path: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

/// On-disk / environment configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Gateway REST root, e.g. `"http://gateway:5167"`.
    pub gateway: Option<String>,

    /// Push hub endpoint override. Derived from `gateway` when unset.
    #[serde(default)]
    pub hub_url: Option<String>,

    /// Accept self-signed TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Custom CA certificate (PEM) for the gateway.
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Delay between push channel reconnect attempts, in seconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay: u64,

    /// Retained live history entries.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Sensors shown per catalog page.
    #[serde(default = "default_sensor_page_size")]
    pub sensor_page_size: usize,

    /// Alert rows shown per log page.
    #[serde(default = "default_log_page_size")]
    pub log_page_size: usize,

    /// Suppress system-level notifications while the surface has focus.
    #[serde(default = "default_true")]
    pub focus_suppression: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: None,
            hub_url: None,
            insecure: false,
            ca_cert: None,
            timeout: default_timeout(),
            reconnect_delay: default_reconnect_delay(),
            history_capacity: default_history_capacity(),
            sensor_page_size: default_sensor_page_size(),
            log_page_size: default_log_page_size(),
            focus_suppression: true,
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_reconnect_delay() -> u64 {
    5
}
fn default_history_capacity() -> usize {
    fabwatch_core::DEFAULT_HISTORY_CAPACITY
}
fn default_sensor_page_size() -> usize {
    fabwatch_core::DEFAULT_SENSOR_PAGE_SIZE
}
fn default_log_page_size() -> usize {
    fabwatch_core::DEFAULT_LOG_PAGE_SIZE
}
fn default_true() -> bool {
    true
}

// ── Loading ─────────────────────────────────────────────────────────

/// Platform config file path (`<config dir>/fabwatch/config.toml`).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "fabwatch")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("fabwatch.toml"))
}

/// Load configuration from the default path plus environment.
pub fn load() -> Result<Config, ConfigError> {
    load_from(config_path())
}

/// Load configuration from a specific file plus environment.
///
/// Precedence, lowest to highest: built-in defaults, the TOML file,
/// `FABWATCH_*` environment variables.
pub fn load_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path.as_ref()))
        .merge(Env::prefixed("FABWATCH_"))
        .extract()?;
    Ok(config)
}

/// Write the config as TOML to the default path, creating parent
/// directories as needed. Returns the path written.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, toml::to_string_pretty(config)?)?;
    Ok(path)
}

// ── Resolution ──────────────────────────────────────────────────────

impl Config {
    /// Render as pretty TOML (for `config show`).
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve into a [`ConsoleConfig`], validating the gateway URL.
    pub fn resolve(&self) -> Result<ConsoleConfig, ConfigError> {
        let raw = self
            .gateway
            .as_deref()
            .ok_or_else(|| ConfigError::NoGateway {
                path: config_path().display().to_string(),
            })?;

        let gateway_url: Url = raw.parse().map_err(|e| ConfigError::Validation {
            field: "gateway".into(),
            reason: format!("invalid URL `{raw}`: {e}"),
        })?;

        let mut console = ConsoleConfig::new(gateway_url).map_err(|e| ConfigError::Validation {
            field: "gateway".into(),
            reason: e.to_string(),
        })?;

        if let Some(ref hub) = self.hub_url {
            console.hub_url = hub.parse().map_err(|e| ConfigError::Validation {
                field: "hub_url".into(),
                reason: format!("invalid URL `{hub}`: {e}"),
            })?;
        }

        console.transport = TransportConfig {
            tls: self.tls_mode(),
            timeout: Duration::from_secs(self.timeout),
        };
        console.reconnect = ReconnectPolicy {
            delay: Duration::from_secs(self.reconnect_delay),
        };
        console.history_capacity = self.history_capacity;
        console.sensor_page_size = self.sensor_page_size;
        console.log_page_size = self.log_page_size;
        console.suppress_when_focused = self.focus_suppression;

        Ok(console)
    }

    fn tls_mode(&self) -> TlsMode {
        if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref path) = self.ca_cert {
            TlsMode::CustomCa(path.clone())
        } else {
            TlsMode::System
        }
    }
}
