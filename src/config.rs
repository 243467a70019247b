//! Collector configuration.
//!
//! Settings are layered with the `config` crate: an optional file (the
//! classic `param.json`), then `MONGOWATCH_*` environment variables, then
//! whatever the command line sets. The raw [`Settings`] are resolved into a
//! validated [`CollectorConfig`] with the defaults applied.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Default MongoDB HTTP status port.
pub const DEFAULT_HTTP_PORT: u16 = 28017;

/// The HTTP status interface listens this far above the data port.
pub const HTTP_PORT_OFFSET: u16 = 1000;

/// Default host when none is configured.
pub const DEFAULT_HOSTNAME: &str = "127.0.0.1";

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default prefix prepended to every metric name.
pub const DEFAULT_PREFIX: &str = "MONGO_";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "MONGOWATCH";

/// Errors raised while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("port {0} has no HTTP status interface (port + 1000 exceeds 65535)")]
    PortOutOfRange(u16),
}

/// Raw, unvalidated settings. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    /// Poll interval in milliseconds.
    #[serde(alias = "pollInterval", alias = "pollinterval")]
    pub poll_interval: Option<u64>,
    pub source: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Request timeout in milliseconds.
    #[serde(alias = "timeoutMs", alias = "timeoutms")]
    pub timeout_ms: Option<u64>,
    pub prefix: Option<String>,
}

impl Settings {
    /// Load settings from `path` (missing file is fine) and the environment,
    /// then apply `overrides` on top.
    pub fn load(path: &Path, overrides: Settings) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings.merge(overrides))
    }

    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            hostname: overrides.hostname.or(self.hostname),
            port: overrides.port.or(self.port),
            poll_interval: overrides.poll_interval.or(self.poll_interval),
            source: overrides.source.or(self.source),
            username: overrides.username.or(self.username),
            password: overrides.password.or(self.password),
            timeout_ms: overrides.timeout_ms.or(self.timeout_ms),
            prefix: overrides.prefix.or(self.prefix),
        }
    }

    /// Apply defaults and validate.
    pub fn resolve(self) -> Result<CollectorConfig, ConfigError> {
        let credentials = non_empty(self.username).map(|username| Credentials {
            username,
            password: self.password.unwrap_or_default(),
        });

        Ok(CollectorConfig {
            hostname: non_empty(self.hostname).unwrap_or_else(|| DEFAULT_HOSTNAME.to_string()),
            port: http_port(self.port)?,
            poll_interval: millis_or(self.poll_interval, DEFAULT_POLL_INTERVAL),
            source: non_empty(self.source).unwrap_or_else(local_hostname),
            credentials,
            timeout: millis_or(self.timeout_ms, DEFAULT_TIMEOUT),
            prefix: self.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
        })
    }
}

/// Validated collector configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    pub hostname: String,
    /// Port of the HTTP status interface (already offset).
    pub port: u16,
    pub poll_interval: Duration,
    /// Label attached to every metric line.
    pub source: String,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
    pub prefix: String,
}

impl CollectorConfig {
    /// URL of the status document.
    pub fn status_url(&self) -> String {
        format!("http://{}:{}/_status", self.hostname, self.port)
    }
}

/// Basic auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Map a configured data port onto the HTTP status port.
///
/// Unset (or 0) and the default status port itself pass through as the
/// default; any other port is taken to be the data port and offset by 1000.
pub fn http_port(port: Option<u16>) -> Result<u16, ConfigError> {
    match port {
        None | Some(0) | Some(DEFAULT_HTTP_PORT) => Ok(DEFAULT_HTTP_PORT),
        Some(port) => port
            .checked_add(HTTP_PORT_OFFSET)
            .ok_or(ConfigError::PortOutOfRange(port)),
    }
}

/// Hostname of this machine, used as the default source label.
pub fn local_hostname() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "localhost".to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn millis_or(value: Option<u64>, default: Duration) -> Duration {
    match value {
        None | Some(0) => default,
        Some(ms) => Duration::from_millis(ms),
    }
}
