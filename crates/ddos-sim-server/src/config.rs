//! Configuration loading and typed config structures for the server.
//!
//! Configuration lives in an optional YAML file (`ddos-sim.yaml` by
//! default). Every field has a default, so an absent file or an absent
//! section is fine. A handful of environment variables override the file:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `DDOS_SIM_HOST` | `server.host` |
//! | `DDOS_SIM_PORT` | `server.port` |
//! | `DDOS_SIM_SESSION_TTL_SECS` | `session.ttl_secs` |
//! | `DDOS_SIM_STRICT_LOG_REFERENCES` | `store.strict_log_references` |
//! | `DDOS_SIM_LOG_JSON` | `logging.json` |

use std::path::Path;

use chrono::TimeDelta;
use serde::Deserialize;

use ddos_sim_store::StoreOptions;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ddos-sim.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {message}")]
    Env {
        /// The offending variable.
        var: &'static str,
        /// Why it was rejected.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Login session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Realtime channel settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Entity store behavior.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load `path` if it exists (defaults otherwise), then apply
    /// environment overrides.
    ///
    /// Runs before logging is set up, so it logs nothing; callers report
    /// where the configuration came from.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Env`] if an override is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::parse(&contents)?
        } else {
            Self::default()
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides looked up through `lookup` (normally the process
    /// environment).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if a present variable cannot be parsed.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("DDOS_SIM_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DDOS_SIM_PORT") {
            self.server.port = parse_var("DDOS_SIM_PORT", &port)?;
        }
        if let Some(ttl) = lookup("DDOS_SIM_SESSION_TTL_SECS") {
            self.session.ttl_secs = parse_var("DDOS_SIM_SESSION_TTL_SECS", &ttl)?;
        }
        if let Some(strict) = lookup("DDOS_SIM_STRICT_LOG_REFERENCES") {
            self.store.strict_log_references =
                parse_var("DDOS_SIM_STRICT_LOG_REFERENCES", &strict)?;
        }
        if let Some(json) = lookup("DDOS_SIM_LOG_JSON") {
            self.logging.json = parse_var("DDOS_SIM_LOG_JSON", &json)?;
        }
        Ok(())
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        message: e.to_string(),
    })
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,
    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Login session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// How long a session stays valid after login, in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,
    /// How often expired sessions are swept, in seconds.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
    /// Mark the session cookie `Secure` (HTTPS only).
    #[serde(default)]
    pub secure_cookie: bool,
}

impl SessionConfig {
    /// The session lifetime as a [`TimeDelta`], saturating on overflow.
    pub fn ttl(&self) -> TimeDelta {
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl_secs(),
            purge_interval_secs: default_purge_interval_secs(),
            secure_cookie: false,
        }
    }
}

/// Realtime channel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RealtimeConfig {
    /// Frames buffered per subscriber before a slow one starts skipping.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

/// Entity store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Reject traffic logs that reference a test the store does not hold.
    #[serde(default)]
    pub strict_log_references: bool,
}

impl StoreConfig {
    /// Convert into the store's own option struct.
    pub const fn options(&self) -> StoreOptions {
        StoreOptions {
            strict_log_references: self.strict_log_references,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    5000
}

const fn default_session_ttl_secs() -> u64 {
    86_400
}

const fn default_purge_interval_secs() -> u64 {
    86_400
}

const fn default_broadcast_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_owned()
}
