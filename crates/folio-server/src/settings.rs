//! Server settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file (`folio.toml`, or the path in `FOLIO_CONFIG`), then environment
//! variables prefixed `FOLIO__` with `__` between levels, e.g.
//! `FOLIO__SERVER__PORT=9000` or `FOLIO__ADMIN__EMAILS=a@x.io,b@x.io`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use folio_cache::FacadeConfig;
use folio_core::{AdminPolicy, StorePath};
use folio_store::{MonitorConfig, RetryPolicy};
use serde::Deserialize;
use thiserror::Error;

/// Default settings file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

/// Environment variable naming an explicit settings file.
pub const CONFIG_PATH_ENV: &str = "FOLIO_CONFIG";

/// Upper bound for `retry.max_retries`.
pub const MAX_RETRIES: u32 = 10;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),

    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub subscriptions: SubscriptionSettings,
    pub retry: RetrySettings,
    pub monitor: MonitorSettings,
    pub admin: AdminSettings,
    pub seed: SeedSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// TTL of cached store reads.
    pub ttl_seconds: u64,
    /// Drop related cached reads after every write.
    pub invalidate_on_write: bool,
    /// Paths read into the cache at start.
    pub preload: Vec<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            invalidate_on_write: true,
            preload: vec!["website".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubscriptionSettings {
    /// Minimum spacing between live deliveries.
    pub throttle_ms: u64,
    /// Deliver the last suppressed value at the end of each window.
    pub trailing: bool,
    /// Interval of SSE keep-alive comments.
    pub keep_alive_seconds: u64,
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            throttle_ms: 1000,
            trailing: false,
            keep_alive_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            backoff_multiplier: 2.0,
            max_delay_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub interval_seconds: u64,
    pub max_failures: u32,
    pub max_backoff_seconds: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
            max_failures: 3,
            max_backoff_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Emails allowed to edit content and read the inbox.
    pub emails: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedSettings {
    /// JSON or YAML file written when `target` is empty.
    pub path: Option<PathBuf>,
    pub target: String,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            path: None,
            target: "website".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from the default locations.
    pub fn load() -> Result<Self, SettingsError> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from(explicit.as_deref())
    }

    /// Loads settings, reading `path` (required) instead of `folio.toml`.
    pub fn load_from(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("FOLIO")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("admin.emails")
                    .with_list_parse_key("cache.preload")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        self.socket_addr()?;
        if self.retry.backoff_multiplier < 1.0 {
            return Err(SettingsError::invalid(
                "retry.backoff_multiplier",
                "must be at least 1.0",
            ));
        }
        if self.retry.max_retries > MAX_RETRIES {
            return Err(SettingsError::invalid(
                "retry.max_retries",
                format!("must be at most {MAX_RETRIES}"),
            ));
        }
        self.preload_paths()?;
        self.seed_target()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| SettingsError::invalid("server.host", format!("{e}")))
    }

    pub fn facade_config(&self) -> FacadeConfig {
        FacadeConfig {
            default_ttl: Duration::from_secs(self.cache.ttl_seconds),
            default_throttle: self.live_throttle(),
            invalidate_on_write: self.cache.invalidate_on_write,
        }
    }

    pub fn live_throttle(&self) -> Duration {
        Duration::from_millis(self.subscriptions.throttle_ms)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.subscriptions.keep_alive_seconds.max(1))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            backoff_multiplier: self.retry.backoff_multiplier,
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: Duration::from_secs(self.monitor.interval_seconds.max(1)),
            max_failures: self.monitor.max_failures,
            max_backoff: Duration::from_secs(self.monitor.max_backoff_seconds),
            ..MonitorConfig::default()
        }
    }

    pub fn admin_policy(&self) -> AdminPolicy {
        AdminPolicy::new(&self.admin.emails)
    }

    pub fn preload_paths(&self) -> Result<Vec<StorePath>, SettingsError> {
        self.cache
            .preload
            .iter()
            .map(|raw| {
                StorePath::parse(raw)
                    .map_err(|e| SettingsError::invalid("cache.preload", e.to_string()))
            })
            .collect()
    }

    pub fn seed_target(&self) -> Result<StorePath, SettingsError> {
        StorePath::parse(&self.seed.target)
            .map_err(|e| SettingsError::invalid("seed.target", e.to_string()))
    }
}
