//! Application configuration management.
//!
//! Sources, lowest priority first: built-in defaults, `config/default.toml`,
//! `config/{RUN_MODE}.toml`, `GOPHERMART__SECTION__KEY` environment variables,
//! command-line overrides, and finally the bare `RUN_ADDRESS`, `DATABASE_URI`,
//! `ACCRUAL_SYSTEM_ADDRESS` and `LOG_LEVEL` variables.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    #[serde(default)]
    pub jwt: JwtConfig,
    /// Accrual system configuration.
    pub accrual: AccrualConfig,
    /// Reconciliation worker configuration.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to, `host:port`.
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "localhost:8080".to_string()
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations at startup.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_run_migrations() -> bool {
    true
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    #[serde(default = "default_jwt_secret")]
    pub secret: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: i64,
}

/// Secret used when none is configured. The server warns when it is in use.
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: default_jwt_secret(),
            token_expiry_hours: default_token_expiry_hours(),
        }
    }
}

impl JwtConfig {
    /// Returns true if the built-in development secret is in use.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_token_expiry_hours() -> i64 {
    24
}

/// Accrual system configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccrualConfig {
    /// Base address of the accrual system, with or without scheme.
    pub address: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    5
}

impl AccrualConfig {
    /// Base URL with a scheme and without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        let trimmed = self.address.trim().trim_end_matches('/');
        if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Reconciliation worker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Pause when no unresolved order exists, in milliseconds.
    #[serde(default = "default_idle_interval")]
    pub idle_interval_ms: u64,
    /// Pause after a transient failure, in milliseconds.
    #[serde(default = "default_retry_interval")]
    pub retry_interval_ms: u64,
    /// Global pause after the accrual system rate-limits us, in seconds.
    #[serde(default = "default_rate_limit_cooldown")]
    pub rate_limit_cooldown_secs: u64,
    /// How long shutdown waits for the in-flight iteration, in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            idle_interval_ms: default_idle_interval(),
            retry_interval_ms: default_retry_interval(),
            rate_limit_cooldown_secs: default_rate_limit_cooldown(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

impl WorkerConfig {
    /// Pause when there is nothing to resolve.
    #[must_use]
    pub const fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    /// Pause after a transient failure or a not-yet-available order.
    #[must_use]
    pub const fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Pause after the accrual system answered 429 without `Retry-After`.
    #[must_use]
    pub const fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_secs(self.rate_limit_cooldown_secs)
    }

    /// Upper bound on the shutdown wait.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

fn default_idle_interval() -> u64 {
    1_000
}

fn default_retry_interval() -> u64 {
    1_000
}

fn default_rate_limit_cooldown() -> u64 {
    60
}

fn default_shutdown_grace() -> u64 {
    5
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `-a`: server address.
    pub run_address: Option<String>,
    /// `-d`: database URI.
    pub database_uri: Option<String>,
    /// `-r`: accrual system address.
    pub accrual_system_address: Option<String>,
}

impl AppConfig {
    /// Loads configuration from config files, environment and overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or a required value
    /// (database URL, accrual address) is missing.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("GOPHERMART").separator("__"))
            .set_override_option("server.address", non_empty(overrides.run_address.clone()))?
            .set_override_option("database.url", non_empty(overrides.database_uri.clone()))?
            .set_override_option(
                "accrual.address",
                non_empty(overrides.accrual_system_address.clone()),
            )?
            .set_override_option("server.address", env_var("RUN_ADDRESS"))?
            .set_override_option("database.url", env_var("DATABASE_URI"))?
            .set_override_option("accrual.address", env_var("ACCRUAL_SYSTEM_ADDRESS"))?
            .set_override_option("log.level", env_var("LOG_LEVEL"))?
            .build()?;

        config.try_deserialize()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_var(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}
