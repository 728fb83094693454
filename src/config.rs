//! Configuration loading and constants.
//!
//! Settings come from three layers: built-in defaults, an optional TOML file,
//! and environment variables (`PORT`, `DB_HOST`, ...), applied in that order.
//! `AppConfig` is the root configuration struct containing all settings.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

// =============================================================================
// HTTP
// =============================================================================

/// Cache-Control for every API response; listings and health must never be cached
pub const CACHE_CONTROL_API: &str = "no-store";

/// Default bind address for the API listener
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default API port
pub const DEFAULT_HTTP_PORT: u16 = 3002;

// =============================================================================
// Database
// =============================================================================

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "stand_capacity";
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_PASSWORD: &str = "postgres";

// =============================================================================
// Frontend / Status client
// =============================================================================

/// Only origin allowed by CORS unless overridden
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// Where the status client finds the API
pub const DEFAULT_API_URL: &str = "http://localhost:3002";

/// Port of the status page listener
pub const DEFAULT_FRONTEND_PORT: u16 = 3000;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path (optional)
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "stand_capacity=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// PostgreSQL connection and pool settings
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub errors: ErrorsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Status client and status page settings
    #[serde(default)]
    pub client: ClientConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }
}

/// Database configuration.
///
/// Pool tuning fields are optional; when unset the sqlx defaults apply.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_host")]
    pub host: String,
    #[serde(default = "DatabaseConfig::default_port")]
    pub port: u16,
    #[serde(default = "DatabaseConfig::default_name")]
    pub name: String,
    #[serde(default = "DatabaseConfig::default_user")]
    pub user: String,
    #[serde(default = "DatabaseConfig::default_password")]
    pub password: String,
    /// Maximum pooled connections
    pub max_connections: Option<u32>,
    /// Minimum idle connections kept open
    pub min_connections: Option<u32>,
    /// How long a request waits for a free connection
    pub acquire_timeout_seconds: Option<u64>,
    /// Idle connections are closed after this many seconds
    pub idle_timeout_seconds: Option<u64>,
    /// Connections are recycled after this many seconds
    pub max_lifetime_seconds: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            name: Self::default_name(),
            user: Self::default_user(),
            password: Self::default_password(),
            max_connections: None,
            min_connections: None,
            acquire_timeout_seconds: None,
            idle_timeout_seconds: None,
            max_lifetime_seconds: None,
        }
    }
}

impl DatabaseConfig {
    fn default_host() -> String {
        DEFAULT_DB_HOST.to_string()
    }
    fn default_port() -> u16 {
        DEFAULT_DB_PORT
    }
    fn default_name() -> String {
        DEFAULT_DB_NAME.to_string()
    }
    fn default_user() -> String {
        DEFAULT_DB_USER.to_string()
    }
    fn default_password() -> String {
        DEFAULT_DB_PASSWORD.to_string()
    }
}

/// Cross-origin policy
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// The single origin allowed to make credentialed requests
    #[serde(default = "CorsConfig::default_frontend_url")]
    pub frontend_url: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            frontend_url: Self::default_frontend_url(),
        }
    }
}

impl CorsConfig {
    fn default_frontend_url() -> String {
        DEFAULT_FRONTEND_URL.to_string()
    }
}

/// Error reporting policy
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorsConfig {
    /// Listing routes return the raw driver message when true
    #[serde(default = "ErrorsConfig::default_verbose")]
    pub verbose: bool,
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            verbose: Self::default_verbose(),
        }
    }
}

impl ErrorsConfig {
    fn default_verbose() -> bool {
        true
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API, without trailing slash
    #[serde(default = "ClientConfig::default_api_url")]
    pub api_url: String,
    /// Request timeout for the health fetch; reqwest default when unset
    pub timeout_seconds: Option<u64>,
    /// Port the status page listens on
    #[serde(default = "ClientConfig::default_listen_port")]
    pub listen_port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Self::default_api_url(),
            timeout_seconds: None,
            listen_port: Self::default_listen_port(),
        }
    }
}

impl ClientConfig {
    fn default_api_url() -> String {
        DEFAULT_API_URL.to_string()
    }

    fn default_listen_port() -> u16 {
        DEFAULT_FRONTEND_PORT
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Like [`AppConfig::load`], reading overrides through `lookup`.
    pub fn load_with<P, F>(path: P, lookup: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;
        config.apply_env(lookup)?;
        config.normalize();
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        config.normalize();
        Ok(config)
    }

    /// Overlay environment-style variables onto the loaded settings.
    ///
    /// `lookup` returns the value of a variable if set; tests pass a map instead
    /// of touching the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HOST") {
            self.http.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.http.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = lookup("DB_HOST") {
            self.database.host = v;
        }
        if let Some(v) = lookup("DB_PORT") {
            self.database.port = parse_var("DB_PORT", &v)?;
        }
        if let Some(v) = lookup("DB_NAME") {
            self.database.name = v;
        }
        if let Some(v) = lookup("DB_USER") {
            self.database.user = v;
        }
        if let Some(v) = lookup("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = lookup("DB_MAX_CONNECTIONS") {
            self.database.max_connections = Some(parse_var("DB_MAX_CONNECTIONS", &v)?);
        }
        if let Some(v) = lookup("DB_ACQUIRE_TIMEOUT_SECONDS") {
            self.database.acquire_timeout_seconds =
                Some(parse_var("DB_ACQUIRE_TIMEOUT_SECONDS", &v)?);
        }
        if let Some(v) = lookup("FRONTEND_URL") {
            self.cors.frontend_url = v;
        }
        if let Some(v) = lookup("API_URL") {
            self.client.api_url = v;
        }
        if let Some(v) = lookup("VERBOSE_ERRORS") {
            self.errors.verbose = parse_var("VERBOSE_ERRORS", &v)?;
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            self.logging.format = v;
        }
        Ok(())
    }

    /// Strip trailing slashes so origins and base URLs compare and join cleanly.
    fn normalize(&mut self) {
        let trimmed = self.cors.frontend_url.trim_end_matches('/').len();
        self.cors.frontend_url.truncate(trimmed);
        let trimmed = self.client.api_url.trim_end_matches('/').len();
        self.client.api_url.truncate(trimmed);
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::Validation(format!("Invalid value for {}: {} ({})", name, value, e)))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
