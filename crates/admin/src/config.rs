//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL for the portal (default: `http://{host}:{port}`).
//!   An `https` URL marks session cookies as secure.
//! - `ADMIN_PAGE_SIZE` - Rows per browser page, 1-100 (default: 10)
//! - `ADMIN_DETAIL_DELAY_MS` - Artificial delay before single-record views resolve (default: 500)
//! - `ADMIN_DOCUMENT_TIMEOUT_SECS` - Timeout for streaming documents (default: 15)
//! - `ADMIN_FIXTURES_PATH` - YAML fixture file replacing the built-in sample data
//! - `ADMIN_LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Largest page size the browser accepts.
pub const MAX_PAGE_SIZE: usize = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin portal
    pub base_url: String,
    /// Rows per browser page
    pub page_size: usize,
    /// Delay before a single-record view resolves
    pub detail_delay: Duration,
    /// Timeout applied to document downloads
    pub document_timeout: Duration,
    /// Fixture file to load instead of the sample data
    pub fixtures_path: Option<PathBuf>,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl Default for AdminConfig {
    fn default() -> Self {
        let host = IpAddr::from([127, 0, 0, 1]);
        Self {
            host,
            port: 3001,
            base_url: format!("http://{host}:3001"),
            page_size: 10,
            detail_delay: Duration::from_millis(500),
            document_timeout: Duration::from_secs(15),
            fixtures_path: None,
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that does not parse
    /// or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`AdminConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host: IpAddr = env.parse_or("ADMIN_HOST", "127.0.0.1")?;
        let port: u16 = env.parse_or("ADMIN_PORT", "3001")?;
        let base_url = env
            .optional("ADMIN_BASE_URL")
            .map_or_else(|| format!("http://{host}:{port}"), |url| url.trim_end_matches('/').to_string());
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_BASE_URL".to_string(), e.to_string()))?;

        let page_size: usize = env.parse_or("ADMIN_PAGE_SIZE", "10")?;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
            ));
        }

        let detail_delay = Duration::from_millis(env.parse_or("ADMIN_DETAIL_DELAY_MS", "500")?);
        let document_timeout =
            Duration::from_secs(env.parse_or("ADMIN_DOCUMENT_TIMEOUT_SECS", "15")?);
        let fixtures_path = env.optional("ADMIN_FIXTURES_PATH").map(PathBuf::from);
        let log_format = match env.optional("ADMIN_LOG_FORMAT").as_deref() {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            page_size,
            detail_delay,
            document_timeout,
            fixtures_path,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the portal is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}
