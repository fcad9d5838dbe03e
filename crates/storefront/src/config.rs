//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `POPACART_API_URL` - Base URL of the shop API (default: `http://localhost:5002/api/v1`)
//! - `POPACART_REQUEST_TIMEOUT_SECS` - Timeout for every remote call (default: 10)
//! - `POPACART_SESSION_COOKIE` - Name of the session cookie (default: `token`)
//! - `POPACART_CATALOG_CACHE_TTL_SECS` - Product cache lifetime (default: 300)
//! - `POPACART_FETCH_ATTEMPTS` - Attempts for cart/wishlist reads (default: 2)
//! - `POPACART_RECONCILE_AFTER_ACK` - Re-fetch after every acknowledged mutation (default: false)
//! - `POPACART_SESSION_FILE` - Where the CLI keeps the session (default: `.popacart/session.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:5002/api/v1";
const DEFAULT_SESSION_FILE: &str = ".popacart/session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the shop API, always ending in `/`
    pub api_url: Url,
    /// Upper bound for every remote call
    pub request_timeout: Duration,
    /// Name of the cookie carrying the session token
    pub session_cookie: String,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
    /// Attempts for idempotent cart and wishlist reads
    pub fetch_attempts: u32,
    /// Re-fetch the authoritative cart after every acknowledged mutation
    pub reconcile_after_ack: bool,
    /// Session persistence path used by the CLI
    pub session_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api_url = parse_api_url(&env.or_default("POPACART_API_URL", DEFAULT_API_URL))?;
        let request_timeout = Duration::from_secs(env.positive("POPACART_REQUEST_TIMEOUT_SECS", 10)?);
        let session_cookie = env.or_default("POPACART_SESSION_COOKIE", "token");
        if session_cookie.is_empty() || session_cookie.contains(['=', ';', ' ']) {
            return Err(ConfigError::InvalidEnvVar(
                "POPACART_SESSION_COOKIE".to_string(),
                "must be a non-empty cookie name".to_string(),
            ));
        }
        let catalog_cache_ttl =
            Duration::from_secs(env.parsed("POPACART_CATALOG_CACHE_TTL_SECS", 300)?);
        let fetch_attempts = u32::try_from(env.positive("POPACART_FETCH_ATTEMPTS", 2)?)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("POPACART_FETCH_ATTEMPTS".to_string(), e.to_string())
            })?;
        let reconcile_after_ack = env.flag("POPACART_RECONCILE_AFTER_ACK")?;
        let session_file = PathBuf::from(env.or_default("POPACART_SESSION_FILE", DEFAULT_SESSION_FILE));

        Ok(Self {
            api_url,
            request_timeout,
            session_cookie,
            catalog_cache_ttl,
            fetch_attempts,
            reconcile_after_ack,
            session_file,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Same configuration pointed at another API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an http(s) URL.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(api_url)?;
        Ok(self)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    fn positive(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        match self.parsed(key, default)? {
            0 => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must be greater than zero".to_string(),
            )),
            value => Ok(value),
        }
    }

    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        match self.optional(key).as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("0" | "false" | "no" | "off") => Ok(false),
            Some("1" | "true" | "yes" | "on") => Ok(true),
            Some(other) => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got '{other}'"),
            )),
        }
    }
}

/// Parse the API base URL, forcing a trailing slash so endpoint paths join
/// below it instead of replacing its last segment.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("POPACART_API_URL".to_string(), reason);

    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
