//! # Service Configuration
//!
//! Where the hosted tables live and how to authenticate.
//!
//! Configuration is loaded once at startup from environment variables (with a
//! `.env` file honored in development). Missing required settings fail fast.
//!
//! | Variable                        | Required | Default |
//! |---------------------------------|----------|---------|
//! | `SUPABASE_URL`                  | yes      |         |
//! | `SUPABASE_KEY`                  | yes      |         |
//! | `CATALOG_CONNECT_TIMEOUT_SECS`  | no       | 10      |
//! | `CATALOG_REQUEST_TIMEOUT_SECS`  | no       | 30      |

use reqwest::Url;
use std::env;
use std::fmt;
use std::time::Duration;

/// Service URL variable.
pub const URL_VAR: &str = "SUPABASE_URL";

/// Service access key variable.
pub const KEY_VAR: &str = "SUPABASE_KEY";

/// Connect timeout variable (whole seconds).
pub const CONNECT_TIMEOUT_VAR: &str = "CATALOG_CONNECT_TIMEOUT_SECS";

/// Request timeout variable (whole seconds).
pub const REQUEST_TIMEOUT_VAR: &str = "CATALOG_REQUEST_TIMEOUT_SECS";

/// Path of the REST API under the service URL.
const REST_PATH: &str = "rest/v1/";

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for the hosted catalog tables.
///
/// ## Example
/// ```rust,ignore
/// let config = ServiceConfig::new("https://abc.supabase.co", "service-key")?
///     .request_timeout(Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Base URL of the service (e.g. `https://abc.supabase.co`).
    pub url: Url,

    /// Access key sent as `apikey` and bearer token.
    pub api_key: String,

    /// TCP/TLS connect timeout.
    /// Default: 10 seconds
    pub connect_timeout: Duration,

    /// Whole-request timeout.
    /// Default: 30 seconds
    pub request_timeout: Duration,
}

impl ServiceConfig {
    /// Creates a configuration from a URL and key, with default timeouts.
    ///
    /// ## Returns
    /// * `Err(ConfigError::MissingRequired)` - URL or key is empty
    /// * `Err(ConfigError::InvalidValue)` - URL isn't an http(s) URL
    pub fn new(url: &str, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into().trim().to_string();

        if url.trim().is_empty() {
            return Err(ConfigError::MissingRequired(URL_VAR.to_string()));
        }
        if api_key.is_empty() {
            return Err(ConfigError::MissingRequired(KEY_VAR.to_string()));
        }

        Ok(ServiceConfig {
            url: parse_service_url(url)?,
            api_key,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        })
    }

    /// Loads configuration from the process environment.
    ///
    /// A `.env` file in the working directory (or a parent) is read first if
    /// present; real environment variables take precedence over it.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration from any key/value source.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let vars: HashMap<String, String> = ...;
    /// let config = ServiceConfig::from_lookup(|k| vars.get(k).cloned())?;
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(URL_VAR).ok_or_else(|| ConfigError::MissingRequired(URL_VAR.to_string()))?;
        let key = lookup(KEY_VAR).ok_or_else(|| ConfigError::MissingRequired(KEY_VAR.to_string()))?;

        let mut config = ServiceConfig::new(&url, key)?;

        if let Some(raw) = lookup(CONNECT_TIMEOUT_VAR) {
            config.connect_timeout = parse_timeout(CONNECT_TIMEOUT_VAR, &raw)?;
        }
        if let Some(raw) = lookup(REQUEST_TIMEOUT_VAR) {
            config.request_timeout = parse_timeout(REQUEST_TIMEOUT_VAR, &raw)?;
        }

        Ok(config)
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the REST endpoint root, `<url>/rest/v1/`.
    pub fn rest_url(&self) -> Result<Url, ConfigError> {
        let mut base = self.url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(REST_PATH)
            .map_err(|_| ConfigError::InvalidValue(URL_VAR.to_string()))
    }
}

/// Debug output never includes the key.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn parse_service_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidValue(URL_VAR.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidValue(URL_VAR.to_string()));
    }

    Ok(url)
}

fn parse_timeout(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue(name.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
