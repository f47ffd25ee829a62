//! Client configuration.
//!
//! [`ConfigBuilder`] collects settings from explicit calls and the
//! environment and produces an immutable [`Config`]. Explicit settings always
//! win over environment values, whichever order the calls were made in.

use crate::client::Client;
use crate::error::{Result, SecureSbomError};
use std::fmt;
use std::time::Duration;

/// Default SecureSBOM API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.securesbom.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "SECURE_SBOM_API_KEY";

/// Environment variable overriding the API endpoint.
pub const ENV_BASE_URL: &str = "SECURE_SBOM_BASE_URL";

/// Resolved, validated client configuration.
#[derive(Clone)]
pub struct Config {
    api_key: String,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Config {
    /// Start building a configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// The API key sent with every request.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base URL of the API, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// User-Agent header value.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Builder for [`Config`].
///
/// Setters take and return the builder by value, so independent builders
/// never share state.
///
/// # Example
///
/// ```rust,no_run
/// use securesbom::Config;
/// use std::time::Duration;
///
/// let client = Config::builder()
///     .with_timeout(Duration::from_secs(60))
///     .from_env()
///     .with_base_url("https://staging.securesbom.com")
///     .build_client()?;
/// # Ok::<(), securesbom::SecureSbomError>(())
/// ```
#[derive(Clone, Default)]
pub struct ConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    env_api_key: Option<String>,
    env_base_url: Option<String>,
}

impl ConfigBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the API base URL (default: [`DEFAULT_BASE_URL`]).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the per-request timeout (default: 30 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the User-Agent header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Read `SECURE_SBOM_API_KEY` and `SECURE_SBOM_BASE_URL`.
    ///
    /// Environment values only fill fields that are not set explicitly,
    /// before or after this call.
    pub fn from_env(self) -> Self {
        self.from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`ConfigBuilder::from_env`], with a caller-supplied variable lookup.
    pub fn from_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        self.env_api_key = read(ENV_API_KEY);
        self.env_base_url = read(ENV_BASE_URL);
        self
    }

    /// Resolve and validate the configuration.
    pub fn build(self) -> Result<Config> {
        let api_key = self
            .api_key
            .or(self.env_api_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                SecureSbomError::Config(format!(
                    "API key is required (pass one explicitly or set {ENV_API_KEY})"
                ))
            })?;

        let base_url = self
            .base_url
            .or(self.env_base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| SecureSbomError::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SecureSbomError::Config(format!(
                "base URL must use http or https, got {:?}",
                parsed.scheme()
            )));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(SecureSbomError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("securesbom-rust/{}", env!("CARGO_PKG_VERSION")));

        Ok(Config {
            api_key,
            base_url,
            timeout,
            user_agent,
        })
    }

    /// Resolve the configuration and build a [`Client`] bound to it.
    ///
    /// Performs no network I/O.
    pub fn build_client(self) -> Result<Client> {
        Client::from_config(self.build()?)
    }
}

impl fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("ConfigBuilder")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("env_api_key", &redact(&self.env_api_key))
            .field("env_base_url", &self.env_base_url)
            .finish()
    }
}
