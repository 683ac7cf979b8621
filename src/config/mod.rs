//! Configuration module for the SparkPost client.
//!
//! Provides configuration management including the API key, API origin,
//! API version, timeouts and the user agent sent with every request.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::errors::{SparkPostError, SparkPostResult};

/// Default origin for the SparkPost API.
pub const DEFAULT_ORIGIN: &str = "https://api.sparkpost.com:443";

/// Default API version.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "SPARKPOST_API_KEY";

/// Configuration for the SparkPost client.
#[derive(Clone)]
pub struct SparkPostConfig {
    /// API key for authentication (stored securely).
    pub(crate) api_key: SecretString,
    /// API origin, without a trailing slash.
    pub origin: String,
    /// API version.
    pub api_version: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Identifier prepended to the user agent.
    pub stack_identity: Option<String>,
    /// Custom headers to include in requests.
    pub custom_headers: Vec<(String, String)>,
}

impl SparkPostConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> SparkPostConfigBuilder {
        SparkPostConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SPARKPOST_API_KEY` (required): API key for authentication
    /// - `SPARKPOST_ORIGIN` (optional): Custom API origin
    /// - `SPARKPOST_API_VERSION` (optional): API version
    /// - `SPARKPOST_TIMEOUT` (optional): Request timeout in seconds
    pub fn from_env() -> SparkPostResult<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| SparkPostError::Configuration {
            message: format!("{} environment variable not set", API_KEY_ENV),
        })?;

        let mut builder = SparkPostConfigBuilder::new().api_key(api_key);

        if let Ok(origin) = std::env::var("SPARKPOST_ORIGIN") {
            builder = builder.origin(origin);
        }

        if let Ok(api_version) = std::env::var("SPARKPOST_API_VERSION") {
            builder = builder.api_version(api_version);
        }

        if let Ok(timeout_str) = std::env::var("SPARKPOST_TIMEOUT") {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(timeout_secs));
            }
        }

        builder.build()
    }

    /// Returns the API key (exposing the secret).
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Returns the base URL every resource path is resolved against.
    pub fn base_url(&self) -> String {
        format!("{}/api/{}/", self.origin, self.api_version)
    }

    /// Returns the user agent sent with every request.
    pub fn user_agent(&self) -> String {
        let version = format!("sparkpost-client-rust/{}", env!("CARGO_PKG_VERSION"));
        match &self.stack_identity {
            Some(identity) => format!("{} {}", identity, version),
            None => version,
        }
    }
}

impl std::fmt::Debug for SparkPostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparkPostConfig")
            .field("api_key", &"[REDACTED]")
            .field("origin", &self.origin)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("stack_identity", &self.stack_identity)
            .finish()
    }
}

/// Builder for `SparkPostConfig`.
#[derive(Default)]
pub struct SparkPostConfigBuilder {
    api_key: Option<String>,
    origin: Option<String>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    stack_identity: Option<String>,
    custom_headers: Vec<(String, String)>,
}

impl SparkPostConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the API origin, e.g. `https://api.eu.sparkpost.com`.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets an identifier prepended to the user agent.
    pub fn stack_identity(mut self, identity: impl Into<String>) -> Self {
        self.stack_identity = Some(identity.into());
        self
    }

    /// Adds a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> SparkPostResult<SparkPostConfig> {
        let api_key = self.api_key.ok_or_else(|| SparkPostError::Configuration {
            message: "client requires an API key".to_string(),
        })?;

        if api_key.is_empty() {
            return Err(SparkPostError::Configuration {
                message: "API key cannot be empty".to_string(),
            });
        }

        let origin = self
            .origin
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string())
            .trim_end_matches('/')
            .to_string();

        if !origin.starts_with("http://") && !origin.starts_with("https://") {
            return Err(SparkPostError::Configuration {
                message: "Origin must start with http:// or https://".to_string(),
            });
        }

        let api_version = self
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        if api_version.is_empty() {
            return Err(SparkPostError::Configuration {
                message: "API version cannot be empty".to_string(),
            });
        }

        Ok(SparkPostConfig {
            api_key: SecretString::new(api_key),
            origin,
            api_version,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            stack_identity: self.stack_identity,
            custom_headers: self.custom_headers,
        })
    }
}
