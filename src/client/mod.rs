//! SparkPost API client.
//!
//! Provides the main client interface for interacting with the SparkPost API.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{ApiKeyAuth, AuthProvider};
use crate::config::{SparkPostConfig, SparkPostConfigBuilder, API_KEY_ENV};
use crate::errors::{SparkPostError, SparkPostResult};
use crate::services::{ApiContext, TransmissionsService};
use crate::transport::{HttpTransport, HttpTransportImpl};

/// The main SparkPost client.
///
/// # Example
///
/// ```rust,no_run
/// use sparkpost_client::{Content, SendOptions, SparkPostClient, Transmission};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = SparkPostClient::builder()
///         .api_key("your-api-key")
///         .build()?;
///
///     let transmission = Transmission::builder()
///         .recipient("\"Jane Doe\" <jane@example.com>")
///         .cc("manager@example.com")
///         .content(
///             Content::new()
///                 .with_from("sender@example.com")
///                 .with_subject("Hello")
///                 .with_text("Hello from SparkPost"),
///         )
///         .build();
///
///     let response = client
///         .transmissions()
///         .send(&transmission, &SendOptions::default())
///         .await?;
///     println!("sent transmission {}", response.results.id);
///     Ok(())
/// }
/// ```
pub struct SparkPostClient {
    config: SparkPostConfig,
    transmissions: TransmissionsService,
}

impl SparkPostClient {
    /// Creates a new client builder.
    pub fn builder() -> SparkPostClientBuilder {
        SparkPostClientBuilder::new()
    }

    /// Creates a client from environment variables.
    ///
    /// See [`SparkPostConfig::from_env`].
    pub fn from_env() -> SparkPostResult<Self> {
        let config = SparkPostConfig::from_env()?;
        SparkPostClientBuilder::from_config(config).build()
    }

    /// Creates a client from an API key.
    pub fn from_api_key(api_key: impl Into<String>) -> SparkPostResult<Self> {
        SparkPostClientBuilder::new().api_key(api_key).build()
    }

    /// Returns the transmissions service.
    pub fn transmissions(&self) -> &TransmissionsService {
        &self.transmissions
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SparkPostConfig {
        &self.config
    }
}

impl std::fmt::Debug for SparkPostClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparkPostClient")
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for the SparkPost client.
pub struct SparkPostClientBuilder {
    config_builder: SparkPostConfigBuilder,
    has_api_key: bool,
    transport: Option<Arc<dyn HttpTransport>>,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl SparkPostClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            config_builder: SparkPostConfigBuilder::new(),
            has_api_key: false,
            transport: None,
            auth: None,
        }
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: SparkPostConfig) -> Self {
        let mut config_builder = SparkPostConfigBuilder::new()
            .api_key(config.api_key())
            .origin(config.origin.as_str())
            .api_version(config.api_version.as_str())
            .timeout(config.timeout);

        if let Some(identity) = &config.stack_identity {
            config_builder = config_builder.stack_identity(identity.as_str());
        }
        for (name, value) in &config.custom_headers {
            config_builder = config_builder.header(name.as_str(), value.as_str());
        }

        Self {
            config_builder,
            has_api_key: true,
            transport: None,
            auth: None,
        }
    }

    /// Sets the API key. Without one, `SPARKPOST_API_KEY` is used.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_key(api_key);
        self.has_api_key = true;
        self
    }

    /// Sets the API origin.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.origin(origin);
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_version(api_version);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets an identifier prepended to the user agent.
    pub fn stack_identity(mut self, identity: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.stack_identity(identity);
        self
    }

    /// Adds a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.header(name, value);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a custom auth provider.
    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Builds the client.
    pub fn build(self) -> SparkPostResult<SparkPostClient> {
        let mut config_builder = self.config_builder;
        if !self.has_api_key {
            if let Ok(api_key) = std::env::var(API_KEY_ENV) {
                config_builder = config_builder.api_key(api_key);
            }
        }
        let config = config_builder.build()?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(
                HttpTransportImpl::new(&config.base_url(), config.timeout).map_err(|e| {
                    SparkPostError::Configuration {
                        message: e.to_string(),
                    }
                })?,
            ),
        };

        let auth: Arc<dyn AuthProvider> = match self.auth {
            Some(a) => a,
            None => Arc::new(ApiKeyAuth::from_string(config.api_key())),
        };
        auth.validate()?;

        let context = ApiContext::new(transport, auth, default_headers(&config));
        let transmissions = TransmissionsService::new(context);

        tracing::debug!(
            origin = %config.origin,
            api_version = %config.api_version,
            "SparkPost client created"
        );

        Ok(SparkPostClient {
            config,
            transmissions,
        })
    }
}

impl Default for SparkPostClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_headers(config: &SparkPostConfig) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("User-Agent".to_string(), config.user_agent());
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("Accept".to_string(), "application/json".to_string());

    for (name, value) in &config.custom_headers {
        headers.insert(name.clone(), value.clone());
    }

    headers
}
