//! Authentication module for the SparkPost client.
//!
//! SparkPost authenticates with the raw API key in the `Authorization`
//! header; there is no `Bearer` scheme.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

use crate::errors::SparkPostError;

/// Authentication provider trait.
///
/// Implementations of this trait provide authentication credentials
/// for API requests.
pub trait AuthProvider: Send + Sync {
    /// Apply authentication to request headers.
    fn apply_auth(&self, headers: &mut HashMap<String, String>);

    /// Validate the credentials.
    fn validate(&self) -> Result<(), SparkPostError>;
}

/// API key authentication provider.
pub struct ApiKeyAuth {
    api_key: SecretString,
}

impl ApiKeyAuth {
    /// Creates a new API key authentication provider.
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }

    /// Creates from a string API key.
    pub fn from_string(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
        }
    }

    /// Gets a hint of the API key for debugging (last 4 characters).
    pub fn key_hint(&self) -> String {
        let key = self.api_key.expose_secret();
        match key.char_indices().rev().nth(3) {
            Some((idx, _)) if key.len() > 4 => format!("...{}", &key[idx..]),
            _ => "****".to_string(),
        }
    }
}

impl AuthProvider for ApiKeyAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            "Authorization".to_string(),
            self.api_key.expose_secret().clone(),
        );
    }

    fn validate(&self) -> Result<(), SparkPostError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(SparkPostError::Authentication {
                message: "API key cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("api_key", &"[REDACTED]")
            .field("key_hint", &self.key_hint())
            .finish()
    }
}
