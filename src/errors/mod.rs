//! Error types for the SparkPost client.
//!
//! Every fallible operation in the crate returns [`SparkPostResult`]. HTTP
//! failures are mapped from the status code and the SparkPost error body
//! (`{"errors":[{"message": ..., "description": ..., "code": ...}]}`).

use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for SparkPost operations.
pub type SparkPostResult<T> = Result<T, SparkPostError>;

/// Error type for SparkPost client operations.
#[derive(Debug, Error)]
pub enum SparkPostError {
    /// Configuration error (missing API key, invalid origin, etc.)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// A method argument was missing or malformed; no request was sent.
    #[error("Validation error: {message}")]
    Validation {
        /// Error message describing the validation issue.
        message: String,
        /// The parameter that caused the error.
        param: Option<String>,
    },

    /// Authentication error (invalid or missing API key).
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error message from the API.
        message: String,
    },

    /// The API key lacks the permission for this resource.
    #[error("Permission denied: {message}")]
    Permission {
        /// Error message from the API.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Error message from the API.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Error message from the API.
        message: String,
        /// Duration to wait before retrying, from `Retry-After`.
        retry_after: Option<Duration>,
    },

    /// Any other 4xx response.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// First error message from the response body.
        message: String,
        /// All errors reported by the API.
        errors: Vec<ApiErrorDetail>,
    },

    /// Server error (5xx status codes).
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Request ID for debugging.
        request_id: Option<String>,
    },

    /// Network/connection error.
    #[error("Network error: {message}")]
    Network {
        /// Error message.
        message: String,
    },

    /// Request timeout.
    #[error("Request timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

impl SparkPostError {
    /// Creates a validation error naming the offending parameter.
    pub fn validation_param(message: impl Into<String>, param: impl Into<String>) -> Self {
        SparkPostError::Validation {
            message: message.into(),
            param: Some(param.into()),
        }
    }

    /// Returns the HTTP status code for errors that came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            SparkPostError::Authentication { .. } => Some(401),
            SparkPostError::Permission { .. } => Some(403),
            SparkPostError::NotFound { .. } => Some(404),
            SparkPostError::RateLimit { .. } => Some(429),
            SparkPostError::Api { status, .. } | SparkPostError::Server { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Returns the retry-after duration if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SparkPostError::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Maps a non-success HTTP response to an error.
    pub fn from_response(status: u16, headers: &HashMap<String, String>, body: &[u8]) -> Self {
        let errors = serde_json::from_slice::<ApiErrorResponse>(body)
            .map(|response| response.errors)
            .unwrap_or_default();

        let message = errors
            .first()
            .map(ApiErrorDetail::summary)
            .unwrap_or_else(|| format!("HTTP {} error", status));

        match status {
            401 => SparkPostError::Authentication { message },
            403 => SparkPostError::Permission { message },
            404 => SparkPostError::NotFound { message },
            429 => SparkPostError::RateLimit {
                message,
                retry_after: header(headers, "retry-after")
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs),
            },
            500..=599 => SparkPostError::Server {
                status,
                message,
                request_id: header(headers, "x-request-id").map(str::to_string),
            },
            _ => SparkPostError::Api {
                status,
                message,
                errors,
            },
        }
    }
}

fn header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Error response body returned by SparkPost.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// The reported errors.
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

/// A single error entry from a SparkPost error response.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ApiErrorDetail {
    /// Short error message.
    pub message: String,
    /// Longer description, when provided.
    #[serde(default)]
    pub description: Option<String>,
    /// SparkPost error code.
    #[serde(default)]
    pub code: Option<String>,
}

impl ApiErrorDetail {
    fn summary(&self) -> String {
        match &self.description {
            Some(description) => format!("{}: {}", self.message, description),
            None => self.message.clone(),
        }
    }
}

impl From<TransportError> for SparkPostError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { .. } => SparkPostError::Timeout {
                message: err.to_string(),
            },
            TransportError::InvalidUrl { message } => SparkPostError::Configuration { message },
            _ => SparkPostError::Network {
                message: err.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for SparkPostError {
    fn from(err: serde_json::Error) -> Self {
        SparkPostError::Serialization {
            message: err.to_string(),
        }
    }
}
