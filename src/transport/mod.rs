//! HTTP transport layer for the SparkPost client.
//!
//! [`HttpTransport`] is the seam where the HTTP client is injected;
//! [`HttpTransportImpl`] is the default reqwest-backed implementation.

mod http;

pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, HttpTransportImpl};

use std::time::Duration;

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// The request path could not be resolved to a URL.
    #[error("Invalid URL: {message}")]
    InvalidUrl {
        /// Error message.
        message: String,
    },

    /// Invalid response.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}
