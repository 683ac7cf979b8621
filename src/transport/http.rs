//! HTTP transport implementation.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::instrument;
use url::Url;

use super::TransportError;
use crate::observability::{log_request, log_response};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// HTTP request representation.
///
/// `path` is relative to the API base URL (`transmissions`,
/// `transmissions/123`) or an absolute `http(s)://` URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request path.
    pub path: String,
    /// Query string parameters, in order.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Vec<u8>>,
    /// Request timeout override.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Creates a request with the given method and path.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Creates a new GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a new POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends query parameters.
    pub fn with_query(mut self, query: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(query);
        self
    }

    /// Sets a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true if the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// HTTP transport trait.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransportImpl {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransportImpl {
    /// Creates a new HTTP transport rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| TransportError::Connection {
                message: e.to_string(),
            })?;

        Self::with_client(client, base_url, timeout)
    }

    /// Creates a new transport around an existing reqwest client.
    pub fn with_client(
        client: Client,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        // Url::join drops the last segment unless the base ends with '/'.
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)
        } else {
            Url::parse(&format!("{}/", base_url))
        }
        .map_err(|e| TransportError::InvalidUrl {
            message: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Resolves a request path against the base URL.
    ///
    /// Absolute `http(s)://` URLs are returned unchanged.
    pub fn build_url(&self, path: &str) -> Result<Url, TransportError> {
        let path = if path.starts_with("http://") || path.starts_with("https://") {
            path
        } else {
            path.trim_start_matches('/')
        };

        self.base_url
            .join(path)
            .map_err(|e| TransportError::InvalidUrl {
                message: format!("{}: {}", path, e),
            })
    }

    fn map_send_error(&self, error: reqwest::Error, timeout: Option<Duration>) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout {
                timeout: timeout.unwrap_or(self.timeout),
            }
        } else if error.is_connect() {
            TransportError::Connection {
                message: error.to_string(),
            }
        } else {
            TransportError::InvalidResponse {
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl HttpTransport for HttpTransportImpl {
    #[instrument(skip(self, request), fields(method = ?request.method, path = %request.path))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.build_url(&request.path)?;
        log_request(
            request.method.as_str(),
            url.as_str(),
            request.body.as_deref().and_then(|b| std::str::from_utf8(b).ok()),
        );

        let mut req_builder = self.client.request(request.method.into(), url);

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        for (name, value) in &request.headers {
            req_builder = req_builder.header(name, value);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        if let Some(timeout) = request.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let started = Instant::now();
        let response = req_builder
            .send()
            .await
            .map_err(|e| self.map_send_error(e, request.timeout))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::InvalidResponse {
                message: e.to_string(),
            })?
            .to_vec();

        log_response(
            status,
            started.elapsed().as_millis() as u64,
            std::str::from_utf8(&body).ok(),
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for HttpTransportImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportImpl")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}
