//! Mock implementations for testing.
//!
//! Provides a mock transport and auth provider so services can be
//! exercised without making real API calls, plus canned SparkPost
//! response bodies in [`fixtures`].

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::auth::AuthProvider;
use crate::errors::SparkPostError;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Mock HTTP transport for testing.
pub struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

enum MockReply {
    Response(MockResponse),
    Timeout(Duration),
    ConnectionFailure(String),
}

/// A recorded request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request path.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    /// Looks up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Looks up a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parses the body as JSON.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Creates an empty response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a successful JSON response.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        Self::new(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_vec(value).unwrap_or_default())
    }

    /// Creates an error response in SparkPost's `errors` format.
    pub fn error(status: u16, message: &str) -> Self {
        let error = serde_json::json!({
            "errors": [{ "message": message }]
        });

        Self::json(&error).with_status(status)
    }

    /// Sets the status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        self.replies.lock().push_back(MockReply::Response(response));
    }

    /// Queues a JSON response.
    pub fn queue_json<T: serde::Serialize>(&self, value: &T) {
        self.queue(MockResponse::json(value));
    }

    /// Queues an error response.
    pub fn queue_error(&self, status: u16, message: &str) {
        self.queue(MockResponse::error(status, message));
    }

    /// Makes the next request time out.
    pub fn queue_timeout(&self, timeout: Duration) {
        self.replies.lock().push_back(MockReply::Timeout(timeout));
    }

    /// Makes the next request fail to connect.
    pub fn queue_connection_failure(&self, message: &str) {
        self.replies
            .lock()
            .push_back(MockReply::ConnectionFailure(message.to_string()));
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn next_reply(&self) -> MockReply {
        self.replies.lock().pop_front().unwrap_or_else(|| {
            MockReply::Response(MockResponse::error(500, "No mock response configured"))
        })
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(RecordedRequest {
            method: request.method,
            path: request.path,
            query: request.query,
            headers: request.headers,
            body: request.body,
        });

        match self.next_reply() {
            MockReply::Response(response) => Ok(HttpResponse {
                status: response.status,
                headers: response.headers,
                body: response.body,
            }),
            MockReply::Timeout(timeout) => Err(TransportError::Timeout { timeout }),
            MockReply::ConnectionFailure(message) => Err(TransportError::Connection { message }),
        }
    }
}

/// Mock authentication provider.
#[derive(Debug, Clone)]
pub struct MockAuth {
    api_key: String,
}

impl MockAuth {
    /// Creates a mock auth provider sending `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl Default for MockAuth {
    fn default() -> Self {
        Self::new("mock-api-key")
    }
}

impl AuthProvider for MockAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        headers.insert("Authorization".to_string(), self.api_key.clone());
    }

    fn validate(&self) -> Result<(), SparkPostError> {
        Ok(())
    }
}

/// Canned SparkPost response bodies.
pub mod fixtures {
    use serde_json::{json, Value};

    /// Response to a successful send.
    pub fn send_results(id: &str, accepted: u64, rejected: u64) -> Value {
        json!({
            "results": {
                "id": id,
                "total_accepted_recipients": accepted,
                "total_rejected_recipients": rejected
            }
        })
    }

    /// Response to a list request with two transmissions.
    pub fn transmission_list() -> Value {
        json!({
            "results": [
                {
                    "id": "11668787484950529",
                    "campaign_id": "spring",
                    "description": "Spring sale",
                    "state": "submitted",
                    "content": { "template_id": "spring-template" }
                },
                {
                    "id": "11668787484950530",
                    "campaign_id": "summer",
                    "state": "Success",
                    "num_rcpt": 42
                }
            ]
        })
    }

    /// Response to a retrieve request.
    pub fn retrieved_transmission(id: &str) -> Value {
        json!({
            "results": {
                "transmission": {
                    "id": id,
                    "description": "Retrieved transmission",
                    "state": "Success",
                    "campaign_id": "spring",
                    "content": {
                        "from": { "email": "from@example.com", "name": "Sender" },
                        "subject": "Hello"
                    },
                    "num_generated": 1
                }
            }
        })
    }
}
