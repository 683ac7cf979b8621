//! Request execution shared by the resource services.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::errors::{SparkPostError, SparkPostResult};
use crate::transport::{HttpRequest, HttpTransport};

/// Transport, credentials and default headers shared by every service.
#[derive(Clone)]
pub struct ApiContext {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
    default_headers: HashMap<String, String>,
}

impl ApiContext {
    /// Creates a new context.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn AuthProvider>,
        default_headers: HashMap<String, String>,
    ) -> Self {
        Self {
            transport,
            auth,
            default_headers,
        }
    }

    /// Sends `request` and decodes a successful JSON response.
    ///
    /// Default headers are added unless the request already sets them, and
    /// authentication is applied last.
    pub async fn execute<T: DeserializeOwned>(&self, mut request: HttpRequest) -> SparkPostResult<T> {
        for (name, value) in &self.default_headers {
            if !request
                .headers
                .keys()
                .any(|existing| existing.eq_ignore_ascii_case(name))
            {
                request.headers.insert(name.clone(), value.clone());
            }
        }
        self.auth.apply_auth(&mut request.headers);

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let error =
                SparkPostError::from_response(response.status, &response.headers, &response.body);
            tracing::debug!(status = response.status, error = %error, "Request failed");
            return Err(error);
        }

        Ok(response.json()?)
    }
}

impl std::fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiContext")
            .field("default_headers", &self.default_headers.keys())
            .finish()
    }
}
