//! Transmissions service.

mod payload;

pub use payload::build_payload;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::instrument;

use crate::errors::{SparkPostError, SparkPostResult};
use crate::services::context::ApiContext;
use crate::transport::HttpRequest;
use crate::types::transmission::{
    ApiResponse, ListTransmissionsParams, RetrievedTransmission, SendOptions, SendResults,
    Transmission, TransmissionSummary,
};

const TRANSMISSIONS_PATH: &str = "transmissions";

/// Everything outside the RFC 3986 unreserved set is encoded, `/` included.
const PATH_SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Service for sending and inspecting transmissions.
#[derive(Debug, Clone)]
pub struct TransmissionsService {
    context: ApiContext,
}

impl TransmissionsService {
    /// Creates a new transmissions service.
    pub fn new(context: ApiContext) -> Self {
        Self { context }
    }

    /// Lists transmissions, optionally filtered by campaign or template.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListTransmissionsParams,
    ) -> SparkPostResult<ApiResponse<Vec<TransmissionSummary>>> {
        let request = HttpRequest::get(TRANSMISSIONS_PATH).with_query(params.to_query());
        self.context.execute(request).await
    }

    /// Retrieves a single transmission.
    #[instrument(skip(self, id), fields(transmission_id = %id))]
    pub async fn get(&self, id: &str) -> SparkPostResult<ApiResponse<RetrievedTransmission>> {
        if id.is_empty() {
            return Err(SparkPostError::validation_param("id is required", "id"));
        }
        if id == "." || id == ".." {
            return Err(SparkPostError::validation_param("id is invalid", "id"));
        }

        let request = HttpRequest::get(format!(
            "{}/{}",
            TRANSMISSIONS_PATH,
            utf8_percent_encode(id, PATH_SEGMENT_SET)
        ));
        self.context.execute(request).await
    }

    /// Sends a transmission.
    ///
    /// `cc` and `bcc` lists are expanded into recipients first; see
    /// [`build_payload`].
    #[instrument(skip(self, transmission), fields(campaign_id = ?transmission.campaign_id))]
    pub async fn send(
        &self,
        transmission: &Transmission,
        options: &SendOptions,
    ) -> SparkPostResult<ApiResponse<SendResults>> {
        let payload = build_payload(transmission);
        let body = serde_json::to_vec(&payload)?;

        let request = HttpRequest::post(TRANSMISSIONS_PATH)
            .with_query(options.to_query())
            .with_body(body);

        let response: ApiResponse<SendResults> = self.context.execute(request).await?;
        tracing::info!(
            transmission_id = %response.results.id,
            accepted = response.results.total_accepted_recipients,
            rejected = response.results.total_rejected_recipients,
            "Transmission sent"
        );

        Ok(response)
    }

    /// Sends a transmission given as untyped JSON.
    ///
    /// Fails with a validation error unless `transmission` is a JSON object.
    pub async fn send_json(
        &self,
        transmission: serde_json::Value,
        options: &SendOptions,
    ) -> SparkPostResult<ApiResponse<SendResults>> {
        let transmission = Transmission::try_from(transmission)?;
        self.send(&transmission, options).await
    }
}
