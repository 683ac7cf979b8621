//! Transmission request and response types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::address::{Address, EmailAddress};
use crate::errors::SparkPostError;

/// A single recipient of a transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    /// Recipient address.
    pub address: Address,

    /// Per-recipient substitution data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution_data: Option<Value>,

    /// Per-recipient metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    /// Recipient tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Bounce address override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_path: Option<String>,

    /// Any other recipient fields, passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Recipient {
    /// Creates a recipient with only an address.
    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
            substitution_data: None,
            metadata: None,
            tags: None,
            return_path: None,
            extra: Map::new(),
        }
    }

    /// Sets the substitution data.
    pub fn with_substitution_data(mut self, data: Value) -> Self {
        self.substitution_data = Some(data);
        self
    }

    /// Sets the metadata.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sets the tags.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

impl From<Address> for Recipient {
    fn from(address: Address) -> Self {
        Recipient::new(address)
    }
}

impl From<EmailAddress> for Recipient {
    fn from(address: EmailAddress) -> Self {
        Recipient::new(address)
    }
}

impl From<&str> for Recipient {
    fn from(address: &str) -> Self {
        Recipient::new(address)
    }
}

impl From<String> for Recipient {
    fn from(address: String) -> Self {
        Recipient::new(address)
    }
}

/// Recipients of a transmission.
///
/// A JSON array is read as inline recipients. Any other value, normally a
/// stored list reference such as `{"list_id": "my-list"}`, is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Recipients {
    /// Recipients listed in the request.
    Inline(Vec<Recipient>),
    /// A stored recipient list reference, passed through unchanged.
    Stored(Value),
}

impl Recipients {
    /// References a stored recipient list.
    pub fn stored_list(list_id: impl Into<String>) -> Self {
        let mut reference = Map::new();
        reference.insert("list_id".to_string(), Value::String(list_id.into()));
        Recipients::Stored(Value::Object(reference))
    }

    /// Returns the inline recipients, if any.
    pub fn as_inline(&self) -> Option<&[Recipient]> {
        match self {
            Recipients::Inline(recipients) => Some(recipients),
            Recipients::Stored(_) => None,
        }
    }

    /// Returns the stored list ID, if this references one.
    pub fn list_id(&self) -> Option<&Value> {
        match self {
            Recipients::Stored(reference) => reference.get("list_id"),
            Recipients::Inline(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for Recipients {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<Recipient>, _>>()
                .map(Recipients::Inline)
                .map_err(serde::de::Error::custom),
            other => Ok(Recipients::Stored(other)),
        }
    }
}

/// Transmission content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Additional message headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,

    /// Sender address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,

    /// Subject line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// HTML body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Plain-text body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Stored template to render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,

    /// Use the draft version of the stored template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_draft_template: Option<bool>,

    /// Complete RFC 822 message, used instead of the other content fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_rfc822: Option<String>,

    /// Reply-To header value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,

    /// Any other content fields, passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Content {
    /// Creates empty content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates content rendering a stored template.
    pub fn template(template_id: impl Into<String>) -> Self {
        Self {
            template_id: Some(template_id.into()),
            ..Self::default()
        }
    }

    /// Sets the sender.
    pub fn with_from(mut self, from: impl Into<Address>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the HTML body.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Sets the plain-text body.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Adds a message header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// A transmission: one message sent to one or more recipients.
///
/// `cc` and `bcc` are convenience lists. When `recipients` is inline they
/// are folded into it before sending and do not appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transmission {
    /// Recipients, inline or a stored list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Recipients>,

    /// Carbon-copy recipients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<Recipient>>,

    /// Blind carbon-copy recipients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<Recipient>>,

    /// Message content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Campaign the transmission belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,

    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Delivery options (tracking, sandbox, start time, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,

    /// Transmission-level metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    /// Transmission-level substitution data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution_data: Option<Value>,

    /// Bounce address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_path: Option<String>,

    /// Any other transmission fields, passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transmission {
    /// Creates a new transmission builder.
    pub fn builder() -> TransmissionBuilder {
        TransmissionBuilder::new()
    }
}

impl TryFrom<Value> for Transmission {
    type Error = SparkPostError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !value.is_object() {
            return Err(SparkPostError::validation_param(
                "transmission object is required",
                "transmission",
            ));
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// Builder for [`Transmission`].
#[derive(Debug, Default)]
pub struct TransmissionBuilder {
    transmission: Transmission,
}

impl TransmissionBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an inline recipient, replacing any stored list.
    pub fn recipient(mut self, recipient: impl Into<Recipient>) -> Self {
        let recipient = recipient.into();
        match &mut self.transmission.recipients {
            Some(Recipients::Inline(recipients)) => recipients.push(recipient),
            other => *other = Some(Recipients::Inline(vec![recipient])),
        }
        self
    }

    /// Adds several inline recipients.
    pub fn recipients<R: Into<Recipient>>(self, recipients: impl IntoIterator<Item = R>) -> Self {
        recipients
            .into_iter()
            .fold(self, |builder, recipient| builder.recipient(recipient))
    }

    /// Sends to a stored recipient list.
    pub fn stored_list(mut self, list_id: impl Into<String>) -> Self {
        self.transmission.recipients = Some(Recipients::stored_list(list_id));
        self
    }

    /// Adds a CC recipient.
    pub fn cc(mut self, recipient: impl Into<Recipient>) -> Self {
        self.transmission
            .cc
            .get_or_insert_with(Vec::new)
            .push(recipient.into());
        self
    }

    /// Adds a BCC recipient.
    pub fn bcc(mut self, recipient: impl Into<Recipient>) -> Self {
        self.transmission
            .bcc
            .get_or_insert_with(Vec::new)
            .push(recipient.into());
        self
    }

    /// Sets the content.
    pub fn content(mut self, content: Content) -> Self {
        self.transmission.content = Some(content);
        self
    }

    /// Sets the campaign ID.
    pub fn campaign_id(mut self, campaign_id: impl Into<String>) -> Self {
        self.transmission.campaign_id = Some(campaign_id.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.transmission.description = Some(description.into());
        self
    }

    /// Sets the metadata.
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.transmission.metadata = Some(metadata);
        self
    }

    /// Sets the substitution data.
    pub fn substitution_data(mut self, data: Value) -> Self {
        self.transmission.substitution_data = Some(data);
        self
    }

    /// Sets the delivery options.
    pub fn options(mut self, options: Value) -> Self {
        self.transmission.options = Some(options);
        self
    }

    /// Builds the transmission.
    pub fn build(self) -> Transmission {
        self.transmission
    }
}

/// Envelope around every successful SparkPost response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response payload.
    pub results: T,
}

/// Result of creating a transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendResults {
    /// Transmission ID.
    pub id: String,
    /// Number of recipients accepted.
    #[serde(default)]
    pub total_accepted_recipients: u64,
    /// Number of recipients rejected.
    #[serde(default)]
    pub total_rejected_recipients: u64,
    /// Per-recipient errors, when `num_rcpt_errors` was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rcpt_to_errors: Option<Vec<Value>>,
}

/// Transmission as returned by the list and retrieve endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionSummary {
    /// Transmission ID.
    pub id: String,
    /// Campaign ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Delivery state, e.g. `submitted` or `Success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Content as stored by SparkPost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Any other fields returned by the API.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a retrieve-transmission response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedTransmission {
    /// The transmission.
    pub transmission: TransmissionSummary,
}

/// Filters for listing transmissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTransmissionsParams {
    /// Only transmissions in this campaign.
    pub campaign_id: Option<String>,
    /// Only transmissions using this template.
    pub template_id: Option<String>,
    /// Other query parameters, sent after the filters in insertion order.
    pub extra: Vec<(String, String)>,
}

impl ListTransmissionsParams {
    /// Creates empty filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by campaign.
    pub fn campaign_id(mut self, campaign_id: impl Into<String>) -> Self {
        self.campaign_id = Some(campaign_id.into());
        self
    }

    /// Filters by template.
    pub fn template_id(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    /// Adds any other query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    /// Returns the filters as query parameters.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(campaign_id) = &self.campaign_id {
            query.push(("campaign_id".to_string(), campaign_id.clone()));
        }
        if let Some(template_id) = &self.template_id {
            query.push(("template_id".to_string(), template_id.clone()));
        }
        query.extend(self.extra.iter().cloned());
        query
    }
}

/// Query options for sending a transmission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Maximum number of recipient errors to return.
    pub num_rcpt_errors: Option<u32>,
}

impl SendOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests up to `count` recipient errors in the response.
    pub fn num_rcpt_errors(mut self, count: u32) -> Self {
        self.num_rcpt_errors = Some(count);
        self
    }

    /// Returns the options as query parameters.
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.num_rcpt_errors
            .map(|count| vec![("num_rcpt_errors".to_string(), count.to_string())])
            .unwrap_or_default()
    }
}
