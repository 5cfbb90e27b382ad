//! Transport adapter for the Mailtrap sending API.

use async_trait::async_trait;

use crate::error::{Result, TransportError};
use crate::message::{Email, OutgoingMessage};
use crate::payload::build_payload;

/// Name under which the host mail system selects this transport.
pub const TRANSPORT_NAME: &str = "mailtrap";

/// Default API host, overridable per instance.
pub const DEFAULT_ENDPOINT: &str = "send.api.mailtrap.io";

const API_TOKEN_HEADER: &str = "Api-Token";

/// Sends a composed message over a provider-specific channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fixed name identifying this transport for logging and selection.
    fn name(&self) -> &'static str;

    /// Send one message. One invocation performs at most one network call.
    async fn send(&self, message: &dyn OutgoingMessage) -> Result<Delivery>;
}

/// Outcome of a successful send. The message id is diagnostic metadata; the
/// provider not returning one is not a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    pub message_id: Option<String>,
}

/// Adapter owning the send-time state: HTTP client, API token, endpoint.
///
/// The fields are independently replaceable after construction and are not
/// synchronized; callers needing concurrent sends with mutation should use
/// separate instances.
#[derive(Debug, Clone)]
pub struct MailtrapTransport {
    client: reqwest::Client,
    token: String,
    endpoint: String,
}

impl MailtrapTransport {
    pub fn new(client: reqwest::Client, token: impl Into<String>) -> Self {
        Self {
            client,
            token: token.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    pub fn set_client(&mut self, client: reqwest::Client) {
        self.client = client;
    }

    /// URL of the send endpoint. A bare host gets the https scheme; an
    /// endpoint override that already carries a scheme is used as-is.
    fn send_url(&self) -> String {
        if self.endpoint.contains("://") {
            format!("{}/api/send", self.endpoint.trim_end_matches('/'))
        } else {
            format!("https://{}/api/send", self.endpoint)
        }
    }

    async fn send_email(&self, email: &Email) -> Result<Delivery> {
        let envelope = email.envelope();
        let payload = build_payload(email, &envelope);

        let response = self
            .client
            .post(self.send_url())
            .header(API_TOKEN_HEADER, &self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let message_id = extract_message_id(&body);
        match &message_id {
            Some(id) => tracing::debug!(message_id = %id, "Mailtrap accepted message"),
            None => tracing::debug!("Mailtrap accepted message, no message id in response"),
        }

        Ok(Delivery { message_id })
    }
}

#[async_trait]
impl Transport for MailtrapTransport {
    fn name(&self) -> &'static str {
        TRANSPORT_NAME
    }

    async fn send(&self, message: &dyn OutgoingMessage) -> Result<Delivery> {
        let email = message
            .as_any()
            .downcast_ref::<Email>()
            .ok_or(TransportError::UnsupportedMessage { expected: "Email" })?;

        self.send_email(email).await
    }
}

/// Pull the first provider-assigned message id out of a response body.
///
/// Only a JSON object with a non-empty `message_ids` array yields an id;
/// any other shape (non-JSON, missing key, empty array) is treated as no
/// diagnostic available, never an error.
pub fn extract_message_id(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let first = value.get("message_ids")?.as_array()?.first()?;
    Some(match first {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
