//! Contact form submission pipeline.
//!
//! [`ContactForm`] owns the form state and drives it through
//!
//! ```text
//! Idle ──submit──▶ Submitting ──relay ok──▶ Success
//!   ▲                   │
//!   │                   └──relay/network failure──▶ Error
//!   └── validation failure (inline errors, no request)
//! ```
//!
//! A filled honeypot goes straight to `Error` without a request. Spam,
//! network and relay failures are all shown as the same generic banner; only
//! the returned [`SubmitError`] (for logs) tells them apart.
//!
//! The network side is the [`ContactTransport`] trait. [`HttpContactClient`]
//! is the reqwest implementation that talks to the relay endpoint.

use crate::validation::{
    ContactFormData, ContactPayload, Field, is_form_valid, messages, sanitize_form_data,
    validate_contact_form,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("{0} field(s) failed validation")]
    Invalid(usize),
    #[error("honeypot field was filled in")]
    SpamRejected,
    #[error("a submission is already in flight")]
    InFlight,
    #[error("network error: {0}")]
    Network(String),
    #[error("relay reported failure: {0}")]
    Relay(String),
}

/// Body returned by the relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RelayResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Sends a payload to the relay endpoint.
///
/// Implementations return `Err` only for transport problems (connection,
/// malformed body, non-2xx without a readable body). A relay that answered
/// with `success: false` is an `Ok` response.
#[async_trait]
pub trait ContactTransport: Send + Sync {
    async fn send(&self, payload: &ContactPayload) -> Result<RelayResponse, SubmitError>;
}

/// Form state: field values, inline errors and submission status.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    data: ContactFormData,
    errors: BTreeMap<Field, String>,
    status: SubmissionStatus,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &ContactFormData {
        &self.data
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SubmissionStatus::Submitting
    }

    /// Update one field. Its inline error is cleared as soon as the visitor types.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.data.name = value,
            Field::Email => self.data.email = value,
            Field::Subject => self.data.subject = value,
            Field::Message => self.data.message = value,
            Field::Honeypot => self.data.honeypot = value,
        }
        self.errors.remove(&field);
    }

    /// Banner text for the current status, if any.
    pub fn banner(&self) -> Option<&'static str> {
        match self.status {
            SubmissionStatus::Success => Some(messages::SUBMIT_SUCCEEDED),
            SubmissionStatus::Error => Some(messages::SUBMIT_FAILED),
            SubmissionStatus::Idle | SubmissionStatus::Submitting => None,
        }
    }

    /// First half of a submission: guard, sanitize, validate, honeypot.
    ///
    /// Validation runs on the sanitized fields, so the inline errors describe
    /// what would actually be sent. On success the form is `Submitting` and
    /// the returned payload must be passed to exactly one transport call
    /// followed by [`Self::finish_submit`].
    pub fn begin_submit(&mut self) -> Result<ContactPayload, SubmitError> {
        if self.is_submitting() {
            return Err(SubmitError::InFlight);
        }
        self.status = SubmissionStatus::Idle;

        let clean = sanitize_form_data(&self.data);
        let validation = validate_contact_form(&clean);
        if !is_form_valid(&validation) {
            self.errors = validation.first_errors().into_iter().collect();
            return Err(SubmitError::Invalid(self.errors.len()));
        }
        self.errors.clear();

        if self.data.is_spam() {
            self.status = SubmissionStatus::Error;
            return Err(SubmitError::SpamRejected);
        }

        self.status = SubmissionStatus::Submitting;
        Ok(clean.to_payload())
    }

    /// Second half of a submission: apply the transport outcome.
    pub fn finish_submit(
        &mut self,
        outcome: Result<RelayResponse, SubmitError>,
    ) -> Result<(), SubmitError> {
        let result = match outcome {
            Ok(response) if response.success => Ok(()),
            Ok(response) => Err(SubmitError::Relay(
                response
                    .message
                    .unwrap_or_else(|| "Failed to send message".to_string()),
            )),
            Err(err) => Err(err),
        };
        match &result {
            Ok(()) => {
                self.data = ContactFormData::default();
                self.status = SubmissionStatus::Success;
            }
            Err(_) => self.status = SubmissionStatus::Error,
        }
        result
    }

    /// Run the whole pipeline against `transport`.
    pub async fn submit<T>(&mut self, transport: &T) -> Result<(), SubmitError>
    where
        T: ContactTransport + ?Sized,
    {
        let payload = match self.begin_submit() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(error = %err, "contact form not submitted");
                return Err(err);
            }
        };
        tracing::info!("submitting contact form");
        let outcome = transport.send(&payload).await;
        let result = self.finish_submit(outcome);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "contact form submission failed");
        }
        result
    }
}

// =============================================================================
// HTTP transport
// =============================================================================

/// Posts payloads to the relay endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpContactClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpContactClient {
    /// `endpoint` is the absolute URL of the relay route,
    /// e.g. `https://example.com/api/contact`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContactTransport for HttpContactClient {
    async fn send(&self, payload: &ContactPayload) -> Result<RelayResponse, SubmitError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        match serde_json::from_str::<RelayResponse>(&body) {
            // A non-2xx that still claims success is not trusted.
            Ok(parsed) if !status.is_success() => Ok(RelayResponse {
                success: false,
                message: parsed.message.or_else(|| Some(format!("HTTP {status}"))),
            }),
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Ok(RelayResponse::failed(format!("HTTP {status}"))),
            Err(e) => Err(SubmitError::Network(format!("malformed response: {e}"))),
        }
    }
}
