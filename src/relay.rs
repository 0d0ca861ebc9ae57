//! Email-delivery provider client.
//!
//! The contact endpoint never sends mail itself. It hands a sanitized
//! [`ContactPayload`] to an [`EmailRelay`], which forwards it to a
//! Web3Forms-compatible API:
//!
//! ```text
//! POST {relay_url}
//! { "access_key", "name", "email", "subject", "message", "from_name" }
//! → { "success": bool, "message": string }
//! ```
//!
//! The access key is a secret, so it is read from the environment variable
//! named by `server.access_key_env` and never stored in `config.toml`.

use crate::config::ServerConfig;
use crate::validation::ContactPayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("relay not configured: environment variable {0} is not set")]
    NotConfigured(String),
    #[error("relay request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("relay rejected the message: {0}")]
    Rejected(String),
}

/// Forwards a contact message to an email provider.
#[async_trait]
pub trait EmailRelay: Send + Sync {
    /// Deliver `payload`. Returns the provider's confirmation message.
    async fn deliver(&self, payload: &ContactPayload) -> Result<String, RelayError>;
}

#[derive(Debug, Serialize)]
struct ProviderRequest<'a> {
    access_key: &'a str,
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
    from_name: String,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    success: bool,
    #[serde(default)]
    message: String,
}

/// Subject used when the visitor left the field blank.
fn subject_or_default<'a>(payload: &'a ContactPayload) -> &'a str {
    if payload.subject.is_empty() {
        "New portfolio contact message"
    } else {
        &payload.subject
    }
}

pub struct Web3FormsRelay {
    client: reqwest::Client,
    url: String,
    access_key: String,
}

impl Web3FormsRelay {
    pub fn new(
        url: impl Into<String>,
        access_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            access_key: access_key.into(),
        })
    }

    /// Build from `[server]` config, reading the access key from the
    /// environment.
    pub fn from_config(config: &ServerConfig) -> Result<Self, RelayError> {
        let key = std::env::var(&config.access_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| RelayError::NotConfigured(config.access_key_env.clone()))?;
        Self::new(
            &config.relay_url,
            key,
            Duration::from_secs(config.relay_timeout_secs),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EmailRelay for Web3FormsRelay {
    async fn deliver(&self, payload: &ContactPayload) -> Result<String, RelayError> {
        let request = ProviderRequest {
            access_key: &self.access_key,
            name: &payload.name,
            email: &payload.email,
            subject: subject_or_default(payload),
            message: &payload.message,
            from_name: format!("{} (portfolio)", payload.name),
        };

        tracing::debug!(url = %self.url, "forwarding contact message");
        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        let body: ProviderResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(RelayError::Network(e)),
            Err(_) => return Err(RelayError::Rejected(format!("HTTP {status}"))),
        };

        if status.is_success() && body.success {
            Ok(body.message)
        } else if body.message.is_empty() {
            Err(RelayError::Rejected(format!("HTTP {status}")))
        } else {
            Err(RelayError::Rejected(body.message))
        }
    }
}
