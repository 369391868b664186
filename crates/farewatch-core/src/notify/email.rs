//! Email delivery through an HTTP email API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use url::Url;

use super::message::Message;
use super::transport::{DispatchError, Transport, request_error, status_error};
use crate::error::{Error, Result};
use crate::preference::ChannelMethod;
use crate::request::is_valid_email;

/// Email API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Send endpoint, e.g. `https://<resource>.communication.azure.com/emails:send?api-version=2023-03-31`.
    pub endpoint: String,
    /// Sender address.
    pub sender: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            sender: String::new(),
            timeout_secs: 30,
        }
    }
}

impl EmailConfig {
    /// Returns true if an endpoint and sender are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.sender.trim().is_empty()
    }
}

/// Sends plain-text email with a JSON POST and bearer authentication.
pub struct HttpEmailTransport {
    http_client: reqwest::Client,
    endpoint: Url,
    sender: String,
    api_key: String,
}

impl HttpEmailTransport {
    /// Creates the transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the endpoint, sender or key is missing or
    /// invalid.
    pub fn new(config: &EmailConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config("email API key is empty".into()));
        }
        if !is_valid_email(&config.sender) {
            return Err(Error::Config(format!(
                "invalid email sender: '{}'",
                config.sender
            )));
        }
        let endpoint = Url::parse(config.endpoint.trim())
            .map_err(|e| Error::Config(format!("invalid email endpoint: {e}")))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("email HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint,
            sender: config.sender.trim().to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl Transport for HttpEmailTransport {
    fn method(&self) -> ChannelMethod {
        ChannelMethod::Email
    }

    async fn send(
        &self,
        recipient: &str,
        message: &Message,
    ) -> std::result::Result<(), DispatchError> {
        let recipient = recipient.trim();
        if !is_valid_email(recipient) {
            return Err(DispatchError::InvalidRecipient(recipient.to_string()));
        }

        let payload = json!({
            "senderAddress": self.sender,
            "recipients": { "to": [{ "address": recipient }] },
            "content": {
                "subject": message.subject,
                "plainText": message.body,
            },
        });

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body, &[400, 404, 422]));
        }

        debug!("Email accepted for delivery (HTTP {})", status.as_u16());
        Ok(())
    }
}
