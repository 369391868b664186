//! Telegram Bot API delivery.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use super::message::Message;
use super::transport::{DispatchError, Transport, request_error, status_error};
use crate::error::{Error, Result};
use crate::preference::ChannelMethod;

/// Telegram Bot API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API base URL.
    pub api_base: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Sends messages with the Bot API `sendMessage` method.
///
/// Recipients are chat IDs or `@channel` names.
pub struct TelegramTransport {
    http_client: reqwest::Client,
    send_url: Url,
}

impl TelegramTransport {
    /// Creates the transport for a bot token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token is empty or the API base is invalid.
    pub fn new(config: &TelegramConfig, bot_token: &str) -> Result<Self> {
        let token = bot_token.trim();
        if token.is_empty() {
            return Err(Error::Config("telegram bot token is empty".into()));
        }

        let base = config.api_base.trim().trim_end_matches('/');
        let send_url = Url::parse(&format!("{base}/bot{token}/sendMessage"))
            .map_err(|e| Error::Config(format!("invalid telegram API base: {e}")))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("telegram HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            send_url,
        })
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    fn method(&self) -> ChannelMethod {
        ChannelMethod::Telegram
    }

    async fn send(
        &self,
        recipient: &str,
        message: &Message,
    ) -> std::result::Result<(), DispatchError> {
        let chat_id = recipient.trim();
        if chat_id.is_empty() || chat_id.contains(char::is_whitespace) {
            return Err(DispatchError::InvalidRecipient(recipient.to_string()));
        }

        let response = self
            .http_client
            .post(self.send_url.clone())
            .json(&json!({
                "chat_id": chat_id,
                "text": message.as_text(),
                "disable_web_page_preview": true,
            }))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let description = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("description").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            return Err(status_error(status.as_u16(), &description, &[400, 403]));
        }

        let ok = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("ok").and_then(Value::as_bool))
            .unwrap_or(false);
        if !ok {
            return Err(DispatchError::TransportFailure(
                "telegram did not confirm delivery".to_string(),
            ));
        }

        debug!("Telegram message delivered to chat {chat_id}");
        Ok(())
    }
}
