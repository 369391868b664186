//! Transport abstraction and channel dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::message::Message;
use crate::preference::ChannelMethod;

/// Errors from delivering a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Network, authentication or server failure.
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// The recipient address was rejected.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// Delivers rendered messages over one channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Channel this transport serves.
    fn method(&self) -> ChannelMethod;

    /// Sends a message to one recipient.
    async fn send(&self, recipient: &str, message: &Message) -> Result<(), DispatchError>;
}

/// Routes messages to the transport registered for each channel.
#[derive(Clone, Default)]
pub struct Dispatcher {
    transports: HashMap<ChannelMethod, Arc<dyn Transport>>,
}

impl Dispatcher {
    /// Creates a dispatcher without transports.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transport, replacing any previous one for its channel.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.register(transport);
        self
    }

    /// Registers a transport, replacing any previous one for its channel.
    pub fn register(&mut self, transport: Arc<dyn Transport>) {
        self.transports.insert(transport.method(), transport);
    }

    /// Returns true if a transport serves `method`.
    #[must_use]
    pub fn supports(&self, method: ChannelMethod) -> bool {
        self.transports.contains_key(&method)
    }

    /// Sends `message` to `recipient` over `method`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::TransportFailure`] if no transport serves the
    /// channel, or the transport's own error.
    pub async fn dispatch(
        &self,
        method: ChannelMethod,
        recipient: &str,
        message: &Message,
    ) -> Result<(), DispatchError> {
        let transport = self.transports.get(&method).ok_or_else(|| {
            DispatchError::TransportFailure(format!("no transport configured for {method}"))
        })?;
        transport.send(recipient, message).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut methods: Vec<_> = self.transports.keys().collect();
        methods.sort();
        f.debug_struct("Dispatcher")
            .field("methods", &methods)
            .finish()
    }
}

/// Maps a non-success HTTP status to a dispatch error.
pub(super) fn status_error(status: u16, body: &str, recipient_statuses: &[u16]) -> DispatchError {
    let mut body = body.trim().to_string();
    if body.len() > 256 {
        let mut end = 256;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }

    if recipient_statuses.contains(&status) {
        DispatchError::InvalidRecipient(format!("HTTP {status}: {body}"))
    } else if matches!(status, 401 | 403) {
        DispatchError::TransportFailure(format!("authentication rejected (HTTP {status})"))
    } else {
        DispatchError::TransportFailure(format!("HTTP {status}: {body}"))
    }
}

pub(super) fn request_error(err: reqwest::Error) -> DispatchError {
    DispatchError::TransportFailure(err.without_url().to_string())
}
