//! Flight snapshot fetching.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use farewatch_provider::{Client, FlightSnapshot, SearchQuery};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::request::SearchRequest;

/// Errors from fetching a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never got a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("Provider returned HTTP {status}: {body}")]
    NonSuccessStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The provider reported an error inside a successful response.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// The body was empty, unparseable or of an unknown shape.
    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

impl From<farewatch_provider::Error> for FetchError {
    fn from(err: farewatch_provider::Error) -> Self {
        use farewatch_provider::Error as ProviderErr;

        match err {
            ProviderErr::Status { status, body } => Self::NonSuccessStatus { status, body },
            ProviderErr::Provider(message) => Self::ProviderError(message),
            ProviderErr::EmptyResponse(reason) => Self::EmptyResponse(reason),
            other @ (ProviderErr::Http(_)
            | ProviderErr::InvalidConfig(_)
            | ProviderErr::UrlError(_)) => Self::Transport(other.to_string()),
        }
    }
}

/// Source of flight snapshots, one call per search.
#[async_trait]
pub trait FlightSource: Send + Sync {
    /// Fetches a snapshot for a request.
    async fn fetch(&self, request: &SearchRequest) -> Result<FlightSnapshot, FetchError>;
}

/// [`FlightSource`] backed by the provider client.
///
/// The raw payload of every successful fetch is written to `snapshot_path`
/// for inspection. Write failures are logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct ProviderSource {
    client: Client,
    snapshot_path: Option<PathBuf>,
}

impl ProviderSource {
    /// Creates a source around a configured client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self {
            client,
            snapshot_path: None,
        }
    }

    /// Writes each raw snapshot to `path`.
    #[must_use]
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }
}

#[async_trait]
impl FlightSource for ProviderSource {
    async fn fetch(&self, request: &SearchRequest) -> Result<FlightSnapshot, FetchError> {
        let fetched = self.client.search(&SearchQuery::from(request)).await?;

        if let Some(path) = &self.snapshot_path {
            if let Err(e) = write_snapshot(path, &fetched.raw).await {
                warn!(path = %path.display(), "Failed to write snapshot: {e}");
            } else {
                debug!(path = %path.display(), "Snapshot written");
            }
        }

        Ok(fetched.snapshot)
    }
}

/// Writes a payload as pretty-printed UTF-8 JSON, creating parent directories.
async fn write_snapshot(path: &Path, raw: &Value) -> crate::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(raw)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
