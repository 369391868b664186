//! HTTP client for the flight-pricing provider.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::query::SearchQuery;
use crate::snapshot::{FlightSnapshot, decode_body};

/// Provider connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the provider API.
    pub base_url: String,
    /// Path of the round-trip search endpoint.
    pub search_path: String,
    /// Value of the `x-rapidapi-host` header.
    pub api_host: String,
    /// Market the provider prices for (e.g. `PL`).
    pub location: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://google-flights4.p.rapidapi.com".to_string(),
            search_path: "/flights/search-roundtrip".to_string(),
            api_host: "google-flights4.p.rapidapi.com".to_string(),
            location: None,
            timeout_secs: 30,
        }
    }
}

/// A decoded snapshot together with the raw payload it came from.
#[derive(Debug, Clone)]
pub struct FetchedSnapshot {
    /// Provider payload as received.
    pub raw: Value,
    /// Normalized snapshot.
    pub snapshot: FlightSnapshot,
}

/// Client for the flight-pricing provider.
///
/// Issues exactly one request per [`Client::search`] call; retries are the
/// caller's business.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    config: ClientConfig,
}

impl Client {
    /// Creates a client from its configuration and API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid, the key is empty or
    /// the HTTP client cannot be built.
    pub fn new(config: ClientConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("provider API key is empty".into()));
        }

        let endpoint = Url::parse(&config.base_url)?.join(&config.search_path)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "unsupported URL scheme: {}",
                endpoint.scheme()
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
            config,
        })
    }

    /// Returns the search endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Runs one round-trip search.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] if the request fails in transport
    /// - [`Error::Status`] for non-2xx responses
    /// - [`Error::Provider`] if the provider reports an error in the body
    /// - [`Error::EmptyResponse`] for blank or unrecognized bodies
    pub async fn search(&self, query: &SearchQuery) -> Result<FetchedSnapshot> {
        debug!(
            "Searching {} -> {} on {}",
            query.departure_id, query.arrival_id, query.outbound_date
        );

        let response = self
            .http_client
            .get(self.endpoint.clone())
            .query(&query.to_pairs(self.config.location.as_deref()))
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.config.api_host)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::status(status.as_u16(), &body));
        }

        let (raw, snapshot) = decode_body(&body)?;
        debug!(
            "Provider returned {} groups ({:?})",
            snapshot.groups.len(),
            snapshot.format
        );
        Ok(FetchedSnapshot { raw, snapshot })
    }
}
