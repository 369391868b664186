//! Error types for provider operations.

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Provider error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status code.
    #[error("Provider returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The provider reported an application error inside a 2xx response.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The body was empty, not JSON, or had no recognized shape.
    #[error("Empty or unrecognized response: {0}")]
    EmptyResponse(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl Error {
    /// Creates a status error, keeping at most 512 bytes of the body.
    #[must_use]
    pub fn status(status: u16, body: &str) -> Self {
        let mut end = body.len().min(512);
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        Self::Status {
            status,
            body: body[..end].to_string(),
        }
    }
}
