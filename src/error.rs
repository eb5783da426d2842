// src/error.rs

use thiserror::Error;

/// Everything that can go wrong inside a single provider fetch.
///
/// These never cross the fetcher boundary as a crash; they are published on
/// the result channel as a failed [`ProviderResult`](crate::models::ProviderResult).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The URL template could not be turned into a request.
    #[error("invalid request: {0}")]
    RequestConstruction(String),

    /// Connection failure, non-success status, or an abort caused by cancellation.
    #[error("transport error: {0}")]
    Transport(String),

    /// The body did not parse into the provider's address shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn cancelled() -> Self {
        FetchError::Transport("cancelled".to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::RequestConstruction(e.to_string())
    }
}
