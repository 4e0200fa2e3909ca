//! Error types for the earthquake feed client.
//!
//! # Design
//! Every failure the source app silently swallowed gets its own variant so
//! logs and tests can tell them apart. The lenient entry points
//! (`Fetcher::fetch`, `parse`, `QuakeClient::fetch_record`) still collapse
//! all of them into "no data".

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The URL could not be parsed into an absolute URL.
    #[error("malformed URL {url:?}: {reason}")]
    MalformedUrl { url: String, reason: String },

    /// Connecting, sending, or reading the body failed (including timeouts).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with something other than 200.
    #[error("unexpected HTTP status {status}")]
    HttpStatus { status: u16 },

    /// The response body was empty or whitespace only.
    #[error("empty response body")]
    EmptyBody,

    /// The body was not the expected GeoJSON shape.
    #[error("malformed feed JSON: {0}")]
    Json(String),

    /// The feed parsed but carried no events.
    #[error("feed contains no features")]
    NoFeatures,
}

impl FeedError {
    /// Short stable label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::MalformedUrl { .. } => "malformed_url",
            FeedError::Network(_) => "network",
            FeedError::HttpStatus { .. } => "http_status",
            FeedError::EmptyBody => "empty_body",
            FeedError::Json(_) => "json",
            FeedError::NoFeatures => "no_features",
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Json(err.to_string())
    }
}
