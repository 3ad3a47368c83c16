//! Position feed error types.

/// Errors from fetching a position snapshot.
///
/// Every variant is a network-level failure: the snapshot as a whole could
/// not be obtained. Malformed individual records are not errors at this
/// level; they are skipped during conversion.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (connection refused, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed returned a non-success status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not a JSON object
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Mock snapshot file could not be loaded
    #[error("mock data error: {message}")]
    Mock { message: String },
}

impl FeedError {
    /// HTTP status code, when the feed answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FeedError::Api { status, .. } => Some(*status),
            FeedError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
