//! Error types for the Notion API surface.

/// Error from Notion API operations.
///
/// [`NotionError::NotFound`] is distinguished so callers can recover from
/// dangling references (a mentioned page the integration cannot see) without
/// string-matching on messages.
#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    /// The requested object does not exist or is not shared with the
    /// integration.
    #[error("object not found: {id}")]
    NotFound {
        /// Id (or asset URL) of the missing object.
        id: String,
    },

    /// The API kept rate-limiting the request after all retries.
    #[error("rate limited by the Notion API after {attempts} attempts")]
    RateLimited {
        /// Number of attempts made.
        attempts: u32,
    },

    /// The API returned an error status.
    #[error("notion api error {code} (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code from the response body.
        code: String,
        /// Human-readable message from the response body.
        message: String,
    },

    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    Http(#[from] Box<ureq::Error>),

    /// JSON serialization error while building a request body.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// A blocking request task could not be joined.
    #[error("request task failed")]
    Runtime(#[from] tokio::task::JoinError),
}

impl From<ureq::Error> for NotionError {
    fn from(err: ureq::Error) -> Self {
        Self::Http(Box::new(err))
    }
}
