/// Error type returned by this crate.
///
/// Callers who need to branch on the failure class match on the variant;
/// the `Display` text is the user-facing message for each case.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// HTTP 429 after the retry budget was exhausted.
    #[error("we're receiving a lot of requests right now, please wait a moment and try again")]
    RateLimited {
        /// Server-provided `Retry-After` hint in seconds, when present.
        retry_after: Option<u64>,
    },
    /// HTTP 500 after the retry budget was exhausted.
    #[error("our servers are having some trouble, please try again in a few moments")]
    ServerError { status: u16 },
    /// HTTP 502/503/504 after the retry budget was exhausted.
    #[error("service temporarily unavailable, please try again shortly")]
    Unavailable { status: u16 },
    /// HTTP 401 — never retried.
    #[error("authentication required, please check your credentials")]
    AuthRequired,
    /// HTTP 403 — never retried.
    #[error("access denied, please check your permissions")]
    Forbidden,
    /// HTTP 404 — never retried.
    #[error("service not found, please try again later")]
    NotFound,
    /// Any other non-success HTTP status.
    #[error("server error ({status}), please try again later")]
    Unexpected { status: u16 },
    /// Transport-level send failure (connection refused, DNS, timeout).
    #[error("connection failed, please check your network and try again")]
    Offline(#[source] reqwest::Error),
    /// Response body could not be parsed as the expected JSON shape.
    #[error("invalid JSON response: {0}")]
    Decode(String),
    /// The queue worker went away before this request completed.
    #[error("request queue shut down before the request completed")]
    Closed,
}

impl QueueError {
    /// Classifies a non-success HTTP status into its error kind.
    ///
    /// `retry_after` is only meaningful for 429 responses and is dropped for
    /// every other status.
    pub(crate) fn from_status(status: u16, retry_after: Option<u64>) -> Self {
        match status {
            429 => Self::RateLimited { retry_after },
            401 => Self::AuthRequired,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500 => Self::ServerError { status },
            502 | 503 | 504 => Self::Unavailable { status },
            other => Self::Unexpected { status: other },
        }
    }
}
