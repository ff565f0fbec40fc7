/// Configures pacing, retry, and timeout behavior of a queue.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueueOptions {
    /// Fixed delay between consecutive dispatches, in milliseconds.
    pub rate_limit_delay_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Base retry backoff in milliseconds (exponential strategy).
    pub retry_base_delay_ms: u64,
    /// Per-request timeout in milliseconds. `None` means the transport's
    /// default applies and a hung request is never abandoned by the queue.
    pub timeout_ms: Option<u64>,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: 1_000,
            max_retries: 3,
            retry_base_delay_ms: 400,
            timeout_ms: None,
        }
    }
}
