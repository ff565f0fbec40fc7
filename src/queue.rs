use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tokio::time::sleep;

use crate::{QueueError, QueueOptions, RequestOptions, Result};

/// One pending request waiting in the queue.
///
/// Completed exactly once: the drain loop sends the final outcome through
/// `completion` after all retries have settled.
struct QueuedRequest {
    url: String,
    options: RequestOptions,
    completion: oneshot::Sender<Result<reqwest::Response>>,
}

/// Shared queue state. Locked only in synchronous sections, never across an
/// await, so FIFO order and the single drain loop survive a multi-threaded
/// runtime.
struct Inner {
    queue: VecDeque<QueuedRequest>,
    draining: bool,
}

/// Rate-limited FIFO queue for outbound HTTP requests.
///
/// Dispatches one request at a time, waits a fixed delay between consecutive
/// dispatches, and retries transient failures (HTTP 429 and 5xx) with
/// exponential backoff before surfacing an error. A later-enqueued request
/// never starts before an earlier one has fully settled, retries included.
///
/// The handle is cheap to clone; clones share the same queue.
///
/// # Example
///
/// ```no_run
/// use paced_http::{RequestOptions, RequestQueue};
///
/// # async fn run() -> paced_http::Result<()> {
/// let queue = RequestQueue::new("https://api.example.com");
/// let response = queue.enqueue("/api/dreams", RequestOptions::get()).await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RequestQueue {
    http: reqwest::Client,
    base_url: String,
    options: QueueOptions,
    inner: Arc<Mutex<Inner>>,
}

impl fmt::Debug for RequestQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock_inner();
        f.debug_struct("RequestQueue")
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .field("queued", &inner.queue.len())
            .field("draining", &inner.draining)
            .finish()
    }
}

impl RequestQueue {
    /// Creates a queue dispatching against the given base URL.
    ///
    /// Paths passed to [`RequestQueue::enqueue`] are joined onto the base;
    /// absolute `http(s)://` paths are used as-is.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            options: QueueOptions::default(),
            inner: Arc::new(Mutex::new(Inner {
                queue: VecDeque::new(),
                draining: false,
            })),
        }
    }

    /// Applies queue options such as pacing and retry behavior.
    pub fn with_options(mut self, opts: QueueOptions) -> Self {
        self.options = opts;
        self
    }

    /// Enqueues a request and awaits its final outcome.
    ///
    /// Returns immediately-deferred work: the request joins the tail of the
    /// queue and is dispatched once everything ahead of it has settled.
    /// Retries on 429/5xx happen automatically and are invisible to the
    /// caller; only the final success or the final error is observed. A
    /// request cannot be withdrawn once enqueued — dropping the returned
    /// future only discards the outcome.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime (the drain loop is spawned
    /// as a task).
    pub async fn enqueue(&self, path: &str, options: RequestOptions) -> Result<reqwest::Response> {
        let url = resolve_url(&self.base_url, path);
        let (completion, settled) = oneshot::channel();

        let spawn_drain = {
            let mut inner = self.lock_inner();
            inner.queue.push_back(QueuedRequest {
                url,
                options,
                completion,
            });
            if inner.draining {
                false
            } else {
                inner.draining = true;
                true
            }
        };

        if spawn_drain {
            let queue = self.clone();
            tokio::spawn(async move { queue.drain().await });
        }

        settled.await.map_err(|_| QueueError::Closed)?
    }

    /// Enqueues a request and parses the response body as JSON.
    ///
    /// Sets `Content-Type: application/json` when the caller has not.
    /// A non-success final status has already been converted into an error by
    /// [`RequestQueue::enqueue`]; a malformed body is a [`QueueError::Decode`].
    pub async fn enqueue_json<T: DeserializeOwned>(
        &self,
        path: &str,
        mut options: RequestOptions,
    ) -> Result<T> {
        if !options.headers.contains_key(reqwest::header::CONTENT_TYPE) {
            options.headers.insert(
                reqwest::header::CONTENT_TYPE,
                reqwest::header::HeaderValue::from_static("application/json"),
            );
        }

        let response = self.enqueue(path, options).await?;
        let body = response.text().await.map_err(QueueError::Offline)?;
        serde_json::from_str::<T>(&body)
            .map_err(|err| QueueError::Decode(format!("invalid response JSON: {err}; body: {body}")))
    }

    /// Single drain loop: runs until the queue is empty, then exits.
    ///
    /// At most one drain task exists at a time — `enqueue` only spawns one
    /// when flipping `draining` from false to true, and the flag is reset in
    /// the same critical section that observes the queue empty, so an enqueue
    /// racing the shutdown either lands before the pop or spawns a fresh loop.
    async fn drain(self) {
        loop {
            let job = {
                let mut inner = self.lock_inner();
                match inner.queue.pop_front() {
                    Some(job) => job,
                    None => {
                        inner.draining = false;
                        return;
                    }
                }
            };

            let result = self.execute(&job.url, &job.options).await;
            // The caller may have dropped its future; the outcome is
            // discarded in that case.
            let _ = job.completion.send(result);

            let more_pending = !self.lock_inner().queue.is_empty();
            if more_pending {
                sleep(Duration::from_millis(self.options.rate_limit_delay_ms)).await;
            }
        }
    }

    /// Executes one request, retrying transient statuses with backoff.
    ///
    /// Bounded by `max_retries` extra attempts; transport-level send failures
    /// are surfaced immediately without retry.
    async fn execute(&self, url: &str, options: &RequestOptions) -> Result<reqwest::Response> {
        let mut attempt = 0usize;
        loop {
            let mut builder = self
                .http
                .request(options.method.clone(), url)
                .headers(options.headers.clone());
            if let Some(body) = &options.body {
                builder = builder.body(body.clone());
            }
            if let Some(timeout_ms) = self.options.timeout_ms {
                builder = builder.timeout(Duration::from_millis(timeout_ms));
            }

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();

                    if is_transient(status) && attempt < self.options.max_retries {
                        self.wait_before_retry(attempt).await;
                        attempt += 1;
                        continue;
                    }

                    if !status.is_success() {
                        let retry_after = retry_after_hint(response.headers());
                        return Err(QueueError::from_status(status.as_u16(), retry_after));
                    }

                    return Ok(response);
                }
                Err(err) => return Err(QueueError::Offline(err)),
            }
        }
    }

    /// Waits before the next retry attempt (exponential backoff).
    async fn wait_before_retry(&self, attempt: usize) {
        let delay_ms = backoff_delay_ms(self.options.retry_base_delay_ms, attempt);

        #[cfg(feature = "tracing")]
        tracing::debug!("retrying request after {} ms", delay_ms);

        sleep(Duration::from_millis(delay_ms)).await;
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Joins a request path onto the queue's base URL.
///
/// Absolute `http(s)://` paths bypass the base entirely.
fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_owned();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Transient statuses presumed likely to succeed on retry: 429 and any 5xx.
fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Exponential backoff delay for the given attempt, capped to avoid overflow.
fn backoff_delay_ms(base_ms: u64, attempt: usize) -> u64 {
    let exp = attempt.min(16) as u32;
    base_ms.saturating_mul(1u64 << exp)
}

/// Parses a `Retry-After` header given in whole seconds, if present.
fn retry_after_hint(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}
