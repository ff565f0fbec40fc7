//! `paced-http` is a rate-limited async queue for outbound HTTP requests.
//!
//! Requests are dispatched strictly one at a time in FIFO order, with a fixed
//! pacing delay between consecutive sends and automatic exponential-backoff
//! retry on transient failures (HTTP 429 and 5xx). Callers enqueue a request
//! and await the final outcome; retries are invisible to them.
//!
//! Entry points:
//! - [`RequestQueue::enqueue`]
//! - [`RequestQueue::enqueue_json`]

mod error;
mod options;
mod queue;
mod request;

pub use error::QueueError;
pub use options::QueueOptions;
pub use queue::RequestQueue;
pub use request::RequestOptions;

pub type Result<T> = std::result::Result<T, QueueError>;
