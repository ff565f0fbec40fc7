use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;

use crate::{QueueError, Result};

/// Method, headers, and body of one queued request.
///
/// Opaque to the queue itself — it is handed to the transport unchanged on
/// every attempt. The default is a plain GET with no headers and no body.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Raw request body, if any.
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    /// Creates a GET request with no headers or body.
    pub fn get() -> Self {
        Self::default()
    }

    /// Creates a POST request carrying a JSON-serialized body.
    ///
    /// Sets `Content-Type: application/json`.
    pub fn post_json<B: Serialize>(body: &B) -> Result<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|err| QueueError::Decode(format!("request body serialization: {err}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self {
            method: Method::POST,
            headers,
            body: Some(bytes),
        })
    }

    /// Replaces the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds one header, replacing any previous value for the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces the request body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}
