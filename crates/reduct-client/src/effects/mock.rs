//! Scripted transport for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use futures_util::stream;

use super::http::{HttpClient, HttpRequest, HttpResponse};
use crate::data::Headers;

/// Transport failure produced by [`MockHttpClient`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

impl From<&str> for MockError {
    fn from(message: &str) -> Self {
        MockError(message.to_string())
    }
}

/// A canned response. The body is delivered chunk by chunk, and may end in an error.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Headers,
    pub chunks: Vec<Result<Bytes, MockError>>,
}

impl MockResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            chunks: Vec::new(),
        }
    }

    /// A poll response carrying one record.
    pub fn record(timestamp: u64, body: &'static [u8], last: bool) -> Self {
        let response = Self::new(200)
            .header("x-reduct-time", timestamp.to_string())
            .header("content-length", body.len().to_string())
            .body(body);
        if last {
            response.header("x-reduct-last", "1")
        } else {
            response
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Append the whole body as a single chunk.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.chunks.push(Ok(body.into()));
        self
    }

    #[must_use]
    pub fn chunks<B: Into<Bytes>>(mut self, chunks: impl IntoIterator<Item = B>) -> Self {
        self.chunks.extend(chunks.into_iter().map(|c| Ok(c.into())));
        self
    }

    /// End the body with a stream error.
    #[must_use]
    pub fn fail(mut self, message: &str) -> Self {
        self.chunks.push(Err(message.into()));
        self
    }
}

type Handler = dyn Fn(&HttpRequest) -> Result<MockResponse, MockError> + Send + Sync;

/// Fake transport that answers through a closure and records every request.
///
/// Clones share the handler and the request log.
#[derive(Clone)]
pub struct MockHttpClient {
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockHttpClient {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<MockResponse, MockError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer requests with `responses` in order, then with 500.
    pub fn sequence(responses: impl IntoIterator<Item = MockResponse>) -> Self {
        let queue = Mutex::new(responses.into_iter().collect::<VecDeque<_>>());
        Self::new(move |_| {
            let next = queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
            Ok(next.unwrap_or_else(|| {
                MockResponse::new(500).header("x-reduct-error", "no scripted response left")
            }))
        })
    }

    /// Every request served so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests sent to `path`.
    pub fn count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

impl HttpClient for MockHttpClient {
    type Error = MockError;

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse<MockError>, MockError> {
        let result = (self.handler)(&request);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let response = result?;
        Ok(HttpResponse {
            status: response.status,
            headers: response.headers,
            body: Box::pin(stream::iter(response.chunks)),
        })
    }
}
