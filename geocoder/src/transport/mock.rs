//! Mock transport for testing without network access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use super::error::FetchError;
use super::{FetchRequest, Transport};

/// Canned answer for a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Successful response with this body
    Body(String),
    /// Successful response with an empty body
    Empty,
    /// Error status code
    Failure(u16),
}

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    pub url: String,
    pub user_agent: String,
    /// When the fetch started, on tokio's clock.
    pub at: Instant,
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, MockResponse>,
    fallback: Option<MockResponse>,
    requests: Vec<RecordedFetch>,
}

/// Transport that serves canned responses and records every request.
///
/// Clones share state, so a test can keep one handle while a session owns
/// another. URLs without a canned response get the fallback response, or a
/// 404 if none is set.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every URL with `body`.
    pub fn always(body: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.set_fallback(MockResponse::Body(body.into()));
        mock
    }

    /// Answer `url` with `response`.
    pub fn with_response(self, url: impl Into<String>, response: MockResponse) -> Self {
        self.lock().responses.insert(url.into(), response);
        self
    }

    /// Answer URLs without a canned response with `response`.
    pub fn set_fallback(&self, response: MockResponse) {
        self.lock().fallback = Some(response);
    }

    /// Number of fetches performed.
    pub fn fetch_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Every fetch performed, in order.
    pub fn requests(&self) -> Vec<RecordedFetch> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for MockTransport {
    async fn fetch(&self, request: &FetchRequest) -> Result<Option<String>, FetchError> {
        let response = {
            let mut state = self.lock();
            state.requests.push(RecordedFetch {
                url: request.url.clone(),
                user_agent: request.user_agent.clone(),
                at: Instant::now(),
            });
            state
                .responses
                .get(&request.url)
                .or(state.fallback.as_ref())
                .cloned()
                .unwrap_or(MockResponse::Failure(404))
        };

        match response {
            MockResponse::Body(body) => Ok(Some(body)),
            MockResponse::Empty => Ok(None),
            MockResponse::Failure(status) => Err(FetchError::Status {
                status,
                message: format!("mock response for {}", request.url),
            }),
        }
    }
}
