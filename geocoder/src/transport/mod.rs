//! The HTTP seam between the request executor and the geocoding service.
//!
//! [`HttpTransport`] talks to the real service over reqwest; [`MockTransport`]
//! serves canned bodies and records what was asked of it, for tests.

mod error;
mod http;
mod mock;

use std::future::Future;

pub use error::FetchError;
pub use http::{HttpConfig, HttpTransport};
pub use mock::{MockResponse, MockTransport, RecordedFetch};

/// A single GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Full URL, query string included.
    pub url: String,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

/// Performs GET requests.
pub trait Transport: Send + Sync {
    /// Fetch `request.url`.
    ///
    /// Returns `Ok(None)` if the service answered successfully with an empty
    /// body.
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<Option<String>, FetchError>> + Send;
}
