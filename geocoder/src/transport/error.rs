//! Transport error types.

/// Errors from fetching a URL.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error status code
    #[error("service error {status}: {message}")]
    Status { status: u16, message: String },

    /// Any other failure, e.g. an invalid header value
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Status {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "service error 503: Service Unavailable");

        let err = FetchError::Other("invalid user agent".into());
        assert_eq!(err.to_string(), "invalid user agent");
    }
}
