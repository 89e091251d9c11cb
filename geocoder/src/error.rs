//! Crate-level error type for geocode calls.

use crate::config::ConfigError;
use crate::decode::DecodeError;
use crate::transport::FetchError;

/// Why a session could not be created or a geocode call produced no result.
///
/// Cache failures never appear here: a failed lookup counts as a miss and a
/// failed insert is logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// Session options could not be resolved
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The request was neither a free-text nor a structured query, or both
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    /// The request uses a feature that is not implemented
    #[error("unsupported request: {0}")]
    Unsupported(&'static str),

    /// The service could not be reached or answered with an error
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The service answered with an empty body
    #[error("empty response from service")]
    EmptyResponse,

    /// The response body could not be decoded
    #[error("could not decode response: {0}")]
    Decode(#[from] DecodeError),
}
