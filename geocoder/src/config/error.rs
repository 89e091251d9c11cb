//! Configuration error types.

use super::template::InvalidTemplate;

/// Errors raised while resolving a session configuration.
///
/// Any of these aborts session creation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Cache location is neither a `.csv`/`.sqlite` file nor a `PG:` datasource
    #[error("unsupported cache location {0:?}: only .csv, .sqlite or PG: datasources are handled")]
    UnsupportedCacheLocation(String),

    /// No URL template given and the service has no built-in one
    #[error("QUERY_TEMPLATE not defined for service {0}")]
    MissingTemplate(String),

    /// URL template does not hold exactly one placeholder
    #[error(transparent)]
    InvalidTemplate(#[from] InvalidTemplate),

    /// An option value could not be interpreted
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}
