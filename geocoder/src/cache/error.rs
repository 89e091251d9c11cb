//! Cache store error types.

use super::location::Backend;

/// Errors from a cache store.
///
/// None of these fail a geocode call: a failed lookup is treated as a miss
/// and a failed insert is logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend was not compiled into this build
    #[error("{0} cache backend is not available in this build")]
    Unavailable(Backend),

    /// No store exists at the location
    #[error("no cache store at {0}")]
    NotFound(String),

    /// The cache collection exists but lacks the url/blob fields
    #[error("cache collection {0} lacks the url/blob fields")]
    InvalidSchema(String),

    /// SQLite failure
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// PostgreSQL failure
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] postgres::Error),

    /// CSV encoding or decoding failure
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A previous holder of the cache lock panicked
    #[error("cache lock poisoned")]
    Poisoned,

    /// The blocking cache task could not complete
    #[error("cache task failed: {0}")]
    Task(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::Unavailable(Backend::Postgres);
        assert_eq!(
            err.to_string(),
            "PostgreSQL cache backend is not available in this build"
        );

        let err = StoreError::NotFound("cache.csv".into());
        assert_eq!(err.to_string(), "no cache store at cache.csv");

        let err = StoreError::InvalidSchema("geocode_cache".into());
        assert!(err.to_string().contains("url/blob"));
    }
}
