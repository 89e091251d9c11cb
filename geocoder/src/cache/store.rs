//! The capability a tabular backend must offer to hold the response cache.

use tracing::debug;

use super::csv_file::CsvStore;
use super::error::StoreError;
use super::location::{Backend, CacheLocation};
use super::memory::MemoryStore;

/// Field holding the request URL.
pub const FIELD_URL: &str = "url";

/// Field holding the raw response body.
pub const FIELD_BLOB: &str = "blob";

/// An opened cache store.
///
/// Implementations are not required to be safe for concurrent use; callers
/// serialise all access behind one lock.
pub trait CacheStore: Send {
    /// Make sure the cache collection exists with its `url` and `blob` fields,
    /// creating it (and, where supported, an index on `url`) if `create` is set.
    ///
    /// Returns `Ok(false)` if the collection is absent and `create` is not set.
    fn ensure_layer(&mut self, create: bool) -> Result<bool, StoreError>;

    /// Body of the first entry whose URL equals `url`.
    fn lookup(&mut self, url: &str) -> Result<Option<String>, StoreError>;

    /// Append an entry. Existing entries for the same URL are left alone.
    fn append(&mut self, url: &str, body: &str) -> Result<(), StoreError>;
}

/// Open a store that already exists at `location`.
pub fn open_existing(location: &CacheLocation) -> Result<Box<dyn CacheStore>, StoreError> {
    debug!(%location, "opening geocode cache");
    match location {
        CacheLocation::Sqlite(path) => sqlite_backend::open_existing(path),
        CacheLocation::Csv(path) => Ok(Box::new(CsvStore::open_existing(path)?)),
        CacheLocation::Postgres(conninfo) => pg_backend::connect(conninfo),
        CacheLocation::Memory(_) => Err(StoreError::NotFound(location.to_string())),
    }
}

/// Create a new, empty store at `location`.
pub fn create(location: &CacheLocation) -> Result<Box<dyn CacheStore>, StoreError> {
    debug!(%location, "creating geocode cache");
    match location {
        CacheLocation::Sqlite(path) => sqlite_backend::create(path),
        CacheLocation::Csv(path) => Ok(Box::new(CsvStore::create(path)?)),
        CacheLocation::Postgres(conninfo) => pg_backend::connect(conninfo),
        CacheLocation::Memory(Backend::Sqlite) => sqlite_backend::in_memory(),
        CacheLocation::Memory(Backend::Csv) => Ok(Box::new(MemoryStore::new())),
        CacheLocation::Memory(Backend::Postgres) => Err(StoreError::NotFound(location.to_string())),
    }
}

#[cfg(feature = "sqlite")]
mod sqlite_backend {
    use std::path::Path;

    use super::super::sqlite::SqliteStore;
    use super::{CacheStore, StoreError};

    pub fn open_existing(path: &Path) -> Result<Box<dyn CacheStore>, StoreError> {
        Ok(Box::new(SqliteStore::open_existing(path)?))
    }

    pub fn create(path: &Path) -> Result<Box<dyn CacheStore>, StoreError> {
        Ok(Box::new(SqliteStore::create(path)?))
    }

    pub fn in_memory() -> Result<Box<dyn CacheStore>, StoreError> {
        Ok(Box::new(SqliteStore::in_memory()?))
    }
}

#[cfg(not(feature = "sqlite"))]
mod sqlite_backend {
    use std::path::Path;

    use super::{Backend, CacheStore, StoreError};

    pub fn open_existing(_path: &Path) -> Result<Box<dyn CacheStore>, StoreError> {
        Err(StoreError::Unavailable(Backend::Sqlite))
    }

    pub fn create(_path: &Path) -> Result<Box<dyn CacheStore>, StoreError> {
        Err(StoreError::Unavailable(Backend::Sqlite))
    }

    pub fn in_memory() -> Result<Box<dyn CacheStore>, StoreError> {
        Err(StoreError::Unavailable(Backend::Sqlite))
    }
}

#[cfg(feature = "postgres")]
mod pg_backend {
    use super::super::pg::PgStore;
    use super::{CacheStore, StoreError};

    pub fn connect(conninfo: &str) -> Result<Box<dyn CacheStore>, StoreError> {
        Ok(Box::new(PgStore::connect(conninfo)?))
    }
}

#[cfg(not(feature = "postgres"))]
mod pg_backend {
    use super::{Backend, CacheStore, StoreError};

    pub fn connect(_conninfo: &str) -> Result<Box<dyn CacheStore>, StoreError> {
        Err(StoreError::Unavailable(Backend::Postgres))
    }
}
