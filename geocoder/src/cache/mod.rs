//! URL-keyed cache of raw geocoding responses.
//!
//! Responses are stored in a two-field collection (`url`, `blob`) inside a
//! tabular store: an SQLite database, a CSV file, a PostgreSQL database, or
//! an in-memory fallback. The store is opened lazily on first use through an
//! explicit chain of acquisition steps, and every access goes through a
//! single lock because store handles are not safe for concurrent use.

mod acquire;
mod csv_file;
mod error;
mod location;
mod memory;
#[cfg(feature = "postgres")]
mod pg;
mod response;
#[cfg(feature = "sqlite")]
mod sqlite;
mod store;

pub use acquire::{Acquire, Acquired, acquire, plan};
pub use error::StoreError;
pub use location::{
    Backend, CACHE_LAYER_NAME, CacheLocation, DEFAULT_CACHE_CSV, DEFAULT_CACHE_SQLITE,
};
pub use response::ResponseCache;
pub use store::{CacheStore, FIELD_BLOB, FIELD_URL, create, open_existing};
