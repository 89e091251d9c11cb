//! Fallback chain for obtaining a cache store.
//!
//! The preferred store may be missing or unusable: the default SQLite file
//! may not exist while a CSV one does, the SQLite backend may not be built
//! in, or the disk may refuse new files. Acquisition is therefore an ordered
//! list of steps, tried in turn until one yields a store.

use tracing::debug;

use super::error::StoreError;
use super::location::{Backend, CacheLocation};
use super::store::{self, CacheStore};

/// One way of obtaining a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquire {
    /// Open a store that already exists.
    Open(CacheLocation),
    /// Create a new store.
    Create(CacheLocation),
}

impl Acquire {
    /// Location this step targets.
    pub fn location(&self) -> &CacheLocation {
        match self {
            Acquire::Open(location) | Acquire::Create(location) => location,
        }
    }

    fn run(&self) -> Result<Box<dyn CacheStore>, StoreError> {
        match self {
            Acquire::Open(location) => store::open_existing(location),
            Acquire::Create(location) => store::create(location),
        }
    }
}

/// A store together with the location it was obtained from.
pub struct Acquired {
    pub store: Box<dyn CacheStore>,
    pub location: CacheLocation,
}

/// Steps to obtain a store for `location`.
///
/// 1. Open the store at `location`.
/// 2. If `location` is the default SQLite file, open the default CSV file.
///
/// With `create` set, and unless `location` is a PostgreSQL database:
///
/// 3. Create a store at `location`, or at the default CSV file if `location`
///    is the default SQLite file and SQLite is not built in.
/// 4. Create an in-memory store of the same backend.
pub fn plan(location: &CacheLocation, create: bool) -> Vec<Acquire> {
    let mut steps = vec![Acquire::Open(location.clone())];

    if location.is_default_sqlite() {
        steps.push(Acquire::Open(CacheLocation::default_csv()));
    }

    if create && location.backend() != Backend::Postgres {
        let target = if location.is_default_sqlite() && !Backend::Sqlite.is_available() {
            CacheLocation::default_csv()
        } else {
            location.clone()
        };
        let fallback = target.memory_fallback();
        steps.push(Acquire::Create(target));
        steps.extend(fallback.map(Acquire::Create));
    }

    steps
}

/// Run `steps` in order, stopping at the first that yields a store.
///
/// Returns the error of the last step if none succeeds.
pub fn acquire(steps: &[Acquire]) -> Result<Acquired, StoreError> {
    let mut last_error = None;

    for step in steps {
        match step.run() {
            Ok(store) => {
                return Ok(Acquired {
                    store,
                    location: step.location().clone(),
                });
            }
            Err(e) => {
                debug!(step = ?step, error = %e, "geocode cache step failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| StoreError::NotFound("no cache location".to_string())))
}
