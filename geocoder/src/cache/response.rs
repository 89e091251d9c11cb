//! The session's response cache.

use std::sync::{Arc, Mutex};

use tracing::debug;

use super::acquire::{acquire, plan};
use super::error::StoreError;
use super::location::CacheLocation;
use super::store::CacheStore;

/// Cache state behind the lock: the configured location and the lazily
/// opened store.
struct CacheState {
    location: CacheLocation,
    store: Option<Box<dyn CacheStore>>,
}

impl CacheState {
    /// The store, opened on first use, with its collection in place.
    ///
    /// Returns `None` if there is no usable collection and `create` is not
    /// set. A store that cannot be opened is retried on the next call.
    fn layer(&mut self, create: bool) -> Result<Option<&mut Box<dyn CacheStore>>, StoreError> {
        if self.store.is_none() {
            match acquire(&plan(&self.location, create)) {
                Ok(acquired) => {
                    if acquired.location != self.location {
                        debug!(
                            from = %self.location,
                            to = %acquired.location,
                            "switching geocode cache"
                        );
                        self.location = acquired.location;
                    }
                    self.store = Some(acquired.store);
                }
                Err(e) if !create => {
                    debug!(location = %self.location, error = %e, "no geocode cache to read");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        }

        let Some(store) = self.store.as_mut() else {
            return Ok(None);
        };
        if store.ensure_layer(create)? {
            Ok(Some(store))
        } else {
            Ok(None)
        }
    }

    fn lookup(&mut self, url: &str) -> Result<Option<String>, StoreError> {
        match self.layer(false)? {
            Some(store) => store.lookup(url),
            None => Ok(None),
        }
    }

    fn insert(&mut self, url: &str, body: &str) -> Result<(), StoreError> {
        let location = self.location.to_string();
        let store = self
            .layer(true)?
            .ok_or(StoreError::InvalidSchema(location))?;
        store.append(url, body)
    }
}

/// URL-keyed store of raw response bodies.
///
/// Cloning yields another handle to the same store. Lookups and inserts are
/// serialised by one lock and run on the blocking thread pool, since the
/// store may do file or network I/O.
///
/// The lock belongs to this cache and its clones, not to the process. Two
/// caches built with [`ResponseCache::new`] on the same location each open
/// their own handle and do not serialise against each other; share one
/// cache by cloning it when that matters. Each insert is a single append,
/// so separate handles see each other's entries on their next lookup.
#[derive(Clone)]
pub struct ResponseCache {
    state: Arc<Mutex<CacheState>>,
}

impl ResponseCache {
    /// Create a cache for `location`. Nothing is opened until first use.
    pub fn new(location: CacheLocation) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                location,
                store: None,
            })),
        }
    }

    /// Body cached for `url`, if any.
    pub async fn lookup(&self, url: &str) -> Result<Option<String>, StoreError> {
        let url = url.to_string();
        self.with_state(move |state| state.lookup(&url)).await
    }

    /// Store `body` under `url`, creating the store if necessary.
    pub async fn insert(&self, url: &str, body: &str) -> Result<(), StoreError> {
        let url = url.to_string();
        let body = body.to_string();
        self.with_state(move |state| state.insert(&url, &body)).await
    }

    /// Location in use, which may differ from the configured one after a
    /// fallback.
    pub fn location(&self) -> CacheLocation {
        match self.state.lock() {
            Ok(state) => state.location.clone(),
            Err(poisoned) => poisoned.into_inner().location.clone(),
        }
    }

    /// Whether a store has been opened.
    pub fn is_open(&self) -> bool {
        match self.state.lock() {
            Ok(state) => state.store.is_some(),
            Err(poisoned) => poisoned.into_inner().store.is_some(),
        }
    }

    async fn with_state<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut CacheState) -> Result<T, StoreError> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        tokio::task::spawn_blocking(move || {
            let mut state = state.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut state)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}
