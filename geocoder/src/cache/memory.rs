//! In-memory cache store.

use super::error::StoreError;
use super::location::CACHE_LAYER_NAME;
use super::store::CacheStore;

/// Cache store kept in process memory; used when nothing can be created on disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// `None` until the collection is created.
    rows: Option<Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn ensure_layer(&mut self, create: bool) -> Result<bool, StoreError> {
        if self.rows.is_none() && create {
            self.rows = Some(Vec::new());
        }
        Ok(self.rows.is_some())
    }

    fn lookup(&mut self, url: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .rows
            .iter()
            .flatten()
            .find(|(u, _)| u == url)
            .map(|(_, body)| body.clone()))
    }

    fn append(&mut self, url: &str, body: &str) -> Result<(), StoreError> {
        let rows = self
            .rows
            .as_mut()
            .ok_or_else(|| StoreError::InvalidSchema(CACHE_LAYER_NAME.to_string()))?;
        rows.push((url.to_string(), body.to_string()));
        Ok(())
    }
}
