//! Geocode call inputs.

use std::collections::BTreeMap;

use crate::config::SessionOptions;
use crate::error::GeocodeError;

/// One geocode call: a free-text query or a structured one, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodeRequest {
    /// Free-text query.
    pub query: Option<String>,
    /// Field-decomposed query (street, city, ...). Not supported yet.
    pub structured: Option<BTreeMap<String, String>>,
    /// Per-call options. Currently unused.
    pub options: SessionOptions,
}

impl GeocodeRequest {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn structured(fields: BTreeMap<String, String>) -> Self {
        Self {
            structured: Some(fields),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// The free-text query, if this is a valid request the executor can run.
    pub(crate) fn free_text(&self) -> Result<&str, GeocodeError> {
        match (&self.query, &self.structured) {
            (Some(query), None) => Ok(query.as_str()),
            (None, None) => Err(GeocodeError::InvalidRequest(
                "neither a query nor a structured query given",
            )),
            (Some(_), Some(_)) => Err(GeocodeError::InvalidRequest(
                "a query and a structured query given",
            )),
            (None, Some(_)) => Err(GeocodeError::Unsupported("structured queries")),
        }
    }
}
