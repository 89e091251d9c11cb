//! Rate-limited, cache-backed client for Nominatim-style geocoding services.
//!
//! A [`Session`] turns a free-text address query into a [`RecordSet`] of
//! places, each with typed attributes and a geometry. Raw responses are kept
//! in a URL-keyed cache (SQLite, CSV, PostgreSQL or in-memory), and fetches
//! to the public services are spaced by a per-service rate limiter.

pub mod cache;
pub mod config;
pub mod decode;
pub mod error;
pub mod session;
pub mod throttle;
pub mod transport;

pub use config::{SessionConfig, SessionOptions};
pub use decode::RecordSet;
pub use error::GeocodeError;
pub use session::{GeocodeRequest, Session};
