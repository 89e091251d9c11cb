//! Session configuration.
//!
//! A session is configured from a case-insensitive map of explicit options.
//! Any option left out falls back to a process-wide setting named
//! `GEOCODE_<KEY>` and then to a hard-coded default.

mod error;
mod options;
mod resolve;
mod service;
mod settings;
mod template;

pub use error::ConfigError;
pub use options::{OptionKey, SessionOptions};
pub use resolve::{DEFAULT_DELAY_SECS, MAX_DELAY_SECS, SessionConfig, default_application, parse_bool};
pub use service::ServiceKind;
pub use settings::{EnvSettings, MapSettings, SETTING_PREFIX, Settings};
pub use template::{InvalidTemplate, QueryTemplate, escape_query_value};
