//! Resolution of explicit options and fallback settings into a session
//! configuration.

use std::time::Duration;

use crate::cache::CacheLocation;

use super::error::ConfigError;
use super::options::{OptionKey, SessionOptions};
use super::service::ServiceKind;
use super::settings::{SETTING_PREFIX, Settings};
use super::template::QueryTemplate;

/// Default minimum delay between two queries to a throttled service.
pub const DEFAULT_DELAY_SECS: f64 = 1.0;

/// Largest accepted delay between two queries: one day.
pub const MAX_DELAY_SECS: f64 = 86_400.0;

/// Default `User-Agent`, naming this library and its version.
pub fn default_application() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Finalised, immutable configuration of a geocoding session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Where cached responses are stored.
    pub cache_location: CacheLocation,

    /// Consult the cache before fetching.
    pub read_cache: bool,

    /// Store fresh responses in the cache.
    pub write_cache: bool,

    /// Remote service queried.
    pub service: ServiceKind,

    /// Contact email sent to services that accept one.
    pub email: Option<String>,

    /// Value of the `User-Agent` header.
    pub application: String,

    /// Minimum delay between two queries to a throttled service.
    pub delay: Duration,

    /// URL template for GET requests.
    pub query_template: QueryTemplate,

    /// Extra query parameters appended verbatim to every URL.
    pub extra_query_parameters: Option<String>,
}

impl SessionConfig {
    /// Resolve a configuration.
    ///
    /// Each option is taken from `options` if present, otherwise from the
    /// setting `GEOCODE_<KEY>` in `settings`, otherwise from its default.
    pub fn resolve(options: &SessionOptions, settings: &dyn Settings) -> Result<Self, ConfigError> {
        let lookup = |key: OptionKey| -> Option<String> {
            options
                .get_key(key)
                .map(str::to_string)
                .or_else(|| settings.get(&format!("{SETTING_PREFIX}{key}")))
        };

        let cache_location = match lookup(OptionKey::CacheFile) {
            Some(raw) => CacheLocation::parse(&raw)
                .ok_or(ConfigError::UnsupportedCacheLocation(raw))?,
            None => CacheLocation::default_sqlite(),
        };

        let read_cache = lookup(OptionKey::ReadCache).is_none_or(|v| parse_bool(&v));
        let write_cache = lookup(OptionKey::WriteCache).is_none_or(|v| parse_bool(&v));

        let service = lookup(OptionKey::Service)
            .map(|name| ServiceKind::parse(&name))
            .unwrap_or_default();

        let email = lookup(OptionKey::Email);
        let application = lookup(OptionKey::Application).unwrap_or_else(default_application);

        let delay = match lookup(OptionKey::Delay) {
            Some(raw) => parse_delay(&raw)?,
            None => Duration::from_secs_f64(DEFAULT_DELAY_SECS),
        };

        let template = lookup(OptionKey::QueryTemplate)
            .or_else(|| service.default_template().map(str::to_string))
            .ok_or_else(|| ConfigError::MissingTemplate(service.to_string()))?;
        let query_template = QueryTemplate::parse(&template)?;

        let extra_query_parameters = lookup(OptionKey::ExtraQueryParameters);

        Ok(Self {
            cache_location,
            read_cache,
            write_cache,
            service,
            email,
            application,
            delay,
            query_template,
            extra_query_parameters,
        })
    }
}

/// Interpret a boolean option value.
///
/// `NO`, `FALSE`, `OFF` and `0` (any case) are false; anything else is true.
pub fn parse_bool(value: &str) -> bool {
    let value = value.trim();
    !["NO", "FALSE", "OFF", "0"]
        .iter()
        .any(|f| value.eq_ignore_ascii_case(f))
}

fn parse_delay(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: "DELAY",
        value: raw.to_string(),
        reason: "expected a number of seconds between 0 and 86400",
    };
    let secs: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if secs > MAX_DELAY_SECS {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}
