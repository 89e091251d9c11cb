//! Geocoding sessions and the request executor.
//!
//! A session binds a resolved configuration to a response cache, a transport
//! and the rate limiters of the services it talks to. Each geocode call
//! looks the request URL up in the cache, fetches it (throttled) on a miss,
//! stores the body and decodes it.

mod request;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::ResponseCache;
use crate::config::{EnvSettings, SessionConfig, SessionOptions, escape_query_value};
use crate::decode::{RecordSet, decode};
use crate::error::GeocodeError;
use crate::throttle::RateLimiters;
use crate::transport::{FetchRequest, HttpConfig, HttpTransport, Transport};

pub use request::GeocodeRequest;

/// The two URLs derived from one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrls {
    /// URL the response is cached under; never carries the contact email.
    pub cache_key: String,
    /// URL actually fetched.
    pub fetch_url: String,
}

/// A configured geocoding session.
///
/// Sessions are independent except for the rate limiters they share.
pub struct Session<T = HttpTransport> {
    config: SessionConfig,
    cache: ResponseCache,
    transport: T,
    limiters: Arc<RateLimiters>,
}

impl Session<HttpTransport> {
    /// Create a session over HTTP.
    ///
    /// Options missing from `options` are read from `GEOCODE_*` environment
    /// variables. Throttling is shared with every other session created this
    /// way.
    pub fn new(options: &SessionOptions) -> Result<Self, GeocodeError> {
        let config = SessionConfig::resolve(options, &EnvSettings)?;
        let transport = HttpTransport::new(HttpConfig::default())?;
        Ok(Self::with_transport(config, transport, RateLimiters::global()))
    }
}

impl<T: Transport> Session<T> {
    pub fn with_transport(config: SessionConfig, transport: T, limiters: Arc<RateLimiters>) -> Self {
        info!(
            service = %config.service,
            cache = %config.cache_location,
            "geocoding session created"
        );
        let cache = ResponseCache::new(config.cache_location.clone());
        Self {
            config,
            cache,
            transport,
            limiters,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Build the cache key and fetch URL for a free-text query.
    ///
    /// The query is escaped into the template and the extra parameters are
    /// appended verbatim. The contact email goes on the fetch URL only, and
    /// only for services that accept one.
    pub fn request_urls(&self, query: &str) -> RequestUrls {
        let mut cache_key = self.config.query_template.expand(&escape_query_value(query));
        if let Some(extra) = &self.config.extra_query_parameters {
            cache_key.push('&');
            cache_key.push_str(extra);
        }

        let mut fetch_url = cache_key.clone();
        if self.config.service.supports_email()
            && let Some(email) = self.config.email.as_deref().filter(|e| !e.is_empty())
        {
            fetch_url.push_str("&email=");
            fetch_url.push_str(&escape_query_value(email));
        }

        RequestUrls {
            cache_key,
            fetch_url,
        }
    }

    /// Geocode a free-text query.
    pub async fn geocode(&self, query: &str) -> Result<RecordSet, GeocodeError> {
        self.geocode_request(&GeocodeRequest::query(query)).await
    }

    /// Run a geocode request.
    ///
    /// Exactly one of a free-text or structured query must be given, and
    /// structured queries are not supported yet. Cache failures never fail
    /// the call.
    pub async fn geocode_request(&self, request: &GeocodeRequest) -> Result<RecordSet, GeocodeError> {
        let query = request.free_text()?;
        let urls = self.request_urls(query);

        if self.config.read_cache {
            match self.cache.lookup(&urls.cache_key).await {
                Ok(Some(body)) => {
                    debug!(url = %urls.cache_key, "geocode cache hit");
                    return Ok(decode(&body)?);
                }
                Ok(None) => debug!(url = %urls.cache_key, "geocode cache miss"),
                Err(e) => warn!(error = %e, "geocode cache lookup failed"),
            }
        }

        let body = self.fetch(urls.fetch_url).await?;

        if self.config.write_cache
            && let Err(e) = self.cache.insert(&urls.cache_key, &body).await
        {
            warn!(error = %e, "could not write geocode cache");
        }

        decode(&body).map_err(|e| {
            warn!(error = %e, "could not decode geocoding response");
            GeocodeError::from(e)
        })
    }

    async fn fetch(&self, url: String) -> Result<String, GeocodeError> {
        let request = FetchRequest {
            url,
            user_agent: self.config.application.clone(),
        };

        let fetched = match self.limiters.for_service(&self.config.service) {
            Some(limiter) => {
                limiter
                    .run(self.config.delay, self.transport.fetch(&request))
                    .await
            }
            None => self.transport.fetch(&request).await,
        };

        match fetched {
            Ok(Some(body)) => Ok(body),
            Ok(None) => {
                warn!(url = %request.url, "empty geocoding response");
                Err(GeocodeError::EmptyResponse)
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "geocoding fetch failed");
                Err(e.into())
            }
        }
    }
}
