//! Per-service rate limiting.
//!
//! Public Nominatim instances ask clients to leave a minimum gap between
//! requests. Each built-in service kind gets one [`RateLimiter`], which
//! remembers when the last fetch to that service finished and holds its lock
//! across the wait and the fetch, so concurrent callers go out one at a time.

use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::config::ServiceKind;

/// Enforces a minimum gap between fetches to one service.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last_fetch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fetch` no sooner than `delay` after the previous fetch through
    /// this limiter finished.
    ///
    /// The lock is held while waiting and while `fetch` runs; the finish time
    /// is recorded whether or not the fetch succeeded.
    pub async fn run<F, T>(&self, delay: Duration, fetch: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut last_fetch = self.last_fetch.lock().await;

        if let Some(last) = *last_fetch {
            let now = Instant::now();
            match last.checked_add(delay) {
                Some(ready_at) if ready_at > now => {
                    debug!(wait_ms = (ready_at - now).as_millis() as u64, "rate limit wait");
                    tokio::time::sleep_until(ready_at).await;
                }
                Some(_) => {}
                // Past the clock's range; tokio clamps the sleep to its far future.
                None => {
                    debug!(?delay, "rate limit wait beyond clock range");
                    tokio::time::sleep(delay).await;
                }
            }
        }

        let result = fetch.await;
        *last_fetch = Some(Instant::now());
        result
    }

    /// When the last fetch through this limiter finished.
    pub async fn last_fetch(&self) -> Option<Instant> {
        *self.last_fetch.lock().await
    }
}

/// One rate limiter per built-in service kind.
///
/// Sessions sharing a registry share throttling; sessions with separate
/// registries do not throttle each other.
#[derive(Debug, Default)]
pub struct RateLimiters {
    osm_nominatim: RateLimiter,
    mapquest_nominatim: RateLimiter,
}

impl RateLimiters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by [`Session::new`](crate::session::Session::new).
    pub fn global() -> Arc<RateLimiters> {
        static GLOBAL: OnceLock<Arc<RateLimiters>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(RateLimiters::new())))
    }

    /// Limiter for `service`, or `None` if the service is not throttled.
    pub fn for_service(&self, service: &ServiceKind) -> Option<&RateLimiter> {
        match service {
            ServiceKind::OsmNominatim => Some(&self.osm_nominatim),
            ServiceKind::MapQuestNominatim => Some(&self.mapquest_nominatim),
            ServiceKind::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_fetch_does_not_wait() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        limiter.run(Duration::from_secs(1), async {}).await;

        assert_eq!(Instant::now(), start);
        assert_eq!(limiter.last_fetch().await, Some(start));
    }

    #[tokio::test(start_paused = true)]
    async fn back_to_back_fetches_are_spaced() {
        let limiter = RateLimiter::new();
        let delay = Duration::from_secs(1);

        let first = limiter.run(delay, async { Instant::now() }).await;
        let second = limiter.run(delay, async { Instant::now() }).await;

        assert!(second - first >= delay);
    }

    #[tokio::test(start_paused = true)]
    async fn no_wait_once_delay_has_passed() {
        let limiter = RateLimiter::new();
        let delay = Duration::from_secs(1);

        limiter.run(delay, async {}).await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        let before = Instant::now();
        let at = limiter.run(delay, async { Instant::now() }).await;
        assert_eq!(at, before);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_counts_from_end_of_fetch() {
        let limiter = RateLimiter::new();
        let delay = Duration::from_secs(1);

        limiter
            .run(delay, tokio::time::sleep(Duration::from_secs(3)))
            .await;
        let finished = Instant::now();

        let at = limiter.run(delay, async { Instant::now() }).await;
        assert_eq!(at, finished + delay);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_delay_waits_without_panicking() {
        let limiter = RateLimiter::new();
        limiter.run(Duration::MAX, async {}).await;

        let second = tokio::time::timeout(
            Duration::from_secs(3600),
            limiter.run(Duration::MAX, async {}),
        )
        .await;
        assert!(second.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_serialised() {
        let limiter = Arc::new(RateLimiter::new());
        let delay = Duration::from_millis(500);

        let tasks: Vec<_> = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.run(delay, async { Instant::now() }).await })
            })
            .collect();

        let mut times = Vec::new();
        for task in tasks {
            times.push(task.await.unwrap());
        }
        times.sort();

        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= delay);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn services_have_independent_limiters() {
        let limiters = RateLimiters::new();
        let delay = Duration::from_secs(10);
        let osm = limiters.for_service(&ServiceKind::OsmNominatim).unwrap();
        let mapquest = limiters.for_service(&ServiceKind::MapQuestNominatim).unwrap();

        let start = Instant::now();
        osm.run(delay, async {}).await;
        let at = mapquest.run(delay, async { Instant::now() }).await;

        assert_eq!(at, start);
    }

    #[test]
    fn other_services_are_not_throttled() {
        let limiters = RateLimiters::new();
        assert!(
            limiters
                .for_service(&ServiceKind::Other("custom".into()))
                .is_none()
        );
    }

    #[test]
    fn global_registry_is_shared() {
        assert!(Arc::ptr_eq(&RateLimiters::global(), &RateLimiters::global()));
    }
}
