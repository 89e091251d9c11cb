//! Request executor tests against the mock transport.

use std::sync::Arc;
use std::time::Duration;

use geo_types::Geometry;
use tempfile::{TempDir, tempdir};

use super::*;
use crate::config::{MapSettings, ServiceKind};
use crate::transport::{MockResponse, MockTransport};

const PARIS: &str = r#"<searchresults><place display_name="Paris, France" lat="48.85" lon="2.35"/></searchresults>"#;

/// Options with the cache in a fresh temporary directory.
fn options(dir: &TempDir) -> SessionOptions {
    SessionOptions::new().with(
        "CACHE_FILE",
        dir.path().join("cache.csv").display().to_string(),
    )
}

fn new_session(options: &SessionOptions, transport: MockTransport) -> Session<MockTransport> {
    let config = SessionConfig::resolve(options, &MapSettings::new()).unwrap();
    Session::with_transport(config, transport, Arc::new(RateLimiters::new()))
}

#[tokio::test]
async fn paris_example() {
    let dir = tempdir().unwrap();
    let options = options(&dir)
        .with("SERVICE", "OSM_NOMINATIM")
        .with("DELAY", "0")
        .with("WRITE_CACHE", "FALSE");
    let session = new_session(&options, MockTransport::always(PARIS));

    let set = session.geocode("Paris").await.unwrap();
    assert_eq!(set.len(), 1);

    let place = set.get(0).unwrap();
    assert_eq!(place.get_str("display_name"), Some("Paris, France"));
    match place.geometry() {
        Some(Geometry::Point(p)) => assert_eq!((p.x(), p.y()), (2.35, 48.85)),
        other => panic!("expected a point, got {other:?}"),
    }
    assert!(!dir.path().join("cache.csv").exists());
}

#[tokio::test]
async fn second_call_is_served_from_cache() {
    let dir = tempdir().unwrap();
    let options = options(&dir).with("DELAY", "0");
    let transport = MockTransport::always(PARIS);
    let session = new_session(&options, transport.clone());

    let first = session.geocode("Paris").await.unwrap();
    let second = session.geocode("Paris").await.unwrap();

    assert_eq!(transport.fetch_count(), 1);
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn cache_hit_skips_the_rate_limiter() {
    let dir = tempdir().unwrap();
    let options = options(&dir).with("DELAY", "60");
    let transport = MockTransport::always(PARIS);
    let session = new_session(&options, transport.clone());

    let start = tokio::time::Instant::now();
    session.geocode("Paris").await.unwrap();
    session.geocode("Paris").await.unwrap();
    session.geocode("Paris").await.unwrap();

    assert_eq!(transport.fetch_count(), 1);
    assert_eq!(tokio::time::Instant::now(), start);

    // An uncached query still has to wait out the delay.
    session.geocode("Lyon").await.unwrap();
    assert_eq!(transport.fetch_count(), 2);
    assert!(tokio::time::Instant::now() - start >= Duration::from_secs(60));
}

#[tokio::test]
async fn cache_is_shared_across_sessions() {
    let dir = tempdir().unwrap();
    let options = options(&dir).with("DELAY", "0");

    let first = MockTransport::always(PARIS);
    new_session(&options, first.clone()).geocode("Paris").await.unwrap();

    let second = MockTransport::always(PARIS);
    new_session(&options, second.clone()).geocode("Paris").await.unwrap();

    assert_eq!(first.fetch_count(), 1);
    assert_eq!(second.fetch_count(), 0);
}

#[tokio::test]
async fn read_cache_disabled_always_fetches() {
    let dir = tempdir().unwrap();
    let options = options(&dir).with("DELAY", "0").with("READ_CACHE", "off");
    let transport = MockTransport::always(PARIS);
    let session = new_session(&options, transport.clone());

    session.geocode("Paris").await.unwrap();
    session.geocode("Paris").await.unwrap();

    assert_eq!(transport.fetch_count(), 2);
    assert!(dir.path().join("cache.csv").exists());
}

#[tokio::test(start_paused = true)]
async fn back_to_back_fetches_respect_delay() {
    let dir = tempdir().unwrap();
    let options = options(&dir)
        .with("DELAY", "2.5")
        .with("READ_CACHE", "NO")
        .with("WRITE_CACHE", "NO");
    let transport = MockTransport::always(PARIS);
    let session = new_session(&options, transport.clone());

    session.geocode("Paris").await.unwrap();
    session.geocode("Paris").await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].at - requests[0].at >= Duration::from_millis(2500));
}

#[tokio::test(start_paused = true)]
async fn sessions_sharing_limiters_are_throttled_together() {
    let dir = tempdir().unwrap();
    let options = options(&dir)
        .with("DELAY", "1")
        .with("READ_CACHE", "NO")
        .with("WRITE_CACHE", "NO");
    let config = SessionConfig::resolve(&options, &MapSettings::new()).unwrap();
    let limiters = Arc::new(RateLimiters::new());
    let transport = MockTransport::always(PARIS);

    let sessions: Vec<_> = (0..3)
        .map(|_| Session::with_transport(config.clone(), transport.clone(), Arc::clone(&limiters)))
        .collect();
    let results =
        futures::future::join_all(sessions.iter().map(|s| s.geocode("Paris"))).await;
    assert!(results.iter().all(Result::is_ok));

    let mut times: Vec<_> = transport.requests().into_iter().map(|r| r.at).collect();
    times.sort();
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(1));
    }
}

#[tokio::test(start_paused = true)]
async fn other_services_are_not_throttled() {
    let dir = tempdir().unwrap();
    let options = options(&dir)
        .with("SERVICE", "ACME")
        .with("QUERY_TEMPLATE", "http://geo.example/search?q=%s")
        .with("DELAY", "10")
        .with("READ_CACHE", "NO")
        .with("WRITE_CACHE", "NO");
    let transport = MockTransport::always(PARIS);
    let session = new_session(&options, transport.clone());
    assert_eq!(session.config().service, ServiceKind::Other("ACME".into()));

    session.geocode("Paris").await.unwrap();
    session.geocode("Paris").await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].at, requests[1].at);
}

#[tokio::test]
async fn email_is_sent_but_not_cached() {
    let dir = tempdir().unwrap();
    let options = options(&dir)
        .with("DELAY", "0")
        .with("EMAIL", "me+geo@example.com");
    let transport = MockTransport::always(PARIS);
    let session = new_session(&options, transport.clone());

    let urls = session.request_urls("10 Downing St");
    assert_eq!(
        urls.cache_key,
        "https://nominatim.openstreetmap.org/search?q=10+Downing+St&format=xml&polygon_text=1&addressdetails=1"
    );
    assert_eq!(
        urls.fetch_url,
        format!("{}&email=me%2Bgeo%40example.com", urls.cache_key)
    );

    session.geocode("10 Downing St").await.unwrap();
    assert_eq!(transport.requests()[0].url, urls.fetch_url);

    let other_email = options.clone().with("EMAIL", "someone@example.org");
    let cached = MockTransport::always(PARIS);
    new_session(&other_email, cached.clone())
        .geocode("10 Downing St")
        .await
        .unwrap();
    assert_eq!(cached.fetch_count(), 0);
}

#[test]
fn email_only_for_osm() {
    let dir = tempdir().unwrap();
    let options = options(&dir)
        .with("SERVICE", "MAPQUEST_NOMINATIM")
        .with("EMAIL", "me@example.com");
    let session = new_session(&options, MockTransport::new());

    let urls = session.request_urls("Paris");
    assert_eq!(urls.cache_key, urls.fetch_url);
    assert!(!urls.fetch_url.contains("email"));
}

#[test]
fn extra_parameters_are_appended_verbatim() {
    let dir = tempdir().unwrap();
    let options = options(&dir)
        .with("EXTRA_QUERY_PARAMETERS", "countrycodes=fr&limit=1")
        .with("EMAIL", "me@example.com");
    let session = new_session(&options, MockTransport::new());

    let urls = session.request_urls("Paris");
    assert!(urls.cache_key.ends_with("&addressdetails=1&countrycodes=fr&limit=1"));
    assert!(urls.fetch_url.ends_with("&countrycodes=fr&limit=1&email=me%40example.com"));
}

#[tokio::test]
async fn application_is_the_user_agent() {
    let dir = tempdir().unwrap();
    let options = options(&dir)
        .with("DELAY", "0")
        .with("APPLICATION", "my-app/2.0");
    let transport = MockTransport::always(PARIS);
    new_session(&options, transport.clone())
        .geocode("Paris")
        .await
        .unwrap();

    assert_eq!(transport.requests()[0].user_agent, "my-app/2.0");
}

#[tokio::test]
async fn fetch_failure_is_reported_and_not_cached() {
    let dir = tempdir().unwrap();
    let options = options(&dir).with("DELAY", "0");
    let transport = MockTransport::new();
    transport.set_fallback(MockResponse::Failure(503));
    let session = new_session(&options, transport);

    let err = session.geocode("Paris").await.unwrap_err();
    assert!(matches!(
        err,
        GeocodeError::Fetch(crate::transport::FetchError::Status { status: 503, .. })
    ));
    assert!(!dir.path().join("cache.csv").exists());
}

#[tokio::test]
async fn empty_body_yields_no_result() {
    let dir = tempdir().unwrap();
    let options = options(&dir).with("DELAY", "0");
    let transport = MockTransport::new();
    transport.set_fallback(MockResponse::Empty);
    let session = new_session(&options, transport);

    assert!(matches!(
        session.geocode("Paris").await,
        Err(GeocodeError::EmptyResponse)
    ));
}

#[tokio::test]
async fn malformed_body_yields_no_result() {
    let dir = tempdir().unwrap();
    let options = options(&dir).with("DELAY", "0");
    let session = new_session(&options, MockTransport::always("<searchresults><place>"));

    assert!(matches!(
        session.geocode("Paris").await,
        Err(GeocodeError::Decode(_))
    ));
}

#[tokio::test]
async fn invalid_requests_do_not_fetch() {
    let dir = tempdir().unwrap();
    let transport = MockTransport::always(PARIS);
    let session = new_session(&options(&dir), transport.clone());

    assert!(matches!(
        session.geocode_request(&GeocodeRequest::default()).await,
        Err(GeocodeError::InvalidRequest(_))
    ));

    let structured = GeocodeRequest::structured(
        [("city".to_string(), "Paris".to_string())].into_iter().collect(),
    );
    assert!(matches!(
        session.geocode_request(&structured).await,
        Err(GeocodeError::Unsupported(_))
    ));

    assert_eq!(transport.fetch_count(), 0);
}

#[tokio::test]
async fn unusable_cache_does_not_fail_the_call() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.csv");
    std::fs::write(&path, "id,name\n1,x\n").unwrap();
    let options = SessionOptions::new()
        .with("CACHE_FILE", path.display().to_string())
        .with("DELAY", "0");
    let transport = MockTransport::always(PARIS);
    let session = new_session(&options, transport.clone());

    assert_eq!(session.geocode("Paris").await.unwrap().len(), 1);
    assert_eq!(session.geocode("Paris").await.unwrap().len(), 1);
    assert_eq!(transport.fetch_count(), 2);
}

#[test]
fn missing_template_fails_session_creation() {
    let options = SessionOptions::new().with("SERVICE", "ACME");
    let err = SessionConfig::resolve(&options, &MapSettings::new()).unwrap_err();
    assert!(matches!(
        GeocodeError::from(err),
        GeocodeError::Config(crate::config::ConfigError::MissingTemplate(_))
    ));
}
