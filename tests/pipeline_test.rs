//! Pipeline behavior against store and upstream doubles.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use market_cache_proxy::cache::CacheKey;
use market_cache_proxy::pipeline::{CacheStatus, ProxyRequest, QueryParams};
use market_cache_proxy::upstream::UpstreamError;

mod common;
use common::{FakeStore, FakeUpstream};

const HISTORICAL: &str = "/openexchangerates.org/api/historical/2024-01-02.json";
const EOD: &str = "/api.twelvedata.com/eod";
const LATEST: &str = "/openexchangerates.org/api/latest.json";

fn request(path: &str, params: &[(&str, &str)]) -> ProxyRequest {
    ProxyRequest::new(path, params.iter().copied().collect::<QueryParams>())
}

fn error_message(body: &str) -> String {
    let parsed: serde_json::Value = serde_json::from_str(body).expect("error body is JSON");
    parsed["error"].as_str().expect("error field").to_string()
}

#[tokio::test]
async fn test_disallowed_domain_touches_nothing() {
    let store = Arc::new(FakeStore::default());
    let upstream = Arc::new(FakeUpstream::ok(200, "{}"));
    let pipeline = common::pipeline(&store, &upstream);

    for path in ["/example.com/api/historical", "/", "", "/evil.com/openexchangerates.org"] {
        let res = pipeline.handle(request(path, &[("a", "b")])).await;
        assert_eq!(res.status_code, 403, "path {:?}", path);
        assert_eq!(error_message(&res.body), "Domain not allowed");
        assert_eq!(res.headers["Content-Type"], "application/json");
        assert_eq!(res.cache_status(), None);
    }

    assert_eq!(store.gets(), 0);
    assert_eq!(store.puts(), 0);
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_historical_miss_then_hit() {
    let store = Arc::new(FakeStore::default());
    let body = r#"{"base":"USD","rates":{"EUR":0.912,"GBP":0.787}}"#;
    let upstream = Arc::new(FakeUpstream::ok(200, body));
    let pipeline = common::pipeline(&store, &upstream);
    let req = request(HISTORICAL, &[("app_id", "k"), ("base", "USD")]);

    let first = pipeline.handle(req.clone()).await;
    assert_eq!(first.status_code, 200);
    assert_eq!(first.cache_status(), Some(CacheStatus::Miss));
    assert_eq!(first.body, body);

    let second = pipeline.handle(req.clone()).await;
    assert_eq!(second.status_code, 200);
    assert_eq!(second.cache_status(), Some(CacheStatus::Hit));
    assert_eq!(second.body, body);
    assert_eq!(second.headers["Content-Type"], "application/json");

    assert_eq!(upstream.calls(), 1);
    assert_eq!(store.puts(), 1);
    assert_eq!(store.body(&req.cache_key()).as_deref(), Some(body));
}

#[tokio::test]
async fn test_upstream_url_and_key_derivation() {
    let store = Arc::new(FakeStore::default());
    let upstream = Arc::new(FakeUpstream::ok(200, "{}"));
    let pipeline = common::pipeline(&store, &upstream);

    pipeline
        .handle(request(HISTORICAL, &[("app_id", "k 1"), ("base", "USD")]))
        .await;

    assert_eq!(
        upstream.urls(),
        vec!["https://openexchangerates.org/api/historical/2024-01-02.json?app_id=k+1&base=USD"]
    );
    let expected_key = CacheKey::derive(
        "/openexchangerates.org/api/historical/2024-01-02.json?app_id=k+1&base=USD",
    );
    assert!(store.body(&expected_key).is_some());
}

#[tokio::test]
async fn test_parameter_order_yields_distinct_entries() {
    let store = Arc::new(FakeStore::default());
    let upstream = Arc::new(FakeUpstream::ok(200, "{}"));
    let pipeline = common::pipeline(&store, &upstream);

    pipeline.handle(request(EOD, &[("symbol", "AAPL"), ("date", "2024-01-02")])).await;
    pipeline.handle(request(EOD, &[("date", "2024-01-02"), ("symbol", "AAPL")])).await;
    pipeline.handle(request(EOD, &[("symbol", "AAPL"), ("date", "2024-01-02")])).await;

    assert_eq!(store.len(), 2);
    assert_eq!(upstream.calls(), 2);
}

#[tokio::test]
async fn test_hit_reports_200_whatever_was_stored() {
    let store = Arc::new(FakeStore::default());
    let upstream = Arc::new(FakeUpstream::ok(500, "unused"));
    let pipeline = common::pipeline(&store, &upstream);
    let req = request(EOD, &[("symbol", "AAPL")]);

    store.seed(req.cache_key(), r#"{"code": 404, "message": "not found"}"#);

    let res = pipeline.handle(req).await;
    assert_eq!(res.status_code, 200);
    assert_eq!(res.cache_status(), Some(CacheStatus::Hit));
    assert_eq!(res.body, r#"{"code": 404, "message": "not found"}"#);
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_end_of_day_admission() {
    let cases = [
        (r#"{"code": 429, "message": "You have run out of API credits"}"#, false),
        (r#"{"code": 500, "message": "internal"}"#, false),
        (r#"{"code": 404, "message": "symbol not found"}"#, true),
        ("not json", true),
        (r#"{"symbol": "AAPL", "close": "189.25"}"#, true),
    ];

    for (body, stored) in cases {
        let store = Arc::new(FakeStore::default());
        let upstream = Arc::new(FakeUpstream::ok(200, body));
        let pipeline = common::pipeline(&store, &upstream);
        let req = request(EOD, &[("symbol", "AAPL"), ("date", "2024-01-02")]);

        let res = pipeline.handle(req.clone()).await;
        assert_eq!(res.status_code, 200);
        assert_eq!(res.body, body);
        assert_eq!(res.cache_status(), Some(CacheStatus::Miss));
        assert_eq!(store.body(&req.cache_key()).is_some(), stored, "body {:?}", body);
    }
}

#[tokio::test]
async fn test_rate_limited_body_is_refetched() {
    let store = Arc::new(FakeStore::default());
    let upstream = Arc::new(FakeUpstream::ok(200, r#"{"code": 429}"#));
    let pipeline = common::pipeline(&store, &upstream);
    let req = request(EOD, &[("symbol", "MSFT")]);

    pipeline.handle(req.clone()).await;
    upstream.respond(200, r#"{"symbol": "MSFT", "close": "402.10"}"#);
    let res = pipeline.handle(req.clone()).await;
    assert_eq!(res.cache_status(), Some(CacheStatus::Miss));

    let res = pipeline.handle(req).await;
    assert_eq!(res.cache_status(), Some(CacheStatus::Hit));
    assert_eq!(res.body, r#"{"symbol": "MSFT", "close": "402.10"}"#);
    assert_eq!(upstream.calls(), 2);
}

#[tokio::test]
async fn test_non_200_success_is_not_stored() {
    let store = Arc::new(FakeStore::default());
    let upstream = Arc::new(FakeUpstream::ok(203, "{}"));
    let pipeline = common::pipeline(&store, &upstream);

    let res = pipeline.handle(request(HISTORICAL, &[])).await;
    assert_eq!(res.status_code, 203);
    assert_eq!(res.cache_status(), Some(CacheStatus::Miss));
    assert_eq!(store.puts(), 0);
}

#[tokio::test]
async fn test_non_cacheable_path_skips_store() {
    let store = Arc::new(FakeStore::default());
    let upstream = Arc::new(FakeUpstream::ok(200, r#"{"rates":{}}"#));
    let pipeline = common::pipeline(&store, &upstream);

    for _ in 0..2 {
        let res = pipeline.handle(request(LATEST, &[("app_id", "k")])).await;
        assert_eq!(res.status_code, 200);
        assert_eq!(res.cache_status(), Some(CacheStatus::Miss));
    }

    assert_eq!(store.gets(), 0);
    assert_eq!(store.puts(), 0);
    assert_eq!(upstream.calls(), 2);
}

#[tokio::test]
async fn test_transport_failure_returns_500_without_write() {
    let store = Arc::new(FakeStore::default());
    let upstream = Arc::new(FakeUpstream::err(UpstreamError::Transport(
        "operation timed out".into(),
    )));
    let pipeline = common::pipeline(&store, &upstream);

    let res = pipeline.handle(request(HISTORICAL, &[])).await;
    assert_eq!(res.status_code, 500);
    assert_eq!(error_message(&res.body), "operation timed out");
    assert_eq!(res.headers["Content-Type"], "application/json");
    assert_eq!(res.cache_status(), None);
    assert_eq!(store.gets(), 1);
    assert_eq!(store.puts(), 0);
}

#[tokio::test]
async fn test_upstream_status_error_is_echoed() {
    let store = Arc::new(FakeStore::default());
    let upstream = Arc::new(FakeUpstream::err(UpstreamError::Status {
        status: 401,
        message: "HTTP status client error (401 Unauthorized)".into(),
    }));
    let pipeline = common::pipeline(&store, &upstream);

    let res = pipeline.handle(request(EOD, &[("symbol", "AAPL")])).await;
    assert_eq!(res.status_code, 401);
    assert_eq!(error_message(&res.body), "HTTP status client error (401 Unauthorized)");
    assert_eq!(store.puts(), 0);
}

#[tokio::test]
async fn test_store_write_failure_is_invisible() {
    let store = Arc::new(FakeStore::default());
    store.fail_put.store(true, Ordering::SeqCst);
    let upstream = Arc::new(FakeUpstream::ok(200, r#"{"rates":{"JPY":141.2}}"#));
    let pipeline = common::pipeline(&store, &upstream);

    let res = pipeline.handle(request(HISTORICAL, &[])).await;
    assert_eq!(res.status_code, 200);
    assert_eq!(res.body, r#"{"rates":{"JPY":141.2}}"#);
    assert_eq!(res.cache_status(), Some(CacheStatus::Miss));
    assert_eq!(store.puts(), 1);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_store_read_failure_counts_as_miss() {
    let store = Arc::new(FakeStore::default());
    let req = request(HISTORICAL, &[]);
    store.seed(req.cache_key(), "stale");
    store.fail_get.store(true, Ordering::SeqCst);
    let upstream = Arc::new(FakeUpstream::ok(200, "fresh"));
    let pipeline = common::pipeline(&store, &upstream);

    let res = pipeline.handle(req.clone()).await;
    assert_eq!(res.status_code, 200);
    assert_eq!(res.body, "fresh");
    assert_eq!(res.cache_status(), Some(CacheStatus::Miss));
    assert_eq!(upstream.calls(), 1);
    assert_eq!(store.body(&req.cache_key()).as_deref(), Some("fresh"));
}
