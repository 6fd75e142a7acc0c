//! HTTP-level tests for the threat-intel routes.
//!
//! Sources are in-process mocks; nothing here touches the network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use recon_api::{build_router, AppState, ServerConfig};
use recon_core::{Source, SourceCategory, SourceError, SourceRegistry, UrlRecord};
use serde_json::{json, Value};
use tower::ServiceExt;

// ── Mock sources ───────────────────────────────────────────────

struct MockSource {
    name: &'static str,
    urls: Vec<&'static str>,
    error: Option<&'static str>,
    configured: bool,
    panic_on_schedule: bool,
    calls: AtomicUsize,
}

impl MockSource {
    fn new(name: &'static str, urls: Vec<&'static str>) -> Self {
        Self {
            name,
            urls,
            error: None,
            configured: true,
            panic_on_schedule: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(name: &'static str, error: &'static str) -> Self {
        Self {
            error: Some(error),
            ..Self::new(name, Vec::new())
        }
    }

    fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Blows up when the executor reads its deadline, outside any adapter task.
    fn panicking_scheduler(mut self) -> Self {
        self.panic_on_schedule = true;
        self
    }
}

#[async_trait]
impl Source for MockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "mock source"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::PassiveDns
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn timeout(&self) -> Duration {
        if self.panic_on_schedule {
            panic!("scheduler failure");
        }
        Duration::from_secs(5)
    }

    async fn search(&self, _keyword: &str) -> Result<Vec<UrlRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.error {
            return Err(SourceError::Other(error.to_string()));
        }
        Ok(self
            .urls
            .iter()
            .filter_map(|u| UrlRecord::new(*u, "", self.name))
            .collect())
    }
}

// ── Test app builder ───────────────────────────────────────────

fn build_test_app(sources: Vec<Arc<MockSource>>) -> axum::Router {
    let registry = SourceRegistry::from_sources(
        sources
            .into_iter()
            .map(|s| s as Arc<dyn Source>)
            .collect(),
    );
    build_router(Arc::new(AppState::new(registry)), &ServerConfig::default())
}

fn default_sources() -> Vec<Arc<MockSource>> {
    vec![
        Arc::new(MockSource::new(
            "crt.sh",
            vec!["https://www.acme.com", "https://api.acme.com"],
        )),
        Arc::new(MockSource::new(
            "hackertarget",
            vec!["https://api.acme.com", "https://mail.acme.com"],
        )),
        Arc::new(MockSource::failing("urlscan", "boom")),
        Arc::new(MockSource::new("shodan", vec!["https://never.acme.com"]).unconfigured()),
    ]
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(
        |_| json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }),
    );
    (status, body)
}

// ── Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let (status, body) = get(build_test_app(vec![]), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_missing_keyword_rejected_before_any_source() {
    let source = Arc::new(MockSource::new("crt.sh", vec!["https://a.io"]));

    for uri in [
        "/api/threat-intel/search",
        "/api/threat-intel/search?keyword=",
        "/api/threat-intel/search?keyword=%20%20",
        "/api/threat-intel/search?keyword=a&keyword=b",
        "/api/threat-intel/search?keyword=a&sources=crt.sh&sources=wayback",
    ] {
        let (status, body) = get(build_test_app(vec![Arc::clone(&source)]), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({ "error": "Missing keyword" }));
    }

    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_merges_and_reports_partial_failure() {
    let sources = default_sources();
    let shodan = Arc::clone(&sources[3]);

    let (status, body) = get(
        build_test_app(sources),
        "/api/threat-intel/search?keyword=acme.com",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[1]["url"], "https://api.acme.com");
    assert_eq!(results[1]["source"], "crt.sh");
    assert_eq!(body["errors"], json!(["urlscan: Other error: boom"]));

    // Unconfigured: never called and no error entry
    assert_eq!(shodan.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_errors_field_when_all_succeed() {
    let app = build_test_app(vec![Arc::new(MockSource::new("crt.sh", vec!["https://a.io"]))]);
    let (status, body) = get(app, "/api/threat-intel/search?keyword=a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "count": 1,
            "results": [{ "url": "https://a.io", "domain": "a.io", "source": "crt.sh" }]
        })
    );
}

#[tokio::test]
async fn test_all_sources_failing_is_still_ok() {
    let app = build_test_app(vec![
        Arc::new(MockSource::failing("crt.sh", "down")),
        Arc::new(MockSource::failing("wayback", "down")),
    ]);
    let (status, body) = get(app, "/api/threat-intel/search?keyword=acme").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["results"], json!([]));
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_urlsearch_alias() {
    let (status, body) = get(
        build_test_app(default_sources()),
        "/api/threat-intel/urlsearch?keyword=acme.com",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn test_source_selection() {
    let (status, body) = get(
        build_test_app(default_sources()),
        "/api/threat-intel/search?keyword=acme.com&sources=hackertarget",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert!(body.get("errors").is_none());

    let (status, body) = get(
        build_test_app(default_sources()),
        "/api/threat-intel/search?keyword=acme.com&sources=crt.sh,bing",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Unknown source: bing" }));
}

#[tokio::test]
async fn test_failure_outside_adapters_is_500() {
    let app = build_test_app(vec![
        Arc::new(MockSource::new("crt.sh", vec!["https://a.io"])),
        Arc::new(MockSource::new("broken", vec![]).panicking_scheduler()),
    ]);
    let (status, body) = get(app, "/api/threat-intel/search?keyword=acme").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to search URLs" }));
}

#[tokio::test]
async fn test_sources_listing() {
    let (status, body) = get(build_test_app(default_sources()), "/api/threat-intel/sources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 4);
    let shodan = &body["sources"][3];
    assert_eq!(shodan["name"], "shodan");
    assert_eq!(shodan["configured"], false);
    assert_eq!(shodan["category"], "passive_dns");
}

#[tokio::test]
async fn test_cors_allows_dashboard_origin() {
    let app = build_test_app(vec![]);
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );

    let resp = build_test_app(vec![])
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "https://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}
