#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;

use folio_core::config::{Config, SiteProfile};
use folio_server::app::build_app;
use folio_server::state::AppState;
use folio_store::JsonFileStore;

pub const CHROME_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";
pub const FIREFOX_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

/// Build a test Config with sensible defaults for integration tests.
pub fn test_config(data_dir: &str) -> Config {
    Config {
        port: 0,
        data_dir: data_dir.to_string(),
        analytics_enabled: true,
        analytics_token: None,
        geoip_path: "/nonexistent/GeoLite2-Country.mmdb".to_string(),
        gemini_api_key: None,
        gemini_url: "http://127.0.0.1:9/unused".to_string(),
        cors_origins: vec![],
        site: SiteProfile {
            base_url: "https://resume.example".to_string(),
            owner: "Ada Lovelace".to_string(),
            headline: "Analytical Engineer".to_string(),
        },
    }
}

pub struct TestApp {
    /// Keeps the analytics directory alive for the test's duration.
    pub dir: tempfile::TempDir,
    pub store: Arc<JsonFileStore>,
    pub state: Arc<AppState>,
    pub app: axum::Router,
}

/// Fresh store in a temp dir, default state, full router.
pub fn setup() -> TestApp {
    setup_with(|cfg| cfg, |state| state)
}

pub fn setup_with(
    tweak_config: impl FnOnce(Config) -> Config,
    tweak_state: impl FnOnce(AppState) -> AppState,
) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_dir = dir.path().to_string_lossy().to_string();
    let store = Arc::new(JsonFileStore::open(&data_dir).expect("open store"));
    let config = tweak_config(test_config(&data_dir));
    let state = Arc::new(tweak_state(AppState::new(store.clone(), config)));
    let app = build_app(Arc::clone(&state));
    TestApp {
        dir,
        store,
        state,
        app,
    }
}

pub fn page_request(path: &str, ip: &str, user_agent: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header("x-forwarded-for", ip)
        .header("user-agent", user_agent)
        .body(Body::empty())
        .expect("build request")
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("build request")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

pub async fn text_body(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8")
}
