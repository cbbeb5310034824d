mod common;

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use folio_core::rate_limit::RateLimiter;
use folio_server::chat::{ChatClient, ChatError};

use common::{json_body, setup, setup_with};

/// Records every prompt and answers with a canned body or error.
struct MockChat {
    prompts: Arc<StdMutex<Vec<String>>>,
    fail_with: Option<fn() -> ChatError>,
}

#[async_trait]
impl ChatClient for MockChat {
    async fn generate(&self, prompt: &str) -> Result<Value, ChatError> {
        self.prompts
            .lock()
            .expect("lock prompts")
            .push(prompt.to_string());
        match self.fail_with {
            Some(make_err) => Err(make_err()),
            None => Ok(json!({
                "candidates": [{ "content": { "parts": [{ "text": format!("echo: {prompt}") }] } }]
            })),
        }
    }
}

fn mock(fail_with: Option<fn() -> ChatError>) -> (Arc<StdMutex<Vec<String>>>, Arc<MockChat>) {
    let prompts = Arc::new(StdMutex::new(Vec::new()));
    let chat = Arc::new(MockChat {
        prompts: Arc::clone(&prompts),
        fail_with,
    });
    (prompts, chat)
}

fn chat_request(ip: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat-assistant")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .expect("build request")
}

fn answer_text(json: &Value) -> String {
    json["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_chat_forwards_prompt_and_returns_upstream_body() {
    let (prompts, chat) = mock(None);
    let t = setup_with(|cfg| cfg, |state| state.with_chat_client(chat));

    let response = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.1", json!({ "prompt": "hello" })))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(answer_text(&json), "echo: hello");
    assert_eq!(*prompts.lock().expect("lock"), vec!["hello".to_string()]);
}

#[tokio::test]
async fn test_second_prompt_within_cooldown_is_rate_limited() {
    let (prompts, chat) = mock(None);
    let t = setup_with(|cfg| cfg, |state| state.with_chat_client(chat));

    let first = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.2", json!({ "prompt": "one" })))
        .await
        .expect("request");
    assert_eq!(first.status(), StatusCode::OK);

    let second = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.2", json!({ "prompt": "two" })))
        .await
        .expect("request");
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = json_body(second).await;
    assert_eq!(json["error"]["code"], "rate_limited");
    assert_eq!(
        json["error"]["message"],
        "Rate limit exceeded. Please wait before making another request."
    );

    // A different client is unaffected.
    let other = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.3", json!({ "prompt": "three" })))
        .await
        .expect("request");
    assert_eq!(other.status(), StatusCode::OK);

    assert_eq!(prompts.lock().expect("lock").len(), 2);
}

#[tokio::test]
async fn test_prompt_after_cooldown_is_accepted() {
    let (_prompts, chat) = mock(None);
    let t = setup_with(
        |cfg| cfg,
        |state| {
            state
                .with_chat_client(chat)
                .with_rate_limiter(RateLimiter::new(Duration::from_millis(50)))
        },
    );

    let first = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.4", json!({ "prompt": "one" })))
        .await
        .expect("request");
    assert_eq!(first.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(80)).await;

    let second = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.4", json!({ "prompt": "two" })))
        .await
        .expect("request");
    assert_eq!(second.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_or_non_string_prompt_is_bad_request() {
    let (prompts, chat) = mock(None);
    let t = setup_with(|cfg| cfg, |state| state.with_chat_client(chat));

    for (ip, body) in [
        ("198.51.100.10", json!({})),
        ("198.51.100.11", json!({ "prompt": 42 })),
        ("198.51.100.12", json!({ "prompt": "" })),
    ] {
        let response = t
            .app
            .clone()
            .oneshot(chat_request(ip, body))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["message"], "Invalid request format - prompt required");
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat-assistant")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "198.51.100.13")
        .body(Body::from("not json"))
        .expect("build request");
    let response = t.app.clone().oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(prompts.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn test_upstream_failure_returns_fallback_candidate() {
    let (_prompts, chat) = mock(Some(|| ChatError::Timeout));
    let t = setup_with(|cfg| cfg, |state| state.with_chat_client(chat));

    let response = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.20", json!({ "prompt": "hi" })))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(answer_text(&json).starts_with("Connection timeout to AI service"));

    let (_prompts, chat) = mock(Some(|| ChatError::Upstream(503)));
    let t = setup_with(|cfg| cfg, |state| state.with_chat_client(chat));
    let response = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.21", json!({ "prompt": "hi" })))
        .await
        .expect("request");
    let json = json_body(response).await;
    assert!(answer_text(&json).starts_with("AI service error"));
}

#[tokio::test]
async fn test_unconfigured_chat_returns_fallback_candidate() {
    let t = setup();
    let response = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.30", json!({ "prompt": "hi" })))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(answer_text(&json).starts_with("AI service temporarily unavailable"));
}

/// Collects formatted log lines for assertions.
#[derive(Clone, Default)]
struct LogBuffer(Arc<StdMutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("lock logs").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("lock logs")).to_string()
    }
}

fn error_level_subscriber(logs: &LogBuffer) -> impl tracing::Subscriber + Send + Sync {
    let writer = logs.clone();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::ERROR)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish()
}

#[tokio::test]
async fn test_unconfigured_chat_is_not_logged_as_error() {
    let logs = LogBuffer::default();
    let _guard = tracing::subscriber::set_default(error_level_subscriber(&logs));

    let t = setup();
    let response = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.31", json!({ "prompt": "hi" })))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!logs.contents().contains("ERROR"), "{}", logs.contents());

    // A real upstream failure is still an error.
    let (_prompts, chat) = mock(Some(|| ChatError::Upstream(502)));
    let t = setup_with(|cfg| cfg, |state| state.with_chat_client(chat));
    let response = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.32", json!({ "prompt": "hi" })))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(logs.contents().contains("Chat upstream failed"), "{}", logs.contents());
}

#[tokio::test]
async fn test_chat_requests_are_not_recorded_as_visits() {
    use folio_core::analytics::AnalyticsStore;

    let (_prompts, chat) = mock(None);
    let t = setup_with(|cfg| cfg, |state| state.with_chat_client(chat));
    let _ = t
        .app
        .clone()
        .oneshot(chat_request("198.51.100.40", json!({ "prompt": "hi" })))
        .await
        .expect("request");

    let summary = t.store.visitor_summary(50).await.expect("summary");
    assert_eq!(summary.total_visitors, 0);
}
