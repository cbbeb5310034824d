use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth, routes, state::AppState};

/// Largest accepted request body (chat prompts).
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `CorsLayer`: any origin unless `FOLIO_CORS_ORIGINS` narrows it.
/// 2. `TraceLayer`: structured request/response logging via `tracing`.
/// 3. `CompressionLayer`: gzip for the HTML shell and JSON payloads.
///
/// The analytics routes additionally sit behind the bearer-token guard.
/// Unmatched paths go to the SPA fallback, which records the visit.
pub fn build_app(state: Arc<AppState>) -> Router {
    let analytics = Router::new()
        .route("/api/analytics/visitors", get(routes::analytics::visitors))
        .route("/api/analytics/daily", get(routes::analytics::daily))
        .route("/api/analytics/summary", get(routes::analytics::summary))
        .route("/api/analytics/export", get(routes::export::export_analytics))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_analytics_token,
        ));

    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/chat-assistant", post(routes::chat::chat_assistant))
        .merge(analytics)
        .fallback(routes::spa::spa_fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
