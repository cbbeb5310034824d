use axum::{response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

/// Name reported by the health probe.
pub const SERVER_NAME: &str = "Folio Resume Server";

/// `GET /api/health`: liveness check.
///
/// Always `200 OK`. The analytics store is not consulted and the request is
/// not recorded as a visit.
///
/// Response shape:
/// ```json
/// { "status": "healthy", "timestamp": "...", "server": "...", "version": "0.1.0" }
/// ```
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "server": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}
