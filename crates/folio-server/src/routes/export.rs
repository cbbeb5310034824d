use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::Response,
};
use chrono::Utc;

use crate::{error::AppError, state::AppState};

/// `GET /api/analytics/export`: download both analytics documents.
///
/// Response: `Content-Type: application/json` with `Content-Disposition:
/// attachment`. Body: `{ visitors, dailyStats, exportInfo }`.
#[tracing::instrument(skip(state))]
pub async fn export_analytics(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let now = Utc::now();
    let bundle = state.store.export(now).await.map_err(AppError::Internal)?;

    let body = serde_json::to_vec_pretty(&bundle)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("export serialization failed: {e}")))?;
    let filename = format!("analytics-export-{}.json", now.format("%Y-%m-%d"));

    tracing::info!(
        total_visitors = bundle.export_info.total_visitors,
        bytes = body.len(),
        "Analytics export generated"
    );

    build_json_attachment(&filename, body)
}

fn build_json_attachment(filename: &str, body: Vec<u8>) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(axum::body::Body::from(body))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("response build failed: {e}")))
}
