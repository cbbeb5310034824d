use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;

use folio_core::analytics::{DAILY_WINDOW_DAYS, RECENT_VISITORS_LIMIT};

use crate::{error::AppError, state::AppState};

/// `GET /api/analytics/visitors`: visitor count and the most recently active
/// visitors, stripped of IP and User-Agent.
#[tracing::instrument(skip(state))]
pub async fn visitors(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let summary = state
        .store
        .visitor_summary(RECENT_VISITORS_LIMIT)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(summary))
}

/// `GET /api/analytics/daily`: daily buckets for the trailing 30 days.
#[tracing::instrument(skip(state))]
pub async fn daily(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let window = state
        .store
        .daily_window(today, DAILY_WINDOW_DAYS)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(window))
}

/// `GET /api/analytics/summary`: lifetime totals, distributions and the last 7 days.
#[tracing::instrument(skip(state))]
pub async fn summary(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let summary = state
        .store
        .summary(today)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(summary))
}
