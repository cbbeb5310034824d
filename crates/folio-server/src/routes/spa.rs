use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderMap, Method, Uri},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    client::ClientAddr,
    error::AppError,
    seo::render_shell,
    state::AppState,
    visit::{build_observation, is_asset_path, VisitRequest},
};

/// Fallback for every path without an explicit route.
///
/// - `/api/*` → 404 JSON.
/// - Methods other than GET/HEAD and asset paths → 404 JSON, not recorded.
/// - HEAD → the SPA shell headers, not recorded.
/// - GET → the SPA shell with route SEO tags, after recording the visit.
#[tracing::instrument(skip_all, fields(path = %uri.path()))]
pub async fn spa_fallback(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    client: ClientAddr,
    query: Result<Query<BTreeMap<String, String>>, QueryRejection>,
) -> Response {
    let path = uri.path();

    if path == "/api" || path.starts_with("/api/") {
        return AppError::NotFound("API endpoint not found".to_string()).into_response();
    }
    if !matches!(method, Method::GET | Method::HEAD) || is_asset_path(path) {
        return AppError::NotFound("Not found".to_string()).into_response();
    }
    if method == Method::HEAD {
        return Html(render_shell(&state.config.site, path)).into_response();
    }

    let query = query.map(|Query(q)| q).unwrap_or_default();
    let visit = build_observation(
        VisitRequest {
            client_ip: client.as_str(),
            method: &method,
            path,
            query,
            headers: &headers,
        },
        state.geo.as_ref(),
        Utc::now(),
    );
    state.record_visit(&visit).await;

    Html(render_shell(&state.config.site, path)).into_response()
}
