use std::collections::BTreeMap;

use axum::http::{header, HeaderMap, Method};
use chrono::{DateTime, Utc};

use folio_core::{
    analytics::{RequestMeta, VisitObservation},
    geo::GeoLocator,
    user_agent::classify_user_agent,
    visitor::derive_visitor_id,
};

/// Request headers copied into the visitor record.
pub const CAPTURED_HEADERS: &[&str] = &[
    "x-forwarded-for",
    "x-real-ip",
    "cf-connecting-ip",
    "host",
    "referer",
    "accept-language",
    "accept-encoding",
];

/// True for paths served as static files rather than SPA routes.
///
/// Covers the bundle directory and anything whose last segment has an
/// extension (`/favicon.ico`, `/robots.txt`, `/IMG_1.webp`).
pub fn is_asset_path(path: &str) -> bool {
    if path.starts_with("/assets/") {
        return true;
    }
    let last = path.rsplit('/').next().unwrap_or_default();
    matches!(last.rsplit_once('.'), Some((stem, ext)) if !stem.is_empty() && !ext.is_empty())
}

pub struct VisitRequest<'a> {
    pub client_ip: &'a str,
    pub method: &'a Method,
    pub path: &'a str,
    pub query: BTreeMap<String, String>,
    pub headers: &'a HeaderMap,
}

/// Enrich one page request into a [`VisitObservation`].
pub fn build_observation(
    request: VisitRequest<'_>,
    geo: &dyn GeoLocator,
    now: DateTime<Utc>,
) -> VisitObservation {
    let user_agent = request
        .headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let referrer = request
        .headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let headers = CAPTURED_HEADERS
        .iter()
        .filter_map(|name| {
            request
                .headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect();

    VisitObservation {
        visitor_id: derive_visitor_id(request.client_ip, &user_agent),
        ip: request.client_ip.to_string(),
        ua: classify_user_agent(&user_agent),
        location: geo.locate(request.client_ip),
        user_agent,
        timestamp: now,
        path: request.path.to_string(),
        referrer,
        request: RequestMeta {
            method: request.method.to_string(),
            query: request.query,
            headers,
        },
    }
}
