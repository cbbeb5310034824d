use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use folio_core::{
    analytics::{retention_window, AnalyticsStore, VisitObservation},
    config::Config,
    geo::{GeoLocator, StaticGeoLocator},
    rate_limit::RateLimiter,
};

use crate::chat::ChatClient;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Built once in `main.rs` and wrapped in an `Arc`; nothing here is a global.
pub struct AppState {
    /// Visitor records and daily stats.
    pub store: Arc<dyn AnalyticsStore>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// Cooldown gate for `POST /api/chat-assistant`, keyed by client address.
    pub rate_limiter: RateLimiter,

    /// Upstream for chat prompts. `None` when no API key is configured; the
    /// chat route then answers with the fallback payload.
    pub chat: Option<Arc<dyn ChatClient>>,

    pub geo: Arc<dyn GeoLocator>,
}

impl AppState {
    /// State with the default rate limiter, no chat upstream and the static
    /// geo locator. Use the `with_*` builders to swap collaborators.
    pub fn new(store: Arc<dyn AnalyticsStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
            rate_limiter: RateLimiter::default(),
            chat: None,
            geo: Arc::new(StaticGeoLocator),
        }
    }

    pub fn with_chat_client(mut self, chat: Arc<dyn ChatClient>) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn with_geo_locator(mut self, geo: Arc<dyn GeoLocator>) -> Self {
        self.geo = geo;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Persist a page visit.
    ///
    /// Failures are logged and swallowed: analytics must never fail the page
    /// request that triggered them.
    pub async fn record_visit(&self, visit: &VisitObservation) {
        if !self.config.analytics_enabled {
            return;
        }
        if let Err(e) = self.store.record_visit(visit).await {
            warn!(
                visitor_id = %visit.visitor_id,
                path = %visit.path,
                error = %e,
                "Failed to record visit"
            );
        }
    }

    /// Startup retention pass. Best-effort: errors are logged, never returned.
    pub async fn prune_old_data(&self, now: DateTime<Utc>) {
        match self.store.prune_older_than(now, retention_window()).await {
            Ok(report) => info!(
                visitors_removed = report.visitors_removed,
                days_removed = report.days_removed,
                "Analytics retention pass complete"
            ),
            Err(e) => warn!(error = %e, "Analytics retention pass failed"),
        }
    }
}
