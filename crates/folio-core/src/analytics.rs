//! Visitor analytics data model and the storage abstraction.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::user_agent::UaClass;
use crate::visitor::extract_referrer_domain;

/// Records and daily buckets older than this are pruned at startup.
pub const RETENTION_DAYS: i64 = 90;
/// Length of the visitor list returned by the visitor summary.
pub const RECENT_VISITORS_LIMIT: usize = 50;
/// Trailing window served by the daily stats endpoint (today inclusive).
pub const DAILY_WINDOW_DAYS: i64 = 30;
/// Trailing window embedded in the summary (today inclusive).
pub const SUMMARY_WINDOW_DAYS: i64 = 7;
/// Referrer bucket for visits without a usable `Referer` header.
pub const DIRECT_REFERRER: &str = "Direct";

pub fn retention_window() -> Duration {
    Duration::days(RETENTION_DAYS)
}

/// Category label → count.
pub type Counter = BTreeMap<String, u64>;

/// Request details captured with each visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMeta {
    pub method: String,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    /// Only the forwarded-IP variants, host, referer and accept-* headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// One inbound page request, fully enriched and ready to persist.
#[derive(Debug, Clone)]
pub struct VisitObservation {
    pub visitor_id: String,
    pub ip: String,
    pub user_agent: String,
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub referrer: Option<String>,
    pub ua: UaClass,
    pub location: String,
    pub request: RequestMeta,
}

impl VisitObservation {
    /// Label used for the daily `referrers` table: the referrer host, or `Direct`.
    pub fn referrer_bucket(&self) -> String {
        self.referrer
            .as_deref()
            .and_then(extract_referrer_domain)
            .unwrap_or_else(|| DIRECT_REFERRER.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    pub id: String,
    pub ip: String,
    pub user_agent: String,
    pub first_seen: DateTime<Utc>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    pub visit_count: u64,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub location: String,
    pub last_path: String,
    #[serde(default)]
    pub last_referrer: Option<String>,
    #[serde(default)]
    pub last_request: RequestMeta,
}

impl VisitorRecord {
    /// Record for a fingerprint seen for the first time.
    pub fn first_visit(visit: &VisitObservation) -> Self {
        Self {
            id: visit.visitor_id.clone(),
            ip: visit.ip.clone(),
            user_agent: visit.user_agent.clone(),
            first_seen: visit.timestamp,
            last_seen: Some(visit.timestamp),
            visit_count: 1,
            browser: visit.ua.browser.clone(),
            os: visit.ua.os.clone(),
            device: visit.ua.device.clone(),
            location: visit.location.clone(),
            last_path: visit.path.clone(),
            last_referrer: visit.referrer.clone(),
            last_request: visit.request.clone(),
        }
    }

    /// Fold a repeat visit into the record.
    pub fn apply_visit(&mut self, visit: &VisitObservation) {
        self.last_seen = Some(visit.timestamp);
        self.visit_count += 1;
        self.ip = visit.ip.clone();
        self.user_agent = visit.user_agent.clone();
        self.browser = visit.ua.browser.clone();
        self.os = visit.ua.os.clone();
        self.device = visit.ua.device.clone();
        self.location = visit.location.clone();
        self.last_path = visit.path.clone();
        self.last_referrer = visit.referrer.clone();
        self.last_request = visit.request.clone();
    }

    /// Most recent activity: last-seen, falling back to first-seen.
    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_seen.unwrap_or(self.first_seen)
    }
}

/// Contents of `visitors.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorsDocument {
    pub visitors: Vec<VisitorRecord>,
    pub last_updated: DateTime<Utc>,
}

impl VisitorsDocument {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            visitors: Vec::new(),
            last_updated: now,
        }
    }
}

/// Aggregate counters for one UTC calendar date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyStat {
    pub total_visits: u64,
    pub browsers: Counter,
    pub operating_systems: Counter,
    pub devices: Counter,
    pub countries: Counter,
    pub paths: Counter,
    pub referrers: Counter,
}

impl DailyStat {
    pub fn record(&mut self, visit: &VisitObservation) {
        self.total_visits += 1;
        bump(&mut self.browsers, &visit.ua.browser);
        bump(&mut self.operating_systems, &visit.ua.os);
        bump(&mut self.devices, &visit.ua.device);
        bump(&mut self.countries, &visit.location);
        bump(&mut self.paths, &visit.path);
        bump(&mut self.referrers, &visit.referrer_bucket());
    }
}

pub fn bump(counter: &mut Counter, key: &str) {
    *counter.entry(key.to_string()).or_insert(0) += 1;
}

/// Contents of `daily-stats.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatsDocument {
    pub daily_stats: BTreeMap<NaiveDate, DailyStat>,
    pub last_updated: DateTime<Utc>,
}

impl DailyStatsDocument {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            daily_stats: BTreeMap::new(),
            last_updated: now,
        }
    }

    /// Buckets for `days` dates ending at `today` inclusive. Missing dates stay missing.
    pub fn window(&self, today: NaiveDate, days: i64) -> BTreeMap<NaiveDate, DailyStat> {
        let start = today - Duration::days(days.max(1) - 1);
        self.daily_stats
            .range(start..=today)
            .map(|(date, stat)| (*date, stat.clone()))
            .collect()
    }
}

/// A visitor reduced to non-identifying fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorSummaryItem {
    pub id: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: Option<DateTime<Utc>>,
    pub visit_count: u64,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub location: String,
    pub last_path: String,
}

impl From<&VisitorRecord> for VisitorSummaryItem {
    fn from(record: &VisitorRecord) -> Self {
        Self {
            id: record.id.clone(),
            first_seen: record.first_seen,
            last_seen: record.last_seen,
            visit_count: record.visit_count,
            browser: record.browser.clone(),
            os: record.os.clone(),
            device: record.device.clone(),
            location: record.location.clone(),
            last_path: record.last_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorSummary {
    pub total_visitors: usize,
    pub last_updated: DateTime<Utc>,
    pub recent_visitors: Vec<VisitorSummaryItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distributions {
    pub browsers: Counter,
    pub operating_systems: Counter,
    pub devices: Counter,
    pub countries: Counter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub total_visitors: usize,
    pub total_visits: u64,
    pub average_visits_per_visitor: f64,
    pub distributions: Distributions,
    pub last_7_days: BTreeMap<NaiveDate, DailyStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportInfo {
    pub exported_at: DateTime<Utc>,
    pub retention_days: i64,
    pub total_visitors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub visitors: VisitorsDocument,
    pub daily_stats: DailyStatsDocument,
    pub export_info: ExportInfo,
}

/// What a pruning pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub visitors_removed: usize,
    pub days_removed: usize,
}

/// Storage for visitor records and daily stats.
///
/// The JSON-file implementation lives in `folio-store`; route handlers only
/// see this trait.
#[async_trait::async_trait]
pub trait AnalyticsStore: Send + Sync + 'static {
    /// Upsert the visitor record and bump today's bucket.
    async fn record_visit(&self, visit: &VisitObservation) -> anyhow::Result<()>;

    /// Drop visitors and daily buckets older than `now - retention`.
    async fn prune_older_than(
        &self,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> anyhow::Result<PruneReport>;

    async fn visitor_summary(&self, limit: usize) -> anyhow::Result<VisitorSummary>;

    async fn daily_window(
        &self,
        today: NaiveDate,
        days: i64,
    ) -> anyhow::Result<BTreeMap<NaiveDate, DailyStat>>;

    async fn summary(&self, today: NaiveDate) -> anyhow::Result<SummaryResult>;

    async fn export(&self, now: DateTime<Utc>) -> anyhow::Result<ExportBundle>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::user_agent::classify_user_agent;

    fn visit(referrer: Option<&str>, ua: &str) -> VisitObservation {
        VisitObservation {
            visitor_id: "abc".to_string(),
            ip: "1.2.3.4".to_string(),
            user_agent: ua.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            path: "/skills".to_string(),
            referrer: referrer.map(str::to_string),
            ua: classify_user_agent(ua),
            location: "Unknown".to_string(),
            request: RequestMeta::default(),
        }
    }

    #[test]
    fn missing_or_empty_referrer_is_direct() {
        assert_eq!(visit(None, "x").referrer_bucket(), "Direct");
        assert_eq!(visit(Some(""), "x").referrer_bucket(), "Direct");
        assert_eq!(
            visit(Some("https://www.google.com/search"), "x").referrer_bucket(),
            "www.google.com"
        );
    }

    #[test]
    fn daily_stat_counts_every_dimension() {
        let mut stat = DailyStat::default();
        stat.record(&visit(None, "Chrome"));
        stat.record(&visit(Some("https://t.co/x"), "Firefox"));
        assert_eq!(stat.total_visits, 2);
        assert_eq!(stat.browsers.get("Chrome"), Some(&1));
        assert_eq!(stat.browsers.get("Firefox"), Some(&1));
        assert_eq!(stat.paths.get("/skills"), Some(&2));
        assert_eq!(stat.referrers.get("Direct"), Some(&1));
        assert_eq!(stat.referrers.get("t.co"), Some(&1));
        assert_eq!(stat.countries.get("Unknown"), Some(&2));
    }

    #[test]
    fn last_active_falls_back_to_first_seen() {
        let mut record = VisitorRecord::first_visit(&visit(None, "Chrome"));
        record.last_seen = None;
        assert_eq!(record.last_active(), record.first_seen);
    }

    #[test]
    fn window_is_inclusive_and_sparse() {
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let mut doc = DailyStatsDocument::empty(now);
        for day in [1, 24, 25, 31] {
            let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            doc.daily_stats.insert(date, DailyStat::default());
        }
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let window = doc.window(today, 7);
        let keys: Vec<String> = window.keys().map(|d| d.to_string()).collect();
        assert_eq!(keys, vec!["2024-01-25", "2024-01-31"]);
    }

    #[test]
    fn daily_document_round_trips_with_date_keys() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut doc = DailyStatsDocument::empty(now);
        doc.daily_stats.insert(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            DailyStat::default(),
        );
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["dailyStats"]["2024-01-01"]["totalVisits"].is_u64());
        assert!(json["lastUpdated"].is_string());
    }
}
