use chrono::{DateTime, NaiveDate, Utc};

use folio_core::analytics::{
    bump, DailyStatsDocument, Distributions, ExportBundle, ExportInfo, SummaryResult,
    VisitorSummary, VisitorSummaryItem, VisitorsDocument, RETENTION_DAYS, SUMMARY_WINDOW_DAYS,
};

/// Most recently active visitors first, truncated to `limit`.
pub fn visitor_summary(doc: &VisitorsDocument, limit: usize) -> VisitorSummary {
    let mut records: Vec<_> = doc.visitors.iter().collect();
    records.sort_by_key(|r| std::cmp::Reverse(r.last_active()));

    VisitorSummary {
        total_visitors: doc.visitors.len(),
        last_updated: doc.last_updated,
        recent_visitors: records
            .into_iter()
            .take(limit)
            .map(VisitorSummaryItem::from)
            .collect(),
    }
}

pub fn summary(
    visitors: &VisitorsDocument,
    daily: &DailyStatsDocument,
    today: NaiveDate,
) -> SummaryResult {
    let total_visitors = visitors.visitors.len();
    let total_visits: u64 = visitors.visitors.iter().map(|v| v.visit_count).sum();

    let mut distributions = Distributions::default();
    for v in &visitors.visitors {
        bump(&mut distributions.browsers, &v.browser);
        bump(&mut distributions.operating_systems, &v.os);
        bump(&mut distributions.devices, &v.device);
        bump(&mut distributions.countries, &v.location);
    }

    SummaryResult {
        total_visitors,
        total_visits,
        average_visits_per_visitor: average(total_visits, total_visitors),
        distributions,
        last_7_days: daily.window(today, SUMMARY_WINDOW_DAYS),
    }
}

/// Mean rounded to two decimals; zero visitors gives `0.0`.
fn average(total: u64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let raw = total as f64 / count as f64;
    (raw * 100.0).round() / 100.0
}

pub fn export(
    visitors: VisitorsDocument,
    daily: DailyStatsDocument,
    now: DateTime<Utc>,
) -> ExportBundle {
    let total_visitors = visitors.visitors.len();
    ExportBundle {
        visitors,
        daily_stats: daily,
        export_info: ExportInfo {
            exported_at: now,
            retention_days: RETENTION_DAYS,
            total_visitors,
        },
    }
}
