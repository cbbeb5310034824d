use chrono::{DateTime, Duration, Utc};
use tracing::info;

use folio_core::analytics::{DailyStatsDocument, PruneReport, VisitorsDocument};

use crate::{backend::JsonFileStore, error::StoreError};

/// Remove visitors whose last activity is strictly before `cutoff`.
pub fn prune_visitors(doc: &mut VisitorsDocument, cutoff: DateTime<Utc>) -> usize {
    let before = doc.visitors.len();
    doc.visitors.retain(|v| v.last_active() >= cutoff);
    before - doc.visitors.len()
}

/// Remove daily buckets dated strictly before the cutoff's UTC date.
pub fn prune_daily(doc: &mut DailyStatsDocument, cutoff: DateTime<Utc>) -> usize {
    let cutoff_date = cutoff.date_naive();
    let before = doc.daily_stats.len();
    doc.daily_stats.retain(|date, _| *date >= cutoff_date);
    before - doc.daily_stats.len()
}

/// Both documents are rewritten unconditionally, even when nothing was removed.
pub(crate) async fn prune_inner(
    store: &JsonFileStore,
    now: DateTime<Utc>,
    retention: Duration,
) -> Result<PruneReport, StoreError> {
    let cutoff = now - retention;
    let _guard = store.lock().await;

    let mut visitors = store.load_visitors().await?;
    let visitors_removed = prune_visitors(&mut visitors, cutoff);
    store.save_visitors(&mut visitors, now).await?;

    let mut daily = store.load_daily_stats().await?;
    let days_removed = prune_daily(&mut daily, cutoff);
    store.save_daily_stats(&mut daily, now).await?;

    info!(
        %cutoff,
        visitors_removed,
        days_removed,
        "Pruned analytics older than retention window"
    );
    Ok(PruneReport {
        visitors_removed,
        days_removed,
    })
}
