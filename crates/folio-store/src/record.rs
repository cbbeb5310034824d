use tracing::debug;

use folio_core::analytics::{
    DailyStatsDocument, VisitObservation, VisitorRecord, VisitorsDocument,
};

use crate::{backend::JsonFileStore, error::StoreError};

/// Upsert the visitor for `visit`. Returns the visitor's new visit count.
pub fn upsert_visitor(doc: &mut VisitorsDocument, visit: &VisitObservation) -> u64 {
    match doc.visitors.iter_mut().find(|v| v.id == visit.visitor_id) {
        Some(existing) => {
            existing.apply_visit(visit);
            existing.visit_count
        }
        None => {
            doc.visitors.push(VisitorRecord::first_visit(visit));
            1
        }
    }
}

/// Add `visit` to the bucket for its UTC date, creating the bucket if needed.
pub fn add_to_daily(doc: &mut DailyStatsDocument, visit: &VisitObservation) {
    let date = visit.timestamp.date_naive();
    doc.daily_stats.entry(date).or_default().record(visit);
}

/// Visitor document first, then the daily document, each persisted in full.
///
/// If the daily step fails the visitor update has already been written; no
/// rollback is attempted.
pub(crate) async fn record_visit_inner(
    store: &JsonFileStore,
    visit: &VisitObservation,
) -> Result<(), StoreError> {
    let _guard = store.lock().await;

    let mut visitors = store.load_visitors().await?;
    let visit_count = upsert_visitor(&mut visitors, visit);
    store.save_visitors(&mut visitors, visit.timestamp).await?;

    let mut daily = store.load_daily_stats().await?;
    add_to_daily(&mut daily, visit);
    store.save_daily_stats(&mut daily, visit.timestamp).await?;

    debug!(
        visitor_id = %visit.visitor_id,
        path = %visit.path,
        visit_count,
        "Visit recorded"
    );
    Ok(())
}
