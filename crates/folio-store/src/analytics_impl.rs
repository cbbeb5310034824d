use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use folio_core::analytics::{
    AnalyticsStore, DailyStat, ExportBundle, PruneReport, SummaryResult, VisitObservation,
    VisitorSummary,
};

use crate::{queries, record, retention, JsonFileStore};

#[async_trait]
impl AnalyticsStore for JsonFileStore {
    async fn record_visit(&self, visit: &VisitObservation) -> anyhow::Result<()> {
        record::record_visit_inner(self, visit).await?;
        Ok(())
    }

    async fn prune_older_than(
        &self,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> anyhow::Result<PruneReport> {
        Ok(retention::prune_inner(self, now, retention).await?)
    }

    async fn visitor_summary(&self, limit: usize) -> anyhow::Result<VisitorSummary> {
        let _guard = self.lock().await;
        let visitors = self.load_visitors().await?;
        Ok(queries::visitor_summary(&visitors, limit))
    }

    async fn daily_window(
        &self,
        today: NaiveDate,
        days: i64,
    ) -> anyhow::Result<BTreeMap<NaiveDate, DailyStat>> {
        let _guard = self.lock().await;
        let daily = self.load_daily_stats().await?;
        Ok(daily.window(today, days))
    }

    async fn summary(&self, today: NaiveDate) -> anyhow::Result<SummaryResult> {
        let _guard = self.lock().await;
        let visitors = self.load_visitors().await?;
        let daily = self.load_daily_stats().await?;
        Ok(queries::summary(&visitors, &daily, today))
    }

    async fn export(&self, now: DateTime<Utc>) -> anyhow::Result<ExportBundle> {
        let _guard = self.lock().await;
        let visitors = self.load_visitors().await?;
        let daily = self.load_daily_stats().await?;
        Ok(queries::export(visitors, daily, now))
    }
}
