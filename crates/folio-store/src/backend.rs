use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use folio_core::analytics::{DailyStatsDocument, VisitorsDocument};

use crate::error::StoreError;

pub const VISITORS_FILE: &str = "visitors.json";
pub const DAILY_STATS_FILE: &str = "daily-stats.json";

/// Analytics store backed by two JSON documents in one directory.
///
/// Every operation reads whole documents and rewrites them in full. All
/// read-modify-write sequences hold `write_lock`, so concurrent handlers in
/// this process cannot interleave and drop each other's updates. Another
/// process writing the same files is not coordinated with.
///
/// Writes land in a sibling `.tmp` file which is then renamed over the
/// target, so readers see either the old or the new document.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Open the store rooted at `dir`, creating the directory and empty
    /// documents when missing. Existing files are left untouched, even if
    /// they do not parse.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let store = Self {
            dir,
            write_lock: Arc::new(Mutex::new(())),
        };

        let now = Utc::now();
        store.create_if_missing(&store.visitors_path(), &VisitorsDocument::empty(now))?;
        store.create_if_missing(&store.daily_stats_path(), &DailyStatsDocument::empty(now))?;

        info!(dir = %store.dir.display(), "Analytics store opened");
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn visitors_path(&self) -> PathBuf {
        self.dir.join(VISITORS_FILE)
    }

    pub fn daily_stats_path(&self) -> PathBuf {
        self.dir.join(DAILY_STATS_FILE)
    }

    fn create_if_missing<T: Serialize>(&self, path: &Path, empty: &T) -> Result<(), StoreError> {
        if path.exists() {
            return Ok(());
        }
        let body = serde_json::to_vec_pretty(empty).map_err(|e| StoreError::json(path, e))?;
        std::fs::write(path, body).map_err(|e| StoreError::io(path, e))?;
        info!(path = %path.display(), "Created empty analytics document");
        Ok(())
    }

    /// Serialise access to both documents.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub(crate) async fn load_visitors(&self) -> Result<VisitorsDocument, StoreError> {
        read_json(&self.visitors_path()).await
    }

    pub(crate) async fn load_daily_stats(&self) -> Result<DailyStatsDocument, StoreError> {
        read_json(&self.daily_stats_path()).await
    }

    pub(crate) async fn save_visitors(
        &self,
        doc: &mut VisitorsDocument,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        doc.last_updated = now;
        write_json(&self.visitors_path(), doc).await
    }

    pub(crate) async fn save_daily_stats(
        &self,
        doc: &mut DailyStatsDocument,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        doc.last_updated = now;
        write_json(&self.daily_stats_path(), doc).await
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::json(path, e))
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(value).map_err(|e| StoreError::json(path, e))?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))
}
