//! Download tracking.
//!
//! Tracking is advisory: callers log failures and carry on delivering the
//! file. Persistent counting is opt-in through [`TrackingMode`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::db::DownloadCounterStore;

/// Errors raised while recording or reading download counts.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("download counter store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// How downloads are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
    /// Log each download, keep no counters.
    Log,
    /// Persist counters in SQLite.
    Sqlite,
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingMode::Log => f.write_str("log"),
            TrackingMode::Sqlite => f.write_str("sqlite"),
        }
    }
}

impl FromStr for TrackingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(TrackingMode::Log),
            "sqlite" => Ok(TrackingMode::Sqlite),
            other => Err(format!("unknown download tracking mode {:?}", other)),
        }
    }
}

/// Records downloads for catalog resources.
#[derive(Clone)]
pub enum DownloadTracker {
    Log,
    Persistent(DownloadCounterStore),
}

impl DownloadTracker {
    /// Record that `resource_id` was downloaded.
    pub async fn record_download(&self, resource_id: &str) -> Result<(), TrackingError> {
        match self {
            DownloadTracker::Log => {
                tracing::info!(resource_id, "Download recorded");
            }
            DownloadTracker::Persistent(store) => {
                let count = store.increment(resource_id).await?;
                tracing::info!(resource_id, count, "Download count incremented");
            }
        }
        Ok(())
    }

    /// Persisted downloads for `resource_id`, or `None` when not persisting.
    pub async fn download_count(&self, resource_id: &str) -> Result<Option<i64>, TrackingError> {
        match self {
            DownloadTracker::Log => Ok(None),
            DownloadTracker::Persistent(store) => Ok(Some(store.get(resource_id).await?)),
        }
    }

    /// All persisted counters keyed by resource id, or `None` when not persisting.
    pub async fn download_counts(&self) -> Result<Option<HashMap<String, i64>>, TrackingError> {
        match self {
            DownloadTracker::Log => Ok(None),
            DownloadTracker::Persistent(store) => {
                let counts = store.list().await?;
                Ok(Some(
                    counts.into_iter().map(|c| (c.resource_id, c.count)).collect(),
                ))
            }
        }
    }

    /// Release the counter store, if any.
    pub async fn close(&self) {
        if let DownloadTracker::Persistent(store) = self {
            store.close().await;
        }
    }
}

/// Download records running in the background.
///
/// Handlers hand records off here so delivery never waits on the tracker;
/// shutdown calls [`PendingDownloads::wait`] before the store is closed.
#[derive(Clone, Default)]
pub struct PendingDownloads {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl PendingDownloads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a download of `resource_id` on a background task.
    pub async fn record(&self, tracker: DownloadTracker, resource_id: String) {
        let mut tasks = self.tasks.lock().await;

        // Reap finished records so the set only holds in-flight ones
        while tasks.try_join_next().is_some() {}

        tasks.spawn(async move {
            if let Err(e) = tracker.record_download(&resource_id).await {
                tracing::warn!("Failed to record download of {}: {}", resource_id, e);
            }
        });
    }

    /// Wait for every in-flight record to finish.
    pub async fn wait(&self) {
        let mut tasks = self.tasks.lock().await;
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!("Download record task failed: {}", e);
            }
        }
    }
}
