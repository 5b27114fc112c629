use crate::core::types::FetchLogEntry;
use crate::persistence::store::SettingsStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub const LOG_KEY: &str = "price_fetch_log";
pub const NEXT_RUN_KEY: &str = "price_fetch_next_run";

/// Retained batch run summaries; oldest evicted beyond this.
const MAX_ENTRIES: usize = 10;

/// Bounded batch run history plus schedule bookkeeping, kept in the injected
/// settings store so the host platform can inspect it.
#[derive(Clone)]
pub struct FetchLog {
    settings: Arc<dyn SettingsStore>,
}

impl FetchLog {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    pub async fn entries(&self) -> Result<Vec<FetchLogEntry>> {
        match self.settings.get(LOG_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value).unwrap_or_default()),
            None => Ok(Vec::new()),
        }
    }

    /// Append one run summary, evicting the oldest entries beyond the cap.
    pub async fn append(&self, entry: FetchLogEntry) -> Result<()> {
        let mut entries = self.entries().await?;
        entries.push(entry);
        if entries.len() > MAX_ENTRIES {
            let excess = entries.len() - MAX_ENTRIES;
            entries.drain(..excess);
        }
        self.settings
            .set(LOG_KEY, serde_json::to_value(&entries)?)
            .await
    }

    pub async fn set_next_run(&self, at: DateTime<Utc>) -> Result<()> {
        self.settings
            .set(NEXT_RUN_KEY, serde_json::to_value(at)?)
            .await
    }

    pub async fn next_run(&self) -> Result<Option<DateTime<Utc>>> {
        match self.settings.get(NEXT_RUN_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value).ok()),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::memory::MemoryStore;

    fn entry(updated: u32) -> FetchLogEntry {
        FetchLogEntry {
            run_at: Utc::now(),
            updated,
            failed: 0,
            skipped: 0,
            details: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_log() {
        let log = FetchLog::new(Arc::new(MemoryStore::new()));
        assert!(log.entries().await.unwrap().is_empty());
        assert_eq!(log.next_run().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let log = FetchLog::new(Arc::new(MemoryStore::new()));
        log.append(entry(3)).await.unwrap();
        log.append(entry(5)).await.unwrap();

        let entries = log.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].updated, 3);
        assert_eq!(entries[1].updated, 5);
    }

    #[tokio::test]
    async fn test_oldest_evicted_beyond_ten() {
        let log = FetchLog::new(Arc::new(MemoryStore::new()));
        for i in 0..11 {
            log.append(entry(i)).await.unwrap();
        }

        let entries = log.entries().await.unwrap();
        assert_eq!(entries.len(), 10);
        // Run 0 evicted, runs 1..=10 retained in order
        assert_eq!(entries[0].updated, 1);
        assert_eq!(entries[9].updated, 10);
    }

    #[tokio::test]
    async fn test_next_run_round_trip() {
        let log = FetchLog::new(Arc::new(MemoryStore::new()));
        let at = Utc::now();
        log.set_next_run(at).await.unwrap();
        assert_eq!(log.next_run().await.unwrap(), Some(at));
    }
}
