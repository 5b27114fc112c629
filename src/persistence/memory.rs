use crate::core::types::{EfficiencyResult, FetchStatus, TireRow};
use crate::persistence::store::{CatalogStore, SettingsStore};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// In-memory stand-in for the catalog and settings stores, used wherever a
/// real database is not available.
#[derive(Default)]
pub struct MemoryStore {
    tires: Mutex<BTreeMap<String, TireRecord>>,
    settings: Mutex<HashMap<String, serde_json::Value>>,
    cache_invalidations: AtomicU32,
}

#[derive(Clone, Debug, Default)]
pub struct TireRecord {
    pub affiliate_link: String,
    pub fetched_price: Option<Decimal>,
    pub price_updated_at: Option<DateTime<Utc>>,
    pub price_fetch_status: Option<FetchStatus>,
    pub efficiency_score: Option<u8>,
    pub efficiency_grade: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_tire(&self, id: &str, record: TireRecord) {
        self.tires.lock().unwrap().insert(id.to_string(), record);
    }

    pub fn tire(&self, id: &str) -> Option<TireRecord> {
        self.tires.lock().unwrap().get(id).cloned()
    }

    pub fn cache_invalidations(&self) -> u32 {
        self.cache_invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn tires_for_refresh(&self) -> Result<Vec<TireRow>> {
        // BTreeMap iteration gives the stable id order
        Ok(self
            .tires
            .lock()
            .unwrap()
            .iter()
            .map(|(id, rec)| TireRow {
                id: id.clone(),
                affiliate_link: rec.affiliate_link.clone(),
            })
            .collect())
    }

    async fn affiliate_link(&self, tire_id: &str) -> Result<Option<String>> {
        Ok(self
            .tires
            .lock()
            .unwrap()
            .get(tire_id)
            .map(|rec| rec.affiliate_link.clone()))
    }

    async fn record_price_success(
        &self,
        tire_id: &str,
        price: Decimal,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tires = self.tires.lock().unwrap();
        let rec = tires.entry(tire_id.to_string()).or_default();
        rec.fetched_price = Some(price);
        rec.price_updated_at = Some(at);
        rec.price_fetch_status = Some(FetchStatus::Success);
        Ok(())
    }

    async fn record_price_failure(&self, tire_id: &str, at: DateTime<Utc>) -> Result<()> {
        let mut tires = self.tires.lock().unwrap();
        let rec = tires.entry(tire_id.to_string()).or_default();
        // Last-known-good retention: fetched_price stays untouched
        rec.price_updated_at = Some(at);
        rec.price_fetch_status = Some(FetchStatus::Failed);
        Ok(())
    }

    async fn save_efficiency(&self, tire_id: &str, result: &EfficiencyResult) -> Result<()> {
        let mut tires = self.tires.lock().unwrap();
        let rec = tires.entry(tire_id.to_string()).or_default();
        rec.efficiency_score = Some(result.score);
        rec.efficiency_grade = Some(result.grade.to_string());
        Ok(())
    }

    async fn invalidate_catalog_cache(&self) -> Result<()> {
        self.cache_invalidations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.settings.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()> {
        self.settings.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Grade;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_failure_keeps_prior_price() {
        let store = MemoryStore::new();
        store.insert_tire(
            "tire-a",
            TireRecord {
                affiliate_link: "https://example.com/a".into(),
                fetched_price: Some(Decimal::from_str("199.99").unwrap()),
                price_fetch_status: Some(FetchStatus::Success),
                ..Default::default()
            },
        );

        store
            .record_price_failure("tire-a", Utc::now())
            .await
            .unwrap();

        let rec = store.tire("tire-a").unwrap();
        assert_eq!(rec.fetched_price, Some(Decimal::from_str("199.99").unwrap()));
        assert_eq!(rec.price_fetch_status, Some(FetchStatus::Failed));
    }

    #[tokio::test]
    async fn test_rows_ordered_by_id() {
        let store = MemoryStore::new();
        store.insert_tire("tire-c", TireRecord::default());
        store.insert_tire("tire-a", TireRecord::default());
        store.insert_tire("tire-b", TireRecord::default());

        let rows = store.tires_for_refresh().await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["tire-a", "tire-b", "tire-c"]);
    }

    #[tokio::test]
    async fn test_save_efficiency() {
        let store = MemoryStore::new();
        store.insert_tire("tire-a", TireRecord::default());
        store
            .save_efficiency(
                "tire-a",
                &EfficiencyResult {
                    score: 86,
                    grade: Grade::A,
                },
            )
            .await
            .unwrap();
        let rec = store.tire("tire-a").unwrap();
        assert_eq!(rec.efficiency_score, Some(86));
        assert_eq!(rec.efficiency_grade.as_deref(), Some("A"));
    }
}
