use crate::core::types::{EfficiencyResult, TireRow};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Row-level access to the tire catalog. Implementations must never clear a
/// previously stored price on failure; only the status and timestamp change.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// All catalog rows in stable id order, including rows with a blank link
    /// (the batch loop classifies those as skipped).
    async fn tires_for_refresh(&self) -> Result<Vec<TireRow>>;

    /// Affiliate link for one tire; None when the id is unknown.
    async fn affiliate_link(&self, tire_id: &str) -> Result<Option<String>>;

    async fn record_price_success(
        &self,
        tire_id: &str,
        price: Decimal,
        at: DateTime<Utc>,
    ) -> Result<()>;

    async fn record_price_failure(&self, tire_id: &str, at: DateTime<Utc>) -> Result<()>;

    async fn save_efficiency(&self, tire_id: &str, result: &EfficiencyResult) -> Result<()>;

    /// Drop the denormalized catalog read view; called once per batch run.
    async fn invalidate_catalog_cache(&self) -> Result<()>;
}

/// Key-value settings owned by the host platform; holds the bounded run log
/// and schedule bookkeeping.
#[async_trait]
pub trait SettingsStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()>;
}
