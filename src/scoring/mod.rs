pub mod efficiency;

use crate::core::types::{EfficiencyResult, TireSpec};
use crate::persistence::store::CatalogStore;
use anyhow::Result;
use tracing::info;

/// Recompute a tire's efficiency and write the denormalized score/grade
/// columns. Called whenever spec fields change.
pub async fn store_efficiency(
    store: &dyn CatalogStore,
    tire_id: &str,
    spec: &TireSpec,
) -> Result<EfficiencyResult> {
    let result = efficiency::calculate_efficiency(spec);
    store.save_efficiency(tire_id, &result).await?;
    info!(tire_id, score = result.score, grade = %result.grade, "efficiency updated");
    Ok(result)
}
