use crate::core::types::{EfficiencyResult, TireRow};
use crate::persistence::store::{CatalogStore, SettingsStore};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::info;

#[derive(Clone)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tires (
                id TEXT PRIMARY KEY,
                affiliate_link TEXT NOT NULL DEFAULT '',
                fetched_price TEXT, -- Decimal stored as text
                price_updated_at TIMESTAMPTZ,
                price_fetch_status TEXT,
                efficiency_score INT,
                efficiency_grade TEXT,
                created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value JSONB NOT NULL,
                updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database tables initialized (Postgres)");
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for Database {
    async fn tires_for_refresh(&self) -> Result<Vec<TireRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, affiliate_link
            FROM tires
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut tires = Vec::with_capacity(rows.len());
        for row in rows {
            tires.push(TireRow {
                id: row.get("id"),
                affiliate_link: row.get("affiliate_link"),
            });
        }
        Ok(tires)
    }

    async fn affiliate_link(&self, tire_id: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT affiliate_link FROM tires WHERE id = $1
            "#,
        )
        .bind(tire_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("affiliate_link")))
    }

    async fn record_price_success(
        &self,
        tire_id: &str,
        price: Decimal,
        at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tires
            SET fetched_price = $2, price_updated_at = $3, price_fetch_status = 'success'
            WHERE id = $1
            "#,
        )
        .bind(tire_id)
        .bind(price.to_string())
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_price_failure(&self, tire_id: &str, at: DateTime<Utc>) -> Result<()> {
        // fetched_price deliberately untouched: last known good price stays
        sqlx::query(
            r#"
            UPDATE tires
            SET price_updated_at = $2, price_fetch_status = 'failed'
            WHERE id = $1
            "#,
        )
        .bind(tire_id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_efficiency(&self, tire_id: &str, result: &EfficiencyResult) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tires
            SET efficiency_score = $2, efficiency_grade = $3
            WHERE id = $1
            "#,
        )
        .bind(tire_id)
        .bind(result.score as i32)
        .bind(result.grade.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn invalidate_catalog_cache(&self) -> Result<()> {
        // The read view is materialized under a settings key by the host;
        // dropping it forces a rebuild on next read
        sqlx::query(
            r#"
            DELETE FROM settings WHERE key = 'catalog_read_cache'
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for Database {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let row = sqlx::query(
            r#"
            SELECT value FROM settings WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("value")))
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
