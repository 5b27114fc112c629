use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[async_trait::async_trait]
pub trait Actor: Send + Sync + 'static {
    async fn run(self) -> Result<()>;
}

// ----------- Domain types -----------------

/// Specification fields of a tire as entered in the catalog. Every field is
/// allowed to be missing or malformed; the scorer treats those as neutral.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TireSpec {
    /// e.g. "275/60R20"
    #[serde(default)]
    pub size: String,
    /// Pounds; 0 = unknown
    #[serde(default)]
    pub weight_lb: f64,
    /// Fraction string, e.g. "10/32"
    #[serde(default)]
    pub tread_depth: String,
    /// Ply rating code: SL, XL, E, ...
    #[serde(default)]
    pub load_range: String,
    #[serde(default)]
    pub speed_rating: String,
    /// e.g. "620 A B"
    #[serde(default)]
    pub utqg: String,
    /// Display category, e.g. "All-Season"
    #[serde(default)]
    pub category: String,
    /// Three-Peak Mountain Snowflake certification; None = unknown
    #[serde(default)]
    pub three_pms: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyResult {
    /// 0..=100
    pub score: u8,
    pub grade: Grade,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Success,
    Failed,
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStatus::Success => write!(f, "success"),
            FetchStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of one extraction attempt. Transient; only price/status/timestamp
/// land on the tire record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceFetchResult {
    pub success: bool,
    pub price: Option<Decimal>,
    /// Matched site name, or domain plus method tag
    pub source: String,
    pub error: Option<String>,
}

impl PriceFetchResult {
    pub fn found(price: Decimal, source: impl Into<String>) -> Self {
        Self {
            success: true,
            price: Some(price),
            source: source.into(),
            error: None,
        }
    }

    pub fn failure(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            price: None,
            source: source.into(),
            error: Some(error.into()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchDetail {
    pub tire_id: String,
    pub status: FetchStatus,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub error: Option<String>,
    pub source: String,
}

/// One batch run summary; the settings store keeps the last 10 of these.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchLogEntry {
    pub run_at: DateTime<Utc>,
    pub updated: u32,
    pub failed: u32,
    pub skipped: u32,
    pub details: Vec<FetchDetail>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub updated: u32,
    pub failed: u32,
    pub skipped: u32,
}

/// Catalog row projection used by the batch loop.
#[derive(Clone, Debug)]
pub struct TireRow {
    pub id: String,
    pub affiliate_link: String,
}
