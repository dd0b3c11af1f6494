use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One timestamped regional consumption reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    /// Wall-clock date and hour as written in the source
    pub timestamp: NaiveDateTime,
    pub region: String,
    pub gas_mw: f64,
    pub electricity_mw: f64,
    /// Target variable
    pub total_mw: f64,
}

impl ConsumptionRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        region: impl Into<String>,
        gas_mw: f64,
        electricity_mw: f64,
        total_mw: f64,
    ) -> Self {
        Self {
            timestamp,
            region: region.into(),
            gas_mw,
            electricity_mw,
            total_mw,
        }
    }
}

/// Model-ready row derived from a [`ConsumptionRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Carried through for result assembly, never used as a predictor
    pub timestamp: NaiveDateTime,
    /// Hour of day (0-23)
    pub hour: u32,
    /// Day of week (0=Monday, 6=Sunday)
    pub day_of_week: u32,
    /// Month (1-12)
    pub month: u32,
    pub year: i32,
    pub region_code: u32,
    pub gas_mw: f64,
    pub electricity_mw: f64,
    /// Label
    pub total_mw: f64,
}
