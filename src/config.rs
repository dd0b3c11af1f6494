use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::forecast::{ForecastError, SplitStrategy};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
    /// chrono format string; RFC 3339 and ISO-like layouts are tried when unset
    #[serde(default)]
    pub timestamp_format: Option<String>,
    #[serde(default)]
    pub columns: ColumnNames,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            delimiter: default_delimiter(),
            decimal_separator: default_decimal_separator(),
            timestamp_format: None,
            columns: ColumnNames::default(),
        }
    }
}

fn default_delimiter() -> char { ';' }
fn default_decimal_separator() -> char { '.' }

/// Header names of the five required columns.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub timestamp: String,
    pub region: String,
    pub gas_mw: String,
    pub electricity_mw: String,
    pub total_mw: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            timestamp: "Date - Heure".to_string(),
            region: "Région".to_string(),
            gas_mw: "Consommation brute gaz (MW PCS 0°C) - NaTran".to_string(),
            electricity_mw: "Consommation brute électricité (MW) - RTE".to_string(),
            total_mw: "Consommation brute totale (MW)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SplitKind {
    Random,
    Chronological,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub strategy: SplitKind,
    pub test_fraction: f64,
    pub random_seed: u64,
    pub cutoff_year: Option<i32>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            strategy: SplitKind::Random,
            test_fraction: 0.2,
            random_seed: 42,
            cutoff_year: None,
        }
    }
}

impl SplitConfig {
    /// Resolve the flat configuration into the partitioner's strategy.
    pub fn strategy(&self) -> Result<SplitStrategy, ForecastError> {
        match self.strategy {
            SplitKind::Random => SplitStrategy::random(self.test_fraction, self.random_seed),
            SplitKind::Chronological => {
                let cutoff_year = self.cutoff_year.ok_or_else(|| {
                    ForecastError::InvalidConfig(
                        "cutoff_year is required for the chronological split".to_string(),
                    )
                })?;
                Ok(SplitStrategy::Chronological { cutoff_year })
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: u16,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 500,
            learning_rate: 0.1,
            max_depth: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_csv: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("EFC__").split("__"));
        Ok(figment.extract()?)
    }
}
