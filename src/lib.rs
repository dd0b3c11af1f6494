//! Regional energy consumption forecasting.
//!
//! Loads timestamped regional readings, derives calendar and region features,
//! partitions them (random hold-out or chronological cutoff), fits a
//! gradient-boosted tree ensemble and evaluates it on the held-out rows.

pub mod config;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod ml;
pub mod telemetry;

pub use error::{ForecastError, Result};
