//! Forecast Metrics and Evaluation
//!
//! Accuracy metrics for held-out predictions: MAE, RMSE, MAPE, reliability
//! (100 − MAPE) and R². Values are kept at full precision; rounding happens
//! only in the [`fmt::Display`] implementation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ForecastError, Result};

/// Forecast accuracy report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Square Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (%)
    pub mape_percent: f64,
    /// 100 − MAPE (%)
    pub reliability_percent: f64,
    /// R² (coefficient of determination) as a percentage
    pub r2_percent: f64,
    /// Number of samples evaluated
    pub sample_count: usize,
}

impl EvaluationReport {
    /// Calculate metrics from actual and predicted values
    pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(ForecastError::DimensionMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }

        if actual.is_empty() {
            return Err(ForecastError::EmptyInput(
                "no values to evaluate".to_string(),
            ));
        }

        if let Some(index) = actual.iter().position(|a| *a == 0.0) {
            return Err(ForecastError::DivisionByZero { index });
        }

        let n = actual.len() as f64;

        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut pct_sum = 0.0;
        for (a, p) in actual.iter().zip(predicted.iter()) {
            let error = a - p;
            abs_sum += error.abs();
            sq_sum += error * error;
            pct_sum += error.abs() / a.abs();
        }

        let mae = abs_sum / n;
        let rmse = (sq_sum / n).sqrt();
        let mape_percent = 100.0 * pct_sum / n;

        // R²: Coefficient of determination
        let mean_actual = actual.iter().sum::<f64>() / n;
        let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
        let ss_res = sq_sum;

        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Ok(Self {
            mae,
            rmse,
            mape_percent,
            reliability_percent: 100.0 - mape_percent,
            r2_percent: 100.0 * r2,
            sample_count: actual.len(),
        })
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MAE : {:.2}", self.mae)?;
        writeln!(f, "RMSE : {:.2}", self.rmse)?;
        writeln!(f, "MAPE : {:.2}%", self.mape_percent)?;
        writeln!(f, "Reliability (100 - MAPE) : {:.2}%", self.reliability_percent)?;
        write!(f, "R² Score : {:.2}%", self.r2_percent)
    }
}
