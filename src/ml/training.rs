//! Model training
//!
//! Validates the training partition before handing it to the ensemble and
//! wraps the fitted ensemble together with the feature layout it was fit on.

use tracing::info;

use super::{BoostingParameters, FeatureLayout, GradientBoostedTrees};
use crate::config::ModelConfig;
use crate::domain::FeatureRow;
use crate::error::{ForecastError, Result};

impl BoostingParameters {
    pub fn from_config(config: &ModelConfig, seed: u64) -> Self {
        Self {
            n_estimators: config.n_estimators,
            learning_rate: config.learning_rate,
            max_depth: config.max_depth,
            seed,
            ..Self::default()
        }
    }
}

/// Total-consumption model fit on one training partition.
#[derive(Debug)]
pub struct ForecastModel {
    layout: FeatureLayout,
    ensemble: GradientBoostedTrees,
    training_samples: usize,
}

impl ForecastModel {
    pub fn fit(rows: &[FeatureRow], layout: FeatureLayout, params: BoostingParameters) -> Result<Self> {
        if rows.is_empty() {
            return Err(ForecastError::Fit("cannot train on zero rows".to_string()));
        }

        if let Some(index) = rows.iter().position(|r| !r.total_mw.is_finite()) {
            return Err(ForecastError::Fit(format!("non-finite label at row {}", index)));
        }

        let x = layout.matrix(rows);
        check_feature_variation(&x, &layout)?;
        let y: Vec<f64> = rows.iter().map(|r| r.total_mw).collect();

        info!(
            rows = rows.len(),
            features = ?layout.feature_names(),
            n_estimators = params.n_estimators,
            learning_rate = params.learning_rate,
            max_depth = params.max_depth,
            "training gradient-boosted trees"
        );

        let ensemble = GradientBoostedTrees::fit(&x, &y, &params)?;

        Ok(Self {
            layout,
            ensemble,
            training_samples: rows.len(),
        })
    }

    /// One prediction per row, in input order.
    pub fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>> {
        self.ensemble.predict(&self.layout.matrix(rows))
    }

    pub fn training_samples(&self) -> usize {
        self.training_samples
    }
}

/// Reject predictors that hold a single distinct value across the training rows.
fn check_feature_variation(x: &[Vec<f64>], layout: &FeatureLayout) -> Result<()> {
    let Some(first) = x.first() else {
        return Ok(());
    };

    for (col, name) in layout.feature_names().into_iter().enumerate() {
        let reference = first[col];
        if x.iter().all(|row| row[col] == reference) {
            return Err(ForecastError::Fit(format!(
                "feature '{}' has a single distinct value ({}) in the training data",
                name, reference
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn rows(n: usize) -> Vec<FeatureRow> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| {
                let timestamp = start + Duration::hours(i as i64 * 37);
                let gas = 50.0 + (i % 7) as f64 * 10.0;
                let electricity = 200.0 + (i % 5) as f64 * 20.0;
                FeatureRow {
                    timestamp,
                    hour: (i * 37 % 24) as u32,
                    day_of_week: (i % 7) as u32,
                    month: (i % 12) as u32 + 1,
                    year: 2023 + (i % 2) as i32,
                    region_code: (i % 3) as u32,
                    gas_mw: gas,
                    electricity_mw: electricity,
                    total_mw: gas + electricity,
                }
            })
            .collect()
    }

    fn params() -> BoostingParameters {
        BoostingParameters {
            n_estimators: 40,
            max_depth: 4,
            ..BoostingParameters::default()
        }
    }

    #[test]
    fn test_fit_and_predict() {
        let data = rows(60);
        let model = ForecastModel::fit(&data, FeatureLayout::new(false), params()).unwrap();

        assert_eq!(model.training_samples(), 60);
        let predictions = model.predict(&data[..10]).unwrap();
        assert_eq!(predictions.len(), 10);
        for (row, pred) in data[..10].iter().zip(&predictions) {
            assert!((row.total_mw - pred).abs() < 30.0);
        }
    }

    #[test]
    fn test_zero_rows_is_fit_error() {
        let result = ForecastModel::fit(&[], FeatureLayout::new(false), params());
        assert!(matches!(result, Err(ForecastError::Fit(_))));
    }

    #[test]
    fn test_constant_feature_is_fit_error() {
        let mut data = rows(30);
        for row in &mut data {
            row.region_code = 0;
        }
        let err = ForecastModel::fit(&data, FeatureLayout::new(false), params()).unwrap_err();
        assert!(err.to_string().contains("region_code"));
    }

    #[test]
    fn test_constant_year_only_matters_when_used() {
        let mut data = rows(30);
        for row in &mut data {
            row.year = 2024;
        }
        assert!(ForecastModel::fit(&data, FeatureLayout::new(false), params()).is_ok());
        assert!(matches!(
            ForecastModel::fit(&data, FeatureLayout::new(true), params()),
            Err(ForecastError::Fit(_))
        ));
    }

    #[test]
    fn test_non_finite_label_is_fit_error() {
        let mut data = rows(10);
        data[3].total_mw = f64::NAN;
        assert!(matches!(
            ForecastModel::fit(&data, FeatureLayout::new(false), params()),
            Err(ForecastError::Fit(_))
        ));
    }

    #[test]
    fn test_parameters_from_config() {
        let params = BoostingParameters::from_config(&ModelConfig::default(), 7);
        assert_eq!(params.n_estimators, 500);
        assert_eq!(params.learning_rate, 0.1);
        assert_eq!(params.max_depth, 10);
        assert_eq!(params.seed, 7);
    }
}
