//! Machine Learning Module
//!
//! Gradient-boosted regression trees for consumption forecasting:
//! - [`FeatureLayout`] turns [`FeatureRow`]s into model input vectors
//! - [`boosting`] holds the tree ensemble built on smartcore regression trees
//! - [`training`] validates training input and owns the fitted [`ForecastModel`]

use serde::{Deserialize, Serialize};

use crate::domain::FeatureRow;

pub mod boosting;
pub mod training;

pub use boosting::{BoostingParameters, GradientBoostedTrees};
pub use training::ForecastModel;

/// Column layout of the model input.
///
/// The year is only a predictor when forecasting an unseen year
/// (chronological split).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub include_year: bool,
}

impl FeatureLayout {
    pub fn new(include_year: bool) -> Self {
        Self { include_year }
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        let mut names = vec!["hour", "day_of_week", "month"];
        if self.include_year {
            names.push("year");
        }
        names.extend(["region_code", "gas_mw", "electricity_mw"]);
        names
    }

    /// Number of input columns
    pub fn width(&self) -> usize {
        if self.include_year {
            7
        } else {
            6
        }
    }

    pub fn vectorize(&self, row: &FeatureRow) -> Vec<f64> {
        let mut features = Vec::with_capacity(self.width());
        features.push(row.hour as f64);
        features.push(row.day_of_week as f64);
        features.push(row.month as f64);
        if self.include_year {
            features.push(row.year as f64);
        }
        features.push(row.region_code as f64);
        features.push(row.gas_mw);
        features.push(row.electricity_mw);
        features
    }

    pub fn matrix(&self, rows: &[FeatureRow]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.vectorize(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_row() -> FeatureRow {
        FeatureRow {
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 6)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            hour: 8,
            day_of_week: 0,
            month: 5,
            year: 2024,
            region_code: 3,
            gas_mw: 120.0,
            electricity_mw: 480.0,
            total_mw: 600.0,
        }
    }

    #[test]
    fn test_layout_without_year() {
        let layout = FeatureLayout::new(false);
        let features = layout.vectorize(&sample_row());

        assert_eq!(features, vec![8.0, 0.0, 5.0, 3.0, 120.0, 480.0]);
        assert_eq!(layout.feature_names().len(), layout.width());
        assert!(!layout.feature_names().contains(&"year"));
    }

    #[test]
    fn test_layout_with_year() {
        let layout = FeatureLayout::new(true);
        let features = layout.vectorize(&sample_row());

        assert_eq!(features, vec![8.0, 0.0, 5.0, 2024.0, 3.0, 120.0, 480.0]);
        assert_eq!(layout.feature_names()[3], "year");
        assert_eq!(layout.feature_names().len(), layout.width());
    }

    #[test]
    fn test_label_is_never_a_feature() {
        let layout = FeatureLayout::new(true);
        assert!(!layout.vectorize(&sample_row()).contains(&600.0));
    }
}
