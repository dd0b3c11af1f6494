//! Gradient-boosted regression trees
//!
//! Least-squares boosting on top of smartcore's `DecisionTreeRegressor`:
//! the ensemble starts from the mean label and every tree is fit on the
//! residuals of the current ensemble, scaled by the learning rate.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};

use crate::error::{ForecastError, Result};

type RegressionTree = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

const PROGRESS_EVERY: usize = 100;

/// Ensemble hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingParameters {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: u16,
    pub min_samples_leaf: usize,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for BoostingParameters {
    fn default() -> Self {
        Self {
            n_estimators: 500,
            learning_rate: 0.1,
            max_depth: 10,
            min_samples_leaf: 1,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

impl BoostingParameters {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ForecastError::Fit("n_estimators must be at least 1".to_string()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::Fit(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(ForecastError::Fit("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }

    fn tree_parameters(&self) -> DecisionTreeRegressorParameters {
        DecisionTreeRegressorParameters {
            max_depth: Some(self.max_depth),
            min_samples_leaf: self.min_samples_leaf,
            min_samples_split: self.min_samples_split,
            seed: Some(self.seed),
        }
    }
}

/// Fitted tree ensemble. Immutable once built.
pub struct GradientBoostedTrees {
    base_score: f64,
    learning_rate: f64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl fmt::Debug for GradientBoostedTrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradientBoostedTrees")
            .field("base_score", &self.base_score)
            .field("learning_rate", &self.learning_rate)
            .field("n_features", &self.n_features)
            .field("n_trees", &self.trees.len())
            .finish()
    }
}

fn to_matrix(x: &[Vec<f64>], n_features: usize) -> Result<DenseMatrix<f64>> {
    let mut flat_data = Vec::with_capacity(x.len() * n_features);
    for row in x {
        if row.len() != n_features {
            return Err(ForecastError::Prediction(format!(
                "expected {} features per row, got {}",
                n_features,
                row.len()
            )));
        }
        flat_data.extend_from_slice(row);
    }
    Ok(DenseMatrix::new(x.len(), n_features, flat_data, false))
}

impl GradientBoostedTrees {
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &BoostingParameters) -> Result<Self> {
        params.validate()?;

        if x.is_empty() || y.is_empty() {
            return Err(ForecastError::Fit("cannot train on empty dataset".to_string()));
        }
        if x.len() != y.len() {
            return Err(ForecastError::Fit(format!(
                "feature and target count mismatch: {} rows, {} targets",
                x.len(),
                y.len()
            )));
        }

        let n_features = x[0].len();
        let x_matrix = to_matrix(x, n_features).map_err(|e| ForecastError::Fit(e.to_string()))?;

        let base_score = y.iter().sum::<f64>() / y.len() as f64;
        let mut ensemble_pred = vec![base_score; y.len()];
        let mut trees = Vec::with_capacity(params.n_estimators);

        for round in 0..params.n_estimators {
            let residuals: Vec<f64> = y
                .iter()
                .zip(ensemble_pred.iter())
                .map(|(target, pred)| target - pred)
                .collect();

            let tree = RegressionTree::fit(&x_matrix, &residuals, params.tree_parameters())
                .map_err(|e| ForecastError::Fit(format!("tree {} failed: {}", round, e)))?;
            let step = tree
                .predict(&x_matrix)
                .map_err(|e| ForecastError::Fit(format!("tree {} prediction failed: {}", round, e)))?;

            for (pred, delta) in ensemble_pred.iter_mut().zip(step.iter()) {
                *pred += params.learning_rate * delta;
            }
            trees.push(tree);

            if (round + 1) % PROGRESS_EVERY == 0 {
                let mse = y
                    .iter()
                    .zip(ensemble_pred.iter())
                    .map(|(t, p)| (t - p).powi(2))
                    .sum::<f64>()
                    / y.len() as f64;
                debug!(trees = round + 1, train_rmse = mse.sqrt(), "boosting progress");
            }
        }

        Ok(Self {
            base_score,
            learning_rate: params.learning_rate,
            n_features,
            trees,
        })
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if x.is_empty() {
            return Ok(Vec::new());
        }

        let x_matrix = to_matrix(x, self.n_features)?;
        let mut predictions = vec![self.base_score; x.len()];

        for tree in &self.trees {
            let step = tree
                .predict(&x_matrix)
                .map_err(|e| ForecastError::Prediction(e.to_string()))?;
            for (pred, delta) in predictions.iter_mut().zip(step.iter()) {
                *pred += self.learning_rate * delta;
            }
        }

        Ok(predictions)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }
}
