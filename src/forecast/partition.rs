//! Train/test partitioning
//!
//! Two policies share one partitioner:
//! - random hold-out: seeded shuffle, then a fixed fraction goes to test
//! - chronological cutoff: years before the cutoff train, the cutoff year tests

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::FeatureRow;
use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SplitStrategy {
    Random { test_fraction: f64, seed: u64 },
    Chronological { cutoff_year: i32 },
}

impl SplitStrategy {
    pub fn random(test_fraction: f64, seed: u64) -> Result<Self> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(ForecastError::InvalidConfig(format!(
                "test_fraction must be within (0, 1), got {}",
                test_fraction
            )));
        }
        Ok(Self::Random { test_fraction, seed })
    }

    /// Whether the year is a model predictor under this strategy
    pub fn uses_year_feature(&self) -> bool {
        matches!(self, Self::Chronological { .. })
    }
}

#[derive(Debug, Clone)]
pub struct PartitionedDataset {
    pub train: Vec<FeatureRow>,
    pub test: Vec<FeatureRow>,
    /// Rows belonging to neither side (chronological rows after the cutoff year)
    pub excluded: usize,
}

/// Number of rows assigned to test by the random hold-out.
///
/// Rounds to the nearest row count.
pub fn test_size(total: usize, test_fraction: f64) -> usize {
    (total as f64 * test_fraction).round() as usize
}

pub fn partition(rows: Vec<FeatureRow>, strategy: &SplitStrategy) -> Result<PartitionedDataset> {
    let dataset = match *strategy {
        SplitStrategy::Random { test_fraction, seed } => random_split(rows, test_fraction, seed)?,
        SplitStrategy::Chronological { cutoff_year } => chronological_split(rows, cutoff_year),
    };

    if dataset.train.is_empty() {
        return Err(ForecastError::InsufficientData(
            "training partition is empty".to_string(),
        ));
    }
    if dataset.test.is_empty() {
        return Err(ForecastError::InsufficientData(
            "test partition is empty".to_string(),
        ));
    }

    info!(
        train = dataset.train.len(),
        test = dataset.test.len(),
        excluded = dataset.excluded,
        "partitioned dataset"
    );
    Ok(dataset)
}

fn random_split(rows: Vec<FeatureRow>, test_fraction: f64, seed: u64) -> Result<PartitionedDataset> {
    // re-validate: the enum variant can be built directly
    SplitStrategy::random(test_fraction, seed)?;

    let n_test = test_size(rows.len(), test_fraction);

    let mut order: Vec<usize> = (0..rows.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let mut slots: Vec<Option<FeatureRow>> = rows.into_iter().map(Some).collect();
    let mut take = |indices: &[usize]| -> Vec<FeatureRow> {
        indices.iter().filter_map(|&i| slots[i].take()).collect()
    };

    let test = take(&order[..n_test]);
    let train = take(&order[n_test..]);

    Ok(PartitionedDataset {
        train,
        test,
        excluded: 0,
    })
}

fn chronological_split(rows: Vec<FeatureRow>, cutoff_year: i32) -> PartitionedDataset {
    let mut train = Vec::new();
    let mut test = Vec::new();
    let mut excluded = 0;

    for row in rows {
        match row.year.cmp(&cutoff_year) {
            std::cmp::Ordering::Less => train.push(row),
            std::cmp::Ordering::Equal => test.push(row),
            std::cmp::Ordering::Greater => excluded += 1,
        }
    }

    PartitionedDataset {
        train,
        test,
        excluded,
    }
}
