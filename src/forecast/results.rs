//! Actual vs. predicted table handed to the visualization layer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub timestamp: NaiveDateTime,
    pub actual: f64,
    pub predicted: f64,
}

/// Rows ordered by timestamp ascending; ties keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn assemble(timestamps: &[NaiveDateTime], actual: &[f64], predicted: &[f64]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(ForecastError::DimensionMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }
        if timestamps.len() != actual.len() {
            return Err(ForecastError::DimensionMismatch {
                actual: actual.len(),
                predicted: timestamps.len(),
            });
        }

        let mut rows: Vec<ResultRow> = timestamps
            .iter()
            .zip(actual.iter().zip(predicted.iter()))
            .map(|(&timestamp, (&actual, &predicted))| ResultRow {
                timestamp,
                actual,
                predicted,
            })
            .collect();
        rows.sort_by_key(|row| row.timestamp);

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn actual(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.actual).collect()
    }

    pub fn predicted(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.predicted).collect()
    }

    /// Write `timestamp,actual,predicted` rows with a header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer
                .serialize(row)
                .map_err(|e| ForecastError::Io(std::io::Error::other(e)))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_csv(file)
    }
}
