//! Feature engineering for the consumption model
//!
//! Expands timestamps into calendar features and maps region labels onto a
//! dense integer code. The region mapping is built once over the whole record
//! set, before any partitioning, and shared by train and test rows.

use chrono::{Datelike, NaiveDateTime, Timelike};
use itertools::Itertools;
use std::collections::HashMap;

use crate::domain::{ConsumptionRecord, FeatureRow};

/// Calendar decomposition of a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    /// Hour of day (0-23)
    pub hour: u32,
    /// Day of week (0=Monday, 6=Sunday)
    pub day_of_week: u32,
    /// Month (1-12)
    pub month: u32,
    pub year: i32,
}

impl CalendarFeatures {
    pub fn from_timestamp(timestamp: &NaiveDateTime) -> Self {
        Self {
            hour: timestamp.hour(),
            day_of_week: timestamp.weekday().num_days_from_monday(),
            month: timestamp.month(),
            year: timestamp.year(),
        }
    }
}

/// Region label to integer code, assigned in sorted lexicographic label order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionEncoder {
    labels: Vec<String>,
    codes: HashMap<String, u32>,
}

impl RegionEncoder {
    /// Build the mapping from every label in `labels`.
    pub fn fit<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .unique()
            .sorted()
            .map(str::to_string)
            .collect();

        let codes = labels
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code as u32))
            .collect();

        Self { labels, codes }
    }

    pub fn encode(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.labels.get(code as usize).map(String::as_str)
    }

    /// Labels ordered by code
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Result of feature derivation: the rows plus the encoder that produced them.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
    pub encoder: RegionEncoder,
}

/// Derive one [`FeatureRow`] per record, preserving input order.
pub fn derive_features(records: &[ConsumptionRecord]) -> FeatureTable {
    let encoder = RegionEncoder::fit(records.iter().map(|r| r.region.as_str()));

    let rows = records
        .iter()
        .map(|record| {
            let calendar = CalendarFeatures::from_timestamp(&record.timestamp);
            FeatureRow {
                timestamp: record.timestamp,
                hour: calendar.hour,
                day_of_week: calendar.day_of_week,
                month: calendar.month,
                year: calendar.year,
                // every label was seen while fitting
                region_code: encoder.encode(&record.region).unwrap_or_default(),
                gas_mw: record.gas_mw,
                electricity_mw: record.electricity_mw,
                total_mw: record.total_mw,
            }
        })
        .collect();

    FeatureTable { rows, encoder }
}
