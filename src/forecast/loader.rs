//! Record loader
//!
//! Reads delimited consumption exports into [`ConsumptionRecord`]s. Rows with a
//! missing or unparseable required field are dropped, never imputed.

use chrono::{DateTime, NaiveDateTime};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{ColumnNames, InputConfig};
use crate::domain::ConsumptionRecord;
use crate::error::{ForecastError, Result};

/// Layouts tried in order when no explicit timestamp format is configured
const FALLBACK_TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Outcome of a load: surviving records plus how many rows were discarded.
#[derive(Debug, Clone)]
pub struct LoadedRecords {
    pub records: Vec<ConsumptionRecord>,
    pub dropped: usize,
}

pub struct RecordLoader {
    delimiter: u8,
    decimal_separator: char,
    timestamp_format: Option<String>,
    columns: ColumnNames,
}

struct ColumnIndices {
    timestamp: usize,
    region: usize,
    gas_mw: usize,
    electricity_mw: usize,
    total_mw: usize,
}

impl RecordLoader {
    pub fn new(config: &InputConfig) -> Result<Self> {
        if !config.delimiter.is_ascii() {
            return Err(ForecastError::InvalidConfig(format!(
                "delimiter must be a single ASCII character, got {:?}",
                config.delimiter
            )));
        }
        if config.decimal_separator == config.delimiter {
            return Err(ForecastError::InvalidConfig(format!(
                "decimal separator {:?} collides with the field delimiter",
                config.decimal_separator
            )));
        }

        Ok(Self {
            delimiter: config.delimiter as u8,
            decimal_separator: config.decimal_separator,
            timestamp_format: config.timestamp_format.clone(),
            columns: config.columns.clone(),
        })
    }

    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadedRecords> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| ForecastError::Load(format!("cannot open {}: {}", path.display(), e)))?;
        info!(path = %path.display(), "loading consumption records");
        self.load_reader(file)
    }

    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadedRecords> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| ForecastError::Load(format!("cannot read header row: {}", e)))?
            .clone();
        let indices = self.locate_columns(&headers)?;

        let mut records = Vec::new();
        let mut dropped = 0usize;

        for (line, row) in csv_reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) if e.is_io_error() => {
                    return Err(ForecastError::Load(format!("read failed: {}", e)));
                }
                // includes rows whose field count differs from the header
                Err(e) => {
                    debug!(line, error = %e, "skipping malformed row");
                    dropped += 1;
                    continue;
                }
            };

            match self.parse_row(&row, &indices) {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, kept = records.len(), "dropped incomplete rows");
        }

        if records.is_empty() {
            return Err(ForecastError::Load(
                "no complete rows remain after filtering".to_string(),
            ));
        }

        info!(records = records.len(), "loaded consumption records");
        Ok(LoadedRecords { records, dropped })
    }

    fn locate_columns(&self, headers: &csv::StringRecord) -> Result<ColumnIndices> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}') == name)
                .ok_or_else(|| ForecastError::Load(format!("missing required column '{}'", name)))
        };

        Ok(ColumnIndices {
            timestamp: find(self.columns.timestamp.as_str())?,
            region: find(self.columns.region.as_str())?,
            gas_mw: find(self.columns.gas_mw.as_str())?,
            electricity_mw: find(self.columns.electricity_mw.as_str())?,
            total_mw: find(self.columns.total_mw.as_str())?,
        })
    }

    fn parse_row(&self, row: &csv::StringRecord, idx: &ColumnIndices) -> Option<ConsumptionRecord> {
        let timestamp = self.parse_timestamp(row.get(idx.timestamp)?)?;

        let region = row.get(idx.region)?.trim();
        if region.is_empty() {
            return None;
        }

        Some(ConsumptionRecord {
            timestamp,
            region: region.to_string(),
            gas_mw: self.parse_reading(row.get(idx.gas_mw)?)?,
            electricity_mw: self.parse_reading(row.get(idx.electricity_mw)?)?,
            total_mw: self.parse_reading(row.get(idx.total_mw)?)?,
        })
    }

    fn parse_timestamp(&self, raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(format) = &self.timestamp_format {
            return NaiveDateTime::parse_from_str(raw, format).ok();
        }

        // Offsets are dropped: calendar features follow the local wall clock
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }

        FALLBACK_TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }

    fn parse_reading(&self, raw: &str) -> Option<f64> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let value: f64 = if self.decimal_separator == '.' {
            raw.parse().ok()?
        } else {
            raw.replace(self.decimal_separator, ".").parse().ok()?
        };

        (value.is_finite() && value >= 0.0).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use rstest::rstest;
    use std::io::Write;

    fn columns() -> ColumnNames {
        ColumnNames {
            timestamp: "timestamp".to_string(),
            region: "region".to_string(),
            gas_mw: "gas".to_string(),
            electricity_mw: "electricity".to_string(),
            total_mw: "total".to_string(),
        }
    }

    fn loader(delimiter: char, decimal_separator: char) -> RecordLoader {
        RecordLoader::new(&InputConfig {
            delimiter,
            decimal_separator,
            columns: columns(),
            ..InputConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_load_drops_incomplete_rows() {
        let data = "\
timestamp;region;gas;electricity;total
2024-01-01T00:00:00+01:00;Bretagne;100.5;200;300.5
2024-01-01T01:00:00+01:00;Bretagne;;200;300
2024-01-01T02:00:00+01:00;;100;200;300
2024-01-01T03:00:00+01:00;Normandie;abc;200;300
not a date;Normandie;1;2;3
2024-01-01T04:00:00+01:00;Normandie;10;20;30
";
        let loaded = loader(';', '.').load_reader(data.as_bytes()).unwrap();

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.dropped, 4);
        assert_eq!(loaded.records[0].region, "Bretagne");
        assert_eq!(loaded.records[0].gas_mw, 100.5);
        assert_eq!(loaded.records[1].region, "Normandie");
        assert_eq!(loaded.records[1].total_mw, 30.0);
    }

    #[test]
    fn test_rfc3339_keeps_wall_clock_hour() {
        let data = "timestamp;region;gas;electricity;total\n2024-03-05T23:00:00+01:00;Occitanie;1;2;3\n";
        let loaded = loader(';', '.').load_reader(data.as_bytes()).unwrap();
        let ts = loaded.records[0].timestamp;

        assert_eq!(ts.hour(), 23);
        assert_eq!(ts.day(), 5);
    }

    #[test]
    fn test_comma_decimal_separator() {
        let data = "timestamp;region;gas;electricity;total\n2024-01-01 10:00;Grand Est;1,5;2,25;3,75\n";
        let loaded = loader(';', ',').load_reader(data.as_bytes()).unwrap();
        let record = &loaded.records[0];

        assert_eq!(record.gas_mw, 1.5);
        assert_eq!(record.electricity_mw, 2.25);
        assert_eq!(record.total_mw, 3.75);
    }

    #[test]
    fn test_decimal_separator_equal_to_delimiter_rejected() {
        let result = RecordLoader::new(&InputConfig {
            delimiter: ',',
            decimal_separator: ',',
            ..InputConfig::default()
        });
        assert!(matches!(result, Err(ForecastError::InvalidConfig(_))));
    }

    #[test]
    fn test_rows_with_wrong_field_count_are_dropped() {
        let data = "\
timestamp;region;gas;electricity;total
2024-01-01 10:00;Grand Est;1,5;2,25;3,75
2024-01-01 11:00;Grand Est;1;5;2;25;3;75
2024-01-01 12:00;Grand Est;1;5
";
        let loaded = loader(';', ',').load_reader(data.as_bytes()).unwrap();

        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.dropped, 2);
        assert_eq!(loaded.records[0].electricity_mw, 2.25);
    }

    #[rstest]
    #[case("-1")]
    #[case("NaN")]
    #[case("inf")]
    #[case("  ")]
    fn test_invalid_readings_are_dropped(#[case] raw: &str) {
        assert_eq!(loader(';', '.').parse_reading(raw), None);
    }

    #[test]
    fn test_explicit_timestamp_format() {
        let loader = RecordLoader::new(&InputConfig {
            delimiter: ',',
            timestamp_format: Some("%d.%m.%Y %H:%M".to_string()),
            columns: columns(),
            ..InputConfig::default()
        })
        .unwrap();
        let data = "timestamp,region,gas,electricity,total\n07.02.2024 13:30,Corse,1,2,3\n";
        let loaded = loader.load_reader(data.as_bytes()).unwrap();

        assert_eq!(loaded.records[0].timestamp.month(), 2);
        assert_eq!(loaded.records[0].timestamp.hour(), 13);
    }

    #[test]
    fn test_missing_column_is_load_error() {
        let data = "timestamp;region;gas;electricity\n2024-01-01 00:00;A;1;2\n";
        let result = loader(';', '.').load_reader(data.as_bytes());
        assert!(matches!(result, Err(ForecastError::Load(_))));
    }

    #[test]
    fn test_all_rows_dropped_is_load_error() {
        let data = "timestamp;region;gas;electricity;total\n;;;;\n";
        let result = loader(';', '.').load_reader(data.as_bytes());
        assert!(matches!(result, Err(ForecastError::Load(_))));
    }

    #[test]
    fn test_unreadable_path_is_load_error() {
        let result = loader(';', '.').load_path("/nonexistent/consumption.csv");
        assert!(matches!(result, Err(ForecastError::Load(_))));
    }

    #[test]
    fn test_load_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp;region;gas;electricity;total").unwrap();
        writeln!(file, "2023-06-01 12:00:00;Bretagne;10;20;30").unwrap();
        writeln!(file, "2023-06-01 13:00:00;Bretagne;11;21;32").unwrap();

        let loaded = loader(';', '.').load_path(file.path()).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.dropped, 0);
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let result = RecordLoader::new(&InputConfig {
            delimiter: '§',
            ..InputConfig::default()
        });
        assert!(matches!(result, Err(ForecastError::InvalidConfig(_))));
    }
}
