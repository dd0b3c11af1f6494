//! Forecast pipeline
//!
//! Runs the stages in order for one configuration and collects the report,
//! the result table and the partition sizes.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, info_span};

use super::features::derive_features;
use super::loader::RecordLoader;
use super::metrics::EvaluationReport;
use super::partition::{partition, SplitStrategy};
use super::results::ResultTable;
use crate::config::Config;
use crate::domain::ConsumptionRecord;
use crate::error::Result;
use crate::ml::{BoostingParameters, FeatureLayout, ForecastModel};

/// Everything one pipeline run hands to the reporting layer.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub report: EvaluationReport,
    #[serde(skip)]
    pub results: ResultTable,
    pub strategy: SplitStrategy,
    pub train_size: usize,
    pub test_size: usize,
    pub excluded_size: usize,
    pub dropped_rows: usize,
    pub regions: Vec<String>,
}

/// Load → derive features → partition → fit → predict → evaluate.
///
/// Every stage consumes the previous stage's output; nothing is shared
/// between runs.
pub struct ForecastPipeline {
    config: Config,
}

impl ForecastPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run against the configured input file.
    pub fn run(&self) -> Result<PipelineOutput> {
        let loader = RecordLoader::new(&self.config.input)?;
        let loaded = loader.load_path(&self.config.input.path)?;
        let mut output = self.run_records(&loaded.records)?;
        output.dropped_rows = loaded.dropped;
        Ok(output)
    }

    /// Run against records that are already loaded.
    pub fn run_records(&self, records: &[ConsumptionRecord]) -> Result<PipelineOutput> {
        let strategy = self.config.split.strategy()?;
        let span = info_span!("forecast_pipeline", strategy = %self.config.split.strategy);
        let _guard = span.enter();

        let table = derive_features(records);
        info!(
            rows = table.rows.len(),
            regions = table.encoder.len(),
            "derived features"
        );
        let regions = table.encoder.labels().to_vec();

        let dataset = partition(table.rows, &strategy)?;

        let layout = FeatureLayout::new(strategy.uses_year_feature());
        let params = BoostingParameters::from_config(&self.config.model, self.config.split.random_seed);
        let model = ForecastModel::fit(&dataset.train, layout, params)?;

        let predicted = model.predict(&dataset.test)?;
        let actual: Vec<f64> = dataset.test.iter().map(|r| r.total_mw).collect();
        let timestamps: Vec<NaiveDateTime> = dataset.test.iter().map(|r| r.timestamp).collect();

        let report = EvaluationReport::evaluate(&actual, &predicted)?;
        let results = ResultTable::assemble(&timestamps, &actual, &predicted)?;

        info!(
            mae = report.mae,
            rmse = report.rmse,
            mape_percent = report.mape_percent,
            reliability_percent = report.reliability_percent,
            r2_percent = report.r2_percent,
            "evaluation complete"
        );

        Ok(PipelineOutput {
            report,
            results,
            strategy,
            train_size: dataset.train.len(),
            test_size: dataset.test.len(),
            excluded_size: dataset.excluded,
            dropped_rows: 0,
            regions,
        })
    }
}
