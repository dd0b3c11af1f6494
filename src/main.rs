use anyhow::{Context, Result};
use energy_forecast::{config, forecast, telemetry};
use config::Config;
use forecast::ForecastPipeline;
use std::fs::{self, File};
use std::path::Path;
use telemetry::init_tracing;
use tracing::{error, info};

fn main() -> Result<()> {
    init_tracing();

    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load_from(&path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => Config::load().context("failed to load configuration")?,
    };

    info!(
        input = %cfg.input.path.display(),
        strategy = %cfg.split.strategy,
        "starting energy consumption forecast"
    );

    let pipeline = ForecastPipeline::new(cfg.clone());
    let output = pipeline.run().map_err(|e| {
        error!(error = %e, "forecast run failed");
        e
    })?;

    println!("Train size : {}", output.train_size);
    println!("Test size  : {}", output.test_size);
    println!("{}", output.report);

    if let Some(path) = &cfg.output.results_csv {
        ensure_parent(path)?;
        output
            .results
            .save_csv(path)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        info!(path = %path.display(), rows = output.results.len(), "wrote result table");
    }

    if let Some(path) = &cfg.output.report_json {
        ensure_parent(path)?;
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &output)?;
        info!(path = %path.display(), "wrote evaluation report");
    }

    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}
