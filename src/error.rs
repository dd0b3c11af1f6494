use thiserror::Error;

/// Errors raised by the forecasting pipeline.
///
/// Every variant is terminal for the run that produced it.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Failed to load consumption data: {0}")]
    Load(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Model fit failed: {0}")]
    Fit(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Division by zero: actual value at index {index} is zero")]
    DivisionByZero { index: usize },

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Dimension mismatch: actual={actual}, predicted={predicted}")]
    DimensionMismatch { actual: usize, predicted: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ForecastError>;
