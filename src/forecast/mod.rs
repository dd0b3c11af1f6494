pub mod engine;
pub mod features;
pub mod loader;
pub mod metrics;
pub mod partition;
pub mod results;

pub use crate::error::{ForecastError, Result};
pub use engine::*;
pub use features::{derive_features, CalendarFeatures, FeatureTable, RegionEncoder};
pub use loader::{LoadedRecords, RecordLoader};
pub use metrics::EvaluationReport;
pub use partition::{partition, PartitionedDataset, SplitStrategy};
pub use results::{ResultRow, ResultTable};
