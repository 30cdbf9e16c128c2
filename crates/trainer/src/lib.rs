//! Crutch Height Trainer
//!
//! Loads measurement datasets, fits the feature scaler and predictor,
//! exports matched artifacts, and produces the reduced-precision model.

mod dataset;
mod error;
mod golden;
mod metrics;
mod optimize;
mod pipeline;
mod regression;
mod split;
pub mod synthetic;

pub use dataset::Dataset;
pub use error::{DatasetError, TrainError};
pub use golden::{check_golden, GoldenCase, GoldenOutcome, DEFAULT_TOLERANCE_CM, GOLDEN_CASES};
pub use metrics::RegressionMetrics;
pub use optimize::{
    deviation_samples, max_deviation, optimize, OptimizeReport, DEFAULT_MAX_DEVIATION_CM,
};
pub use pipeline::{
    train, train_from_file, ArtifactPaths, TrainReport, TrainingConfig, MODEL_BIN_FILE,
    MODEL_JSON_FILE, MODEL_OPTIMIZED_FILE, SCALER_FILE,
};
pub use regression::fit_linear;
pub use split::train_test_split;
