//! Training Error Types

use feature_scaler::ScalerError;
use inference_engine::InferenceError;
use thiserror::Error;

/// Errors while reading a training dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Required column absent from the header; the whole run is rejected
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    /// File extension is neither CSV nor a spreadsheet
    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    /// Workbook has no sheets
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    /// Header present but every row was dropped
    #[error("No complete rows in dataset ({dropped} dropped)")]
    NoCompleteRows { dropped: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Dataset I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for DatasetError {
    fn from(err: calamine::Error) -> Self {
        DatasetError::Spreadsheet(err.to_string())
    }
}

/// Errors during fitting, export, and optimization
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Scaler(#[from] ScalerError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// Too few rows to produce non-empty train and test splits
    #[error("Not enough rows to split: {rows} rows with test fraction {test_fraction}")]
    InsufficientData { rows: usize, test_fraction: f64 },

    /// Normal equations have no unique solution
    #[error("Least-squares system is singular at column {0}; try a positive ridge_lambda")]
    Singular(usize),

    /// Optimized model drifted too far from the original
    #[error("Optimized model deviates by {deviation_cm:.3} cm (max allowed {max_allowed_cm:.3} cm)")]
    ToleranceExceeded {
        deviation_cm: f32,
        max_allowed_cm: f32,
    },

    #[error("Training I/O error: {0}")]
    Io(#[from] std::io::Error),
}
