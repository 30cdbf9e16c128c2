//! Scaler Error Types

use thiserror::Error;

/// Errors raised while fitting, loading, or validating scaler inputs
#[derive(Debug, Error)]
pub enum ScalerError {
    /// Fit called with no rows
    #[error("Cannot fit scaler on an empty sample set")]
    EmptySamples,

    /// NaN or infinity in a training row
    #[error("Non-finite value {value} for {field} at row {row}")]
    NonFinite {
        field: &'static str,
        row: usize,
        value: f32,
    },

    /// NaN or infinity in a stored min or max
    #[error("Non-finite {bound} bound {value} for {field}")]
    NonFiniteBound {
        field: &'static str,
        bound: &'static str,
        value: f32,
    },

    /// Stored bounds with min above max
    #[error("Inverted range for {field}: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    /// Value out of the plausible range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// Artifact written by an unknown schema version
    #[error("Unsupported scaler schema: expected {expected}, got {actual}")]
    SchemaMismatch {
        expected: &'static str,
        actual: String,
    },

    /// Artifact lists features in a different order
    #[error("Feature order mismatch at position {position}: expected {expected}, got {actual}")]
    FeatureOrder {
        position: usize,
        expected: &'static str,
        actual: String,
    },

    /// Stored fingerprint does not match the stored bounds
    #[error("Scaler fingerprint mismatch: stored {stored}, computed {computed}")]
    FingerprintMismatch { stored: String, computed: String },

    /// Artifact file could not be read or written
    #[error("Scaler artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact file is not valid JSON for the schema
    #[error("Scaler artifact format error: {0}")]
    Format(#[from] serde_json::Error),
}
