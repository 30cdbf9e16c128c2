//! Crutch Height Inference Engine
//!
//! Runs the scaled-feature → crutch-height function, either as a dense
//! network loaded from a model artifact or as an ONNX graph through tract.

mod artifact;
mod engine;
mod network;
mod onnx;
mod predictor;

pub use artifact::{LayerRecord, ModelArtifact, Precision, TensorData, MODEL_SCHEMA};
pub use engine::{InferenceEngine, InferenceResult, Prediction};
pub use network::{Activation, DenseLayer, DenseNetwork};
pub use onnx::OnnxPredictor;
pub use predictor::Predictor;

use feature_scaler::ScalerError;
use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Unsupported model schema: expected {expected}, got {actual}")]
    SchemaMismatch {
        expected: &'static str,
        actual: String,
    },
    #[error("Model and scaler come from different training runs ({field}: scaler {scaler}, model {model})")]
    ArtifactMismatch {
        field: &'static str,
        scaler: String,
        model: String,
    },
    #[error(transparent)]
    Scaler(#[from] ScalerError),
    #[error("Model artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Model artifact JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Model artifact binary error: {0}")]
    Binary(#[from] postcard::Error),
}
