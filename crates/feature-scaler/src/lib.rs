//! Feature Scaling
//!
//! Min-max scaling for crutch height measurements, the persisted scaler
//! artifact, and plausibility range checks for raw inputs and predictions.

mod artifact;
mod error;
mod features;
mod scaler;
mod validator;

pub use artifact::{ScalerArtifact, SCALER_SCHEMA};
pub use error::ScalerError;
pub use features::{
    FeatureVector, ScaledFeatureVector, FEATURE_COUNT, FEATURE_NAMES, TARGET_NAME,
};
pub use scaler::ScalerParams;
pub use validator::{MeasurementRanges, ValidationResult, Validator};
