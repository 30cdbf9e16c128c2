//! Predictor Seam

use crate::InferenceError;
use feature_scaler::ScaledFeatureVector;

/// A fixed-shape function from one scaled feature vector to one crutch height (cm)
pub trait Predictor {
    /// Run the function on a single sample
    fn predict(&self, features: &ScaledFeatureVector) -> Result<f32, InferenceError>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}
