//! Feature Vector Layout

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of input features
pub const FEATURE_COUNT: usize = 4;

/// Dataset column names, in model input order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "UserHeight_cm",
    "ArmpitToWrist_cm",
    "WristToFoot_cm",
    "UserWeight_kg",
];

/// Dataset column holding the regression target
pub const TARGET_NAME: &str = "RecommendedCrutchHeight_cm";

/// Raw measurements for one person.
///
/// The order of the underlying array is the model input order; a
/// transposition produces wrong predictions without any error, so callers
/// should build vectors with [`FeatureVector::new`] rather than raw arrays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    /// Create a feature vector from named measurements
    pub const fn new(
        user_height_cm: f32,
        armpit_to_wrist_cm: f32,
        wrist_to_foot_cm: f32,
        user_weight_kg: f32,
    ) -> Self {
        Self([
            user_height_cm,
            armpit_to_wrist_cm,
            wrist_to_foot_cm,
            user_weight_kg,
        ])
    }

    /// Wrap an array already in model input order
    pub const fn from_array(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }

    pub fn user_height_cm(&self) -> f32 {
        self.0[0]
    }

    pub fn armpit_to_wrist_cm(&self) -> f32 {
        self.0[1]
    }

    pub fn wrist_to_foot_cm(&self) -> f32 {
        self.0[2]
    }

    pub fn user_weight_kg(&self) -> f32 {
        self.0[3]
    }
}

impl Index<usize> for FeatureVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

/// Min-max scaled features, the only input a predictor accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaledFeatureVector([f32; FEATURE_COUNT]);

impl ScaledFeatureVector {
    /// Wrap values that were already scaled with the matching params
    pub fn from_array(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Whether every component lies in [0, 1] (true for in-distribution inputs)
    pub fn is_within_unit_range(&self) -> bool {
        self.0.iter().all(|v| (0.0..=1.0).contains(v))
    }
}

impl Index<usize> for ScaledFeatureVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}
