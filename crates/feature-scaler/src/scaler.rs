//! Min-Max Scaler

use crate::error::ScalerError;
use crate::features::{FeatureVector, ScaledFeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Per-feature bounds fitted on a training set.
///
/// Scaling is `(x - min) / (max - min)` in `f32`, with no clamping. A
/// degenerate column (`min == max`) maps every input to `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    data_min: [f32; FEATURE_COUNT],
    data_max: [f32; FEATURE_COUNT],
}

impl ScalerParams {
    /// Build params from stored bounds
    pub fn new(
        data_min: [f32; FEATURE_COUNT],
        data_max: [f32; FEATURE_COUNT],
    ) -> Result<Self, ScalerError> {
        for i in 0..FEATURE_COUNT {
            for (bound, value) in [("min", data_min[i]), ("max", data_max[i])] {
                if !value.is_finite() {
                    return Err(ScalerError::NonFiniteBound {
                        field: FEATURE_NAMES[i],
                        bound,
                        value,
                    });
                }
            }
            if data_min[i] > data_max[i] {
                return Err(ScalerError::InvertedRange {
                    field: FEATURE_NAMES[i],
                    min: data_min[i],
                    max: data_max[i],
                });
            }
        }
        Ok(Self { data_min, data_max })
    }

    /// Fit per-column min and max over all samples
    pub fn fit(samples: &[FeatureVector]) -> Result<Self, ScalerError> {
        if samples.is_empty() {
            return Err(ScalerError::EmptySamples);
        }

        let mut data_min = [f32::MAX; FEATURE_COUNT];
        let mut data_max = [f32::MIN; FEATURE_COUNT];

        for (row, sample) in samples.iter().enumerate() {
            for (i, &value) in sample.as_array().iter().enumerate() {
                if !value.is_finite() {
                    return Err(ScalerError::NonFinite {
                        field: FEATURE_NAMES[i],
                        row,
                        value,
                    });
                }
                data_min[i] = data_min[i].min(value);
                data_max[i] = data_max[i].max(value);
            }
        }

        let params = Self { data_min, data_max };
        for name in params.degenerate_columns() {
            warn!(
                "Column {} has zero range in training data; it will scale to 0.0",
                name
            );
        }
        debug!(
            "Fitted scaler on {} samples: min={:?} max={:?}",
            samples.len(),
            data_min,
            data_max
        );

        Ok(params)
    }

    /// Scale one feature vector
    pub fn transform(&self, features: &FeatureVector) -> ScaledFeatureVector {
        let x = features.as_array();
        let mut scaled = [0.0f32; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            let range = self.data_max[i] - self.data_min[i];
            scaled[i] = if range > 0.0 {
                (x[i] - self.data_min[i]) / range
            } else {
                0.0
            };
        }
        ScaledFeatureVector::from_array(scaled)
    }

    /// Scale a batch of feature vectors
    pub fn transform_batch(&self, samples: &[FeatureVector]) -> Vec<ScaledFeatureVector> {
        samples.iter().map(|s| self.transform(s)).collect()
    }

    pub fn data_min(&self) -> &[f32; FEATURE_COUNT] {
        &self.data_min
    }

    pub fn data_max(&self) -> &[f32; FEATURE_COUNT] {
        &self.data_max
    }

    /// Per-feature `max - min`
    pub fn data_range(&self) -> [f32; FEATURE_COUNT] {
        let mut range = [0.0f32; FEATURE_COUNT];
        for (i, r) in range.iter_mut().enumerate() {
            *r = self.data_max[i] - self.data_min[i];
        }
        range
    }

    /// Whether column `index` has zero range
    pub fn is_degenerate(&self, index: usize) -> bool {
        self.data_max[index] <= self.data_min[index]
    }

    /// Names of all zero-range columns
    pub fn degenerate_columns(&self) -> Vec<&'static str> {
        (0..FEATURE_COUNT)
            .filter(|&i| self.is_degenerate(i))
            .map(|i| FEATURE_NAMES[i])
            .collect()
    }

    /// SHA-256 over the little-endian bytes of min then max, hex encoded.
    ///
    /// Model artifacts record this value to bind them to the scaler they
    /// were trained with.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for value in self.data_min.iter().chain(self.data_max.iter()) {
            hasher.update(value.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }
}
