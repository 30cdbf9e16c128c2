//! Plausibility Range Checks

use crate::error::ScalerError;
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES, TARGET_NAME};
use serde::{Deserialize, Serialize};

/// Plausible ranges for raw measurements and predictions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRanges {
    /// Body height (cm)
    pub user_height_cm: (f32, f32),
    /// Armpit to wrist (cm)
    pub armpit_to_wrist_cm: (f32, f32),
    /// Wrist to foot (cm)
    pub wrist_to_foot_cm: (f32, f32),
    /// Body weight (kg)
    pub user_weight_kg: (f32, f32),
    /// Recommended crutch height (cm)
    pub crutch_height_cm: (f32, f32),
}

impl Default for MeasurementRanges {
    fn default() -> Self {
        Self {
            user_height_cm: (50.0, 250.0),
            armpit_to_wrist_cm: (10.0, 150.0),
            wrist_to_foot_cm: (10.0, 150.0),
            user_weight_kg: (10.0, 300.0),
            crutch_height_cm: (30.0, 200.0),
        }
    }
}

impl MeasurementRanges {
    fn feature_ranges(&self) -> [(f32, f32); FEATURE_COUNT] {
        [
            self.user_height_cm,
            self.armpit_to_wrist_cm,
            self.wrist_to_foot_cm,
            self.user_weight_kg,
        ]
    }
}

/// Result of validating one feature vector
#[derive(Debug)]
pub struct ValidationResult {
    /// Whether all values are plausible
    pub valid: bool,
    /// Out-of-range findings
    pub errors: Vec<ScalerError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    fn from_errors(errors: Vec<ScalerError>, fields_checked: usize) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            fields_checked,
        }
    }
}

/// Range validator for measurements and predictions.
///
/// The scaling contract itself never bounds inputs or outputs; callers use
/// this to flag implausible values before trusting a prediction.
pub struct Validator {
    ranges: MeasurementRanges,
}

impl Validator {
    pub fn new(ranges: MeasurementRanges) -> Self {
        Self { ranges }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f32,
        range: (f32, f32),
    ) -> Result<(), ScalerError> {
        if !value.is_finite() || value < range.0 || value > range.1 {
            Err(ScalerError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate all four measurements, collecting every finding
    pub fn validate_features(&self, features: &FeatureVector) -> ValidationResult {
        let errors = self
            .ranges
            .feature_ranges()
            .iter()
            .enumerate()
            .filter_map(|(i, &range)| {
                self.validate_range(FEATURE_NAMES[i], features[i], range)
                    .err()
            })
            .collect();
        ValidationResult::from_errors(errors, FEATURE_COUNT)
    }

    /// Validate a predicted crutch height
    pub fn validate_prediction(&self, crutch_height_cm: f32) -> Result<(), ScalerError> {
        self.validate_range(TARGET_NAME, crutch_height_cm, self.ranges.crutch_height_cm)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(MeasurementRanges::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typical_person_is_valid() {
        let validator = Validator::default();
        let result = validator.validate_features(&FeatureVector::new(170.0, 40.0, 50.0, 70.0));
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.fields_checked, 4);
    }

    #[test]
    fn test_collects_every_out_of_range_field() {
        let validator = Validator::default();
        let result = validator.validate_features(&FeatureVector::new(400.0, 40.0, 5.0, 70.0));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert!(matches!(
            result.errors[0],
            ScalerError::OutOfRange { field: "UserHeight_cm", .. }
        ));
        assert!(matches!(
            result.errors[1],
            ScalerError::OutOfRange { field: "WristToFoot_cm", .. }
        ));
    }

    #[test]
    fn test_nan_is_out_of_range() {
        let validator = Validator::default();
        assert!(validator
            .validate_range("UserWeight_kg", f32::NAN, (10.0, 300.0))
            .is_err());
    }

    #[test]
    fn test_prediction_bounds() {
        let validator = Validator::default();
        assert!(validator.validate_prediction(130.0).is_ok());
        assert!(validator.validate_prediction(30.0).is_ok());
        assert!(validator.validate_prediction(12.0).is_err());
        assert!(validator.validate_prediction(480.0).is_err());
    }
}
