//! Reference People for Regression Checks

use crate::synthetic::reference_crutch_height;
use feature_scaler::FeatureVector;
use inference_engine::{InferenceEngine, InferenceError};
use serde::Serialize;

/// Default allowed distance from the reference height (cm)
pub const DEFAULT_TOLERANCE_CM: f32 = 5.0;

/// A named person with a known reasonable crutch height
#[derive(Debug, Clone, Copy)]
pub struct GoldenCase {
    pub name: &'static str,
    pub features: FeatureVector,
}

impl GoldenCase {
    const fn new(
        name: &'static str,
        height: f32,
        armpit_to_wrist: f32,
        wrist_to_foot: f32,
        weight: f32,
    ) -> Self {
        Self {
            name,
            features: FeatureVector::from_array([height, armpit_to_wrist, wrist_to_foot, weight]),
        }
    }

    pub fn reference_cm(&self) -> f32 {
        reference_crutch_height(self.features.user_height_cm())
    }
}

/// Short, average, tall, heavy, and light people
pub const GOLDEN_CASES: [GoldenCase; 5] = [
    GoldenCase::new("Short Person", 150.0, 35.0, 45.0, 55.0),
    GoldenCase::new("Average Person", 170.0, 40.0, 50.0, 70.0),
    GoldenCase::new("Tall Person", 190.0, 45.0, 55.0, 85.0),
    GoldenCase::new("Heavy Person", 175.0, 42.0, 52.0, 95.0),
    GoldenCase::new("Light Person", 160.0, 38.0, 48.0, 50.0),
];

/// Outcome of one golden case
#[derive(Debug, Clone, Serialize)]
pub struct GoldenOutcome {
    pub name: &'static str,
    pub predicted_cm: f32,
    pub reference_cm: f32,
    pub within_tolerance: bool,
}

/// Run every golden case through the engine
pub fn check_golden(
    engine: &InferenceEngine,
    tolerance_cm: f32,
) -> Result<Vec<GoldenOutcome>, InferenceError> {
    GOLDEN_CASES
        .iter()
        .map(|case| {
            let predicted_cm = engine.predict_height(&case.features)?;
            let reference_cm = case.reference_cm();
            Ok(GoldenOutcome {
                name: case.name,
                predicted_cm,
                reference_cm,
                within_tolerance: (predicted_cm - reference_cm).abs() <= tolerance_cm,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_scaler::ScalerParams;
    use inference_engine::DenseNetwork;

    #[test]
    fn test_reference_values() {
        assert!((GOLDEN_CASES[0].reference_cm() - 115.5).abs() < 1e-3);
        assert!((GOLDEN_CASES[2].reference_cm() - 146.3).abs() < 1e-3);
    }

    #[test]
    fn test_check_flags_out_of_tolerance() {
        let scaler = ScalerParams::fit(&GOLDEN_CASES.map(|c| c.features)).unwrap();
        // Constant 130 cm: only the average and heavy people are within 5 cm
        let engine = InferenceEngine::new(scaler, Box::new(DenseNetwork::linear([0.0; 4], 130.0)));
        let outcomes = check_golden(&engine, DEFAULT_TOLERANCE_CM).unwrap();
        let passing: Vec<_> = outcomes
            .iter()
            .filter(|o| o.within_tolerance)
            .map(|o| o.name)
            .collect();
        assert_eq!(passing, vec!["Average Person", "Heavy Person"]);
    }
}
