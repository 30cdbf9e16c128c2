//! Inference Engine Implementation

use crate::artifact::ModelArtifact;
use crate::onnx::OnnxPredictor;
use crate::predictor::Predictor;
use crate::InferenceError;
use feature_scaler::{FeatureVector, ScaledFeatureVector, ScalerArtifact, ScalerParams};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Prediction for one person
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Recommended crutch height (cm), unbounded
    pub crutch_height_cm: f32,
    /// Features as seen by the predictor
    pub scaled: ScaledFeatureVector,
}

/// Result of inference operation
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// The prediction
    pub prediction: Prediction,
    /// Inference latency in microseconds
    pub latency_us: u64,
}

/// Scaler and predictor from one training run, built once and passed by reference
pub struct InferenceEngine {
    scaler: ScalerParams,
    predictor: Box<dyn Predictor>,
    run_id: Option<Uuid>,
}

impl InferenceEngine {
    /// Pair already-loaded parts; the caller vouches that they match
    pub fn new(scaler: ScalerParams, predictor: Box<dyn Predictor>) -> Self {
        Self {
            scaler,
            predictor,
            run_id: None,
        }
    }

    /// Load a scaler artifact and a model, refusing pairs from different runs.
    ///
    /// `.onnx` models are executed with tract and cannot be checked against
    /// the scaler; any other extension is read as a model artifact.
    pub fn load(
        scaler_path: impl AsRef<Path>,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, InferenceError> {
        let model_path = model_path.as_ref();
        let scaler_artifact = ScalerArtifact::load(scaler_path)?;
        let scaler = scaler_artifact.validate()?;

        let is_onnx = model_path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("onnx"))
            .unwrap_or(false);

        let predictor: Box<dyn Predictor> = if is_onnx {
            warn!(
                "ONNX model {} has no run binding; assuming it matches scaler run {}",
                model_path.display(),
                scaler_artifact.run_id
            );
            Box::new(OnnxPredictor::load(model_path)?)
        } else {
            let model = ModelArtifact::load(model_path)?;
            model.ensure_matches(&scaler_artifact)?;
            Box::new(model.to_network()?)
        };

        info!(
            "Inference engine ready: {} (run {})",
            predictor.describe(),
            scaler_artifact.run_id
        );

        Ok(Self {
            scaler,
            predictor,
            run_id: Some(scaler_artifact.run_id),
        })
    }

    /// Scale and predict one feature vector
    pub fn predict(&self, features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        let start = Instant::now();

        let scaled = self.scaler.transform(features);
        let crutch_height_cm = self.predictor.predict(&scaled)?;

        let latency_us = start.elapsed().as_micros() as u64;
        debug!(
            "Predicted {:.2} cm for {:?} in {}us",
            crutch_height_cm,
            features.as_array(),
            latency_us
        );

        Ok(InferenceResult {
            prediction: Prediction {
                crutch_height_cm,
                scaled,
            },
            latency_us,
        })
    }

    /// Predict only the crutch height
    pub fn predict_height(&self, features: &FeatureVector) -> Result<f32, InferenceError> {
        Ok(self.predict(features)?.prediction.crutch_height_cm)
    }

    pub fn scaler(&self) -> &ScalerParams {
        &self.scaler
    }

    pub fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }

    /// Training run shared by both artifacts, when loaded from disk
    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Precision;
    use crate::network::DenseNetwork;

    fn scaler() -> ScalerParams {
        ScalerParams::fit(&[
            FeatureVector::new(140.0, 30.0, 40.0, 40.0),
            FeatureVector::new(200.0, 50.0, 60.0, 120.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_predict_scales_before_predicting() {
        // Only height contributes: 100 + 60 * scaled_height
        let engine = InferenceEngine::new(
            scaler(),
            Box::new(DenseNetwork::linear([60.0, 0.0, 0.0, 0.0], 100.0)),
        );
        let result = engine
            .predict(&FeatureVector::new(170.0, 40.0, 50.0, 80.0))
            .unwrap();
        assert_eq!(result.prediction.scaled.as_array(), &[0.5, 0.5, 0.5, 0.5]);
        assert_eq!(result.prediction.crutch_height_cm, 130.0);
        assert!(engine.run_id().is_none());
    }

    #[test]
    fn test_load_matched_pair() {
        let dir = tempfile::tempdir().unwrap();
        let params = scaler();
        let run_id = Uuid::new_v4();
        let scaler_artifact = ScalerArtifact::new(&params, run_id);
        scaler_artifact.save(dir.path().join("scaler.json")).unwrap();

        let network = DenseNetwork::linear([60.0, 0.0, 0.0, 0.0], 100.0);
        ModelArtifact::from_network(&network, run_id, params.fingerprint(), Precision::F32)
            .save(dir.path().join("model.bin"))
            .unwrap();

        let engine =
            InferenceEngine::load(dir.path().join("scaler.json"), dir.path().join("model.bin"))
                .unwrap();
        assert_eq!(engine.run_id(), Some(run_id));
        let height = engine
            .predict_height(&FeatureVector::new(200.0, 40.0, 50.0, 80.0))
            .unwrap();
        assert_eq!(height, 160.0);
    }

    #[test]
    fn test_load_rejects_pair_from_other_run() {
        let dir = tempfile::tempdir().unwrap();
        let params = scaler();
        ScalerArtifact::new(&params, Uuid::new_v4())
            .save(dir.path().join("scaler.json"))
            .unwrap();
        ModelArtifact::from_network(
            &DenseNetwork::linear([1.0; 4], 0.0),
            Uuid::new_v4(),
            params.fingerprint(),
            Precision::F32,
        )
        .save(dir.path().join("model.json"))
        .unwrap();

        let result =
            InferenceEngine::load(dir.path().join("scaler.json"), dir.path().join("model.json"));
        assert!(matches!(
            result,
            Err(InferenceError::ArtifactMismatch { .. })
        ));
    }

    #[test]
    fn test_load_missing_scaler() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            InferenceEngine::load(dir.path().join("scaler.json"), dir.path().join("model.bin"));
        assert!(matches!(result, Err(InferenceError::Scaler(_))));
    }
}
