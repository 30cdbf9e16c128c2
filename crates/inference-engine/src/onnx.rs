//! ONNX Predictor using tract

use crate::predictor::Predictor;
use crate::InferenceError;
use feature_scaler::{ScaledFeatureVector, FEATURE_COUNT};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tract_onnx::prelude::*;

type Plan = TypedRunnableModel<TypedModel>;

/// Predictor backed by an ONNX graph with input `(1,4)` f32 and output `(1,1)` f32.
///
/// ONNX files carry no link to a scaler artifact, so the caller is
/// responsible for pairing them.
pub struct OnnxPredictor {
    model_path: PathBuf,
    plan: Plan,
}

impl OnnxPredictor {
    /// Load, optimize, and check the graph's input and output shapes
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading ONNX model from {}", path.display());

        let load_err = |e: TractError| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        };

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(load_err)?;

        let output = plan.model().output_fact(0).map_err(load_err)?;
        let shape = output.shape.as_concrete().map(|s| s.to_vec());
        if output.datum_type != f32::datum_type() || shape.as_deref() != Some(&[1, 1][..]) {
            return Err(InferenceError::InvalidInputShape {
                expected: "output (1, 1) f32".to_string(),
                actual: format!("output {:?} {:?}", shape, output.datum_type),
            });
        }

        Ok(Self {
            model_path: path.to_path_buf(),
            plan,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, features: &ScaledFeatureVector) -> Result<f32, InferenceError> {
        let failed = |e: TractError| InferenceError::InferenceFailed(e.to_string());

        let input = Tensor::from_shape(&[1, FEATURE_COUNT], features.as_slice()).map_err(failed)?;
        let outputs = self.plan.run(tvec!(input.into())).map_err(failed)?;
        let view = outputs[0].to_array_view::<f32>().map_err(failed)?;
        debug!("ONNX output shape {:?}", view.shape());

        match view.iter().next() {
            Some(value) if value.is_finite() => Ok(*value),
            Some(value) => Err(InferenceError::InferenceFailed(format!(
                "non-finite output {}",
                value
            ))),
            None => Err(InferenceError::InferenceFailed(
                "empty output tensor".to_string(),
            )),
        }
    }

    fn describe(&self) -> String {
        format!("onnx graph {}", self.model_path.display())
    }
}
