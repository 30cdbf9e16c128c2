//! Reduced-Precision Export
//!
//! Re-encodes the trained model with half-precision weights and refuses to
//! write it if predictions drift more than the allowed deviation from the
//! full-precision model.

use crate::error::TrainError;
use crate::golden::GOLDEN_CASES;
use crate::pipeline::ArtifactPaths;
use feature_scaler::{FeatureVector, ScalerArtifact, ScalerParams, FEATURE_COUNT};
use inference_engine::{InferenceError, ModelArtifact, Precision, Predictor};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default maximum absolute prediction drift (cm)
pub const DEFAULT_MAX_DEVIATION_CM: f32 = 1.0;

/// Grid points per feature between training min and max
const GRID_STEPS: usize = 3;

/// Outcome of an optimization pass
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeReport {
    pub original_bytes: u64,
    pub optimized_bytes: u64,
    pub max_deviation_cm: f32,
    pub samples: usize,
    pub optimized_path: PathBuf,
}

impl OptimizeReport {
    pub fn size_reduction_pct(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (self.original_bytes as f64 - self.optimized_bytes as f64) / self.original_bytes as f64
            * 100.0
    }
}

/// Write a half-precision copy of the model in `model_dir`
pub fn optimize(
    model_dir: impl AsRef<Path>,
    max_deviation_cm: f32,
) -> Result<OptimizeReport, TrainError> {
    let paths = ArtifactPaths::in_dir(model_dir);

    let scaler_artifact = ScalerArtifact::load(&paths.scaler)?;
    let scaler = scaler_artifact.validate()?;
    let original = ModelArtifact::load(&paths.model_json)?;
    original.ensure_matches(&scaler_artifact)?;

    info!("Converting model to half precision");
    let optimized = original.with_precision(Precision::F16)?;

    let samples = deviation_samples(&scaler);
    let deviation = max_deviation(
        &original.to_network()?,
        &optimized.to_network()?,
        &scaler,
        &samples,
    )?;
    info!(
        "Max prediction deviation over {} samples: {:.4} cm",
        samples.len(),
        deviation
    );
    if deviation > max_deviation_cm {
        return Err(TrainError::ToleranceExceeded {
            deviation_cm: deviation,
            max_allowed_cm: max_deviation_cm,
        });
    }

    let original_bytes = original.to_bytes()?.len() as u64;
    let optimized_bytes = optimized.save(&paths.model_optimized)?;

    let report = OptimizeReport {
        original_bytes,
        optimized_bytes,
        max_deviation_cm: deviation,
        samples: samples.len(),
        optimized_path: paths.model_optimized,
    };
    info!(
        "Original model: {:.2} KB, optimized model: {:.2} KB ({:.1}% smaller)",
        report.original_bytes as f64 / 1024.0,
        report.optimized_bytes as f64 / 1024.0,
        report.size_reduction_pct()
    );
    Ok(report)
}

/// Golden people plus a grid spanning the training range of every feature
pub fn deviation_samples(scaler: &ScalerParams) -> Vec<FeatureVector> {
    let mut samples: Vec<FeatureVector> = GOLDEN_CASES.iter().map(|c| c.features).collect();

    let levels: Vec<[f32; GRID_STEPS]> = (0..FEATURE_COUNT)
        .map(|i| {
            let (lo, hi) = (scaler.data_min()[i], scaler.data_max()[i]);
            [lo, (lo + hi) / 2.0, hi]
        })
        .collect();

    for idx in 0..GRID_STEPS.pow(FEATURE_COUNT as u32) {
        let mut values = [0.0f32; FEATURE_COUNT];
        let mut rest = idx;
        for (i, value) in values.iter_mut().enumerate() {
            *value = levels[i][rest % GRID_STEPS];
            rest /= GRID_STEPS;
        }
        samples.push(FeatureVector::from_array(values));
    }
    samples
}

/// Largest absolute difference between two predictors over the samples
pub fn max_deviation(
    reference: &dyn Predictor,
    candidate: &dyn Predictor,
    scaler: &ScalerParams,
    samples: &[FeatureVector],
) -> Result<f32, InferenceError> {
    samples.iter().try_fold(0.0f32, |acc, fv| {
        let x = scaler.transform(fv);
        let d = (reference.predict(&x)? - candidate.predict(&x)?).abs();
        Ok(acc.max(d))
    })
}
