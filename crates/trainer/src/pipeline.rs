//! Training Pipeline
//!
//! load → split → fit scaler → fit predictor → evaluate → export the
//! scaler and model artifacts as a matched pair.

use crate::dataset::Dataset;
use crate::error::TrainError;
use crate::metrics::RegressionMetrics;
use crate::regression::fit_linear;
use crate::split::train_test_split;
use feature_scaler::{ScalerArtifact, ScalerParams};
use inference_engine::{ModelArtifact, Precision, Predictor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const SCALER_FILE: &str = "scaler.json";
pub const MODEL_JSON_FILE: &str = "crutch_height_model.json";
pub const MODEL_BIN_FILE: &str = "crutch_height_model.bin";
pub const MODEL_OPTIMIZED_FILE: &str = "crutch_height_model_optimized.bin";

/// Number of held-out rows echoed after evaluation
const EXAMPLE_ROWS: usize = 10;

/// Artifact locations inside a model directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub model_json: PathBuf,
    pub model_bin: PathBuf,
    pub model_optimized: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            scaler: dir.join(SCALER_FILE),
            model_json: dir.join(MODEL_JSON_FILE),
            model_bin: dir.join(MODEL_BIN_FILE),
            model_optimized: dir.join(MODEL_OPTIMIZED_FILE),
        }
    }
}

/// Training parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,
    /// Shuffle seed for the split
    pub seed: u64,
    /// Ridge penalty on feature weights
    pub ridge_lambda: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            ridge_lambda: 1e-3,
        }
    }
}

/// Summary of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub run_id: Uuid,
    pub train_rows: usize,
    pub test_rows: usize,
    pub metrics: RegressionMetrics,
    /// (true, predicted) for the first held-out rows
    pub examples: Vec<(f32, f32)>,
    pub degenerate_columns: Vec<&'static str>,
    pub paths: ArtifactPaths,
    pub model_json_bytes: u64,
    pub model_bin_bytes: u64,
}

/// Load a dataset file and train on it
pub fn train_from_file(
    data_file: impl AsRef<Path>,
    model_dir: impl AsRef<Path>,
    config: &TrainingConfig,
) -> Result<TrainReport, TrainError> {
    let dataset = Dataset::load(data_file)?;
    train(&dataset, model_dir, config)
}

/// Fit, evaluate, and export artifacts into `model_dir`
pub fn train(
    dataset: &Dataset,
    model_dir: impl AsRef<Path>,
    config: &TrainingConfig,
) -> Result<TrainReport, TrainError> {
    let (train_set, test_set) = train_test_split(dataset, config.test_fraction, config.seed)?;
    info!(
        "Train size: {} rows, test size: {} rows",
        train_set.len(),
        test_set.len()
    );

    let scaler = ScalerParams::fit(&train_set.features)?;
    let train_scaled = scaler.transform_batch(&train_set.features);
    let network = fit_linear(&train_scaled, &train_set.targets, config.ridge_lambda)?;
    info!("Fitted predictor: {}", network.describe());

    let predictions = scaler
        .transform_batch(&test_set.features)
        .iter()
        .map(|x| network.predict(x))
        .collect::<Result<Vec<f32>, _>>()?;
    let metrics = RegressionMetrics::compute(&predictions, &test_set.targets);
    info!("Test MAE (cm): {:.3}", metrics.mae);

    let examples: Vec<(f32, f32)> = test_set
        .targets
        .iter()
        .copied()
        .zip(predictions.iter().copied())
        .take(EXAMPLE_ROWS)
        .collect();
    for &(truth, pred) in &examples {
        info!(
            "True: {:.1} cm   Pred: {:.1} cm   Diff: {:.1} cm",
            truth,
            pred,
            pred - truth
        );
    }

    let model_dir = model_dir.as_ref();
    std::fs::create_dir_all(model_dir)?;
    let paths = ArtifactPaths::in_dir(model_dir);
    let run_id = Uuid::new_v4();

    let scaler_artifact = ScalerArtifact::new(&scaler, run_id);
    scaler_artifact.save(&paths.scaler)?;

    let model = ModelArtifact::from_network(
        &network,
        run_id,
        scaler_artifact.fingerprint.clone(),
        Precision::F32,
    );
    let model_json_bytes = model.save(&paths.model_json)?;
    let model_bin_bytes = model.save(&paths.model_bin)?;

    info!("Training run {} complete", run_id);

    Ok(TrainReport {
        run_id,
        train_rows: train_set.len(),
        test_rows: test_set.len(),
        metrics,
        examples,
        degenerate_columns: scaler.degenerate_columns(),
        paths,
        model_json_bytes,
        model_bin_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;

    #[test]
    fn test_artifact_paths() {
        let paths = ArtifactPaths::in_dir("models");
        assert_eq!(paths.scaler, Path::new("models/scaler.json"));
        assert_eq!(paths.model_bin, Path::new("models/crutch_height_model.bin"));
    }

    #[test]
    fn test_train_writes_matched_pair() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = synthetic::generate(200, 11);
        let report = train(&dataset, dir.path(), &TrainingConfig::default()).unwrap();

        assert_eq!(report.train_rows, 160);
        assert_eq!(report.test_rows, 40);
        assert_eq!(report.examples.len(), 10);
        assert!(report.metrics.mae < 2.0, "mae {}", report.metrics.mae);
        assert!(report.degenerate_columns.is_empty());

        let scaler = ScalerArtifact::load(&report.paths.scaler).unwrap();
        let model = ModelArtifact::load(&report.paths.model_bin).unwrap();
        assert_eq!(scaler.run_id, report.run_id);
        model.ensure_matches(&scaler).unwrap();
        assert!(report.model_bin_bytes < report.model_json_bytes);
    }

    #[test]
    fn test_constant_weight_column_still_trains() {
        let dir = tempfile::tempdir().unwrap();
        let mut dataset = synthetic::generate(100, 5);
        for fv in dataset.features.iter_mut() {
            let a = *fv.as_array();
            *fv = feature_scaler::FeatureVector::new(a[0], a[1], a[2], 70.0);
        }
        let report = train(&dataset, dir.path(), &TrainingConfig::default()).unwrap();
        assert_eq!(report.degenerate_columns, vec!["UserWeight_kg"]);
        assert!(report.metrics.mae < 2.0);
    }
}
