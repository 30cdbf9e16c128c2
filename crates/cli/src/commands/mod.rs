//! Command implementations

pub mod check;
pub mod generate;
pub mod guide;
pub mod optimize;
pub mod predict;
pub mod train;

use crate::config::AppConfig;
use anyhow::Context;
use clap::Args;
use inference_engine::InferenceEngine;
use std::path::PathBuf;
use trainer::ArtifactPaths;

/// Artifact selection shared by commands that load a model
#[derive(Debug, Clone, Default, Args)]
pub struct ModelArgs {
    /// Scaler artifact (defaults to <model_dir>/scaler.json)
    #[arg(long)]
    pub scaler: Option<PathBuf>,

    /// Model artifact or ONNX graph (defaults to <model_dir>/crutch_height_model.json)
    #[arg(long)]
    pub model: Option<PathBuf>,
}

impl ModelArgs {
    pub fn scaler_path(&self, config: &AppConfig) -> PathBuf {
        self.scaler
            .clone()
            .unwrap_or_else(|| ArtifactPaths::in_dir(&config.paths.model_dir).scaler)
    }

    pub fn model_path(&self, config: &AppConfig) -> PathBuf {
        self.model
            .clone()
            .unwrap_or_else(|| ArtifactPaths::in_dir(&config.paths.model_dir).model_json)
    }

    /// Load the scaler and model as one engine
    pub fn load_engine(&self, config: &AppConfig) -> anyhow::Result<InferenceEngine> {
        let scaler = self.scaler_path(config);
        let model = self.model_path(config);
        InferenceEngine::load(&scaler, &model).with_context(|| {
            format!(
                "Failed to load model {} with scaler {}",
                model.display(),
                scaler.display()
            )
        })
    }
}
