//! Layered Application Configuration
//!
//! Built-in defaults, then an optional TOML file, then `CRUTCH__SECTION__KEY`
//! environment variables. Command line flags are applied on top by each
//! command.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use trainer::TrainingConfig;

/// Config file read from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "crutch.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub training: TrainingConfig,
    pub optimize: OptimizeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Measurement spreadsheet or CSV used for training
    pub data_file: PathBuf,
    /// Directory holding the scaler and model artifacts
    pub model_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeConfig {
    pub max_deviation_cm: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl AppConfig {
    /// Load configuration; an explicit `path` must exist
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = TrainingConfig::default();
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        Config::builder()
            .set_default("paths.data_file", "height_segments_with_weight.xlsx")?
            .set_default("paths.model_dir", "models")?
            .set_default("training.test_fraction", defaults.test_fraction)?
            .set_default("training.seed", defaults.seed)?
            .set_default("training.ridge_lambda", defaults.ridge_lambda)?
            .set_default(
                "optimize.max_deviation_cm",
                f64::from(trainer::DEFAULT_MAX_DEVIATION_CM),
            )?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .add_source(file)
            .add_source(
                Environment::with_prefix("CRUTCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
