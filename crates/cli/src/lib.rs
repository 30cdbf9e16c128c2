//! Crutch Height Estimator CLI
//!
//! Command parsing, logging setup, and dispatch to the train, optimize,
//! predict, check, guide, and generate commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod config;

pub use config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "crutch", version, about = "Crutch height estimator")]
pub struct Cli {
    /// Configuration file (defaults to ./crutch.toml when present)
    #[arg(long, global = true, env = "CRUTCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Artifact directory, overriding paths.model_dir
    #[arg(long, global = true)]
    pub model_dir: Option<PathBuf>,

    /// Log level or filter directive, overriding logging.level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fit the scaler and predictor and export the artifact pair
    Train(commands::train::TrainArgs),
    /// Write the half-precision model and report size and drift
    Optimize(commands::optimize::OptimizeArgs),
    /// Predict a crutch height, once from flags or interactively
    Predict(commands::predict::PredictArgs),
    /// Run the reference people through the model
    Check(commands::check::CheckArgs),
    /// Print scaler constants and mobile/embedded integration snippets
    Guide(commands::guide::GuideArgs),
    /// Write a synthetic measurement dataset as CSV
    Generate(commands::generate::GenerateArgs),
}

impl Cli {
    /// Apply global flags on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.model_dir {
            config.paths.model_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Initialize logging; `RUST_LOG` takes precedence over `level`
pub fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {e}");
    }
}

/// Run the selected command
pub fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Train(args) => commands::train::run(args, config),
        Commands::Optimize(args) => commands::optimize::run(args, config),
        Commands::Predict(args) => commands::predict::run(args, config),
        Commands::Check(args) => commands::check::run(args, config),
        Commands::Guide(args) => commands::guide::run(args, config),
        Commands::Generate(args) => commands::generate::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "crutch",
            "check",
            "--model-dir",
            "elsewhere",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let mut config = AppConfig::load(None).unwrap();
        cli.apply_overrides(&mut config);
        assert_eq!(config.paths.model_dir, PathBuf::from("elsewhere"));
        assert_eq!(config.logging.level, "debug");
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn test_generate_train_optimize_check() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.csv");
        let models = dir.path().join("models");
        let guide = dir.path().join("guide.txt");

        let mut config = AppConfig::load(None).unwrap();
        config.paths.data_file = data.clone();
        config.paths.model_dir = models.clone();

        let steps: [&[&str]; 5] = [
            &["crutch", "generate", "--rows", "300", "--output", data.to_str().unwrap()],
            &["crutch", "train"],
            &["crutch", "optimize"],
            &["crutch", "check"],
            &["crutch", "guide", "--output", guide.to_str().unwrap()],
        ];
        for args in steps {
            let cli = Cli::try_parse_from(args).unwrap();
            run(cli, &config).unwrap_or_else(|e| panic!("{args:?}: {e:#}"));
        }

        assert!(models.join(trainer::MODEL_OPTIMIZED_FILE).exists());
        let text = std::fs::read_to_string(&guide).unwrap();
        assert!(text.contains("floatArrayOf("));
        assert!(text.contains(trainer::MODEL_OPTIMIZED_FILE));
    }

    #[test]
    fn test_check_fails_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::load(None).unwrap();
        config.paths.model_dir = dir.path().to_path_buf();
        let cli = Cli::try_parse_from(["crutch", "check"]).unwrap();
        assert!(run(cli, &config).is_err());
    }
}
