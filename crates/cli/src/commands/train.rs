//! `crutch train`

use crate::config::AppConfig;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// Training data (CSV or spreadsheet), overriding paths.data_file
    #[arg(long, short)]
    pub data: Option<PathBuf>,

    /// Held-out fraction, overriding training.test_fraction
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Split seed, overriding training.seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the training report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: TrainArgs, config: &AppConfig) -> anyhow::Result<()> {
    let data = args.data.unwrap_or_else(|| config.paths.data_file.clone());
    let mut training = config.training.clone();
    if let Some(fraction) = args.test_fraction {
        training.test_fraction = fraction;
    }
    if let Some(seed) = args.seed {
        training.seed = seed;
    }

    info!("Loading dataset from: {}", data.display());
    let report = trainer::train_from_file(&data, &config.paths.model_dir, &training)
        .with_context(|| format!("Training on {} failed", data.display()))?;

    for column in &report.degenerate_columns {
        warn!("Column {} is constant in the training split and scales to 0", column);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Test MAE (cm): {:.3}", report.metrics.mae);
    println!("\nTrue vs predicted crutch height (first {} test rows):", report.examples.len());
    for (truth, pred) in &report.examples {
        println!(
            "  True: {:.1} cm   Pred: {:.1} cm   Diff: {:.1} cm",
            truth,
            pred,
            pred - truth
        );
    }
    println!("\nRun {}", report.run_id);
    println!("  Scaler: {}", report.paths.scaler.display());
    println!(
        "  Model:  {} ({} bytes)",
        report.paths.model_json.display(),
        report.model_json_bytes
    );
    println!(
        "  Binary: {} ({} bytes)",
        report.paths.model_bin.display(),
        report.model_bin_bytes
    );
    Ok(())
}
