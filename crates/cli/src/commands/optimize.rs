//! `crutch optimize`

use crate::config::AppConfig;
use anyhow::Context;
use clap::Args;

#[derive(Debug, Args)]
pub struct OptimizeArgs {
    /// Allowed prediction drift in cm, overriding optimize.max_deviation_cm
    #[arg(long)]
    pub max_deviation: Option<f32>,
}

pub fn run(args: OptimizeArgs, config: &AppConfig) -> anyhow::Result<()> {
    let max_deviation = args
        .max_deviation
        .unwrap_or(config.optimize.max_deviation_cm);
    let report = trainer::optimize(&config.paths.model_dir, max_deviation)
        .context("Optimization failed")?;

    println!("Model optimization results");
    println!(
        "  Original model:  {:.2} KB",
        report.original_bytes as f64 / 1024.0
    );
    println!(
        "  Optimized model: {:.2} KB",
        report.optimized_bytes as f64 / 1024.0
    );
    println!("  Size reduction:  {:.1}%", report.size_reduction_pct());
    println!(
        "  Max deviation:   {:.4} cm over {} samples (limit {:.2} cm)",
        report.max_deviation_cm, report.samples, max_deviation
    );
    println!("\nOptimized model saved to: {}", report.optimized_path.display());
    Ok(())
}
