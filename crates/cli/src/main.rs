//! Crutch Height Estimator - Main Entry Point

use anyhow::Context;
use clap::Parser;
use crutch_cli::{init_logging, run, AppConfig, Cli};
use tracing::debug;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    init_logging(&config.logging.level, config.logging.json);

    debug!("=== Crutch Height Estimator v{} ===", env!("CARGO_PKG_VERSION"));
    debug!("Configuration: {:?}", config);

    run(cli, &config)
}
