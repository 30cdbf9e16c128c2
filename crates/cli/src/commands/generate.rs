//! `crutch generate`

use anyhow::Context;
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;
use trainer::synthetic;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Number of people to generate
    #[arg(long, default_value_t = 500)]
    pub rows: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV file; stdout when omitted
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let dataset = synthetic::generate(args.rows, args.seed);
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Cannot create {}", path.display()))?;
            synthetic::write_csv(&dataset, BufWriter::new(file))?;
            info!("Wrote {} synthetic rows to {}", dataset.len(), path.display());
        }
        None => synthetic::write_csv(&dataset, std::io::stdout().lock())?,
    }
    Ok(())
}
