//! `crutch check`

use super::ModelArgs;
use crate::config::AppConfig;
use clap::Args;
use trainer::{check_golden, GOLDEN_CASES};

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Allowed distance from the reference height in cm
    #[arg(long, default_value_t = trainer::DEFAULT_TOLERANCE_CM)]
    pub tolerance: f32,
}

pub fn run(args: CheckArgs, config: &AppConfig) -> anyhow::Result<()> {
    let engine = args.model.load_engine(config)?;
    let outcomes = check_golden(&engine, args.tolerance)?;

    println!("Crutch height predictions for reference people\n");
    for (case, outcome) in GOLDEN_CASES.iter().zip(&outcomes) {
        let fv = &case.features;
        println!("  {}:", outcome.name);
        println!("    Height: {} cm", fv.user_height_cm());
        println!("    Armpit to Wrist: {} cm", fv.armpit_to_wrist_cm());
        println!("    Wrist to Foot: {} cm", fv.wrist_to_foot_cm());
        println!("    Weight: {} kg", fv.user_weight_kg());
        println!(
            "    Predicted Crutch Height: {:.1} cm (reference {:.1} cm) {}",
            outcome.predicted_cm,
            outcome.reference_cm,
            if outcome.within_tolerance { "OK" } else { "FAIL" }
        );
        println!();
    }

    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| !o.within_tolerance)
        .map(|o| o.name)
        .collect();
    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} people outside ±{} cm: {}",
            failed.len(),
            outcomes.len(),
            args.tolerance,
            failed.join(", ")
        );
    }
    println!("All {} people within ±{} cm", outcomes.len(), args.tolerance);
    Ok(())
}
