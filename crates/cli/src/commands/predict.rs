//! `crutch predict`
//!
//! One-shot prediction when all four measurements are given as flags,
//! otherwise an interactive session that keeps asking until Ctrl+C or EOF.

use super::ModelArgs;
use crate::config::AppConfig;
use clap::Args;
use feature_scaler::{FeatureVector, Validator, FEATURE_COUNT};
use inference_engine::{InferenceEngine, InferenceError};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use thiserror::Error;

const PROMPTS: [&str; FEATURE_COUNT] = [
    "Enter your height (cm): ",
    "Enter armpit to wrist distance (cm): ",
    "Enter wrist to foot distance (cm): ",
    "Enter your weight (kg): ",
];

#[derive(Debug, Args)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Body height in cm
    #[arg(long)]
    pub height: Option<f32>,

    /// Armpit to wrist distance in cm
    #[arg(long)]
    pub armpit_to_wrist: Option<f32>,

    /// Wrist to foot distance in cm
    #[arg(long)]
    pub wrist_to_foot: Option<f32>,

    /// Body weight in kg
    #[arg(long)]
    pub weight: Option<f32>,

    /// Print the one-shot result as JSON
    #[arg(long)]
    pub json: bool,
}

impl PredictArgs {
    /// All four measurements, none, or an error naming what is missing
    fn one_shot(&self) -> anyhow::Result<Option<FeatureVector>> {
        match (self.height, self.armpit_to_wrist, self.wrist_to_foot, self.weight) {
            (Some(h), Some(a), Some(w2f), Some(w)) => Ok(Some(FeatureVector::new(h, a, w2f, w))),
            (None, None, None, None) => Ok(None),
            _ => anyhow::bail!(
                "--height, --armpit-to-wrist, --wrist-to-foot and --weight must be given together"
            ),
        }
    }
}

/// Rejected interactive input
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Please enter a value")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' is not a finite number")]
    NotFinite(String),
}

/// Parse one typed measurement
pub fn parse_measurement(input: &str) -> Result<f32, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    let value: f32 = input
        .parse()
        .map_err(|_| InputError::NotANumber(input.to_string()))?;
    if !value.is_finite() {
        return Err(InputError::NotFinite(input.to_string()));
    }
    Ok(value)
}

pub fn run(args: PredictArgs, config: &AppConfig) -> anyhow::Result<()> {
    let features = args.one_shot()?;
    let engine = args.model.load_engine(config)?;
    let validator = Validator::default();

    match features {
        Some(features) if args.json => {
            let result = engine.predict(&features)?;
            println!("{}", serde_json::to_string_pretty(&result.prediction)?);
            Ok(())
        }
        Some(features) => {
            println!("{}", recommend(&engine, &validator, &features)?);
            Ok(())
        }
        None => interactive(&engine, &validator),
    }
}

/// Print measurement and prediction warnings, then format the height
fn recommend(
    engine: &InferenceEngine,
    validator: &Validator,
    features: &FeatureVector,
) -> Result<String, InferenceError> {
    for finding in validator.validate_features(features).errors {
        eprintln!("Warning: {finding}");
    }
    let height = engine.predict_height(features)?;
    if let Err(finding) = validator.validate_prediction(height) {
        eprintln!("Warning: {finding}");
    }
    Ok(format!("Recommended crutch height: {:.1} cm", height))
}

/// Interactive reply; a failed prediction is reported instead of ending the session
fn answer(engine: &InferenceEngine, validator: &Validator, features: &FeatureVector) -> String {
    recommend(engine, validator, features)
        .unwrap_or_else(|e| format!("Prediction failed: {e}. Please check the values and try again."))
}

fn interactive(engine: &InferenceEngine, validator: &Validator) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("Enter your measurements to get a crutch height prediction.");
    println!("(press Ctrl+C or Ctrl+D to exit)\n");

    while let Some(features) = read_features(&mut rl)? {
        println!("{}", answer(engine, validator, &features));
        println!();
    }

    println!("Goodbye!");
    Ok(())
}

/// Ask for all four values; `None` once the user ends the session
fn read_features(rl: &mut DefaultEditor) -> anyhow::Result<Option<FeatureVector>> {
    let mut values = [0.0f32; FEATURE_COUNT];
    for (value, prompt) in values.iter_mut().zip(PROMPTS) {
        match read_value(rl, prompt)? {
            Some(v) => *value = v,
            None => return Ok(None),
        }
    }
    Ok(Some(FeatureVector::from_array(values)))
}

fn read_value(rl: &mut DefaultEditor, prompt: &str) -> anyhow::Result<Option<f32>> {
    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                if matches!(line.trim(), "exit" | "quit" | "q") {
                    return Ok(None);
                }
                match parse_measurement(&line) {
                    Ok(v) => {
                        let _ = rl.add_history_entry(line.trim());
                        return Ok(Some(v));
                    }
                    Err(e) => eprintln!("Invalid input: {e}. Please enter a numeric value."),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(None),
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_scaler::ScalerParams;
    use inference_engine::DenseNetwork;

    #[test]
    fn test_parse_measurement() {
        assert_eq!(parse_measurement(" 172.5 "), Ok(172.5));
        assert_eq!(parse_measurement("70"), Ok(70.0));
        assert_eq!(parse_measurement(""), Err(InputError::Empty));
        assert_eq!(
            parse_measurement("tall"),
            Err(InputError::NotANumber("tall".to_string()))
        );
        assert_eq!(
            parse_measurement("inf"),
            Err(InputError::NotFinite("inf".to_string()))
        );
    }

    fn args(values: [Option<f32>; 4]) -> PredictArgs {
        PredictArgs {
            model: ModelArgs::default(),
            height: values[0],
            armpit_to_wrist: values[1],
            wrist_to_foot: values[2],
            weight: values[3],
            json: false,
        }
    }

    #[test]
    fn test_one_shot_requires_all_values() {
        let full = args([Some(170.0), Some(40.0), Some(50.0), Some(70.0)]);
        assert_eq!(
            full.one_shot().unwrap(),
            Some(FeatureVector::new(170.0, 40.0, 50.0, 70.0))
        );
        assert_eq!(args([None; 4]).one_shot().unwrap(), None);
        assert!(args([Some(170.0), None, None, Some(70.0)]).one_shot().is_err());
    }

    #[test]
    fn test_failed_prediction_keeps_session_going() {
        let scaler = ScalerParams::new([0.0; 4], [1.0; 4]).unwrap();
        // Scaled inputs of 1.0 overflow to infinity
        let engine = InferenceEngine::new(scaler, Box::new(DenseNetwork::linear([1.0e38; 4], 0.0)));
        let validator = Validator::default();

        let failed = answer(&engine, &validator, &FeatureVector::new(1.0, 1.0, 1.0, 1.0));
        assert!(failed.starts_with("Prediction failed:"), "{failed}");
        assert!(recommend(&engine, &validator, &FeatureVector::new(1.0, 1.0, 1.0, 1.0)).is_err());

        let next = answer(&engine, &validator, &FeatureVector::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(next, "Recommended crutch height: 0.0 cm");
    }
}
