//! Deterministic Synthetic Measurements
//!
//! Generates plausible anthropometric rows for demos and tests when the
//! real spreadsheet is not available. The target follows the common
//! clinical rule of thumb that an axillary crutch is about 77% of body
//! height, plus a small seeded noise term.

use crate::dataset::Dataset;
use feature_scaler::{FeatureVector, FEATURE_NAMES, TARGET_NAME};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

/// Crutch height as a fraction of body height
pub const CRUTCH_HEIGHT_RATIO: f32 = 0.77;

/// Reference crutch height for a body height
pub fn reference_crutch_height(user_height_cm: f32) -> f32 {
    user_height_cm * CRUTCH_HEIGHT_RATIO
}

/// Generate `rows` people with a fixed seed
pub fn generate(rows: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(rows);
    let mut targets = Vec::with_capacity(rows);

    for _ in 0..rows {
        let height: f32 = rng.gen_range(145.0..200.0);
        let armpit_to_wrist = 0.235 * height + rng.gen_range(-1.5..1.5);
        let wrist_to_foot = 0.295 * height + rng.gen_range(-1.5..1.5);
        let bmi: f32 = rng.gen_range(18.0..32.0);
        let weight = bmi * (height / 100.0) * (height / 100.0);
        let target = reference_crutch_height(height) + rng.gen_range(-1.0..1.0);

        features.push(FeatureVector::new(
            round1(height),
            round1(armpit_to_wrist),
            round1(wrist_to_foot),
            round1(weight),
        ));
        targets.push(round1(target));
    }

    Dataset::new(features, targets)
}

/// Write a dataset as CSV with the standard column names
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header: Vec<&str> = FEATURE_NAMES.to_vec();
    header.push(TARGET_NAME);
    wtr.write_record(&header)?;

    for (fv, target) in dataset.features.iter().zip(&dataset.targets) {
        let mut record: Vec<String> = fv.as_array().iter().map(|v| v.to_string()).collect();
        record.push(target.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}
