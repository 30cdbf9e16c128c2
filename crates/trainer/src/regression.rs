//! Closed-Form Ridge Regression
//!
//! Fits `y ≈ w · x + b` on scaled features by solving the normal equations
//! `(XᵀX + λI) θ = Xᵀy` in f64, with the bias column left unpenalized.

use crate::error::TrainError;
use feature_scaler::{ScaledFeatureVector, FEATURE_COUNT};
use inference_engine::DenseNetwork;
use tracing::debug;

const COLUMNS: usize = FEATURE_COUNT + 1;
const PIVOT_EPSILON: f64 = 1e-12;

/// Fit a single linear layer on scaled features
pub fn fit_linear(
    features: &[ScaledFeatureVector],
    targets: &[f32],
    ridge_lambda: f64,
) -> Result<DenseNetwork, TrainError> {
    if features.is_empty() || features.len() != targets.len() {
        return Err(TrainError::InsufficientData {
            rows: features.len().min(targets.len()),
            test_fraction: 0.0,
        });
    }

    let mut xtx = [[0.0f64; COLUMNS]; COLUMNS];
    let mut xty = [0.0f64; COLUMNS];

    for (fv, &y) in features.iter().zip(targets) {
        let mut row = [1.0f64; COLUMNS];
        for (slot, &v) in row.iter_mut().zip(fv.as_array()) {
            *slot = v as f64;
        }
        for i in 0..COLUMNS {
            for j in 0..COLUMNS {
                xtx[i][j] += row[i] * row[j];
            }
            xty[i] += row[i] * y as f64;
        }
    }

    for (i, row) in xtx.iter_mut().enumerate().take(FEATURE_COUNT) {
        row[i] += ridge_lambda;
    }

    let theta = solve(xtx, xty)?;
    debug!("Ridge solution (lambda={}): {:?}", ridge_lambda, theta);

    let mut weights = [0.0f32; FEATURE_COUNT];
    for (w, &t) in weights.iter_mut().zip(&theta) {
        *w = t as f32;
    }
    Ok(DenseNetwork::linear(weights, theta[FEATURE_COUNT] as f32))
}

/// Gaussian elimination with partial pivoting
fn solve(
    mut a: [[f64; COLUMNS]; COLUMNS],
    mut b: [f64; COLUMNS],
) -> Result<[f64; COLUMNS], TrainError> {
    for col in 0..COLUMNS {
        let pivot = (col..COLUMNS)
            .max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return Err(TrainError::Singular(col));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..COLUMNS {
            let factor = a[row][col] / a[col][col];
            for k in col..COLUMNS {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0f64; COLUMNS];
    for row in (0..COLUMNS).rev() {
        let tail: f64 = (row + 1..COLUMNS).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::Predictor;

    fn grid() -> Vec<ScaledFeatureVector> {
        let mut out = Vec::new();
        for a in 0..4 {
            for b in 0..3 {
                for c in 0..3 {
                    for d in 0..2 {
                        out.push(ScaledFeatureVector::from_array([
                            a as f32 / 3.0,
                            b as f32 / 2.0,
                            c as f32 / 2.0,
                            d as f32,
                        ]));
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_recovers_exact_linear_relation() {
        let xs = grid();
        let ys: Vec<f32> = xs
            .iter()
            .map(|x| 100.0 + 50.0 * x[0] - 4.0 * x[1] + 2.5 * x[2] + 8.0 * x[3])
            .collect();

        let net = fit_linear(&xs, &ys, 0.0).unwrap();
        for (x, &y) in xs.iter().zip(&ys) {
            let pred = net.predict(x).unwrap();
            assert!((pred - y).abs() < 1e-3, "{} vs {}", pred, y);
        }
    }

    #[test]
    fn test_constant_column_is_singular_without_ridge() {
        let xs: Vec<_> = grid()
            .into_iter()
            .map(|x| ScaledFeatureVector::from_array([x[0], x[1], x[2], 0.0]))
            .collect();
        let ys: Vec<f32> = xs.iter().map(|x| 120.0 + 30.0 * x[0]).collect();

        assert!(matches!(
            fit_linear(&xs, &ys, 0.0),
            Err(TrainError::Singular(_))
        ));

        let net = fit_linear(&xs, &ys, 1e-3).unwrap();
        let pred = net
            .predict(&ScaledFeatureVector::from_array([1.0, 0.5, 0.5, 0.0]))
            .unwrap();
        assert!((pred - 150.0).abs() < 0.1);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(fit_linear(&[], &[], 0.0).is_err());
    }
}
