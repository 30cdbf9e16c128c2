//! Regression Error Statistics

use serde::Serialize;

/// Error statistics between predictions and reference values (cm)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegressionMetrics {
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Largest absolute error
    pub max_abs_error: f64,
    /// Mean signed error (prediction - reference)
    pub bias: f64,
    /// Number of pairs compared
    pub count: usize,
}

impl RegressionMetrics {
    /// Compute statistics over paired slices; extra elements of the longer slice are ignored
    pub fn compute(predictions: &[f32], references: &[f32]) -> Self {
        let count = predictions.len().min(references.len());
        if count == 0 {
            return Self::default();
        }

        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut signed_sum = 0.0;
        let mut max_abs_error: f64 = 0.0;

        for (&p, &r) in predictions.iter().zip(references) {
            let d = p as f64 - r as f64;
            abs_sum += d.abs();
            sq_sum += d * d;
            signed_sum += d;
            max_abs_error = max_abs_error.max(d.abs());
        }

        let n = count as f64;
        Self {
            mae: abs_sum / n,
            rmse: (sq_sum / n).sqrt(),
            max_abs_error,
            bias: signed_sum / n,
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_computation() {
        let m = RegressionMetrics::compute(&[10.0, 12.0, 9.0, 13.0], &[10.0, 10.0, 10.0, 10.0]);
        assert_eq!(m.count, 4);
        assert!((m.mae - 1.5).abs() < 1e-9);
        assert!((m.rmse - (14.0f64 / 4.0).sqrt()).abs() < 1e-9);
        assert!((m.max_abs_error - 3.0).abs() < 1e-9);
        assert!((m.bias - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_predictions() {
        let m = RegressionMetrics::compute(&[115.5, 130.9], &[115.5, 130.9]);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.max_abs_error, 0.0);
    }

    #[test]
    fn test_empty_values() {
        let m = RegressionMetrics::compute(&[], &[]);
        assert_eq!(m.count, 0);
        assert_eq!(m.mae, 0.0);
    }
}
