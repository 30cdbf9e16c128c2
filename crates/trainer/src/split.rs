//! Seeded Train/Test Split

use crate::dataset::Dataset;
use crate::error::TrainError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle rows with a fixed seed and hold out `ceil(rows * test_fraction)` for testing
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<(Dataset, Dataset), TrainError> {
    let rows = dataset.len();
    let test_rows = (rows as f64 * test_fraction).ceil() as usize;
    if !(0.0..1.0).contains(&test_fraction) || test_rows == 0 || test_rows >= rows {
        return Err(TrainError::InsufficientData {
            rows,
            test_fraction,
        });
    }

    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let pick = |idx: &[usize]| {
        Dataset::new(
            idx.iter().map(|&i| dataset.features[i]).collect(),
            idx.iter().map(|&i| dataset.targets[i]).collect(),
        )
    };
    let (test_idx, train_idx) = indices.split_at(test_rows);

    Ok((pick(train_idx), pick(test_idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_scaler::FeatureVector;

    fn dataset(n: usize) -> Dataset {
        Dataset::new(
            (0..n)
                .map(|i| FeatureVector::new(150.0 + i as f32, 35.0, 45.0, 60.0))
                .collect(),
            (0..n).map(|i| i as f32).collect(),
        )
    }

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split(&dataset(10), 0.2, 42).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let (train, test) = train_test_split(&dataset(11), 0.2, 42).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 3);
    }

    #[test]
    fn test_split_is_deterministic_and_disjoint() {
        let ds = dataset(50);
        let (train_a, test_a) = train_test_split(&ds, 0.2, 7).unwrap();
        let (train_b, test_b) = train_test_split(&ds, 0.2, 7).unwrap();
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);

        let mut all: Vec<f32> = train_a.targets.iter().chain(&test_a.targets).copied().collect();
        all.sort_by(f32::total_cmp);
        assert_eq!(all, (0..50).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn test_rows_stay_paired_with_targets() {
        let (train, _) = train_test_split(&dataset(20), 0.25, 3).unwrap();
        for (fv, &target) in train.features.iter().zip(&train.targets) {
            assert_eq!(fv.user_height_cm(), 150.0 + target);
        }
    }

    #[test]
    fn test_too_small_to_split() {
        assert!(train_test_split(&dataset(1), 0.2, 42).is_err());
        assert!(train_test_split(&dataset(10), 0.0, 42).is_err());
        assert!(train_test_split(&dataset(10), 1.0, 42).is_err());
    }
}
