//! Seeded train/validation partitioning

use super::frame::Frame;
use crate::error::{PredictorError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Disjoint train and validation partitions of a feature frame and its targets
#[derive(Debug, Clone)]
pub struct TrainValidSplit {
    pub train_features: Frame,
    pub train_targets: Vec<f64>,
    pub valid_features: Frame,
    pub valid_targets: Vec<f64>,
}

/// Shuffle row indices with a seeded RNG and cut off `ceil(test_size * n)` rows for validation
///
/// The same data, fraction and seed always produce the same partition.
pub fn train_test_split(
    features: &Frame,
    targets: &[f64],
    test_size: f64,
    seed: u64,
) -> Result<TrainValidSplit> {
    let n = features.n_rows();
    if targets.len() != n {
        return Err(PredictorError::InvalidInput(format!(
            "features have {} rows but targets have {}",
            n,
            targets.len()
        )));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PredictorError::InvalidInput(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n_valid = (test_size * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_valid);
    if n_valid == 0 || n_train == 0 {
        return Err(PredictorError::InvalidInput(format!(
            "with n_samples={} and test_size={} one of the partitions would be empty",
            n, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (valid_idx, train_idx) = indices.split_at(n_valid);

    Ok(TrainValidSplit {
        train_features: features.take_rows(train_idx),
        train_targets: train_idx.iter().map(|&i| targets[i]).collect(),
        valid_features: features.take_rows(valid_idx),
        valid_targets: valid_idx.iter().map(|&i| targets[i]).collect(),
    })
}
