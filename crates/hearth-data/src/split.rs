//! Deterministic train/test partitioning

use crate::example::Example;
use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Default held-out fraction (90/10 split)
pub const DEFAULT_TEST_FRACTION: f32 = 0.1;

/// Default split seed, fixed so the partition is stable run-to-run
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Train and test partitions of a dataset
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Examples used for optimization
    pub train: Vec<Example>,
    /// Held-out examples used for per-epoch evaluation
    pub test: Vec<Example>,
}

/// Split examples into train and test partitions.
///
/// The examples are shuffled with an RNG seeded from `seed` and then
/// partitioned, so the same inputs, fraction, and seed always produce the
/// same split. The test partition holds `test_fraction` of the examples
/// (rounded to the nearest whole example, never the entire dataset).
///
/// # Errors
/// `test_fraction` outside `[0, 1)` is a configuration error. Zero examples
/// is not an error here; the trainer fails fast on an empty train partition.
pub fn train_test_split(
    mut examples: Vec<Example>,
    test_fraction: f32,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(0.0..1.0).contains(&test_fraction) {
        bail!(
            "test_fraction must be in [0, 1), got {}",
            test_fraction
        );
    }

    let mut rng = StdRng::seed_from_u64(seed);
    examples.shuffle(&mut rng);

    let total = examples.len();
    let mut test_len = (total as f64 * test_fraction as f64).round() as usize;
    if test_len >= total && total > 0 {
        test_len = total - 1;
    }

    let test = examples.split_off(total - test_len);
    Ok(TrainTestSplit {
        train: examples,
        test,
    })
}
