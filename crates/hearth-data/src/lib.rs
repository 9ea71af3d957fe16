//! Example dataset loading and splitting for hearth fine-tuning
//!
//! This crate owns the input side of the pipeline: reading raw text examples
//! from a JSON or JSONL file and partitioning them into train and test sets
//! with a deterministic, seeded split.

pub mod example;
pub mod split;

pub use example::{load_examples, Example};
pub use split::{train_test_split, TrainTestSplit, DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION};
