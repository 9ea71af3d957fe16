//! Eager tokenization of dataset partitions
//!
//! Tokenization is applied across a whole partition before training begins:
//! a blocking, order-preserving map that replaces each example's text with a
//! fixed-length id row and keeps nothing else.

use crate::config::DataConfig;
use anyhow::{Context, Result};
use hearth_data::{load_examples, train_test_split, Example};
use hearth_tokenizer::Tokenizer;

/// Tokenize a partition of examples to fixed-length id rows.
///
/// Order-preserving and side-effect-free; every row has exactly
/// `context_length` ids.
pub fn tokenize_partition(
    tokenizer: &Tokenizer,
    examples: &[Example],
    context_length: usize,
) -> Result<Vec<Vec<u32>>> {
    examples
        .iter()
        .map(|example| tokenizer.encode_fixed(&example.text, context_length))
        .collect()
}

/// Load, split, and tokenize the dataset described by `data`.
///
/// Returns `(train_rows, eval_rows)` ready for the training driver.
pub fn prepare_dataset(
    tokenizer: &Tokenizer,
    data: &DataConfig,
    context_length: usize,
) -> Result<(Vec<Vec<u32>>, Vec<Vec<u32>>)> {
    let examples = load_examples(&data.dataset_path).context("Failed to load dataset")?;
    let split = train_test_split(examples, data.test_fraction, data.split_seed)
        .context("Failed to split dataset")?;

    let train_rows = tokenize_partition(tokenizer, &split.train, context_length)
        .context("Failed to tokenize train partition")?;
    let eval_rows = tokenize_partition(tokenizer, &split.test, context_length)
        .context("Failed to tokenize test partition")?;

    Ok((train_rows, eval_rows))
}
