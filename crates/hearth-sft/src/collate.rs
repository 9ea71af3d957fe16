//! Batch collation for causal-LM training
//!
//! Collation assembles tokenized rows into one training batch: rows are
//! padded to a common length, and a labels tensor identical to the input ids
//! is derived (nothing is masked; there is no MLM objective here).
//!
//! The attention mask produced by the base collation is then removed before
//! the batch reaches the model. With the pad token aliased to eos, the mask
//! would hide genuine eos tokens exactly like padding, so the batch carries
//! no mask at all. The removal is a post-processing transform composed onto
//! the base collation rather than an override of it.

use anyhow::{bail, Result};
use aprender::autograd::Tensor;

/// One training batch, constructed fresh per step and never persisted
#[derive(Debug)]
pub struct Batch {
    /// Token ids, `[batch, seq]`
    pub input_ids: Tensor,
    /// Training targets, element-for-element identical to `input_ids`
    pub labels: Tensor,
    /// 1.0 over real tokens, 0.0 over padding; `None` once stripped
    pub attention_mask: Option<Tensor>,
    /// Number of rows in the batch
    pub rows: usize,
    /// Common padded length of the batch
    pub seq_len: usize,
}

/// Base causal-LM collation.
///
/// Pads every row with `pad_id` to the longest length in the batch, copies
/// the padded ids into `labels`, and builds the 1/0 attention mask over
/// real/padded positions.
///
/// # Errors
/// An empty row list is an upstream data-contract failure and is rejected.
pub fn collate_causal_lm(rows: &[&[u32]], pad_id: u32) -> Result<Batch> {
    if rows.is_empty() {
        bail!("Cannot collate an empty batch");
    }

    let seq_len = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    let batch = rows.len();

    let mut ids_data = Vec::with_capacity(batch * seq_len);
    let mut mask_data = Vec::with_capacity(batch * seq_len);

    for row in rows {
        ids_data.extend(row.iter().map(|&id| id as f32));
        mask_data.extend(std::iter::repeat(1.0).take(row.len()));

        let pad_len = seq_len - row.len();
        ids_data.extend(std::iter::repeat(pad_id as f32).take(pad_len));
        mask_data.extend(std::iter::repeat(0.0).take(pad_len));
    }

    let input_ids = Tensor::new(&ids_data, &[batch, seq_len]);
    let labels = Tensor::new(&ids_data, &[batch, seq_len]);
    let attention_mask = Tensor::new(&mask_data, &[batch, seq_len]);

    Ok(Batch {
        input_ids,
        labels,
        attention_mask: Some(attention_mask),
        rows: batch,
        seq_len,
    })
}

/// Remove the attention mask from a collated batch
pub fn strip_attention_mask(mut batch: Batch) -> Batch {
    batch.attention_mask = None;
    batch
}

/// Collation as used by the training driver: base causal-LM collation with
/// the attention mask unconditionally removed.
pub fn collate(rows: &[&[u32]], pad_id: u32) -> Result<Batch> {
    Ok(strip_attention_mask(collate_causal_lm(rows, pad_id)?))
}
