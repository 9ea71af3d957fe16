//! Model seam for the training driver
//!
//! The model architecture, its forward/backward pass, and its weight format
//! are external to this crate. The driver only needs the operations below;
//! the pretrained base model crate implements them on top of `aprender`.

use anyhow::Result;
use aprender::autograd::Tensor;
use std::path::Path;

/// Interface the training driver requires from a causal language model.
///
/// Passing the model explicitly (rather than configuring process-wide
/// defaults before construction) keeps device and precision choices visible
/// at the call sites that depend on them.
pub trait CausalLm {
    /// Forward pass computing the causal-LM loss.
    ///
    /// `input_ids` and `labels` are `[batch, seq]` tensors; with labels equal
    /// to the input ids the framework's shifted next-token objective applies.
    /// No attention mask is accepted: the collator removed it, and the model
    /// attends over every position including pad/eos.
    ///
    /// Returns a scalar loss tensor; the caller invokes `backward()` on it.
    fn forward_training(&self, input_ids: &Tensor, labels: &Tensor) -> Result<Tensor>;

    /// Mutable references to all trainable parameters, for optimizer setup
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// Persist model weights to `path` (SafeTensors in the base model crate)
    fn save_weights(&self, path: &Path) -> Result<()>;

    /// Load model weights from `path`, replacing the current parameters
    fn load_weights(&mut self, path: &Path) -> Result<()>;
}
