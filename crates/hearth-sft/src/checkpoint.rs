//! Checkpoint persistence and retention
//!
//! A checkpoint is a pair of files with a shared stem: `<name>.safetensors`
//! holding the weights (written through the model seam) and `<name>.json`
//! holding training metadata. Epoch checkpoints live under
//! `<output>/checkpoints/` and at most `save_total_limit` of them are kept;
//! the final model artifact is written to the output directory itself.

use crate::model::CausalLm;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of epoch checkpoint file stems
const CHECKPOINT_PREFIX: &str = "checkpoint_epoch_";

/// Training metadata stored beside checkpoint weights
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Last completed epoch (0-indexed)
    pub epoch: usize,
    /// Optimizer step count at save time
    pub step: usize,
    /// Mean training loss at save time
    pub loss: Option<f32>,
    /// Learning rate at save time
    pub learning_rate: Option<f32>,
    /// Additional metadata as key-value pairs
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Save an epoch checkpoint under `checkpoints_dir`.
///
/// Returns the checkpoint base path (no extension).
pub fn save_checkpoint<M: CausalLm>(
    model: &M,
    checkpoints_dir: &Path,
    metadata: &CheckpointMetadata,
) -> Result<PathBuf> {
    fs::create_dir_all(checkpoints_dir).with_context(|| {
        format!(
            "Failed to create checkpoints directory: {}",
            checkpoints_dir.display()
        )
    })?;

    let base = checkpoints_dir.join(format!("{}{}", CHECKPOINT_PREFIX, metadata.epoch));
    write_pair(model, &base, metadata)?;
    Ok(base)
}

/// Write the final model artifact (`model.safetensors` + `model.json`)
pub fn save_final_model<M: CausalLm>(
    model: &M,
    output_dir: &Path,
    metadata: &CheckpointMetadata,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let base = output_dir.join("model");
    write_pair(model, &base, metadata)?;
    Ok(base)
}

fn write_pair<M: CausalLm>(model: &M, base: &Path, metadata: &CheckpointMetadata) -> Result<()> {
    let weights_path = base.with_extension("safetensors");
    model
        .save_weights(&weights_path)
        .with_context(|| format!("Failed to save weights to {}", weights_path.display()))?;

    let metadata_path = base.with_extension("json");
    let json_data =
        serde_json::to_string_pretty(metadata).context("Failed to serialize checkpoint metadata")?;
    fs::write(&metadata_path, json_data)
        .with_context(|| format!("Failed to write metadata file: {}", metadata_path.display()))?;

    Ok(())
}

/// Load checkpoint metadata given either the base path or one of the pair's
/// file paths (the `.json` sibling is derived from the stem).
pub fn load_metadata(path: &Path) -> Result<CheckpointMetadata> {
    let metadata_path = path.with_extension("json");
    let json_data = fs::read_to_string(&metadata_path)
        .with_context(|| format!("Failed to read metadata file: {}", metadata_path.display()))?;
    serde_json::from_str(&json_data).context("Failed to parse checkpoint metadata")
}

/// Delete the oldest epoch checkpoints so at most `keep` remain.
///
/// A missing checkpoints directory is treated as already pruned.
pub fn prune_checkpoints(checkpoints_dir: &Path, keep: usize) -> Result<()> {
    if !checkpoints_dir.exists() {
        return Ok(());
    }

    let mut epochs: Vec<usize> = Vec::new();
    for entry in fs::read_dir(checkpoints_dir).with_context(|| {
        format!(
            "Failed to read checkpoints directory: {}",
            checkpoints_dir.display()
        )
    })? {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Some(epoch) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_prefix(CHECKPOINT_PREFIX))
            .and_then(|s| s.parse::<usize>().ok())
        {
            epochs.push(epoch);
        }
    }

    epochs.sort_unstable();
    if epochs.len() <= keep {
        return Ok(());
    }

    for &epoch in &epochs[..epochs.len() - keep] {
        let base = checkpoints_dir.join(format!("{}{}", CHECKPOINT_PREFIX, epoch));
        for ext in ["safetensors", "json"] {
            let path = base.with_extension(ext);
            if path.exists() {
                fs::remove_file(&path).with_context(|| {
                    format!("Failed to remove stale checkpoint file: {}", path.display())
                })?;
            }
        }
    }

    Ok(())
}
