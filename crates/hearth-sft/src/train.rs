//! Fine-tuning driver loop
//!
//! One blocking call: epochs over the tokenized train partition with
//! gradient accumulation, per-epoch evaluation and checkpointing, and a
//! final model artifact. Forward/backward and parameter updates are
//! delegated to the model and `aprender`'s optimizer; failures propagate
//! uncaught with the framework's own diagnostics.

use crate::checkpoint::{prune_checkpoints, save_checkpoint, save_final_model, CheckpointMetadata, load_metadata};
use crate::collate::collate;
use crate::config::TrainingParams;
use crate::metrics::MetricsLogger;
use crate::model::CausalLm;
use crate::optimizer::{lr_at_step, setup_optimizer, OptimizerConfig};
use crate::runtime::{ExecutionContext, Precision};
use anyhow::{bail, Context, Result};
use aprender::nn::optim::Optimizer;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Default seed for per-epoch shuffling when the config leaves it unset
const DEFAULT_SHUFFLE_SEED: u64 = 42;

/// Outcome of a completed training run
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    /// Epochs actually executed (0 when resuming past the last epoch)
    pub epochs_run: usize,
    /// Total optimizer steps, including any resumed prefix
    pub optimizer_steps: usize,
    /// Mean train loss over the last optimizer step, if any step ran
    pub final_train_loss: Option<f32>,
    /// Eval loss after the last epoch, if an eval partition was available
    pub final_eval_loss: Option<f32>,
    /// Base path of the final model artifact (extensionless)
    pub final_model_path: PathBuf,
}

/// Mean evaluation loss over a tokenized partition (forward passes only).
///
/// # Errors
/// An empty partition cannot be evaluated.
pub fn evaluate<M: CausalLm>(
    model: &M,
    rows: &[Vec<u32>],
    pad_id: u32,
    micro_batch_size: usize,
) -> Result<f32> {
    if rows.is_empty() {
        bail!("Cannot evaluate over an empty partition");
    }

    let mut total_loss = 0.0;
    let mut total_rows = 0usize;

    for chunk in rows.chunks(micro_batch_size.max(1)) {
        let refs: Vec<&[u32]> = chunk.iter().map(|row| row.as_slice()).collect();
        let batch = collate(&refs, pad_id)?;
        let loss = model
            .forward_training(&batch.input_ids, &batch.labels)
            .context("Evaluation forward pass failed")?;
        total_loss += loss.item() * batch.rows as f32;
        total_rows += batch.rows;
    }

    Ok(total_loss / total_rows as f32)
}

/// Run the fine-tuning loop.
///
/// `train_rows` and `eval_rows` are fixed-length token id rows produced by
/// [`crate::encode::prepare_dataset`]; `pad_id` is the tokenizer's pad/eos
/// identifier used for intra-batch padding. When `resume` names a checkpoint
/// (base path or either file of the pair), weights and progress are restored
/// and training continues from the following epoch; otherwise it starts from
/// the supplied base model.
///
/// # Errors
/// Fails fast on an empty train partition, invalid batch configuration, and
/// any error surfaced by the model or optimizer.
#[allow(clippy::too_many_arguments)]
pub fn train<M: CausalLm>(
    model: &mut M,
    train_rows: &[Vec<u32>],
    eval_rows: &[Vec<u32>],
    pad_id: u32,
    config: &TrainingParams,
    optimizer_config: &OptimizerConfig,
    ctx: &ExecutionContext,
    resume: Option<&Path>,
) -> Result<TrainingSummary> {
    if train_rows.is_empty() {
        bail!("Training partition is empty; refusing to run a no-op epoch");
    }

    let accumulation_steps = config.gradient_accumulation_steps()?;

    let checkpoints_dir = config.output_dir.join("checkpoints");
    std::fs::create_dir_all(&checkpoints_dir).with_context(|| {
        format!(
            "Failed to create checkpoints directory: {}",
            checkpoints_dir.display()
        )
    })?;

    println!("Execution context: {}", ctx.describe());
    if config.precision == Precision::Bf16 {
        println!("Requested precision bf16 is recorded; the backend executes in f32");
    }

    // Restore weights and progress when resuming
    let mut start_epoch = 0;
    let mut global_step = 0;
    if let Some(checkpoint_path) = resume {
        model
            .load_weights(&checkpoint_path.with_extension("safetensors"))
            .context("Failed to load resume checkpoint weights")?;
        let metadata = load_metadata(checkpoint_path)
            .context("Failed to load resume checkpoint metadata")?;
        start_epoch = metadata.epoch + 1;
        global_step = metadata.step;
        println!(
            "Resumed from checkpoint at epoch {} (step {})",
            metadata.epoch, global_step
        );
    }

    let mut optimizer = setup_optimizer(model.parameters_mut(), optimizer_config)
        .context("Failed to set up optimizer")?;

    let micro_batches_per_epoch = train_rows.len().div_ceil(config.micro_batch_size);
    let steps_per_epoch = micro_batches_per_epoch.div_ceil(accumulation_steps);
    let total_steps = config.epochs * steps_per_epoch;

    let shuffle_seed = config.shuffle_seed.unwrap_or(DEFAULT_SHUFFLE_SEED);
    let mut metrics_logger = MetricsLogger::new(config.logging_steps);

    let mut epochs_run = 0;
    let mut last_train_loss = None;
    let mut last_eval_loss = None;
    let mut current_lr = optimizer_config.learning_rate;

    for epoch in start_epoch..config.epochs {
        // Per-epoch shuffle, deterministic regardless of resume point
        let mut indices: Vec<usize> = (0..train_rows.len()).collect();
        let mut rng = StdRng::seed_from_u64(shuffle_seed.wrapping_add(epoch as u64));
        indices.shuffle(&mut rng);

        let mut accumulated_loss = 0.0;
        let mut accumulation_count = 0;
        let mut tokens_accumulated = 0;
        let mut step_timer = Instant::now();

        let chunk_count = indices.len().div_ceil(config.micro_batch_size);
        for (chunk_idx, chunk) in indices.chunks(config.micro_batch_size).enumerate() {
            let refs: Vec<&[u32]> = chunk.iter().map(|&i| train_rows[i].as_slice()).collect();
            let batch = collate(&refs, pad_id)?;
            debug_assert!(batch.attention_mask.is_none());

            let loss = model
                .forward_training(&batch.input_ids, &batch.labels)
                .context("Forward training failed")?;
            loss.backward();

            accumulated_loss += loss.item();
            accumulation_count += 1;
            tokens_accumulated += batch.rows * batch.seq_len;

            // A short final chunk still flushes the pending accumulation
            let last_chunk = chunk_idx + 1 == chunk_count;
            if accumulation_count >= accumulation_steps || last_chunk {
                optimizer.step();
                optimizer.zero_grad();

                current_lr = lr_at_step(global_step, total_steps, optimizer_config);
                optimizer.set_lr(current_lr);
                global_step += 1;

                let avg_loss = accumulated_loss / accumulation_count as f32;
                last_train_loss = Some(avg_loss);
                metrics_logger.log_step(
                    avg_loss,
                    current_lr,
                    tokens_accumulated,
                    step_timer.elapsed().as_secs_f32(),
                );

                accumulated_loss = 0.0;
                accumulation_count = 0;
                tokens_accumulated = 0;
                step_timer = Instant::now();
            }
        }

        epochs_run += 1;

        // Evaluation and checkpointing run once per epoch
        if eval_rows.is_empty() {
            eprintln!("Warning: evaluation partition is empty; skipping per-epoch evaluation");
        } else {
            let eval_loss = evaluate(model, eval_rows, pad_id, config.micro_batch_size)
                .context("Per-epoch evaluation failed")?;
            metrics_logger.log_eval(epoch, eval_loss);
            last_eval_loss = Some(eval_loss);
        }

        let metadata = epoch_metadata(epoch, global_step, last_train_loss, current_lr, ctx, last_eval_loss)?;
        let checkpoint_path = save_checkpoint(model, &checkpoints_dir, &metadata)
            .context("Failed to save checkpoint")?;
        prune_checkpoints(&checkpoints_dir, config.save_total_limit)
            .context("Failed to prune checkpoints")?;
        println!(
            "Saved checkpoint for epoch {} to {}",
            epoch,
            checkpoint_path.display()
        );
    }

    // Final artifact reflects the last completed epoch
    let final_epoch = config.epochs.saturating_sub(1);
    let metadata = epoch_metadata(final_epoch, global_step, last_train_loss, current_lr, ctx, last_eval_loss)?;
    let final_model_path = save_final_model(model, &config.output_dir, &metadata)
        .context("Failed to save final model")?;
    println!(
        "Training completed; final model saved to {}",
        final_model_path.display()
    );

    Ok(TrainingSummary {
        epochs_run,
        optimizer_steps: global_step,
        final_train_loss: last_train_loss,
        final_eval_loss: last_eval_loss,
        final_model_path,
    })
}

fn epoch_metadata(
    epoch: usize,
    step: usize,
    loss: Option<f32>,
    learning_rate: f32,
    ctx: &ExecutionContext,
    eval_loss: Option<f32>,
) -> Result<CheckpointMetadata> {
    let mut extra = HashMap::new();
    extra.insert(
        "execution_context".to_string(),
        serde_json::to_value(ctx).context("Failed to serialize execution context")?,
    );
    if let Some(eval_loss) = eval_loss {
        extra.insert(
            "eval_loss".to_string(),
            serde_json::to_value(eval_loss).context("Failed to serialize eval loss")?,
        );
    }

    Ok(CheckpointMetadata {
        epoch,
        step,
        loss,
        learning_rate: Some(learning_rate),
        extra,
    })
}
