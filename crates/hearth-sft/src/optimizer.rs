//! Optimizer setup and learning-rate scheduling

use anyhow::Result;
use aprender::autograd::Tensor;
use aprender::nn::optim::AdamW;
use serde::{Deserialize, Serialize};

/// How the learning rate decays over training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    /// Cosine decay from the initial rate to `min_lr`
    Cosine,
    /// Linear decay from the initial rate to `min_lr`
    Linear,
    /// Hold the initial rate for the whole run
    Constant,
}

/// Optimizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Initial learning rate
    pub learning_rate: f32,
    /// Weight decay
    pub weight_decay: f32,
    /// AdamW beta1
    pub beta1: f32,
    /// AdamW beta2
    pub beta2: f32,
    /// AdamW epsilon
    pub eps: f32,
    /// Linear warmup steps before decay begins
    pub warmup_steps: usize,
    /// Floor the schedule decays to
    pub min_lr: f32,
    /// Decay curve
    pub schedule: ScheduleKind,
}

/// Build the AdamW optimizer over the model's parameters.
///
/// # Errors
/// A model with no parameters cannot be optimized.
pub fn setup_optimizer(parameters: Vec<&mut Tensor>, config: &OptimizerConfig) -> Result<AdamW> {
    if parameters.is_empty() {
        anyhow::bail!("Model has no parameters to optimize");
    }
    Ok(AdamW::new(parameters, config.learning_rate))
}

/// Learning rate at a given optimizer step.
///
/// Linear warmup over `warmup_steps`, then the configured decay curve from
/// `learning_rate` down to `min_lr` across the remaining steps. Steps are
/// 0-indexed; `step >= total_steps` returns the final rate.
pub fn lr_at_step(step: usize, total_steps: usize, config: &OptimizerConfig) -> f32 {
    let warmup = config.warmup_steps.min(total_steps);
    if warmup > 0 && step < warmup {
        return config.learning_rate * (step + 1) as f32 / warmup as f32;
    }

    let decay_steps = total_steps.saturating_sub(warmup);
    let progress = if decay_steps > 0 {
        ((step - warmup) as f32 / decay_steps as f32).min(1.0)
    } else {
        1.0
    };

    let span = config.learning_rate - config.min_lr;
    match config.schedule {
        ScheduleKind::Constant => config.learning_rate,
        ScheduleKind::Linear => config.min_lr + span * (1.0 - progress),
        ScheduleKind::Cosine => {
            config.min_lr + 0.5 * span * (1.0 + (std::f32::consts::PI * progress).cos())
        }
    }
}
