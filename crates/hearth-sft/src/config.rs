//! Training configuration
//!
//! A static bundle of hyperparameters and operational policy, constructed
//! once before training and read-only for the run's duration. Loaded from a
//! JSON file or built from the standard defaults.

use crate::optimizer::{OptimizerConfig, ScheduleKind};
use crate::runtime::Precision;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete configuration bundle loaded from file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfigFile {
    /// Dataset location and split policy
    pub data: DataConfig,
    /// Training loop hyperparameters
    pub training: TrainingParams,
    /// Optimizer and learning-rate schedule
    pub optimizer: OptimizerConfig,
}

/// Dataset location and split policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON/JSONL file of `{"text": ...}` examples
    pub dataset_path: PathBuf,
    /// Held-out fraction for evaluation
    pub test_fraction: f32,
    /// Seed for the deterministic train/test split
    pub split_seed: u64,
}

/// Training loop hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Fixed token length of every tokenized example
    pub context_length: usize,
    /// Examples per forward/backward step
    pub micro_batch_size: usize,
    /// Simulated effective batch size; must be a multiple of the micro-batch
    pub target_batch_size: usize,
    /// Full passes over the train partition
    pub epochs: usize,
    /// Optimizer steps between metric log lines
    pub logging_steps: usize,
    /// Maximum number of epoch checkpoints retained
    pub save_total_limit: usize,
    /// Seed for per-epoch example shuffling (None = fixed default)
    pub shuffle_seed: Option<u64>,
    /// Requested compute precision
    pub precision: Precision,
    /// Directory for checkpoints and the final model artifact
    pub output_dir: PathBuf,
}

impl TrainingParams {
    /// Micro-steps accumulated per optimizer step.
    ///
    /// # Errors
    /// The target batch size must be a positive multiple of the micro-batch
    /// size; anything else is a configuration error.
    pub fn gradient_accumulation_steps(&self) -> Result<usize> {
        if self.micro_batch_size == 0 {
            bail!("micro_batch_size must be positive");
        }
        if self.target_batch_size == 0 || self.target_batch_size % self.micro_batch_size != 0 {
            bail!(
                "target_batch_size ({}) must be a positive multiple of micro_batch_size ({})",
                self.target_batch_size,
                self.micro_batch_size
            );
        }
        Ok(self.target_batch_size / self.micro_batch_size)
    }
}

impl TrainingConfigFile {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: TrainingConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Standard fine-tuning defaults: context 512, batch 2 (no
    /// accumulation), 4 epochs, lr 1e-5 with cosine decay, 2 checkpoints
    /// retained, bf16.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self {
            data: DataConfig {
                dataset_path: PathBuf::from("data/home_assistant_examples.json"),
                test_fraction: 0.1,
                split_seed: 42,
            },
            training: TrainingParams {
                context_length: 512,
                micro_batch_size: 2,
                target_batch_size: 2,
                epochs: 4,
                logging_steps: 10,
                save_total_limit: 2,
                shuffle_seed: None,
                precision: Precision::Bf16,
                output_dir: PathBuf::from("models/training"),
            },
            optimizer: OptimizerConfig {
                learning_rate: 1e-5,
                weight_decay: 0.0,
                beta1: 0.9,
                beta2: 0.999,
                eps: 1e-8,
                warmup_steps: 0,
                min_lr: 0.0,
                schedule: ScheduleKind::Cosine,
            },
        }
    }
}
