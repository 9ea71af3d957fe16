//! Supervised fine-tuning for the hearth home-assistant model
//!
//! This crate configures and runs fine-tuning of a pretrained causal language
//! model on a small JSON dataset of home-assistant text examples:
//! load examples, tokenize them to a fixed context length, collate batches
//! (dropping the attention mask, see [`collate`]), and drive the training
//! loop with per-epoch evaluation and checkpointing.
//!
//! Gradient computation, optimization, and weight serialization are owned by
//! `aprender` and the [`model::CausalLm`] implementor; this crate only
//! orchestrates them.

pub mod checkpoint;
pub mod collate;
pub mod config;
pub mod encode;
pub mod metrics;
pub mod model;
pub mod optimizer;
pub mod runtime;
pub mod train;

pub use config::TrainingConfigFile;
pub use model::CausalLm;
pub use train::{train, TrainingSummary};
