//! Training metrics logging

/// Metrics for a single optimizer step
#[derive(Debug, Clone)]
pub struct TrainingMetrics {
    /// Mean loss over the accumulated micro-batches
    pub loss: f32,
    /// Learning rate applied at this step
    pub learning_rate: f32,
    /// Throughput (tokens per second)
    pub throughput: f32,
    /// Optimizer step number
    pub step: usize,
}

/// Logs scalar training metrics to stdout at a fixed step cadence
pub struct MetricsLogger {
    logging_steps: usize,
    step: usize,
}

impl MetricsLogger {
    /// Create a logger emitting every `logging_steps` optimizer steps
    pub fn new(logging_steps: usize) -> Self {
        Self {
            logging_steps: logging_steps.max(1),
            step: 0,
        }
    }

    /// Record one optimizer step, printing if the cadence is due
    pub fn log_step(&mut self, loss: f32, learning_rate: f32, tokens_processed: usize, elapsed_secs: f32) {
        self.step += 1;

        if self.step % self.logging_steps == 0 {
            let throughput = if elapsed_secs > 0.0 {
                tokens_processed as f32 / elapsed_secs
            } else {
                0.0
            };
            let metrics = TrainingMetrics {
                loss,
                learning_rate,
                throughput,
                step: self.step,
            };
            self.print_metrics(&metrics);
        }
    }

    /// Print the per-epoch evaluation loss
    pub fn log_eval(&self, epoch: usize, eval_loss: f32) {
        println!("Epoch {}: eval_loss={:.6}", epoch, eval_loss);
    }

    fn print_metrics(&self, metrics: &TrainingMetrics) {
        println!(
            "Step {}: loss={:.6}, lr={:.2e}, throughput={:.2} tokens/s",
            metrics.step, metrics.loss, metrics.learning_rate, metrics.throughput
        );
    }

    /// Number of optimizer steps recorded so far
    pub fn step(&self) -> usize {
        self.step
    }
}
