//! Execution context for a training run
//!
//! Device and precision are an explicit value handed to the driver, not
//! process-wide defaults configured before any object is built. The context
//! is logged once at startup and recorded in checkpoint metadata so a run's
//! intent stays auditable.

use serde::{Deserialize, Serialize};

/// Compute device for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// CPU execution (aprender's backend)
    #[default]
    Cpu,
}

/// Requested compute precision.
///
/// `aprender` executes in f32; a bf16 request is accepted as the configured
/// mode and recorded, with reduced-precision execution left to the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// bfloat16 compute for training and evaluation
    Bf16,
    /// Full 32-bit floating point
    Fp32,
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Bf16
    }
}

/// Execution context passed to the training driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Compute device
    pub device: Device,
    /// Requested compute precision
    pub precision: Precision,
}

impl ExecutionContext {
    /// One-line description for startup logging
    pub fn describe(&self) -> String {
        let device = match self.device {
            Device::Cpu => "cpu",
        };
        let precision = match self.precision {
            Precision::Bf16 => "bf16",
            Precision::Fp32 => "fp32",
        };
        format!("device={}, precision={}", device, precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let ctx = ExecutionContext::default();
        assert_eq!(ctx.precision, Precision::Bf16);
        assert_eq!(ctx.describe(), "device=cpu, precision=bf16");
    }

    #[test]
    fn test_context_serialization() {
        let ctx = ExecutionContext {
            device: Device::Cpu,
            precision: Precision::Fp32,
        };
        let json = serde_json::to_string(&ctx).expect("Should serialize");
        assert_eq!(json, r#"{"device":"cpu","precision":"fp32"}"#);

        let back: ExecutionContext = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(back, ctx);
    }
}
