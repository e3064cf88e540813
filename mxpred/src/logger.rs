//! Observer for predictor lifecycle events.
//!
//! A [`Session`](crate::Session) in verbose mode reports every native
//! predictor it creates or frees to its `Logger`. The default
//! implementation forwards to the `tracing` crate.

use std::sync::Arc;

use crate::engine::Device;
use crate::layout::InputShape;

/// Receives predictor lifecycle events.
pub trait Logger: Send + Sync {
    /// A predictor was created for `shape` on `device`.
    fn predictor_created(&self, shape: &InputShape, device: Device);

    /// The held predictor was freed.
    fn predictor_freed(&self, shape: &InputShape, device: Device);
}

/// Returns the default logger that uses the `tracing` crate.
pub fn default_logger() -> Arc<dyn Logger> {
    Arc::new(TracingLogger)
}

/// Default logger implementation using `tracing`.
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn predictor_created(&self, shape: &InputShape, device: Device) {
        tracing::info!("mxpred: created predictor on {device} for input {shape}");
    }

    fn predictor_freed(&self, shape: &InputShape, device: Device) {
        tracing::info!("mxpred: freed predictor on {device} for input {shape}");
    }
}

/// No-op logger that discards all events.
pub struct NopLogger;

impl Logger for NopLogger {
    fn predictor_created(&self, _shape: &InputShape, _device: Device) {}
    fn predictor_freed(&self, _shape: &InputShape, _device: Device) {}
}
