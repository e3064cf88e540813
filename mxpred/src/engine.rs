//! The call contract between a [`Session`](crate::Session) and a native
//! inference engine.
//!
//! [`Engine`] mirrors the six calls of the MXNet C predict API. The session
//! only talks to the engine through this trait, which keeps the predictor
//! lifecycle independent of the linked library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by the native engine for a single call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct EngineError {
    /// Status code returned by the engine call.
    pub status: i32,
    /// Engine-provided description, usually from its last-error slot.
    pub message: String,
}

impl EngineError {
    pub fn new(status: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Device a predictor is bound to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
    Gpu(i32),
}

impl Device {
    /// Device type selector as understood by the engine (1 = cpu, 2 = gpu).
    pub fn dev_type(self) -> i32 {
        match self {
            Device::Cpu => 1,
            Device::Gpu(_) => 2,
        }
    }

    /// Device ordinal. Always 0 for the CPU.
    pub fn dev_id(self) -> i32 {
        match self {
            Device::Cpu => 0,
            Device::Gpu(id) => id,
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu(0)"),
            Device::Gpu(id) => write!(f, "gpu({id})"),
        }
    }
}

/// Everything the engine needs to build a predictor.
///
/// `symbol` and `params` borrow from the session's loaded model. The engine
/// may keep pointers into them for as long as the returned handle lives.
#[derive(Debug, Clone, Copy)]
pub struct CreateRequest<'a> {
    pub symbol: &'a str,
    pub params: &'a [u8],
    pub device: Device,
    /// Name of the single input binding.
    pub input_key: &'a str,
    /// Input dimensions, slowest-varying first.
    pub input_shape: &'a [u32],
}

/// A native inference engine driven through an opaque predictor handle.
pub trait Engine {
    /// Opaque predictor handle owned by the caller.
    type Handle;

    /// Builds a predictor for the given graph, weights, device and shape.
    fn create_predictor(&mut self, req: &CreateRequest<'_>) -> Result<Self::Handle, EngineError>;

    /// Copies `data` into the named input of the predictor.
    fn set_input(&mut self, handle: &mut Self::Handle, key: &str, data: &[f32]) -> Result<(), EngineError>;

    /// Runs one forward pass.
    fn forward(&mut self, handle: &mut Self::Handle) -> Result<(), EngineError>;

    /// Returns the dimensions of output `index`, slowest-varying first.
    fn output_shape(&mut self, handle: &Self::Handle, index: u32) -> Result<Vec<u32>, EngineError>;

    /// Writes output `index` into `out`, which holds exactly the element
    /// count of [`Engine::output_shape`].
    fn output(&mut self, handle: &Self::Handle, index: u32, out: &mut [f32]) -> Result<(), EngineError>;

    /// Releases a predictor. Best effort: callers log failures and move on.
    fn free(&mut self, handle: Self::Handle) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_selectors() {
        assert_eq!(Device::default(), Device::Cpu);
        assert_eq!((Device::Cpu.dev_type(), Device::Cpu.dev_id()), (1, 0));
        assert_eq!((Device::Gpu(3).dev_type(), Device::Gpu(3).dev_id()), (2, 3));
        assert_eq!(Device::Gpu(1).to_string(), "gpu(1)");
    }

    #[test]
    fn device_serde() {
        assert_eq!(serde_json::to_string(&Device::Cpu).unwrap(), "\"cpu\"");
        let d: Device = serde_json::from_str(r#"{"gpu":2}"#).unwrap();
        assert_eq!(d, Device::Gpu(2));
    }

    #[test]
    fn engine_error_display() {
        let err = EngineError::new(-1, "bad symbol");
        assert_eq!(err.to_string(), "bad symbol (status -1)");
    }
}
