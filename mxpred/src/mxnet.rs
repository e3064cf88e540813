//! [`Engine`] implementation backed by libmxnet.

use std::ffi::{CStr, CString};
use std::os::raw::{c_int, c_void};
use std::ptr;

use tracing::warn;

use crate::engine::{CreateRequest, Engine, EngineError};
use crate::ffi;

/// Reads the thread-local last-error message of the engine.
fn last_error() -> String {
    unsafe {
        let ptr = ffi::MXGetLastError();
        if ptr.is_null() {
            return String::from("unknown error");
        }
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

/// Converts an engine status code to a Rust Result.
fn check(ret: c_int) -> Result<(), EngineError> {
    if ret == 0 {
        return Ok(());
    }
    Err(EngineError::new(ret, last_error()))
}

fn to_mx_uint(n: usize, what: &str) -> Result<ffi::MxUint, EngineError> {
    ffi::MxUint::try_from(n).map_err(|_| EngineError::new(-1, format!("{what} {n} exceeds u32")))
}

// ---------------------------------------------------------------------------
// MxPredictor
// ---------------------------------------------------------------------------

/// Owned MXNet predictor handle. Freed on drop if not freed explicitly.
pub struct MxPredictor {
    handle: ffi::PredictorHandle,
}

impl MxPredictor {
    fn close(&mut self) -> Result<(), EngineError> {
        if self.handle.is_null() {
            return Ok(());
        }
        let ret = unsafe { ffi::MXPredFree(self.handle) };
        self.handle = ptr::null_mut();
        check(ret)
    }
}

impl Drop for MxPredictor {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("mxpred: free predictor: {err}");
        }
    }
}

// ---------------------------------------------------------------------------
// MxEngine
// ---------------------------------------------------------------------------

/// The MXNet C predict API.
#[derive(Debug, Default, Clone, Copy)]
pub struct MxEngine;

impl MxEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for MxEngine {
    type Handle = MxPredictor;

    fn create_predictor(&mut self, req: &CreateRequest<'_>) -> Result<MxPredictor, EngineError> {
        let symbol = CString::new(req.symbol).map_err(|e| EngineError::new(-1, e.to_string()))?;
        let key = CString::new(req.input_key).map_err(|e| EngineError::new(-1, e.to_string()))?;
        let param_size = c_int::try_from(req.params.len())
            .map_err(|_| EngineError::new(-1, format!("params of {} bytes exceed i32", req.params.len())))?;

        let keys = [key.as_ptr()];
        let indptr: [ffi::MxUint; 2] = [0, to_mx_uint(req.input_shape.len(), "input rank")?];

        let mut handle: ffi::PredictorHandle = ptr::null_mut();
        check(unsafe {
            ffi::MXPredCreate(
                symbol.as_ptr(),
                req.params.as_ptr() as *const c_void,
                param_size,
                req.device.dev_type(),
                req.device.dev_id(),
                1,
                keys.as_ptr(),
                indptr.as_ptr(),
                req.input_shape.as_ptr(),
                &mut handle,
            )
        })?;
        if handle.is_null() {
            return Err(EngineError::new(-1, "MXPredCreate returned a null handle"));
        }
        Ok(MxPredictor { handle })
    }

    fn set_input(&mut self, handle: &mut MxPredictor, key: &str, data: &[f32]) -> Result<(), EngineError> {
        let c_key = CString::new(key).map_err(|e| EngineError::new(-1, e.to_string()))?;
        let size = to_mx_uint(data.len(), "input size")?;
        check(unsafe { ffi::MXPredSetInput(handle.handle, c_key.as_ptr(), data.as_ptr(), size) })
    }

    fn forward(&mut self, handle: &mut MxPredictor) -> Result<(), EngineError> {
        check(unsafe { ffi::MXPredForward(handle.handle) })
    }

    fn output_shape(&mut self, handle: &MxPredictor, index: u32) -> Result<Vec<u32>, EngineError> {
        let mut shape_data: *mut ffi::MxUint = ptr::null_mut();
        let mut ndim: ffi::MxUint = 0;
        check(unsafe { ffi::MXPredGetOutputShape(handle.handle, index, &mut shape_data, &mut ndim) })?;

        if ndim == 0 {
            return Ok(Vec::new());
        }
        if shape_data.is_null() {
            return Err(EngineError::new(-1, "MXPredGetOutputShape returned no shape data"));
        }
        // The shape buffer belongs to the predictor and is only valid until
        // the next call on it.
        let dims = unsafe { std::slice::from_raw_parts(shape_data, ndim as usize) };
        Ok(dims.to_vec())
    }

    fn output(&mut self, handle: &MxPredictor, index: u32, out: &mut [f32]) -> Result<(), EngineError> {
        let size = to_mx_uint(out.len(), "output size")?;
        check(unsafe { ffi::MXPredGetOutput(handle.handle, index, out.as_mut_ptr(), size) })
    }

    fn free(&mut self, mut handle: MxPredictor) -> Result<(), EngineError> {
        handle.close()
    }
}
