//! Raw FFI bindings for the MXNet C predict API.
//!
//! Only the single-input, single-output calls of `mxnet/c_predict_api.h`
//! are declared; signatures follow that header with `mx_uint` as `c_uint`.

use std::os::raw::{c_char, c_float, c_int, c_uint, c_void};

/// Opaque predictor handle.
pub type PredictorHandle = *mut c_void;

pub type MxUint = c_uint;
pub type MxFloat = c_float;

// Every call returns 0 on success and -1 on failure; the message is then
// available from MXGetLastError until the next failing call on this thread.
#[link(name = "mxnet")]
unsafe extern "C" {
    pub fn MXGetLastError() -> *const c_char;

    pub fn MXPredCreate(
        symbol_json_str: *const c_char,
        param_bytes: *const c_void,
        param_size: c_int,
        dev_type: c_int,
        dev_id: c_int,
        num_input_nodes: MxUint,
        input_keys: *const *const c_char,
        input_shape_indptr: *const MxUint,
        input_shape_data: *const MxUint,
        out: *mut PredictorHandle,
    ) -> c_int;
    pub fn MXPredSetInput(handle: PredictorHandle, key: *const c_char, data: *const MxFloat, size: MxUint) -> c_int;
    pub fn MXPredForward(handle: PredictorHandle) -> c_int;
    pub fn MXPredGetOutputShape(
        handle: PredictorHandle,
        index: MxUint,
        shape_data: *mut *mut MxUint,
        shape_ndim: *mut MxUint,
    ) -> c_int;
    pub fn MXPredGetOutput(handle: PredictorHandle, index: MxUint, data: *mut MxFloat, size: MxUint) -> c_int;
    pub fn MXPredFree(handle: PredictorHandle) -> c_int;
}
