//! Rust bindings for the MXNet C predict API.
//!
//! MXNet checkpoints come as a symbol graph (`<prefix>-symbol.json`) and a
//! parameter blob (`<prefix>-0009.params`). This crate loads both, builds a
//! native predictor for the shape of the images it is given and runs forward
//! passes on it, rebuilding the predictor only when the input shape changes.
//!
//! # Usage
//!
//! ```no_run
//! # #[cfg(feature = "native")]
//! # fn main() -> mxpred::Result<()> {
//! use mxpred::{Images, MxEngine, Session};
//!
//! let mut session = Session::new(MxEngine::new());
//! session.load("model/vgg19", 9)?;
//!
//! // One 224x224 RGB image, column-major.
//! let pixels = vec![0.0f32; 224 * 224 * 3];
//! let output = session.forward(Images::new(&[224, 224, 3], &pixels))?;
//! println!("{:?}", output.shape());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "native"))]
//! # fn main() {}
//! ```
//!
//! # Layouts
//!
//! Inputs are column-major (width varies fastest) and are transposed per
//! plane before they reach the engine. Outputs are returned in the engine's
//! row-major order, untransposed.
//!
//! # Linking
//!
//! The `native` feature links `libmxnet` and enables [`MxEngine`]. Without
//! it, any type implementing [`Engine`] can drive a [`Session`].

mod engine;
mod error;
#[cfg(feature = "native")]
mod ffi;
pub mod layout;
pub mod logger;
pub mod model;
#[cfg(feature = "native")]
mod mxnet;
mod session;
pub mod symbol;

pub use engine::{CreateRequest, Device, Engine, EngineError};
pub use error::{Error, Result};
pub use layout::{to_engine_layout, Images, InputShape};
pub use logger::{Logger, NopLogger, TracingLogger};
pub use model::ModelDefinition;
#[cfg(feature = "native")]
pub use mxnet::{MxEngine, MxPredictor};
pub use session::{OutputTensor, Session, SessionOptions, INPUT_KEY, MAX_OUTPUT_RANK};
pub use symbol::Symbol;
