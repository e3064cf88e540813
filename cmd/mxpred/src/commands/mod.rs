//! CLI commands module.

mod inspect;
mod predict;
mod util;

pub use inspect::InspectCommand;
pub use predict::PredictCommand;

pub(crate) use util::*;
