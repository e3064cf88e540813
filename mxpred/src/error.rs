use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by model loading and predictor operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("mxpred: load {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("mxpred: shape: {0}")]
    Shape(String),

    #[error("mxpred: no model loaded")]
    NotLoaded,

    #[error("mxpred: create predictor: {0}")]
    PredictorCreation(#[source] EngineError),

    #[error("mxpred: set input: {0}")]
    InputBinding(#[source] EngineError),

    #[error("mxpred: forward: {0}")]
    ForwardExecution(#[source] EngineError),

    #[error("mxpred: get output: {0}")]
    OutputFetch(#[source] EngineError),

    #[error("mxpred: symbol: {0}")]
    Symbol(#[from] serde_json::Error),
}
