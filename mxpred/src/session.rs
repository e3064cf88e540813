//! Inference session: owns the loaded model and at most one native
//! predictor, rebuilding the predictor only when the input shape or device
//! changes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::{CreateRequest, Device, Engine};
use crate::error::{Error, Result};
use crate::layout::{self, Images, InputShape};
use crate::logger::{default_logger, Logger};
use crate::model::ModelDefinition;

/// Name of the single input binding.
pub const INPUT_KEY: &str = "data";

/// Highest output rank the engine may report.
pub const MAX_OUTPUT_RANK: usize = 4;

/// Session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Device predictors are created on.
    pub device: Device,
    /// Report predictor creation and release to the session's logger.
    pub verbose: bool,
}

impl SessionOptions {
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Result of one forward pass.
///
/// `data` is in the engine's row-major order and `shape` lists the engine's
/// dimensions slowest-varying first. Unlike the input, the output is not
/// converted back to the caller's column-major layout.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl OutputTensor {
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

/// What a predictor was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    shape: InputShape,
    device: Device,
}

/// A native predictor together with what it was built for.
struct Built<H> {
    key: CacheKey,
    handle: H,
}

/// Returns the held handle, creating one first if the slot is empty.
fn get_or_try_create<H>(
    slot: &mut Option<Built<H>>,
    key: CacheKey,
    create: impl FnOnce() -> Result<H>,
) -> Result<&mut H> {
    let built = match *slot {
        Some(ref mut built) => built,
        None => slot.insert(Built { key, handle: create()? }),
    };
    Ok(&mut built.handle)
}

/// Runs images through a model on a native engine.
///
/// Creating a predictor is expensive, so the session keeps the last one and
/// reuses it for as long as calls arrive with the same input shape. Batch
/// images into one tensor rather than alternating shapes: every shape change
/// frees the predictor and builds a new one.
///
/// The predictor is freed on [`Session::release`], on reload and on drop.
pub struct Session<E: Engine> {
    engine: E,
    options: SessionOptions,
    model: Option<ModelDefinition>,
    // Empty until the first forward, and again after every release.
    predictor: Option<Built<E::Handle>>,
    // Last shape seen by `forward`. Kept even when building the predictor
    // for it failed.
    last_key: Option<CacheKey>,
    logger: Arc<dyn Logger>,
}

impl<E: Engine> Session<E> {
    /// Creates a session with default options (CPU, quiet).
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, SessionOptions::default())
    }

    pub fn with_options(engine: E, options: SessionOptions) -> Self {
        Self {
            engine,
            options,
            model: None,
            predictor: None,
            last_key: None,
            logger: default_logger(),
        }
    }

    /// Replaces the lifecycle observer used in verbose mode.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.options.verbose = verbose;
    }

    /// Selects the device for the next predictor. A held predictor on a
    /// different device is rebuilt by the next `forward`.
    pub fn set_device(&mut self, device: Device) {
        self.options.device = device;
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The loaded model, if any.
    pub fn definition(&self) -> Option<&ModelDefinition> {
        self.model.as_ref()
    }

    /// Whether a native predictor is currently held.
    pub fn is_built(&self) -> bool {
        self.predictor.is_some()
    }

    /// Input shape of the last `forward` call since the last release.
    pub fn cached_shape(&self) -> Option<InputShape> {
        self.last_key.map(|k| k.shape)
    }

    /// Loads `<prefix>-symbol.json` and `<prefix>-%04d.params`.
    ///
    /// On failure the current model and predictor are kept.
    pub fn load(&mut self, prefix: &str, epoch: u32) -> Result<()> {
        let def = ModelDefinition::load(prefix, epoch)?;
        self.load_definition(def);
        Ok(())
    }

    /// Installs a model, freeing any predictor built from the previous one.
    pub fn load_definition(&mut self, def: ModelDefinition) {
        self.release();
        self.model = Some(def);
    }

    /// Runs one forward pass and returns output 0.
    ///
    /// `images` is column-major with rank 2, 3 or 4. A predictor is created
    /// on the first call and whenever the shape differs from the previous
    /// call; otherwise the held one is reused.
    pub fn forward(&mut self, images: Images<'_>) -> Result<OutputTensor> {
        let (shape, input) = layout::to_engine_layout(images)?;
        let input_shape = shape.engine_dims()?;
        if self.model.is_none() {
            return Err(Error::NotLoaded);
        }

        let key = CacheKey {
            shape,
            device: self.options.device,
        };
        if self.last_key != Some(key) {
            self.free_predictor();
        }
        self.last_key = Some(key);

        let Self {
            engine,
            model,
            predictor,
            options,
            logger,
            ..
        } = self;
        let model = model.as_ref().ok_or(Error::NotLoaded)?;

        let handle = get_or_try_create(predictor, key, || {
            let req = CreateRequest {
                symbol: model.symbol_text(),
                params: model.params(),
                device: key.device,
                input_key: INPUT_KEY,
                input_shape: &input_shape,
            };
            let handle = engine.create_predictor(&req).map_err(Error::PredictorCreation)?;
            debug!("mxpred: predictor ready, input {input_shape:?} on {}", key.device);
            if options.verbose {
                logger.predictor_created(&key.shape, key.device);
            }
            Ok(handle)
        })?;

        run(engine, handle, &input)
    }

    /// Frees the predictor if one is held and forgets the cached shape.
    /// Calling it again is a no-op.
    pub fn release(&mut self) {
        self.free_predictor();
        self.last_key = None;
    }

    fn free_predictor(&mut self) {
        if let Some(Built { key, handle }) = self.predictor.take() {
            if let Err(err) = self.engine.free(handle) {
                warn!("mxpred: free predictor: {err}");
            }
            if self.options.verbose {
                self.logger.predictor_freed(&key.shape, key.device);
            }
        }
    }
}

impl<E: Engine> Drop for Session<E> {
    fn drop(&mut self) {
        self.release();
    }
}

fn run<E: Engine>(engine: &mut E, handle: &mut E::Handle, input: &[f32]) -> Result<OutputTensor> {
    engine
        .set_input(handle, INPUT_KEY, input)
        .map_err(Error::InputBinding)?;
    engine.forward(handle).map_err(Error::ForwardExecution)?;

    let dims = engine.output_shape(handle, 0).map_err(Error::OutputFetch)?;
    if dims.len() > MAX_OUTPUT_RANK {
        return Err(Error::Shape(format!(
            "engine reported output rank {} (max {MAX_OUTPUT_RANK})",
            dims.len()
        )));
    }
    let shape: Vec<usize> = dims.iter().map(|&d| d as usize).collect();
    let len = output_len(&shape)?;
    let mut data = vec![0.0f32; len];
    engine.output(handle, 0, &mut data).map_err(Error::OutputFetch)?;

    debug!("mxpred: forward done, output {shape:?}");
    Ok(OutputTensor { shape, data })
}

/// Element count of an engine-reported shape, refusing sizes no buffer can hold.
fn output_len(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .filter(|&n| n.checked_mul(size_of::<f32>()).is_some_and(|b| b <= isize::MAX as usize))
        .ok_or_else(|| Error::Shape(format!("engine reported output shape {shape:?} too large to allocate")))
}
