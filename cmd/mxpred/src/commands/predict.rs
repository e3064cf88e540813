//! Forward pass over raw image data.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

#[cfg(feature = "native")]
use mxpred::{Device, SessionOptions};

use super::{output_result, CheckpointArgs, Ranked};
use crate::Cli;

/// Run raw float32 images through a checkpoint.
#[derive(Args)]
pub struct PredictCommand {
    #[command(flatten)]
    checkpoint: CheckpointArgs,

    /// Little-endian float32 image data, column-major (width fastest)
    #[arg(long)]
    input: PathBuf,

    /// Input shape as width,height[,channels[,batch]]
    #[arg(long, value_delimiter = ',', required = true)]
    shape: Vec<usize>,

    /// Run on this GPU instead of the CPU
    #[arg(long)]
    gpu: Option<i32>,

    /// Number of top scores to print per row
    #[arg(long, default_value_t = 5)]
    top: usize,
}

#[derive(Debug, Serialize)]
struct PredictResult {
    shape: Vec<usize>,
    top: Vec<Vec<Ranked>>,
}

impl PredictCommand {
    #[cfg(feature = "native")]
    fn options(&self, cli: &Cli) -> SessionOptions {
        let device = self.gpu.map_or(Device::Cpu, Device::Gpu);
        SessionOptions::default()
            .with_device(device)
            .with_verbose(cli.verbose)
    }

    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let result = self.predict(cli)?;
        output_result(&result, cli.output.as_deref(), cli.json, |r| {
            let mut s = format!("output shape: {:?}\n", r.shape);
            for (row, ranked) in r.top.iter().enumerate() {
                s.push_str(&format!("row {row}:\n"));
                for Ranked { index, score } in ranked {
                    s.push_str(&format!("  {index:>6}  {score:.6}\n"));
                }
            }
            s
        })
    }

    #[cfg(feature = "native")]
    fn predict(&self, cli: &Cli) -> anyhow::Result<PredictResult> {
        use mxpred::{Images, MxEngine, Session};

        let data = super::read_f32_file(&self.input)?;
        let mut session = Session::with_options(MxEngine::new(), self.options(cli));
        session.load(&self.checkpoint.prefix, self.checkpoint.epoch)?;

        let output = session.forward(Images::new(&self.shape, &data))?;
        let classes = output.shape().last().copied().unwrap_or(1);
        Ok(PredictResult {
            shape: output.shape().to_vec(),
            top: super::top_k(output.data(), classes, self.top),
        })
    }

    #[cfg(not(feature = "native"))]
    fn predict(&self, _cli: &Cli) -> anyhow::Result<PredictResult> {
        let data = super::read_f32_file(&self.input)?;
        mxpred::to_engine_layout(mxpred::Images::new(&self.shape, &data))?;
        anyhow::bail!("mxpred was built without the `native` feature; rebuild with --features native to link libmxnet")
    }
}
