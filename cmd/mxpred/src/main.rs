//! mxpred CLI - run MXNet checkpoints from the command line.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{InspectCommand, PredictCommand};

/// mxpred CLI - inspect MXNet checkpoints and run images through them.
///
/// A checkpoint is addressed by its prefix and epoch: `--prefix model/vgg19
/// --epoch 9` reads model/vgg19-symbol.json and model/vgg19-0009.params.
#[derive(Parser)]
#[command(name = "mxpred")]
#[command(about = "MXNet checkpoint predictor")]
#[command(version)]
pub struct Cli {
    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the arguments and outputs of a checkpoint's graph
    Inspect(InspectCommand),
    /// Run raw float32 images through a checkpoint
    Predict(PredictCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .init();
    }

    match &cli.command {
        Commands::Inspect(cmd) => cmd.run(&cli),
        Commands::Predict(cmd) => cmd.run(&cli),
    }
}
