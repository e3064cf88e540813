//! Checkpoint inspection.

use clap::Args;
use serde::Serialize;

use mxpred::ModelDefinition;

use super::{output_result, CheckpointArgs};
use crate::Cli;

/// Show the arguments and outputs of a checkpoint's graph.
#[derive(Args)]
pub struct InspectCommand {
    #[command(flatten)]
    checkpoint: CheckpointArgs,

    /// Print every graph node with its inputs and attributes
    #[arg(long)]
    graph: bool,
}

#[derive(Debug, Serialize)]
struct InspectResult {
    nodes: usize,
    params_bytes: usize,
    arguments: Vec<String>,
    outputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    graph: Option<String>,
}

impl InspectCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let def = ModelDefinition::load(&self.checkpoint.prefix, self.checkpoint.epoch)?;
        let symbol = def.symbol()?;

        let result = InspectResult {
            nodes: symbol.num_nodes(),
            params_bytes: def.params().len(),
            arguments: symbol.list_arguments().into_iter().map(String::from).collect(),
            outputs: symbol.list_outputs(),
            graph: self.graph.then(|| symbol.debug_str()),
        };

        output_result(&result, cli.output.as_deref(), cli.json, |r| {
            let mut s = format!("nodes: {}\nparams: {} bytes\narguments:\n", r.nodes, r.params_bytes);
            for name in &r.arguments {
                s.push_str(&format!("  {name}\n"));
            }
            s.push_str("outputs:\n");
            for name in &r.outputs {
                s.push_str(&format!("  {name}\n"));
            }
            if let Some(graph) = &r.graph {
                s.push_str(graph);
            }
            s
        })
    }
}
