//! Read-only view of an MXNet symbol JSON graph.
//!
//! The predictor never needs this; it is for listing what a checkpoint
//! expects and produces before binding it.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub op: String,
    pub name: String,
    /// Entries of `[node_id, output_index, version]`; older files omit the version.
    #[serde(default)]
    pub inputs: Vec<Vec<usize>>,
    /// Operator parameters. Files from older releases call this `param` or `attr`.
    #[serde(default, alias = "param", alias = "attr", skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
}

/// A parsed symbol graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub arg_nodes: Vec<usize>,
    #[serde(default)]
    pub heads: Vec<Vec<usize>>,
}

impl Symbol {
    /// Parses symbol JSON text and checks that every node reference resolves.
    pub fn parse(text: &str) -> Result<Self> {
        let sym: Symbol = serde_json::from_str(text)?;
        let n = sym.nodes.len();

        let refs = sym.arg_nodes.iter().copied();
        let heads = sym.heads.iter().filter_map(|e| e.first().copied());
        let inputs = sym.nodes.iter().flat_map(|node| node.inputs.iter().filter_map(|e| e.first().copied()));
        if let Some(bad) = refs.chain(heads).chain(inputs).find(|&id| id >= n) {
            return Err(serde_json::Error::custom(format!("node id {bad} out of range ({n} nodes)")).into());
        }
        Ok(sym)
    }

    /// Number of nodes in the graph.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Names of the graph's variables (inputs, weights, biases) in argument order.
    pub fn list_arguments(&self) -> Vec<&str> {
        self.arg_nodes
            .iter()
            .filter_map(|&id| self.nodes.get(id))
            .filter(|node| node.op == "null")
            .map(|node| node.name.as_str())
            .collect()
    }

    /// Names of the graph's outputs.
    pub fn list_outputs(&self) -> Vec<String> {
        self.heads
            .iter()
            .filter_map(|entry| {
                let node = self.nodes.get(*entry.first()?)?;
                Some(match entry.get(1).copied().unwrap_or(0) {
                    0 => format!("{}_output", node.name),
                    i => format!("{}_output{i}", node.name),
                })
            })
            .collect()
    }

    /// Human-readable dump of the graph: its outputs, then every node in
    /// topological order with its inputs and operator attributes.
    pub fn debug_str(&self) -> String {
        let mut out = String::from("Symbol Outputs:\n");
        for (i, entry) in self.heads.iter().enumerate() {
            let _ = writeln!(out, "\toutput[{i}]={}", self.entry_str(entry));
        }
        for node in &self.nodes {
            if node.op == "null" {
                let _ = writeln!(out, "Variable:{}", node.name);
                continue;
            }
            out.push_str("--------------------\n");
            let _ = writeln!(out, "Op:{}, Name={}", node.op, node.name);
            out.push_str("Inputs:\n");
            for (i, entry) in node.inputs.iter().enumerate() {
                let version = entry.get(2).copied().unwrap_or(0);
                let _ = writeln!(out, "\targ[{i}]={} version={version}", self.entry_str(entry));
            }
            if !node.attrs.is_empty() {
                out.push_str("Attrs:\n");
                for (k, v) in &node.attrs {
                    let _ = writeln!(out, "\t{k}={v}");
                }
            }
        }
        out
    }

    fn entry_str(&self, entry: &[usize]) -> String {
        let name = entry
            .first()
            .and_then(|&id| self.nodes.get(id))
            .map_or("?", |node| node.name.as_str());
        format!("{name}({})", entry.get(1).copied().unwrap_or(0))
    }
}
