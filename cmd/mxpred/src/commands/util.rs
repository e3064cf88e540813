//! Utility functions for CLI commands.

use std::path::Path;

use anyhow::{bail, Context};
use clap::Args;
use serde::Serialize;

/// Locates a checkpoint on disk.
#[derive(Args, Debug, Clone)]
pub struct CheckpointArgs {
    /// Checkpoint prefix, e.g. model/vgg19
    #[arg(long)]
    pub prefix: String,

    /// Checkpoint epoch
    #[arg(long, default_value_t = 0)]
    pub epoch: u32,
}

/// Reads a file of little-endian float32 values.
pub fn read_f32_file(path: &Path) -> anyhow::Result<Vec<f32>> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    if bytes.len() % 4 != 0 {
        bail!(
            "{}: size {} is not a multiple of 4 bytes",
            path.display(),
            bytes.len()
        );
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// A single ranked score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub index: usize,
    pub score: f32,
}

/// Returns the `k` highest scores of each row of `classes` values.
#[cfg_attr(not(feature = "native"), allow(dead_code))]
pub fn top_k(data: &[f32], classes: usize, k: usize) -> Vec<Vec<Ranked>> {
    if classes == 0 {
        return Vec::new();
    }
    data.chunks(classes)
        .map(|row| {
            let mut ranked: Vec<Ranked> = row
                .iter()
                .enumerate()
                .map(|(index, &score)| Ranked { index, score })
                .collect();
            ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
            ranked.truncate(k);
            ranked
        })
        .collect()
}

/// Outputs result as JSON, or through `plain` otherwise.
pub fn output_result<T: Serialize>(
    result: &T,
    output_path: Option<&str>,
    as_json: bool,
    plain: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    let output = if as_json {
        serde_json::to_string_pretty(result)? + "\n"
    } else {
        plain(result)
    };

    match output_path {
        Some(path) => std::fs::write(path, output)?,
        None => print!("{}", output),
    }

    Ok(())
}
