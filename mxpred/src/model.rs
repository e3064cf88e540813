//! Model definition: symbol JSON text plus the raw parameter blob.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::symbol::Symbol;

/// Returns the symbol file path for a checkpoint prefix (`<prefix>-symbol.json`).
pub fn symbol_path(prefix: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}-symbol.json"))
}

/// Returns the parameter file path for a checkpoint prefix and epoch
/// (`<prefix>-0009.params` for epoch 9).
pub fn params_path(prefix: &str, epoch: u32) -> PathBuf {
    PathBuf::from(format!("{prefix}-{epoch:04}.params"))
}

/// A loaded network: the serialized graph and its weights.
///
/// Both parts are opaque here; they are only interpreted by the engine when a
/// predictor is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDefinition {
    symbol: String,
    params: Vec<u8>,
}

impl ModelDefinition {
    /// Creates a definition from in-memory symbol text and parameter bytes.
    pub fn new(symbol: impl Into<String>, params: impl Into<Vec<u8>>) -> Self {
        Self {
            symbol: symbol.into(),
            params: params.into(),
        }
    }

    /// Reads `<prefix>-symbol.json` and `<prefix>-%04d.params`.
    ///
    /// Nothing is returned unless both files were read.
    pub fn load(prefix: &str, epoch: u32) -> Result<Self> {
        let sym_path = symbol_path(prefix);
        let symbol = read(&sym_path, |p| fs::read_to_string(p))?;

        let par_path = params_path(prefix, epoch);
        let params = read(&par_path, |p| fs::read(p))?;

        debug!(
            "mxpred: loaded {} ({} bytes) and {} ({} bytes)",
            sym_path.display(),
            symbol.len(),
            par_path.display(),
            params.len()
        );
        Ok(Self { symbol, params })
    }

    /// The symbol JSON text.
    pub fn symbol_text(&self) -> &str {
        &self.symbol
    }

    /// The raw parameter bytes.
    pub fn params(&self) -> &[u8] {
        &self.params
    }

    /// Parses the symbol text.
    pub fn symbol(&self) -> Result<Symbol> {
        Symbol::parse(&self.symbol)
    }
}

fn read<T>(path: &Path, f: impl FnOnce(&Path) -> std::io::Result<T>) -> Result<T> {
    f(path).map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths() {
        assert_eq!(symbol_path("model/vgg19"), PathBuf::from("model/vgg19-symbol.json"));
        assert_eq!(params_path("model/vgg19", 9), PathBuf::from("model/vgg19-0009.params"));
        assert_eq!(params_path("m", 0), PathBuf::from("m-0000.params"));
        assert_eq!(params_path("m", 12345), PathBuf::from("m-12345.params"));
    }

    #[test]
    fn load_reads_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("net");
        let prefix = prefix.to_str().unwrap();
        fs::write(symbol_path(prefix), "{\"nodes\":[]}").unwrap();
        fs::write(params_path(prefix, 3), [1u8, 2, 3]).unwrap();

        let def = ModelDefinition::load(prefix, 3).unwrap();
        assert_eq!(def.symbol_text(), "{\"nodes\":[]}");
        assert_eq!(def.params(), &[1, 2, 3]);
    }

    #[test]
    fn load_missing_params() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("net");
        let prefix = prefix.to_str().unwrap();
        fs::write(symbol_path(prefix), "{}").unwrap();

        match ModelDefinition::load(prefix, 1) {
            Err(Error::Load { path, .. }) => assert_eq!(path, params_path(prefix, 1)),
            other => panic!("expected load error, got {other:?}"),
        }
    }

    #[test]
    fn load_missing_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("net");
        let prefix = prefix.to_str().unwrap();
        fs::write(params_path(prefix, 1), [0u8]).unwrap();

        match ModelDefinition::load(prefix, 1) {
            Err(Error::Load { path, .. }) => assert_eq!(path, symbol_path(prefix)),
            other => panic!("expected load error, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_non_utf8_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("net");
        let prefix = prefix.to_str().unwrap();
        fs::write(symbol_path(prefix), [0xffu8, 0xfe]).unwrap();
        fs::write(params_path(prefix, 1), [0u8]).unwrap();

        assert!(matches!(ModelDefinition::load(prefix, 1), Err(Error::Load { .. })));
    }
}
