//! Reading trace-export files
//!
//! An export is a JSON object with an `items` array of spans. Several
//! exports can be merged: they are read one after another, in the order
//! given, and their items concatenated in that same order.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::record::SpanRecord;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid trace export {path} (line {line}, column {column}): {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level shape of an export file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceExport {
    pub items: Vec<SpanRecord>,
}

/// Parse the contents of one export
pub fn parse_export(content: &str) -> Result<TraceExport, serde_json::Error> {
    serde_json::from_str(content)
}

/// Read and parse a single export file
pub fn load_file(path: &Path) -> Result<Vec<SpanRecord>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let export = parse_export(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        line: source.line(),
        column: source.column(),
        source,
    })?;

    tracing::debug!("Loaded {} spans from {}", export.items.len(), path.display());
    Ok(export.items)
}

/// Read every file in order and concatenate their spans.
///
/// The first file that fails aborts the whole load.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SpanRecord>, LoadError> {
    let mut spans = Vec::new();
    for path in paths {
        spans.extend(load_file(path.as_ref())?);
    }

    tracing::info!("Loaded {} spans from {} file(s)", spans.len(), paths.len());
    Ok(spans)
}
