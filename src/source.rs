//! Score sources
//!
//! The pipeline never parses files itself; it asks a `ScoreSource` for a
//! `Score`. `KernSource` is the implementation for Humdrum files, tests use
//! in-memory sources.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result, ScoreError};
use crate::models::Score;

/// Capability: turn a file into a flattened `Score`
pub trait ScoreSource {
    /// File extension (without the dot) this source reads
    fn extension(&self) -> &str;

    /// Parse one file; failures are per-score and never abort the batch
    fn load(&self, path: &Path) -> std::result::Result<Score, ScoreError>;
}

/// All files under `root` with the given extension, sorted by path
pub fn discover_scores(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(PipelineError::MissingDirectory(root.to_path_buf()));
    }

    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| PipelineError::io(&dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| PipelineError::io(&dir, e))?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == extension) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}
