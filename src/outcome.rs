//! Interpretation of a MOPAC log.
//!
//! Three marker phrases are known. Lines are scanned from the top and the
//! first marker found decides; on a single line the pi-bond marker is checked
//! first, then the failure marker. A log with none of them counts as failed.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::PipelineError;

pub const PI_BOND_MARKER: &str = "AN ERROR IN ASSIGNING PI-BONDS";
pub const FAILURE_MARKER: &str = "Error and normal";
pub const SUCCESS_MARKER: &str = "JOB ENDED NORMALLY";

/// Extension of the structure MOPAC writes when `PDBOUT` is requested.
pub const STRUCTURE_EXTENSION: &str = "pdb";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    PiBondFailure,
    Failed,
    /// Path of the structure output, derived from the log path. Its existence
    /// is not checked here.
    Success(PathBuf),
}

/// Classify log content already in memory.
pub fn classify_content(content: &str, log: &Path) -> Outcome {
    content
        .lines()
        .find_map(|line| {
            if line.contains(PI_BOND_MARKER) {
                Some(Outcome::PiBondFailure)
            } else if line.contains(FAILURE_MARKER) {
                Some(Outcome::Failed)
            } else if line.contains(SUCCESS_MARKER) {
                Some(Outcome::Success(log.with_extension(STRUCTURE_EXTENSION)))
            } else {
                None
            }
        })
        .unwrap_or(Outcome::Failed)
}

pub fn classify(log: &Path) -> Result<Outcome, PipelineError> {
    let content =
        std::fs::read(log).map_err(|err| PipelineError::FileReadError(log.to_path_buf(), err))?;
    Ok(classify_content(&String::from_utf8_lossy(&content), log))
}
