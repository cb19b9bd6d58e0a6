use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

/// Errors that end the pipeline of a single molecule.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to start `{command}` with arguments {arguments:?}: {source}")]
    CommandExecutionFail {
        command: String,
        arguments: Vec<String>,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` with arguments {arguments:?} exited with {status}")]
    ExternalToolFailure {
        command: String,
        arguments: Vec<String>,
        status: ExitStatus,
        stderr: String,
    },
    #[error("unable to locate program `{0}`")]
    ProgramNotFound(String),
    #[error("failed to read {0:?}")]
    FileReadError(PathBuf, #[source] io::Error),
    #[error("failed to write {0:?}")]
    FileWriteError(PathBuf, #[source] io::Error),
    #[error("malformed atom record at line {line} of {path:?}: {record:?}")]
    MalformedAtomRecord {
        path: PathBuf,
        line: usize,
        record: String,
    },
    #[error("solver did not end the job normally, see {0:?}")]
    SolverFailed(PathBuf),
    #[error("name `{0}` is already used by another molecule of this batch")]
    DuplicateName(String),
}

/// Errors that stop a whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("invalid table pattern {0:?}")]
    FilePatternError(String, #[source] glob::PatternError),
    #[error(transparent)]
    GlobError(#[from] glob::GlobError),
    #[error("no table matches {0:?}")]
    NoTableMatched(String),
    #[error("failed to parse table {0:?}")]
    TableError(PathBuf, #[source] csv::Error),
    #[error("table {path:?} has no column named {column:?}")]
    MissingColumn { path: PathBuf, column: String },
    #[error("failed to prepare workspace {0:?}")]
    WorkspaceError(PathBuf, #[source] io::Error),
    #[error("failed to write archive {0:?}")]
    ArchiveError(PathBuf, #[source] zip::result::ZipError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
