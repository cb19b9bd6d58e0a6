use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use cached::{proc_macro::cached, UnboundCache};
use lazy_static::lazy_static;
use log::debug;

use crate::error::PipelineError;

pub mod mopac;
pub mod obabel;

lazy_static! {
    /// Directory of the running binary first, then `PATH`.
    static ref SEARCH_PATHS: Vec<PathBuf> = {
        let mut paths = Vec::new();
        if let Some(binary_directory) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            paths.push(binary_directory);
        }
        if let Some(path_var) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&path_var));
        }
        paths
    };
}

#[cached(
    ty = "UnboundCache<String, Option<PathBuf>>",
    create = "{ UnboundCache::new() }",
    convert = r#"{ program.to_string() }"#
)]
fn locate_on_search_path(program: &str) -> Option<PathBuf> {
    SEARCH_PATHS
        .iter()
        .map(|directory| directory.join(program))
        .find(|candidate| candidate.is_file())
}

/// Resolve the program to an explicit path.
///
/// Absolute paths are kept, bare names are searched on the search path and
/// any other relative path is taken from `base`.
pub fn resolve_program(program: &Path, base: &Path) -> Result<PathBuf, PipelineError> {
    if program.is_absolute() {
        Ok(program.to_path_buf())
    } else if program.components().count() > 1 {
        Ok(base.join(program))
    } else {
        let name = program.to_string_lossy();
        locate_on_search_path(&name).ok_or_else(|| PipelineError::ProgramNotFound(name.to_string()))
    }
}

/// Run a program to completion in `working_directory`.
///
/// Blocks until the child exits, there is no timeout. Output on stdout is
/// discarded, stderr is kept for the error report.
pub fn run_program(
    program: &Path,
    arguments: &[String],
    working_directory: &Path,
) -> Result<(), PipelineError> {
    let command = program.to_string_lossy().to_string();
    debug!("running {} {}", command, arguments.join(" "));
    let output = Command::new(program)
        .args(arguments)
        .current_dir(working_directory)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| PipelineError::CommandExecutionFail {
            command: command.clone(),
            arguments: arguments.to_vec(),
            source,
        })?;
    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!("{} failed with {}: {}", command, output.status, stderr);
        Err(PipelineError::ExternalToolFailure {
            command,
            arguments: arguments.to_vec(),
            status: output.status,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_taken_from_base() {
        let base = Path::new("/data/calc/mol1");
        let resolved = resolve_program(Path::new("../../mopac_files/bin/mopac"), base).unwrap();
        assert_eq!(resolved, base.join("../../mopac_files/bin/mopac"));
        let absolute = resolve_program(Path::new("/opt/mopac/MOPAC2016.exe"), base).unwrap();
        assert_eq!(absolute, PathBuf::from("/opt/mopac/MOPAC2016.exe"));
    }

    #[test]
    fn unknown_bare_program_is_reported() {
        let result = resolve_program(Path::new("surely-not-an-installed-tool-4a1f"), Path::new("."));
        assert!(matches!(result, Err(PipelineError::ProgramNotFound(name)) if name == "surely-not-an-installed-tool-4a1f"));
    }

    #[cfg(unix)]
    #[test]
    fn bare_program_is_found_on_path() {
        let resolved = resolve_program(Path::new("sh"), Path::new("/data/calc/mol1")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.is_file());
        assert_eq!(resolved.file_name().and_then(|name| name.to_str()), Some("sh"));
        let again = resolve_program(Path::new("sh"), Path::new(".")).unwrap();
        assert_eq!(again, resolved);
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_external_tool_failure() {
        let directory = tempfile::tempdir().unwrap();
        let arguments = vec!["-c".to_string(), "echo broken >&2; exit 3".to_string()];
        let error = run_program(Path::new("sh"), &arguments, directory.path()).unwrap_err();
        match error {
            PipelineError::ExternalToolFailure { command, arguments: recorded, status, stderr } => {
                assert_eq!(command, "sh");
                assert_eq!(recorded, arguments);
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn missing_binary_is_execution_failure() {
        let directory = tempfile::tempdir().unwrap();
        let missing = directory.path().join("does-not-exist");
        let error = run_program(&missing, &[], directory.path()).unwrap_err();
        assert!(matches!(error, PipelineError::CommandExecutionFail { .. }));
    }
}
