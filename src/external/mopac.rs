use std::path::{Path, PathBuf};

use crate::{error::PipelineError, settings::SolverSettings, workspace::JobWorkspace};

use super::{resolve_program, run_program};

pub const LOG_EXTENSION: &str = "out";

pub struct Mopac {
    program: PathBuf,
}

impl Mopac {
    pub fn new(settings: &SolverSettings) -> Self {
        Self {
            program: settings.program.clone(),
        }
    }

    /// Run MOPAC on an input deck. MOPAC writes its log next to the deck,
    /// with the extension swapped for `.out`.
    pub fn run(&self, input: &Path, job: &JobWorkspace) -> Result<PathBuf, PipelineError> {
        let program = resolve_program(&self.program, job.directory())?;
        run_program(
            &program,
            &[input.to_string_lossy().to_string()],
            job.directory(),
        )?;
        Ok(log_path(input))
    }
}

pub fn log_path(input: &Path) -> PathBuf {
    input.with_extension(LOG_EXTENSION)
}

#[test]
fn log_sits_next_to_input() {
    assert_eq!(
        log_path(Path::new("/data/calc/mol1/mol1.mop")),
        PathBuf::from("/data/calc/mol1/mol1.out")
    );
}
