use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    error::{BatchError, PipelineError},
    utils::fs::{file_safe_name, remove_if_exists},
};

/// Root directory holding one job workspace per molecule of a batch.
#[derive(Debug)]
pub struct BatchWorkspace {
    root: PathBuf,
    used_names: BTreeSet<String>,
}

impl BatchWorkspace {
    pub fn create(root: &Path) -> Result<Self, BatchError> {
        std::fs::create_dir_all(root)
            .map_err(|err| BatchError::WorkspaceError(root.to_path_buf(), err))?;
        Ok(Self {
            root: root.to_path_buf(),
            used_names: BTreeSet::new(),
        })
    }

    /// Create the workspace of a molecule. A name is handed out only once per
    /// batch, so two molecules never share a directory.
    pub fn job(&mut self, name: &str) -> Result<JobWorkspace, PipelineError> {
        let safe_name = file_safe_name(name);
        if !self.used_names.insert(safe_name.clone()) {
            return Err(PipelineError::DuplicateName(name.to_string()));
        }
        let directory = self.root.join(&safe_name);
        std::fs::create_dir_all(&directory)
            .map_err(|err| PipelineError::FileWriteError(directory.clone(), err))?;
        Ok(JobWorkspace {
            name: safe_name,
            directory,
        })
    }
}

/// Directory owning every intermediate and final file of one molecule.
#[derive(Debug, Clone)]
pub struct JobWorkspace {
    name: String,
    directory: PathBuf,
}

impl JobWorkspace {
    /// File-safe name, used as stem of every file of the job.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }
}

/// Remove the workspace and the archive of a previous batch.
pub fn reset(workspace: &Path, archive: &Path) -> Result<(), BatchError> {
    for path in [workspace, archive] {
        if remove_if_exists(path).map_err(|err| BatchError::WorkspaceError(path.to_path_buf(), err))? {
            info!("Removed {:?}", path);
        }
    }
    Ok(())
}
