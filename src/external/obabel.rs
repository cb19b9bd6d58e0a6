use std::path::{Path, PathBuf};

use log::debug;

use crate::{
    error::PipelineError,
    settings::{ConverterSettings, SolverSettings},
    workspace::JobWorkspace,
};

use super::{resolve_program, run_program};

/// Structure formats produced by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    /// MOPAC input deck.
    SolverInput,
    /// Tripos mol2, the final artifact of every successful job.
    Interchange,
    /// PDB structure generated only to read atom names from.
    Reference,
}

impl TargetFormat {
    pub fn format_code(&self) -> &'static str {
        match self {
            Self::SolverInput => "mop",
            Self::Interchange => "mol2",
            Self::Reference => "pdb",
        }
    }

    /// Output file name for a job, inside its workspace.
    pub fn file_name(&self, name: &str) -> String {
        match self {
            Self::Reference => format!("{}_temp.pdb", name),
            format => format!("{}.{}", name, format.format_code()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    pub gen3d: bool,
    pub hydrogens: bool,
}

impl From<&ConverterSettings> for ConvertOptions {
    fn from(value: &ConverterSettings) -> Self {
        Self {
            gen3d: value.gen3d,
            hydrogens: value.hydrogens,
        }
    }
}

/// Wrapper around the `obabel` command line.
pub struct OpenBabel {
    program: PathBuf,
    options: ConvertOptions,
    placeholder: String,
    keywords: String,
}

impl OpenBabel {
    pub fn new(converter: &ConverterSettings, solver: &SolverSettings) -> Self {
        Self {
            program: converter.program.clone(),
            options: converter.into(),
            placeholder: solver.placeholder.clone(),
            keywords: solver.keywords.clone(),
        }
    }

    /// Fail before any job starts when the program is missing. Paths relative
    /// to the job workspace can only be checked once a job runs.
    pub fn locate(&self) -> Result<(), PipelineError> {
        if self.program.is_absolute() && !self.program.is_file() {
            return Err(PipelineError::ProgramNotFound(
                self.program.to_string_lossy().to_string(),
            ));
        }
        if self.program.components().count() == 1 {
            resolve_program(&self.program, Path::new("."))?;
        }
        Ok(())
    }

    /// Convert a SMILES string into `target`, written into the job workspace.
    ///
    /// A solver input deck gets its keyword placeholder replaced right after
    /// the conversion.
    pub fn convert_smiles(
        &self,
        smiles: &str,
        target: TargetFormat,
        job: &JobWorkspace,
    ) -> Result<PathBuf, PipelineError> {
        let output = job.file(&target.file_name(job.name()));
        let mut arguments = vec![
            "-ismi".to_string(),
            format!("-:{}", smiles),
            format!("-o{}", target.format_code()),
            "-O".to_string(),
            output.to_string_lossy().to_string(),
        ];
        arguments.extend(self.generation_flags(self.options));
        self.run(&arguments, job)?;
        if target == TargetFormat::SolverInput {
            substitute_keywords(&output, &self.placeholder, &self.keywords)?;
        }
        Ok(output)
    }

    /// Convert an existing structure file, the input format is taken from its
    /// extension and the output lands next to it.
    pub fn convert_file(
        &self,
        input: &Path,
        target: TargetFormat,
        job: &JobWorkspace,
    ) -> Result<PathBuf, PipelineError> {
        let input_format = input
            .extension()
            .map(|extension| extension.to_string_lossy().to_string())
            .unwrap_or_default();
        let output = input.with_extension(target.format_code());
        let arguments = vec![
            format!("-i{}", input_format),
            input.to_string_lossy().to_string(),
            format!("-o{}", target.format_code()),
            "-O".to_string(),
            output.to_string_lossy().to_string(),
        ];
        self.run(&arguments, job)?;
        Ok(output)
    }

    fn generation_flags(&self, options: ConvertOptions) -> Vec<String> {
        let mut flags = vec![];
        if options.gen3d {
            flags.push("--gen3d".to_string());
        }
        if options.hydrogens {
            flags.push("-h".to_string());
        }
        flags
    }

    fn run(&self, arguments: &[String], job: &JobWorkspace) -> Result<(), PipelineError> {
        let program = resolve_program(&self.program, job.directory())?;
        run_program(&program, arguments, job.directory())
    }
}

/// Replace every occurrence of `placeholder` in the file with `keywords`.
pub fn substitute_keywords(
    path: &Path,
    placeholder: &str,
    keywords: &str,
) -> Result<(), PipelineError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| PipelineError::FileReadError(path.to_path_buf(), err))?;
    let replaced = content.replace(placeholder, keywords);
    if replaced == content {
        debug!("no {:?} placeholder found in {:?}", placeholder, path);
    }
    std::fs::write(path, replaced)
        .map_err(|err| PipelineError::FileWriteError(path.to_path_buf(), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_format() {
        assert_eq!(TargetFormat::SolverInput.file_name("mol1"), "mol1.mop");
        assert_eq!(TargetFormat::Interchange.file_name("mol1"), "mol1.mol2");
        assert_eq!(TargetFormat::Reference.file_name("mol1"), "mol1_temp.pdb");
    }

    #[test]
    fn placeholder_becomes_solver_keywords() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("mol1.mop");
        std::fs::write(
            &path,
            "PUT KEYWORDS HERE\nethanol\n\nC   0.0 1  0.0 1  0.0 1\n",
        )
        .unwrap();
        substitute_keywords(&path, "PUT KEYWORDS HERE", "PM7 PRECISE PDBOUT").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next(), Some("PM7 PRECISE PDBOUT"));
        assert!(!content.contains("PUT KEYWORDS HERE"));
        assert!(content.ends_with("C   0.0 1  0.0 1  0.0 1\n"));
    }

    #[test]
    fn unreadable_deck_is_reported() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("missing.mop");
        let error = substitute_keywords(&path, "PUT KEYWORDS HERE", "PM7").unwrap_err();
        assert!(matches!(error, PipelineError::FileReadError(reported, _) if reported == path));
    }

    #[test]
    fn flags_follow_options() {
        let converter = OpenBabel::new(&Default::default(), &Default::default());
        assert_eq!(
            converter.generation_flags(ConvertOptions { gen3d: true, hydrogens: true }),
            vec!["--gen3d", "-h"]
        );
        let options = ConvertOptions {
            gen3d: false,
            hydrogens: false,
        };
        assert!(converter.generation_flags(options).is_empty());
    }
}
