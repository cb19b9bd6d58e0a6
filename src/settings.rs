use std::{fs::File, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::serde_default::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default = "default_smiles_column")]
    pub smiles_column: String,
    /// Root of the batch workspace, one sub-directory per molecule.
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,
    #[serde(default = "default_archive")]
    pub archive: PathBuf,
    /// Put the raw solver log into the archive next to the final structure.
    #[serde(default = "default_true")]
    pub include_logs: bool,
    #[serde(default)]
    pub converter: ConverterSettings,
    #[serde(default)]
    pub solver: SolverSettings,
    #[serde(default)]
    pub reconcile: RecordLayout,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConverterSettings {
    #[serde(default = "default_obabel")]
    pub program: PathBuf,
    #[serde(default = "default_true")]
    pub gen3d: bool,
    #[serde(default = "default_true")]
    pub hydrogens: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SolverSettings {
    /// Bare names are searched on `PATH`, other relative paths are taken
    /// from the job workspace.
    #[serde(default = "default_mopac")]
    pub program: PathBuf,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    #[serde(default = "default_keywords")]
    pub keywords: String,
}

/// Fixed-width layout of the atom records patched after a solver run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordLayout {
    #[serde(default = "default_atom_record")]
    pub record: String,
    /// Zero-based character offset where the atom name field starts.
    #[serde(default = "default_name_column")]
    pub name_column: usize,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            program: default_obabel(),
            gen3d: true,
            hydrogens: true,
        }
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            program: default_mopac(),
            placeholder: default_placeholder(),
            keywords: default_keywords(),
        }
    }
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self {
            record: default_atom_record(),
            name_column: default_name_column(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
            smiles_column: default_smiles_column(),
            workspace: default_workspace(),
            archive: default_archive(),
            include_logs: true,
            converter: Default::default(),
            solver: Default::default(),
            reconcile: Default::default(),
        }
    }
}

impl Settings {
    /// Read settings from a YAML file, or fall back to the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Unable to open settings file {:?}", path))?;
                serde_yaml::from_reader(file)
                    .with_context(|| format!("Failed to parse settings file {:?}", path))
            }
            None => Ok(Self::default()),
        }
    }

    /// Anchor the workspace and archive paths on `base`, so that nothing
    /// later depends on the process working directory.
    pub fn anchored(mut self, base: &Path) -> Self {
        if self.workspace.is_relative() {
            self.workspace = base.join(&self.workspace);
        }
        if self.archive.is_relative() {
            self.archive = base.join(&self.archive);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let settings: Settings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings.id_column, "ID");
        assert_eq!(settings.smiles_column, "SMILES");
        assert_eq!(settings.solver.keywords, "PM7 PRECISE PDBOUT");
        assert_eq!(settings.solver.placeholder, "PUT KEYWORDS HERE");
        assert_eq!(settings.reconcile.record, "HETATM");
        assert_eq!(settings.reconcile.name_column, 77);
        assert!(settings.converter.gen3d && settings.converter.hydrogens);
        assert!(settings.include_logs);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings: Settings = serde_yaml::from_str(
            "smiles_column: smi\nsolver:\n  keywords: PM6 PDBOUT\nconverter:\n  gen3d: false\n",
        )
        .unwrap();
        assert_eq!(settings.smiles_column, "smi");
        assert_eq!(settings.id_column, "ID");
        assert_eq!(settings.solver.keywords, "PM6 PDBOUT");
        assert_eq!(settings.solver.program, default_mopac());
        assert!(!settings.converter.gen3d);
        assert!(settings.converter.hydrogens);
    }

    #[test]
    fn anchoring_leaves_absolute_paths_alone() {
        let mut settings = Settings::default();
        settings.archive = PathBuf::from("/srv/out.zip");
        let settings = settings.anchored(Path::new("/data/run"));
        assert_eq!(settings.workspace, PathBuf::from("/data/run/calc"));
        assert_eq!(settings.archive, PathBuf::from("/srv/out.zip"));
    }
}
