use std::path::PathBuf;

pub fn default_true() -> bool {
    true
}

pub fn default_id_column() -> String {
    String::from("ID")
}

pub fn default_smiles_column() -> String {
    String::from("SMILES")
}

pub fn default_workspace() -> PathBuf {
    PathBuf::from("calc")
}

pub fn default_archive() -> PathBuf {
    PathBuf::from("output_files.zip")
}

pub fn default_obabel() -> PathBuf {
    PathBuf::from("obabel")
}

/// Relative to the job workspace, i.e. `mopac_files/` sits next to the
/// batch workspace root.
pub fn default_mopac() -> PathBuf {
    PathBuf::from("../../mopac_files/bin/mopac")
}

pub fn default_placeholder() -> String {
    String::from("PUT KEYWORDS HERE")
}

pub fn default_keywords() -> String {
    String::from("PM7 PRECISE PDBOUT")
}

pub fn default_atom_record() -> String {
    String::from("HETATM")
}

pub fn default_name_column() -> usize {
    77
}
