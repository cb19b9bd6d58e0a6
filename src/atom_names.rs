//! Atom name correction for the PDB structure MOPAC writes.
//!
//! MOPAC loses the atom names of the structure it was given. They are read
//! back from a reference PDB generated from the same SMILES and written into
//! the name field of each atom record, matched on the atom serial number.

use std::path::Path;

use log::debug;

use crate::{error::PipelineError, settings::RecordLayout};

/// Atom names in serial order: entry `i` belongs to atom serial `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomNameList(Vec<String>);

#[derive(Debug, PartialEq, Eq)]
pub struct MalformedRecord {
    pub line: usize,
    pub record: String,
}

impl AtomNameList {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Name for a 1-based atom serial number.
    pub fn get(&self, serial: usize) -> Option<&str> {
        serial
            .checked_sub(1)
            .and_then(|index| self.0.get(index))
            .map(String::as_str)
    }

    /// Collect the last column of every atom record.
    pub fn from_reference(content: &str, record: &str) -> Self {
        Self(
            content
                .lines()
                .filter(|line| line.starts_with(record))
                .filter_map(|line| line.split_whitespace().last())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn read_reference(path: &Path, record: &str) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| PipelineError::FileReadError(path.to_path_buf(), err))?;
        Ok(Self::from_reference(&content, record))
    }
}

/// Rewrite the name field of every atom record whose serial has a name in
/// `names`. Other lines, and records past the end of `names`, are kept as
/// they are.
pub fn patch_records(
    content: &str,
    names: &AtomNameList,
    layout: &RecordLayout,
) -> Result<(String, usize), MalformedRecord> {
    let mut patched = String::with_capacity(content.len());
    let mut count = 0;
    for (index, raw) in content.split_inclusive('\n').enumerate() {
        let line = raw.trim_end_matches(['\n', '\r']);
        if !line.starts_with(&layout.record) {
            patched.push_str(raw);
            continue;
        }
        let serial = line
            .split_whitespace()
            .nth(1)
            .and_then(|token| token.parse::<usize>().ok())
            .ok_or_else(|| MalformedRecord {
                line: index + 1,
                record: line.to_string(),
            })?;
        match names.get(serial) {
            Some(name) => {
                patched.push_str(&fixed_prefix(line, layout.name_column));
                patched.push_str(name);
                patched.push('\n');
                count += 1;
            }
            None => patched.push_str(raw),
        }
    }
    Ok((patched, count))
}

/// The first `width` characters of `line`, padded with spaces when the line
/// is shorter.
fn fixed_prefix(line: &str, width: usize) -> String {
    let mut prefix: String = line.chars().take(width).collect();
    let missing = width.saturating_sub(prefix.chars().count());
    prefix.extend(std::iter::repeat(' ').take(missing));
    prefix
}

/// Patch the structure file in place.
pub fn reconcile(
    path: &Path,
    names: &AtomNameList,
    layout: &RecordLayout,
) -> Result<usize, PipelineError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| PipelineError::FileReadError(path.to_path_buf(), err))?;
    let (patched, count) = patch_records(&content, names, layout).map_err(|malformed| {
        PipelineError::MalformedAtomRecord {
            path: path.to_path_buf(),
            line: malformed.line,
            record: malformed.record,
        }
    })?;
    std::fs::write(path, patched)
        .map_err(|err| PipelineError::FileWriteError(path.to_path_buf(), err))?;
    debug!("{} atom names written to {:?}", count, path);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hetatm(serial: usize, name: &str, element: &str) -> String {
        format!(
            "HETATM{:>5} {:<4} UNL     1    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00          {:>2}\n",
            serial, name, 0.0, 1.5, -0.75, element
        )
    }

    fn structure() -> String {
        [
            "HEADER    mol1\n".to_string(),
            hetatm(1, "C", "C"),
            hetatm(2, "C", "C"),
            hetatm(3, "O", "O"),
            "CONECT    1    2\n".to_string(),
            "END\n".to_string(),
        ]
        .concat()
    }

    fn names(names: &[&str]) -> AtomNameList {
        AtomNameList::new(names.iter().map(|name| name.to_string()).collect())
    }

    #[test]
    fn record_layout_matches_pdb_columns() {
        let line = hetatm(1, "C", "C");
        assert_eq!(line.trim_end().len(), 78);
        assert_eq!(&line[76..78], " C");
    }

    #[test]
    fn reference_names_are_last_column() {
        let reference = [
            "COMPND    UNNAMED\n".to_string(),
            hetatm(1, "C", "C"),
            hetatm(2, "O", "O"),
            hetatm(3, "H", "H"),
            "END\n".to_string(),
        ]
        .concat();
        assert_eq!(
            AtomNameList::from_reference(&reference, "HETATM"),
            names(&["C", "O", "H"])
        );
    }

    #[test]
    fn names_are_written_from_fixed_column() {
        let layout = RecordLayout::default();
        let (patched, count) =
            patch_records(&structure(), &names(&["C1", "C2", "O1"]), &layout).unwrap();
        assert_eq!(count, 3);
        let lines: Vec<&str> = patched.lines().collect();
        assert_eq!(lines[0], "HEADER    mol1");
        assert_eq!(&lines[1][77..], "C1");
        assert_eq!(&lines[3][77..], "O1");
        assert_eq!(&lines[3][..77], &hetatm(3, "O", "O")[..77]);
        assert_eq!(lines[4], "CONECT    1    2");
        assert!(patched.ends_with("END\n"));
    }

    #[test]
    fn short_name_list_leaves_remaining_records() {
        let layout = RecordLayout::default();
        let original = structure();
        let (patched, count) = patch_records(&original, &names(&["C1"]), &layout).unwrap();
        assert_eq!(count, 1);
        let original_lines: Vec<&str> = original.lines().collect();
        let patched_lines: Vec<&str> = patched.lines().collect();
        assert_eq!(&patched_lines[1][77..], "C1");
        assert_eq!(patched_lines[2], original_lines[2]);
        assert_eq!(patched_lines[3], original_lines[3]);
    }

    #[test]
    fn patching_twice_is_same_as_once() {
        let layout = RecordLayout::default();
        let list = names(&["C1", "C2", "O1"]);
        let (once, _) = patch_records(&structure(), &list, &layout).unwrap();
        let (twice, _) = patch_records(&once, &list, &layout).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn short_lines_are_padded_to_column() {
        let layout = RecordLayout {
            record: "HETATM".to_string(),
            name_column: 20,
        };
        let (patched, _) = patch_records("HETATM    1  C\n", &names(&["C1"]), &layout).unwrap();
        assert_eq!(patched, format!("{:<20}C1\n", "HETATM    1  C"));
        let (again, _) = patch_records(&patched, &names(&["C1"]), &layout).unwrap();
        assert_eq!(again, patched);
    }

    #[test]
    fn serial_zero_is_out_of_range() {
        let list = names(&["C1"]);
        assert_eq!(list.get(0), None);
        assert_eq!(list.get(1), Some("C1"));
        assert_eq!(list.get(2), None);
    }

    #[test]
    fn non_numeric_serial_is_malformed() {
        let layout = RecordLayout::default();
        let error = patch_records("REMARK\nHETATM  abc  C\n", &names(&["C1"]), &layout).unwrap_err();
        assert_eq!(
            error,
            MalformedRecord {
                line: 2,
                record: "HETATM  abc  C".to_string()
            }
        );
    }

    #[test]
    fn reconcile_rewrites_file_in_place() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("mol1.pdb");
        std::fs::write(&path, structure()).unwrap();
        let count = reconcile(&path, &names(&["C1", "C2"]), &RecordLayout::default()).unwrap();
        assert_eq!(count, 2);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(&content.lines().nth(2).unwrap()[77..], "C2");
    }
}
