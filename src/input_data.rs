use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use glob::glob;
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::BatchError;

/// One row of the batch input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoleculeRecord {
    pub name: String,
    pub smiles: String,
}

impl MoleculeRecord {
    pub fn new<N: Into<String>, S: Into<String>>(name: N, smiles: S) -> Self {
        Self {
            name: name.into(),
            smiles: smiles.into(),
        }
    }
}

fn delimiter_of(path: &Path) -> u8 {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some(extension) if extension.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

/// Read the identifier and SMILES columns of a CSV/TSV table. Rows where
/// either value is empty are left out.
pub fn read_table<R: std::io::Read>(
    reader: R,
    delimiter: u8,
    source: &Path,
    id_column: &str,
    smiles_column: &str,
) -> Result<Vec<MoleculeRecord>, BatchError> {
    let table_error = |err| BatchError::TableError(source.to_path_buf(), err);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers().map_err(table_error)?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| BatchError::MissingColumn {
                path: source.to_path_buf(),
                column: name.to_string(),
            })
    };
    let id_index = column(id_column)?;
    let smiles_index = column(smiles_column)?;
    let mut records = vec![];
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(table_error)?;
        match (record.get(id_index), record.get(smiles_index)) {
            (Some(name), Some(smiles)) if !name.is_empty() && !smiles.is_empty() => {
                records.push(MoleculeRecord::new(name, smiles))
            }
            _ => debug!("row {} of {:?} has missing values, skipped", row + 1, source),
        }
    }
    Ok(records)
}

pub fn load_table(
    path: &Path,
    id_column: &str,
    smiles_column: &str,
) -> Result<Vec<MoleculeRecord>, BatchError> {
    let file = std::fs::File::open(path)
        .map_err(|err| BatchError::TableError(path.to_path_buf(), err.into()))?;
    read_table(file, delimiter_of(path), path, id_column, smiles_column)
}

/// Load every table matching `pattern`, concatenated in path order.
pub fn load_tables(
    pattern: &str,
    id_column: &str,
    smiles_column: &str,
) -> Result<Vec<MoleculeRecord>, BatchError> {
    let mut paths = glob(pattern)
        .map_err(|err| BatchError::FilePatternError(pattern.to_string(), err))?
        .collect::<Result<Vec<PathBuf>, _>>()?;
    if paths.is_empty() {
        return Err(BatchError::NoTableMatched(pattern.to_string()));
    }
    paths.sort();
    let tables = paths
        .par_iter()
        .map(|path| load_table(path, id_column, smiles_column))
        .collect::<Result<Vec<_>, BatchError>>()?;
    let records = tables.concat();
    info!("{} molecules loaded from {} tables", records.len(), paths.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str, delimiter: u8) -> Result<Vec<MoleculeRecord>, BatchError> {
        read_table(content.as_bytes(), delimiter, Path::new("batch.csv"), "ID", "SMILES")
    }

    #[test]
    fn selects_named_columns() {
        let records = parse("Index,SMILES,ID,pIC50\n1,CCO,mol1,5.2\n2,c1ccccc1,mol2,6.1\n", b',').unwrap();
        assert_eq!(
            records,
            vec![MoleculeRecord::new("mol1", "CCO"), MoleculeRecord::new("mol2", "c1ccccc1")]
        );
    }

    #[test]
    fn rows_with_missing_values_are_dropped() {
        let records = parse("ID,SMILES\nmol1,CCO\nmol2,\n,CC\nmol4\nmol5, CN \n", b',').unwrap();
        assert_eq!(
            records,
            vec![MoleculeRecord::new("mol1", "CCO"), MoleculeRecord::new("mol5", "CN")]
        );
    }

    #[test]
    fn missing_column_is_an_error() {
        let error = parse("Name,SMILES\nmol1,CCO\n", b',').unwrap_err();
        assert!(matches!(error, BatchError::MissingColumn { column, .. } if column == "ID"));
    }

    #[test]
    fn tab_separated_tables() {
        assert_eq!(delimiter_of(Path::new("batch.tsv")), b'\t');
        assert_eq!(delimiter_of(Path::new("batch.csv")), b',');
        let records = parse("ID\tSMILES\nmol1\tCC(=O)O\n", b'\t').unwrap();
        assert_eq!(records, vec![MoleculeRecord::new("mol1", "CC(=O)O")]);
    }

    #[test]
    fn pattern_loads_tables_in_order() {
        let directory = tempfile::tempdir().unwrap();
        std::fs::write(directory.path().join("b.csv"), "ID,SMILES\nmol2,CCN\n").unwrap();
        std::fs::write(directory.path().join("a.csv"), "ID,SMILES\nmol1,CCO\n").unwrap();
        let pattern = directory.path().join("*.csv");
        let records = load_tables(&pattern.to_string_lossy(), "ID", "SMILES").unwrap();
        assert_eq!(
            records,
            vec![MoleculeRecord::new("mol1", "CCO"), MoleculeRecord::new("mol2", "CCN")]
        );
        let nothing = directory.path().join("*.xlsx");
        assert!(matches!(
            load_tables(&nothing.to_string_lossy(), "ID", "SMILES"),
            Err(BatchError::NoTableMatched(_))
        ));
    }
}
