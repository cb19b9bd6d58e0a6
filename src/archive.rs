use std::{fs::File, path::{Path, PathBuf}};

use log::info;
use zip::{result::ZipError, write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::error::BatchError;

/// Pack `files` flat into a zip archive at `path`, each under its file name.
pub fn write_archive(path: &Path, files: &[PathBuf]) -> Result<(), BatchError> {
    let archive_error = |err: ZipError| BatchError::ArchiveError(path.to_path_buf(), err);
    let file = File::create(path).map_err(|err| archive_error(err.into()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for entry in files {
        let name = entry
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        writer.start_file(name, options).map_err(archive_error)?;
        let mut source = File::open(entry).map_err(|err| archive_error(err.into()))?;
        std::io::copy(&mut source, &mut writer).map_err(|err| archive_error(err.into()))?;
    }
    writer.finish().map_err(archive_error)?;
    info!("Archive {:?} written with {} files", path, files.len());
    Ok(())
}

#[test]
fn files_are_stored_by_name() {
    let directory = tempfile::tempdir().unwrap();
    let job = directory.path().join("calc").join("mol1");
    std::fs::create_dir_all(&job).unwrap();
    std::fs::write(job.join("mol1.mol2"), "@<TRIPOS>MOLECULE\nmol1\n").unwrap();
    std::fs::write(job.join("mol1.out"), " JOB ENDED NORMALLY\n").unwrap();
    let archive = directory.path().join("output_files.zip");
    write_archive(&archive, &[job.join("mol1.mol2"), job.join("mol1.out")]).unwrap();

    let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
    let mut names: Vec<&str> = zip.file_names().collect();
    names.sort();
    assert_eq!(names, vec!["mol1.mol2", "mol1.out"]);
    let mut content = String::new();
    std::io::Read::read_to_string(&mut zip.by_name("mol1.out").unwrap(), &mut content).unwrap();
    assert_eq!(content, " JOB ENDED NORMALLY\n");
}
