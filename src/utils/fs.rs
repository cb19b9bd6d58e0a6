use std::{io, path::Path};

/// Turn a molecule identifier into something usable as a directory and file
/// stem: whitespace and path separators become `_`.
pub fn file_safe_name(name: &str) -> String {
    let name = name.trim();
    if name.chars().all(|c| c == '.') {
        return "_".repeat(name.len().max(1));
    }
    name.chars()
        .map(|c| {
            if c.is_whitespace() || std::path::is_separator(c) || c == '\0' {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Remove a file or a directory tree, a missing target is not an error.
pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> io::Result<bool> {
    let path = path.as_ref();
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

#[test]
fn spaces_and_separators_are_replaced() {
    assert_eq!(file_safe_name("ethyl alcohol"), "ethyl_alcohol");
    assert_eq!(file_safe_name(" a/b "), "a_b");
    assert_eq!(file_safe_name("mol1"), "mol1");
    assert_eq!(file_safe_name(".."), "__");
}

#[test]
fn removing_missing_path_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("output_files.zip");
    assert!(!remove_if_exists(&file).unwrap());
    std::fs::write(&file, b"zip").unwrap();
    assert!(remove_if_exists(&file).unwrap());
    let nested = dir.path().join("calc").join("mol1");
    std::fs::create_dir_all(&nested).unwrap();
    assert!(remove_if_exists(dir.path().join("calc")).unwrap());
    assert!(!nested.exists());
}
