use glob::glob;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{ConvertError, Result};
use crate::types::{CLASSES_FILE_NAME, LABEL_EXTENSION};

/// Read a whole label file into memory
pub fn read_label_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))
}

/// Write `contents` to `path`, creating missing parent directories.
///
/// Data goes to a temporary file in the destination directory first and is
/// renamed over `path` once fully written, so a failed write never leaves a
/// truncated file behind.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| ConvertError::io(parent, e))?;
    tmp.write_all(contents)
        .map_err(|e| ConvertError::io(path, e))?;
    tmp.persist(path).map_err(|e| ConvertError::io(path, e.error))?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// List the label files directly inside `dir`, sorted by name. `classes.txt` is left out.
pub fn collect_label_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ConvertError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        LABEL_EXTENSION
    );
    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .filter(|path| !is_classes_file(path))
        .collect();
    files.sort();
    Ok(files)
}

fn is_classes_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name == CLASSES_FILE_NAME)
        .unwrap_or(false)
}

/// Output path for `input` inside `output_dir`, keeping the file name.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) => output_dir.join(name),
        None => output_dir.join(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomically_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/labels.txt");
        write_atomically(&path, b"first").unwrap();
        write_atomically(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_collect_label_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "classes.txt", "image.jpg"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let files = collect_label_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_collect_label_files_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_label_files(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("in/x.txt"), Path::new("out")),
            PathBuf::from("out/x.txt")
        );
    }
}
