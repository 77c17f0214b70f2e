use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::fs;
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::types::ImageDimensions;

/// Read the pixel size of an image file without decoding the pixel data
pub fn read_image_dimensions(path: &Path) -> Result<ImageDimensions> {
    let (width, height) =
        image::image_dimensions(path).map_err(|source| ConvertError::ImageSize {
            path: path.to_path_buf(),
            source,
        })?;
    ImageDimensions::new(width, height)
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Create the output directory if it is missing. Existing content is kept.
pub fn ensure_output_directory(path: &Path) -> Result<()> {
    if path.is_file() {
        warn!("Output path {:?} is a file, not a directory", path);
    }
    fs::create_dir_all(path).map_err(|e| ConvertError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_output_directory_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("x/y");
        ensure_output_directory(&out).unwrap();
        fs::write(out.join("keep.txt"), "1").unwrap();
        ensure_output_directory(&out).unwrap();
        assert!(out.join("keep.txt").exists());
    }

    #[test]
    fn test_read_image_dimensions_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_image_dimensions(&dir.path().join("missing.png"));
        assert!(matches!(result, Err(ConvertError::ImageSize { .. })));
    }
}
