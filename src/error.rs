use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by whole-file conversion operations.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid image dimensions: {0}")]
    InvalidDimensions(String),

    #[error("failed to read image size from {}: {source}", .path.display())]
    ImageSize {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("class name file {} contains no names", .0.display())]
    EmptyClassNames(PathBuf),

    #[error("class id {id} exceeds the supported maximum of {max}")]
    ClassIdTooLarge { id: u32, max: u32 },

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Reasons a single annotation line is not treated as annotation data.
///
/// Line errors never reach the caller of a file conversion: the line is
/// skipped and counted instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("field {index} is not a number: {value:?}")]
    InvalidNumber { index: usize, value: String },
}
