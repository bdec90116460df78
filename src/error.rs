use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovluaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid line number in profile tag '{tag}'")]
    InvalidLine { tag: String },

    #[error("Cannot resolve path for tag '{tag}' ({}): {source}", path.display())]
    PathResolution {
        tag: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Source file not found for tag '{tag}': {}", path.display())]
    SourceNotFound { tag: String, path: PathBuf },

    #[error("Source path for tag '{tag}' is not a regular file: {}", path.display())]
    NotAFile { tag: String, path: PathBuf },

    #[error("Failed to parse {}: {message}", path.display())]
    Grammar { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, CovluaError>;
