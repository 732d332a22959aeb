use std::path::PathBuf;

use thiserror::Error;

use super::loader::FileFormat;

/// Failures that end an upload attempt. Each one is shown to the user as-is.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("The uploaded file is empty.")]
    EmptyInput,
    #[error("Could not parse {format} data: {reason}")]
    Parse { format: FileFormat, reason: String },
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Cleaning faulted or rejected every row; the two are not told apart here.
    #[error("No valid data found after cleaning.")]
    Cleaning,
}

/// Faults detected while normalizing a raw table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CleaningError {
    #[error("columns {first:?} and {second:?} both normalize to {canonical:?}")]
    DuplicateColumn {
        first: String,
        second: String,
        canonical: String,
    },
    #[error("required column {0:?} is missing")]
    MissingColumn(&'static str),
}
