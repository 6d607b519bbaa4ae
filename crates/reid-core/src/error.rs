//! Error types for the partitioner workspace.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{CameraId, PersonId};

/// Main error type for the partitioner.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configured dataset root does not exist
    #[error("{dataset} dataset path '{}' could not be found", .root.display())]
    DatasetNotFound { dataset: String, root: PathBuf },

    /// Dataset name has no registered indexer
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    /// Configuration error, including unsatisfiable balancing or sampling windows
    #[error("Configuration error: {0}")]
    Config(String),

    /// Camera id was never registered with the pack
    #[error("Unknown camera id: {0}")]
    UnknownCamera(CameraId),

    /// Person id was never registered with the pack
    #[error("Unknown person id: {0}")]
    UnknownPerson(PersonId),

    /// Copying an image into the output tree failed
    #[error("Failed to copy '{}' to '{}': {source}", .src.display(), .dest.display())]
    Copy {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid filename pattern
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Pattern(err.to_string())
    }
}

/// Specialized Result type for partitioner operations.
pub type Result<T> = std::result::Result<T, Error>;
