use std::path::PathBuf;
use thiserror::Error;

/// Failures while building an index. The index is left absent.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Dataset could not be read: {0}")]
    Dataset(String),

    #[error("Column '{0}' does not exist in dataset")]
    UnknownColumn(String),

    #[error("Dataset identifier must not be empty")]
    EmptyDatasetId,

    #[error("Failed to write index at {}: {message}", path.display())]
    IndexWrite { path: PathBuf, message: String },

    #[error("Failed to persist column descriptors at {}: {message}", path.display())]
    Descriptors { path: PathBuf, message: String },

    #[error("Synonym augmentation is enabled but no synonym source is configured")]
    MissingSynonymSource,
}

/// Failures while opening or querying an index. Schema generation aborts.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("No index found at {}", .0.display())]
    IndexMissing(PathBuf),

    #[error("Failed to open index at {}: {message}", path.display())]
    Open { path: PathBuf, message: String },

    #[error("Search on '{field}' failed: {message}")]
    Search { field: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ResolutionError {
    pub fn search(field: impl ToString, message: impl ToString) -> Self {
        ResolutionError::Search { field: field.to_string(), message: message.to_string() }
    }
}
