use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the itinere library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Input feature file could not be located at the resolved path.
    #[error("input features not found at {path}")]
    InputNotFound { path: PathBuf },

    /// Raised when a build option is out of range.
    #[error("invalid build configuration: {message}")]
    InvalidConfig { message: String },

    /// Raised when the graph artifact could not be written.
    #[error("failed to write graph artifact to {path}: {message}")]
    ArtifactWrite { path: PathBuf, message: String },

    /// Raised when reading a graph artifact back from disk fails.
    #[error("failed to load graph artifact from {path}: {message}")]
    ArtifactLoad { path: PathBuf, message: String },

    /// Raised when a loaded artifact breaks one or more graph invariants.
    #[error("graph artifact is invalid: {}", format_problems(.problems))]
    InvalidArtifact { problems: Vec<String> },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON encoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn format_problems(problems: &[String]) -> String {
    match problems {
        [] => "no details".to_string(),
        [single] => single.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}
