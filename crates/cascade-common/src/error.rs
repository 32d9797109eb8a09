//! Error types for cascade.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cascade operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for cascade.
///
/// Library modules keep their own narrower error enums; this is what the
/// binary reports and maps onto exit codes.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("project root cannot be resolved: {path}")]
    ProjectRoot { path: PathBuf },

    #[error("home directory cannot be resolved")]
    HomeDirUnavailable,

    // Storage errors (20-29)
    #[error("failed to write pattern data to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::ProjectRoot { .. } => 11,
            Error::HomeDirUnavailable => 12,
            Error::Persist { .. } => 20,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Whether this error comes from configuration rather than runtime I/O.
    pub fn is_config(&self) -> bool {
        self.code() < 20
    }
}
