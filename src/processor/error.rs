//! Error types for the processor module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for processor operations
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Writing an output file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing page records failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ProcessError> for CrateError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Io(e) => CrateError::Io(e),
            ProcessError::Json(e) => CrateError::Json(e),
        }
    }
}
