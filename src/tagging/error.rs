//! Error types for the tagging module

use crate::error::Error as CrateError;
use rig::completion::CompletionError;
use thiserror::Error;

/// Error type for service tagging
#[derive(Debug, Error)]
pub enum TaggingError {
    /// The language model request failed
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    /// The model answered with something that is not a tagging result
    #[error("Unparseable model response: {0}")]
    InvalidResponse(String),

    /// No API key was configured for the model provider
    #[error("Missing API key: {0} environment variable must be set")]
    MissingApiKey(&'static str),

    /// Reading the known services or writing the result failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The known services file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<TaggingError> for CrateError {
    fn from(err: TaggingError) -> Self {
        match err {
            TaggingError::Io(e) => CrateError::Io(e),
            TaggingError::Json(e) => CrateError::Json(e),
            _ => CrateError::Tagging(err.to_string()),
        }
    }
}
