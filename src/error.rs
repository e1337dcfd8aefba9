use thiserror::Error;

use crate::api::ApiError;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by the command flows.
#[derive(Error, Debug)]
pub enum Error {
    /// Remote server or network failure (after retries where applicable)
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Bad user input: missing id, unknown movie, ambiguous title
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid settings
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The interactive prompt capability is not available
    #[error("Interactive selection unavailable: {0}")]
    SelectionUnavailable(String),

    /// I/O error, including terminal prompt failures
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
