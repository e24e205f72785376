//! Conversion client error types.

use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Conversion request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid conversion response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
