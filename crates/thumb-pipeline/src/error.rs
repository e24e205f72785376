//! Pipeline error types.

use thiserror::Error;

use thumb_convert::ConvertError;
use thumb_media::MediaError;
use thumb_storage::StorageError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort a preview request.
///
/// Skips are outcomes, not errors. Cleanup failures have no variant:
/// scratch-file deletion is best-effort and only logged.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Metadata lookup failed: {0}")]
    Metadata(StorageError),

    #[error("Download failed: {0}")]
    Download(StorageError),

    #[error("Conversion delegate failed: {0}")]
    Delegate(#[from] ConvertError),

    #[error("Media tool failed: {0}")]
    ConversionTool(MediaError),

    #[error("Encoding failed: {0}")]
    Encoding(MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
