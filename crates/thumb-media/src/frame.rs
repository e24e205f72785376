//! Single-frame extraction from video.

use std::path::Path;

use crate::command::{run_ffmpeg, FfmpegCommand};
use crate::error::MediaResult;

/// Extract one frame from a video into an image file.
///
/// The frame is taken at `timestamp` (HH:MM:SS); FFmpeg infers the output
/// format from the extension of `output_path`.
pub async fn extract_frame(
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    timestamp: &str,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(video_path.as_ref(), output_path.as_ref())
        .seek(timestamp)
        .single_frame()
        .log_level("error");

    run_ffmpeg(&cmd).await
}
