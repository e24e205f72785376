//! Pipeline configuration.

use thumb_models::limits;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum thumbnail width in pixels
    pub max_width: u32,
    /// Maximum thumbnail height in pixels
    pub max_height: u32,
    /// Objects above this many bytes are not fully downloaded
    pub size_threshold: u64,
    /// Leading byte range fetched from oversized images
    pub partial_range_bytes: u64,
    /// Output image format
    pub format: String,
    /// Timestamp of the extracted video frame
    pub frame_timestamp: String,
    /// PDF rasterization density (DPI)
    pub raster_density: u32,
    /// PDF rasterization quality (0-100)
    pub raster_quality: u8,
    /// Scratch directory for per-request working files
    pub work_dir: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_width: limits::MAX_THUMB_WIDTH,
            max_height: limits::MAX_THUMB_HEIGHT,
            size_threshold: limits::MAX_OBJECT_SIZE,
            partial_range_bytes: limits::PARTIAL_RANGE_BYTES,
            format: limits::THUMB_FORMAT.to_string(),
            frame_timestamp: limits::FRAME_TIMESTAMP.to_string(),
            raster_density: limits::RASTER_DENSITY,
            raster_quality: limits::RASTER_QUALITY,
            work_dir: "/tmp/thumbgen".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_width: std::env::var("THUMB_MAX_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(limits::MAX_THUMB_WIDTH),
            max_height: std::env::var("THUMB_MAX_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(limits::MAX_THUMB_HEIGHT),
            size_threshold: std::env::var("THUMB_SIZE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(limits::MAX_OBJECT_SIZE),
            partial_range_bytes: std::env::var("THUMB_PARTIAL_RANGE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(limits::PARTIAL_RANGE_BYTES),
            format: std::env::var("THUMB_FORMAT")
                .unwrap_or_else(|_| limits::THUMB_FORMAT.to_string()),
            frame_timestamp: std::env::var("THUMB_FRAME_TIMESTAMP")
                .unwrap_or_else(|_| limits::FRAME_TIMESTAMP.to_string()),
            raster_density: std::env::var("THUMB_RASTER_DENSITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(limits::RASTER_DENSITY),
            raster_quality: std::env::var("THUMB_RASTER_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(limits::RASTER_QUALITY),
            work_dir: std::env::var("THUMB_WORK_DIR")
                .unwrap_or_else(|_| "/tmp/thumbgen".to_string()),
        }
    }
}
