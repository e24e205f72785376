//! Default limits and output settings.

/// Maximum thumbnail width in pixels
pub const MAX_THUMB_WIDTH: u32 = 200;
/// Maximum thumbnail height in pixels
pub const MAX_THUMB_HEIGHT: u32 = 200;

/// Objects larger than this are not fully downloaded (30 MiB)
pub const MAX_OBJECT_SIZE: u64 = 30 * 1024 * 1024;
/// Leading byte range fetched from oversized images (100 KiB)
pub const PARTIAL_RANGE_BYTES: u64 = 100 * 1024;

/// Output image format for thumbnails
pub const THUMB_FORMAT: &str = "png";
/// Timestamp of the extracted video frame
pub const FRAME_TIMESTAMP: &str = "00:00:01";
/// Render density for PDF page rasterization (DPI)
pub const RASTER_DENSITY: u32 = 150;
/// Quality for PDF page rasterization (0-100)
pub const RASTER_QUALITY: u8 = 100;
