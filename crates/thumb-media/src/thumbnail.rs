//! Thumbnail sizing and encoding.

use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::ImageFormat;

use crate::error::{MediaError, MediaResult};

/// An encoded thumbnail with its sizing metadata.
#[derive(Debug, Clone)]
pub struct ThumbnailImage {
    /// Encoded image bytes
    pub buffer: Vec<u8>,
    /// Intrinsic width of the source
    pub source_width: u32,
    /// Intrinsic height of the source
    pub source_height: u32,
    /// Output width
    pub width: u32,
    /// Output height
    pub height: u32,
}

/// Compute output dimensions that fit `(width, height)` proportionally
/// into a bounding box.
///
/// The scale factor is not clamped: sources smaller than the box are
/// upscaled to fill it.
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );

    let out_width = (scale * width as f64).round().max(1.0) as u32;
    let out_height = (scale * height as f64).round().max(1.0) as u32;
    (out_width, out_height)
}

/// Read the intrinsic dimensions of an image file.
///
/// Only the header is decoded, so a file holding just the leading byte
/// range of a large image is sufficient.
pub fn dimensions_from_file(path: impl AsRef<Path>) -> MediaResult<(u32, u32)> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let reader = ImageReader::open(path)?.with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Resize an image file into an encoded in-memory thumbnail.
pub fn render_thumbnail(
    path: impl AsRef<Path>,
    max_width: u32,
    max_height: u32,
    format: &str,
) -> MediaResult<ThumbnailImage> {
    let path = path.as_ref();
    let format = output_format(format)?;

    let source = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let (source_width, source_height) = (source.width(), source.height());
    let (width, height) = scaled_dimensions(source_width, source_height, max_width, max_height);

    let resized = source.resize_exact(width, height, FilterType::Lanczos3);

    let mut buffer = Vec::new();
    resized.write_to(&mut Cursor::new(&mut buffer), format)?;

    Ok(ThumbnailImage {
        buffer,
        source_width,
        source_height,
        width,
        height,
    })
}

/// Map a format name to an encoder format.
fn output_format(name: &str) -> MediaResult<ImageFormat> {
    ImageFormat::from_extension(name).ok_or_else(|| MediaError::UnsupportedFormat(name.to_string()))
}
