//! Media tool wrappers for preview generation.
//!
//! This crate provides:
//! - FFmpeg invocation for single-frame extraction from video
//! - ImageMagick invocation for PDF page rasterization
//! - Image dimension probing and thumbnail resize/encode

pub mod command;
pub mod error;
pub mod frame;
pub mod raster;
pub mod thumbnail;

pub use command::{check_ffmpeg, FfmpegCommand};
pub use error::{MediaError, MediaResult};
pub use frame::extract_frame;
pub use raster::rasterize_first_page;
pub use thumbnail::{dimensions_from_file, render_thumbnail, scaled_dimensions, ThumbnailImage};
