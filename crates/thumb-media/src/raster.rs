//! PDF page rasterization via ImageMagick.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Rasterize the first page of a PDF into an image file.
///
/// `density` controls the render resolution in DPI. The page is flattened
/// so transparency does not bleed into the output background; the output
/// format follows the extension of `output_path`.
pub async fn rasterize_first_page(
    pdf_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    density: u32,
    quality: u8,
) -> MediaResult<()> {
    let binary = magick_binary()?;
    let args = raster_args(pdf_path.as_ref(), output_path.as_ref(), density, quality);
    debug!("Running {}: {}", binary.display(), args.join(" "));

    let output = Command::new(&binary)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if output.status.success() {
        Ok(())
    } else {
        Err(MediaError::raster_failed(
            "ImageMagick exited with non-zero status",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ))
    }
}

/// Locate the ImageMagick binary, preferring the v7 entry point.
fn magick_binary() -> MediaResult<PathBuf> {
    which::which("magick")
        .or_else(|_| which::which("convert"))
        .map_err(|_| MediaError::MagickNotFound)
}

fn raster_args(pdf: &Path, output: &Path, density: u32, quality: u8) -> Vec<String> {
    vec![
        // Density applies to how the PDF is read, so it precedes the input.
        "-density".to_string(),
        density.to_string(),
        format!("{}[0]", pdf.to_string_lossy()),
        "-flatten".to_string(),
        "-quality".to_string(),
        quality.to_string(),
        output.to_string_lossy().to_string(),
    ]
}
