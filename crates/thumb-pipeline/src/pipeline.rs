//! The preview pipeline.
//!
//! Stages run strictly in order; each either advances the job context,
//! finishes with a terminal outcome, or fails the request. Whatever
//! scratch files exist are deleted on every exit path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{debug, info};

use thumb_models::{
    FileTypeCategory, SkipReason, SourceReference, ThumbnailOutcome, ThumbnailPayload,
};

use crate::collaborators::{ConvertService, MediaTools, ObjectStore};
use crate::config::PipelineConfig;
use crate::context::JobContext;
use crate::error::{PipelineError, PipelineResult};

/// Outcome of a single stage.
enum Step {
    /// Context updated, run the next stage
    Advance,
    /// Pipeline is done with a terminal outcome
    Finish(ThumbnailOutcome),
}

/// One-request-at-a-time preview pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    store: Arc<dyn ObjectStore>,
    converter: Arc<dyn ConvertService>,
    tools: Arc<dyn MediaTools>,
}

impl Pipeline {
    /// Create a pipeline over the given collaborators.
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn ObjectStore>,
        converter: Arc<dyn ConvertService>,
        tools: Arc<dyn MediaTools>,
    ) -> Self {
        Self {
            config,
            store,
            converter,
            tools,
        }
    }

    /// Run the pipeline for one source reference.
    pub async fn run(&self, source: &SourceReference) -> PipelineResult<ThumbnailOutcome> {
        let Some(category) = FileTypeCategory::classify(&source.key) else {
            info!("Skipping unsupported key {}", source.key);
            return Ok(ThumbnailOutcome::Skipped(SkipReason::UnsupportedType));
        };

        let mut ctx = JobContext::new(
            &source.container,
            &source.key,
            category,
            &self.config.work_dir,
        );
        debug!(
            request_id = %ctx.request_id,
            category = %ctx.category,
            "Classified {}",
            ctx.key
        );

        let result = self.drive(&mut ctx).await;
        ctx.cleanup().await;
        result
    }

    /// Drive the staged state machine to a terminal outcome.
    async fn drive(&self, ctx: &mut JobContext) -> PipelineResult<ThumbnailOutcome> {
        if let Step::Finish(outcome) = self.check_size(ctx).await? {
            return Ok(outcome);
        }

        if ctx.category == FileTypeCategory::Office {
            self.convert_office(ctx).await?;
        }

        self.download(ctx).await?;
        self.preprocess(ctx).await?;
        self.finalize(ctx).await
    }

    /// Size guard.
    ///
    /// Oversized images yield header-derived dimensions without a full
    /// download; oversized non-images are skipped outright. An object
    /// exactly at the threshold takes the normal path.
    async fn check_size(&self, ctx: &mut JobContext) -> PipelineResult<Step> {
        let region = self
            .store
            .resolve_region(&ctx.container)
            .await
            .map_err(PipelineError::Metadata)?;
        debug!(request_id = %ctx.request_id, region = %region, "Resolved container region");

        let size = self
            .store
            .object_size(&ctx.container, &ctx.key)
            .await
            .map_err(PipelineError::Metadata)?;

        if size <= self.config.size_threshold {
            return Ok(Step::Advance);
        }

        if ctx.category != FileTypeCategory::Image {
            info!(
                "Skipping oversized {} ({} bytes, category {})",
                ctx.key, size, ctx.category
            );
            return Ok(Step::Finish(ThumbnailOutcome::Skipped(
                SkipReason::OversizedNonImage,
            )));
        }

        // The image header alone carries the dimensions.
        let path = ctx.download_path();
        self.store
            .download(
                &ctx.container,
                &ctx.key,
                &path,
                Some(self.config.partial_range_bytes),
            )
            .await
            .map_err(PipelineError::Download)?;
        ctx.set_working(path.clone());

        let (width, height) = self
            .tools
            .image_dimensions(&path)
            .map_err(PipelineError::Encoding)?;
        info!(
            "Returning dimensions only for oversized image {} ({}x{})",
            ctx.key, width, height
        );

        Ok(Step::Finish(ThumbnailOutcome::DimensionsOnly {
            width,
            height,
        }))
    }

    /// Delegate office documents to the external PDF conversion service.
    ///
    /// The destination prefix carries the request id so concurrent
    /// invocations sharing the scratch prefix cannot collide.
    async fn convert_office(&self, ctx: &mut JobContext) -> PipelineResult<()> {
        let destination = format!("scratch/pdf/{}/", ctx.request_id);
        info!("Converting office document {} via delegate", ctx.key);

        let pdf_key = self
            .converter
            .convert_to_pdf(&ctx.container, &ctx.key, &destination)
            .await?;
        debug!(request_id = %ctx.request_id, "Conversion produced {}", pdf_key);

        ctx.reassign(pdf_key, FileTypeCategory::Pdf);
        Ok(())
    }

    /// Materialize the current object as a local working file.
    async fn download(&self, ctx: &mut JobContext) -> PipelineResult<()> {
        let path = ctx.download_path();
        self.store
            .download(&ctx.container, &ctx.key, &path, None)
            .await
            .map_err(PipelineError::Download)?;
        ctx.set_working(path);
        Ok(())
    }

    /// Category-specific transformation into a plain image file.
    ///
    /// Videos contribute one frame, PDFs one rasterized page; the
    /// superseded working file is deleted even when the tool fails.
    async fn preprocess(&self, ctx: &mut JobContext) -> PipelineResult<()> {
        let input = match ctx.working_file() {
            Some(path) => path.to_path_buf(),
            None => return Ok(()),
        };

        let result = match ctx.category {
            // Office keys were rewritten to pdf before download.
            FileTypeCategory::Image | FileTypeCategory::Office => return Ok(()),
            FileTypeCategory::Video => {
                info!("Extracting frame from {}", input.display());
                let target = with_format_ext(&input, &self.config.format);
                ctx.supersede_working(target.clone());
                self.tools
                    .extract_frame(&input, &target, &self.config.frame_timestamp)
                    .await
            }
            FileTypeCategory::Pdf => {
                info!("Rasterizing first page of {}", input.display());
                let target = with_format_ext(&input, &self.config.format);
                ctx.supersede_working(target.clone());
                self.tools
                    .rasterize_first_page(
                        &input,
                        &target,
                        self.config.raster_density,
                        self.config.raster_quality,
                    )
                    .await
            }
        };

        // The origin goes away whether or not the tool succeeded.
        ctx.delete_origin().await;
        result.map_err(PipelineError::ConversionTool)
    }

    /// Resize, encode, and assemble the terminal payload.
    async fn finalize(&self, ctx: &mut JobContext) -> PipelineResult<ThumbnailOutcome> {
        let working = match ctx.working_file() {
            Some(path) => path.to_path_buf(),
            None => {
                return Err(PipelineError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no working file to thumbnail",
                )))
            }
        };

        debug!(request_id = %ctx.request_id, "Creating thumbnail for {}", working.display());
        let image = self
            .tools
            .render_thumbnail(
                &working,
                self.config.max_width,
                self.config.max_height,
                &self.config.format,
            )
            .map_err(PipelineError::Encoding)?;

        // Original dimensions are only reported for plain image sources.
        if ctx.category == FileTypeCategory::Image {
            ctx.source_dimensions = Some((image.source_width, image.source_height));
        }

        let (width, height) = match ctx.source_dimensions {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };

        info!(
            request_id = %ctx.request_id,
            "Thumbnail ready ({}x{}, {} bytes)",
            image.width,
            image.height,
            image.buffer.len()
        );

        Ok(ThumbnailOutcome::Thumbnail(ThumbnailPayload {
            width,
            height,
            format: self.config.format.clone(),
            buffer_base64: BASE64.encode(&image.buffer),
        }))
    }
}

/// Append the output-format extension (`video.mp4` -> `video.mp4.png`).
fn with_format_ext(path: &Path, format: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(format);
    PathBuf::from(name)
}
