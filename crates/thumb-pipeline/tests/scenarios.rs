//! End-to-end pipeline scenarios with in-memory collaborators.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;

use thumb_convert::ConvertResult;
use thumb_media::{MediaError, MediaResult, ThumbnailImage};
use thumb_models::{SkipReason, SourceReference, ThumbnailOutcome};
use thumb_pipeline::{
    ConvertService, MediaTools, ObjectStore, Pipeline, PipelineConfig, PipelineError,
};
use thumb_storage::{StorageError, StorageResult};

const THRESHOLD: u64 = 64 * 1024;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([120, 40, 200, 255]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

/// In-memory object store with optional reported-size overrides.
#[derive(Default)]
struct FakeStore {
    objects: HashMap<String, Vec<u8>>,
    reported_sizes: HashMap<String, u64>,
}

impl FakeStore {
    fn with_object(mut self, key: &str, bytes: Vec<u8>) -> Self {
        self.objects.insert(key.to_string(), bytes);
        self
    }

    fn reporting_size(mut self, key: &str, size: u64) -> Self {
        self.reported_sizes.insert(key.to_string(), size);
        self
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn resolve_region(&self, _container: &str) -> StorageResult<String> {
        Ok("us-east-1".to_string())
    }

    async fn object_size(&self, _container: &str, key: &str) -> StorageResult<u64> {
        if let Some(size) = self.reported_sizes.get(key) {
            return Ok(*size);
        }
        self.objects
            .get(key)
            .map(|b| b.len() as u64)
            .ok_or_else(|| StorageError::not_found(key))
    }

    async fn download(
        &self,
        _container: &str,
        key: &str,
        path: &Path,
        range_bytes: Option<u64>,
    ) -> StorageResult<()> {
        let bytes = self
            .objects
            .get(key)
            .ok_or_else(|| StorageError::not_found(key))?;
        let slice = match range_bytes {
            Some(n) => &bytes[..bytes.len().min(n as usize + 1)],
            None => &bytes[..],
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, slice).await?;
        Ok(())
    }
}

/// Conversion delegate that records destinations and returns a fixed key.
struct FakeConverter {
    produced_key: String,
    destinations: Mutex<Vec<String>>,
}

impl FakeConverter {
    fn new(produced_key: &str) -> Self {
        Self {
            produced_key: produced_key.to_string(),
            destinations: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ConvertService for FakeConverter {
    async fn convert_to_pdf(
        &self,
        _container: &str,
        _key: &str,
        destination: &str,
    ) -> ConvertResult<String> {
        self.destinations.lock().unwrap().push(destination.to_string());
        Ok(self.produced_key.clone())
    }
}

/// Media tools with the subprocess steps replaced by file writes; probing
/// and thumbnailing use the real implementations.
struct StubTools {
    /// Image written when a frame is "extracted" or a page "rasterized"
    frame: Vec<u8>,
    fail_extract: bool,
    extract_called: AtomicBool,
    raster_called: AtomicBool,
    /// Files present next to the working file when the thumbnailer ran
    seen_at_render: Mutex<Vec<String>>,
}

impl StubTools {
    fn new(frame: Vec<u8>) -> Self {
        Self {
            frame,
            fail_extract: false,
            extract_called: AtomicBool::new(false),
            raster_called: AtomicBool::new(false),
            seen_at_render: Mutex::new(Vec::new()),
        }
    }

    fn failing_extract(mut self) -> Self {
        self.fail_extract = true;
        self
    }

    fn record_siblings(&self, path: &Path) {
        let mut seen = self.seen_at_render.lock().unwrap();
        if let Some(parent) = path.parent() {
            if let Ok(entries) = std::fs::read_dir(parent) {
                for entry in entries.flatten() {
                    seen.push(entry.file_name().to_string_lossy().to_string());
                }
            }
        }
    }
}

#[async_trait]
impl MediaTools for StubTools {
    async fn extract_frame(&self, video: &Path, output: &Path, _timestamp: &str) -> MediaResult<()> {
        assert!(video.exists(), "input video must exist when extracting");
        self.extract_called.store(true, Ordering::SeqCst);
        if self.fail_extract {
            return Err(MediaError::ffmpeg_failed("frame extraction failed", None, Some(1)));
        }
        tokio::fs::write(output, &self.frame).await?;
        Ok(())
    }

    async fn rasterize_first_page(
        &self,
        pdf: &Path,
        output: &Path,
        _density: u32,
        _quality: u8,
    ) -> MediaResult<()> {
        assert!(pdf.exists(), "input pdf must exist when rasterizing");
        self.raster_called.store(true, Ordering::SeqCst);
        tokio::fs::write(output, &self.frame).await?;
        Ok(())
    }

    fn image_dimensions(&self, path: &Path) -> MediaResult<(u32, u32)> {
        thumb_media::dimensions_from_file(path)
    }

    fn render_thumbnail(
        &self,
        path: &Path,
        max_width: u32,
        max_height: u32,
        format: &str,
    ) -> MediaResult<ThumbnailImage> {
        self.record_siblings(path);
        thumb_media::render_thumbnail(path, max_width, max_height, format)
    }
}

struct Harness {
    work_dir: TempDir,
    store: Arc<FakeStore>,
    converter: Arc<FakeConverter>,
    tools: Arc<StubTools>,
}

impl Harness {
    fn new(store: FakeStore, converter: FakeConverter, tools: StubTools) -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            store: Arc::new(store),
            converter: Arc::new(converter),
            tools: Arc::new(tools),
        }
    }

    fn pipeline(&self) -> Pipeline {
        let config = PipelineConfig {
            size_threshold: THRESHOLD,
            partial_range_bytes: 8 * 1024,
            work_dir: self.work_dir.path().to_string_lossy().to_string(),
            ..PipelineConfig::default()
        };
        Pipeline::new(
            config,
            self.store.clone(),
            self.converter.clone(),
            self.tools.clone(),
        )
    }

    async fn run(&self, key: &str) -> Result<ThumbnailOutcome, PipelineError> {
        let source = SourceReference {
            container: "media".to_string(),
            key: key.to_string(),
        };
        self.pipeline().run(&source).await
    }

    fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.work_dir.path())
            .map(|entries| entries.count() == 0)
            .unwrap_or(true)
    }
}

fn decoded_thumb(outcome: &ThumbnailOutcome) -> (Option<u32>, Option<u32>, DynamicImage) {
    match outcome {
        ThumbnailOutcome::Thumbnail(payload) => {
            assert_eq!(payload.format, "png");
            let bytes = BASE64.decode(&payload.buffer_base64).unwrap();
            let img = image::load_from_memory(&bytes).unwrap();
            (payload.width, payload.height, img)
        }
        other => panic!("expected thumbnail, got {other:?}"),
    }
}

#[tokio::test]
async fn image_under_threshold_is_thumbnailed_with_source_dimensions() {
    let harness = Harness::new(
        FakeStore::default().with_object("photo.png", png_bytes(400, 100)),
        FakeConverter::new("unused"),
        StubTools::new(Vec::new()),
    );

    let outcome = harness.run("photo.png").await.unwrap();
    let (width, height, img) = decoded_thumb(&outcome);

    assert_eq!((width, height), (Some(400), Some(100)));
    assert_eq!((img.width(), img.height()), (200, 50));
    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn video_frame_is_extracted_then_thumbnailed() {
    let harness = Harness::new(
        FakeStore::default().with_object("clips/clip.mp4", b"not really a video".to_vec()),
        FakeConverter::new("unused"),
        StubTools::new(png_bytes(320, 240)),
    );

    let outcome = harness.run("clips/clip.mp4").await.unwrap();
    let (width, height, img) = decoded_thumb(&outcome);

    // Dimensions are only reported for image sources.
    assert_eq!((width, height), (None, None));
    assert_eq!((img.width(), img.height()), (200, 150));
    assert!(harness.tools.extract_called.load(Ordering::SeqCst));

    // The origin video was already gone when the thumbnailer ran.
    let seen = harness.tools.seen_at_render.lock().unwrap().clone();
    assert!(seen.contains(&"clips-clip.mp4.png".to_string()));
    assert!(!seen.contains(&"clips-clip.mp4".to_string()));
    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn oversized_image_returns_dimensions_only() {
    let harness = Harness::new(
        FakeStore::default()
            .with_object("huge.png", png_bytes(800, 600))
            .reporting_size("huge.png", THRESHOLD + 1),
        FakeConverter::new("unused"),
        StubTools::new(Vec::new()),
    );

    let outcome = harness.run("huge.png").await.unwrap();
    match outcome {
        ThumbnailOutcome::DimensionsOnly { width, height } => {
            assert_eq!((width, height), (800, 600));
        }
        other => panic!("expected dimensions only, got {other:?}"),
    }
    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn size_exactly_at_threshold_takes_the_normal_path() {
    let harness = Harness::new(
        FakeStore::default()
            .with_object("edge.png", png_bytes(300, 300))
            .reporting_size("edge.png", THRESHOLD),
        FakeConverter::new("unused"),
        StubTools::new(Vec::new()),
    );

    let outcome = harness.run("edge.png").await.unwrap();
    assert!(matches!(outcome, ThumbnailOutcome::Thumbnail(_)));
}

#[tokio::test]
async fn oversized_non_image_is_skipped() {
    let harness = Harness::new(
        FakeStore::default()
            .with_object("big.mp4", b"video".to_vec())
            .reporting_size("big.mp4", THRESHOLD + 1),
        FakeConverter::new("unused"),
        StubTools::new(Vec::new()),
    );

    let outcome = harness.run("big.mp4").await.unwrap();
    assert!(matches!(
        outcome,
        ThumbnailOutcome::Skipped(SkipReason::OversizedNonImage)
    ));
    assert!(!harness.tools.extract_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn unknown_extension_is_skipped_without_storage_calls() {
    let harness = Harness::new(
        FakeStore::default(),
        FakeConverter::new("unused"),
        StubTools::new(Vec::new()),
    );

    let outcome = harness.run("notes.txt").await.unwrap();
    assert!(matches!(
        outcome,
        ThumbnailOutcome::Skipped(SkipReason::UnsupportedType)
    ));
    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn office_document_is_converted_then_rasterized() {
    let pdf_key = "scratch/pdf/converted/slides.pdf";
    let harness = Harness::new(
        FakeStore::default()
            .with_object("decks/slides.pptx", b"office bytes".to_vec())
            .with_object(pdf_key, b"pdf bytes".to_vec()),
        FakeConverter::new(pdf_key),
        StubTools::new(png_bytes(500, 500)),
    );

    let outcome = harness.run("decks/slides.pptx").await.unwrap();
    let (width, height, img) = decoded_thumb(&outcome);

    assert_eq!((width, height), (None, None));
    assert_eq!((img.width(), img.height()), (200, 200));
    assert!(harness.tools.raster_called.load(Ordering::SeqCst));
    assert!(!harness.tools.extract_called.load(Ordering::SeqCst));

    // The delegate saw a request-scoped destination prefix.
    let destinations = harness.converter.destinations.lock().unwrap().clone();
    assert_eq!(destinations.len(), 1);
    assert!(destinations[0].starts_with("scratch/pdf/"));
    assert!(destinations[0].ends_with('/'));
    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn failed_extraction_still_cleans_up_scratch() {
    let harness = Harness::new(
        FakeStore::default().with_object("clip.mp4", b"video".to_vec()),
        FakeConverter::new("unused"),
        StubTools::new(png_bytes(100, 100)).failing_extract(),
    );

    let err = harness.run("clip.mp4").await.unwrap_err();
    assert!(matches!(err, PipelineError::ConversionTool(_)));
    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn failure_after_preprocess_leaves_no_files_behind() {
    // An unencodable format makes the thumbnailer fail after the frame
    // has replaced the downloaded video.
    let store = FakeStore::default().with_object("clip.mp4", b"video".to_vec());
    let converter = FakeConverter::new("unused");
    let tools = StubTools::new(png_bytes(100, 100));

    let harness = Harness::new(store, converter, tools);
    let config = PipelineConfig {
        size_threshold: THRESHOLD,
        work_dir: harness.work_dir.path().to_string_lossy().to_string(),
        format: "not-a-format".to_string(),
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(
        config,
        harness.store.clone(),
        harness.converter.clone(),
        harness.tools.clone(),
    );

    let source = SourceReference {
        container: "media".to_string(),
        key: "clip.mp4".to_string(),
    };
    let err = pipeline.run(&source).await.unwrap_err();
    assert!(matches!(err, PipelineError::Encoding(_)));
    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn missing_object_surfaces_metadata_error() {
    let harness = Harness::new(
        FakeStore::default(),
        FakeConverter::new("unused"),
        StubTools::new(Vec::new()),
    );

    let err = harness.run("gone.png").await.unwrap_err();
    assert!(matches!(err, PipelineError::Metadata(_)));
}
