//! Collaborator seams.
//!
//! The pipeline talks to object storage, the conversion delegate, and the
//! local media tools through narrow traits, so each backend is swappable
//! without touching stage logic.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use thumb_convert::{ConvertClient, ConvertRequest, ConvertResult};
use thumb_media::{MediaResult, ThumbnailImage};
use thumb_storage::{leading_range, ObjectStoreClient, StorageResult};

/// Remote object storage, at the granularity the pipeline needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Resolve the region the container lives in and target it for
    /// subsequent calls.
    async fn resolve_region(&self, container: &str) -> StorageResult<String>;

    /// Size of an object in bytes.
    async fn object_size(&self, container: &str, key: &str) -> StorageResult<u64>;

    /// Download an object to a local file, optionally only its first
    /// `range_bytes` bytes.
    async fn download(
        &self,
        container: &str,
        key: &str,
        path: &Path,
        range_bytes: Option<u64>,
    ) -> StorageResult<()>;
}

/// Document-to-PDF conversion delegate.
#[async_trait]
pub trait ConvertService: Send + Sync {
    /// Convert an office document, returning the key of the produced PDF.
    async fn convert_to_pdf(
        &self,
        container: &str,
        key: &str,
        destination: &str,
    ) -> ConvertResult<String>;
}

/// Local media transformations.
#[async_trait]
pub trait MediaTools: Send + Sync {
    /// Extract a single video frame into an image file.
    async fn extract_frame(&self, video: &Path, output: &Path, timestamp: &str) -> MediaResult<()>;

    /// Rasterize the first PDF page into an image file.
    async fn rasterize_first_page(
        &self,
        pdf: &Path,
        output: &Path,
        density: u32,
        quality: u8,
    ) -> MediaResult<()>;

    /// Intrinsic dimensions of an image file (header decode only).
    fn image_dimensions(&self, path: &Path) -> MediaResult<(u32, u32)>;

    /// Resize and encode an image file into an in-memory thumbnail.
    fn render_thumbnail(
        &self,
        path: &Path,
        max_width: u32,
        max_height: u32,
        format: &str,
    ) -> MediaResult<ThumbnailImage>;
}

/// S3-backed object store.
///
/// Region resolution rebinds the inner client so later calls hit the
/// container's own region, mirroring how the storage SDK wants to be
/// pointed at a bucket's home region before metadata lookups.
pub struct S3ObjectStore {
    client: RwLock<ObjectStoreClient>,
}

impl S3ObjectStore {
    pub fn new(client: ObjectStoreClient) -> Self {
        Self {
            client: RwLock::new(client),
        }
    }

    async fn client(&self) -> ObjectStoreClient {
        self.client.read().await.clone()
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn resolve_region(&self, container: &str) -> StorageResult<String> {
        let client = self.client().await;
        let region = client.bucket_region(container).await?;
        *self.client.write().await = client.for_region(&region);
        Ok(region)
    }

    async fn object_size(&self, container: &str, key: &str) -> StorageResult<u64> {
        self.client().await.object_size(container, key).await
    }

    async fn download(
        &self,
        container: &str,
        key: &str,
        path: &Path,
        range_bytes: Option<u64>,
    ) -> StorageResult<()> {
        let range = range_bytes.map(leading_range);
        self.client()
            .await
            .download_to_file(container, key, path, range.as_deref())
            .await
    }
}

#[async_trait]
impl ConvertService for ConvertClient {
    async fn convert_to_pdf(
        &self,
        container: &str,
        key: &str,
        destination: &str,
    ) -> ConvertResult<String> {
        let request = ConvertRequest {
            container: container.to_string(),
            key: key.to_string(),
            destination: destination.to_string(),
        };
        Ok(self.convert(&request).await?.key)
    }
}

/// Production media tools backed by FFmpeg, ImageMagick, and the image
/// crate.
#[derive(Debug, Default, Clone)]
pub struct SystemMediaTools;

#[async_trait]
impl MediaTools for SystemMediaTools {
    async fn extract_frame(&self, video: &Path, output: &Path, timestamp: &str) -> MediaResult<()> {
        thumb_media::extract_frame(video, output, timestamp).await
    }

    async fn rasterize_first_page(
        &self,
        pdf: &Path,
        output: &Path,
        density: u32,
        quality: u8,
    ) -> MediaResult<()> {
        thumb_media::rasterize_first_page(pdf, output, density, quality).await
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
        thumb_media::render_thumbnail(path, max_width, max_height, format)
    }
}
