//! Request-scoped job state.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use thumb_models::FileTypeCategory;

/// Mutable state for one preview request, owned exclusively by the
/// pipeline for the request's lifetime.
///
/// Holds the current key and category (both reassigned when the delegate
/// converts an office document), the current local working file, and the
/// superseded "origin" file awaiting deletion. At most one origin is
/// pending at any time; whichever stage supersedes a working file must
/// also delete it. Nothing survives across requests.
#[derive(Debug)]
pub struct JobContext {
    /// Request identifier; namespaces the scratch directory so that
    /// concurrent invocations sharing an execution environment cannot
    /// collide
    pub request_id: String,
    /// Storage container
    pub container: String,
    /// Current object key
    pub key: String,
    /// Current file category
    pub category: FileTypeCategory,
    /// Intrinsic source dimensions, recorded for image sources
    pub source_dimensions: Option<(u32, u32)>,
    /// Scratch directory for this request
    scratch_dir: PathBuf,
    /// Current local working file
    working: Option<PathBuf>,
    /// Superseded working file pending deletion
    origin: Option<PathBuf>,
}

impl JobContext {
    /// Create a context for one request.
    pub fn new(
        container: impl Into<String>,
        key: impl Into<String>,
        category: FileTypeCategory,
        work_dir: impl AsRef<Path>,
    ) -> Self {
        let request_id = Uuid::new_v4().to_string();
        let scratch_dir = work_dir.as_ref().join(&request_id);

        Self {
            request_id,
            container: container.into(),
            key: key.into(),
            category,
            source_dimensions: None,
            scratch_dir,
            working: None,
            origin: None,
        }
    }

    /// Scratch directory for this request.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Local path the current key downloads to.
    ///
    /// The key is flattened into a single file name so nested keys stay
    /// inside the scratch directory.
    pub fn download_path(&self) -> PathBuf {
        self.scratch_dir.join(self.key.replace('/', "-"))
    }

    /// Current working file, if one has been materialized.
    pub fn working_file(&self) -> Option<&Path> {
        self.working.as_deref()
    }

    /// Set the current working file.
    pub fn set_working(&mut self, path: PathBuf) {
        self.working = Some(path);
    }

    /// Reassign key and category after delegate conversion.
    pub fn reassign(&mut self, key: String, category: FileTypeCategory) {
        self.key = key;
        self.category = category;
    }

    /// Replace the working file with `path`, marking the old one as the
    /// origin pending deletion.
    pub fn supersede_working(&mut self, path: PathBuf) {
        self.origin = self.working.replace(path);
    }

    /// Delete the pending origin file, best-effort.
    pub async fn delete_origin(&mut self) {
        if let Some(origin) = self.origin.take() {
            debug!("Deleting superseded file {}", origin.display());
            if let Err(e) = tokio::fs::remove_file(&origin).await {
                warn!("Failed to delete superseded file {}: {}", origin.display(), e);
            }
        }
    }

    /// Delete whatever scratch files remain and drop the scratch
    /// directory, best-effort.
    ///
    /// Runs on every exit path; failures are logged, never propagated.
    pub async fn cleanup(&mut self) {
        self.delete_origin().await;

        if let Some(working) = self.working.take() {
            if let Err(e) = tokio::fs::remove_file(&working).await {
                // The file may never have been produced on failure paths.
                if working.exists() {
                    warn!("Failed to delete working file {}: {}", working.display(), e);
                }
            }
        }

        if self.scratch_dir.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&self.scratch_dir).await {
                warn!(
                    "Failed to remove scratch dir {}: {}",
                    self.scratch_dir.display(),
                    e
                );
            }
        }
    }
}
