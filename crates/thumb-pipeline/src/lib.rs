//! Preview pipeline orchestration.
//!
//! One request in, one terminal outcome out: classification, oversize
//! guard, optional delegate conversion, download, category-specific
//! preprocessing, thumbnail encoding, and deterministic scratch cleanup.

pub mod collaborators;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;

pub use collaborators::{
    ConvertService, MediaTools, ObjectStore, S3ObjectStore, SystemMediaTools,
};
pub use config::PipelineConfig;
pub use context::JobContext;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::Pipeline;
