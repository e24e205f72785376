//! Shared data models for the Thumbgen backend.
//!
//! This crate provides Serde-serializable types for:
//! - Source object references and request payloads
//! - File-type classification
//! - Terminal pipeline outcomes
//! - Default limits and output settings

pub mod category;
pub mod limits;
pub mod request;
pub mod result;

// Re-export common types
pub use category::FileTypeCategory;
pub use request::{decode_object_key, SourceReference, ThumbnailRequest};
pub use result::{SkipReason, ThumbnailOutcome, ThumbnailPayload};
