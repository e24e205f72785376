//! Object-storage client.
//!
//! This crate provides:
//! - Bucket region resolution
//! - Object metadata (size) lookup
//! - Full and ranged download-to-file

pub mod client;
pub mod error;

pub use client::{leading_range, ObjectStoreClient, StorageConfig};
pub use error::{StorageError, StorageResult};
