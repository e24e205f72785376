//! Document conversion service client.
//!
//! Office documents (word processing, presentations, spreadsheets) are
//! converted to PDF by an external service before rasterization; this
//! crate is the HTTP client for that collaborator.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ConvertClient, ConvertConfig};
pub use error::{ConvertError, ConvertResult};
pub use types::{ConvertRequest, ConvertResponse};
