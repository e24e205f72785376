//! Terminal pipeline outcomes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a request ended without producing a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Key extension is missing or not in the category table
    UnsupportedType,
    /// Object exceeds the size threshold and is not an image
    OversizedNonImage,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType => write!(f, "unsupported type"),
            Self::OversizedNonImage => write!(f, "oversized non-image"),
        }
    }
}

/// Encoded preview returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailPayload {
    /// Intrinsic width of the source, recorded for image sources only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Intrinsic height of the source, recorded for image sources only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Encoded output format
    pub format: String,
    /// Base64-encoded image buffer
    pub buffer_base64: String,
}

/// Terminal result of one pipeline run.
///
/// `Skipped` is a defined outcome, not an error and not an absent reply;
/// callers branch on the variant.
#[derive(Debug, Clone)]
pub enum ThumbnailOutcome {
    /// No processing was performed
    Skipped(SkipReason),
    /// Dimensions of an oversized image; no buffer
    DimensionsOnly { width: u32, height: u32 },
    /// Full preview
    Thumbnail(ThumbnailPayload),
}

impl ThumbnailOutcome {
    /// JSON body for the caller; `None` for skips.
    pub fn response_body(&self) -> Option<serde_json::Value> {
        match self {
            Self::Skipped(_) => None,
            Self::DimensionsOnly { width, height } => Some(serde_json::json!({
                "width": width,
                "height": height,
            })),
            Self::Thumbnail(payload) => serde_json::to_value(payload).ok(),
        }
    }
}
