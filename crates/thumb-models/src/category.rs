//! File-type classification.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Media category of a stored object, derived from its key extension.
///
/// The category selects the preprocessing branch: images go straight to
/// thumbnailing, videos contribute a single frame, PDFs a rasterized
/// page, and office documents are first converted to PDF by the
/// conversion delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileTypeCategory {
    Image,
    Video,
    Pdf,
    Office,
}

impl FileTypeCategory {
    /// Classify an object key by its trailing extension.
    ///
    /// Returns `None` for keys without an extension or with one outside
    /// the category table; such objects are skipped, never failed.
    pub fn classify(key: &str) -> Option<Self> {
        let (_, ext) = key.rsplit_once('.')?;
        Self::from_extension(&ext.to_ascii_lowercase())
    }

    /// Map a lower-cased extension to a category.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tif" | "webp" => Some(Self::Image),
            "mp4" | "wav" | "m4v" | "mov" => Some(Self::Video),
            "pdf" => Some(Self::Pdf),
            "doc" | "docx" | "ppt" | "pptx" | "xls" | "xlsx" => Some(Self::Office),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Pdf => "pdf",
            Self::Office => "office",
        }
    }
}

impl fmt::Display for FileTypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
