//! Conversion service wire types.

use serde::{Deserialize, Serialize};

/// Request payload for document-to-PDF conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertRequest {
    /// Storage container holding the source document
    pub container: String,
    /// Key of the source document
    pub key: String,
    /// Prefix under which the produced PDF is written
    pub destination: String,
}

/// Response payload from the conversion service.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertResponse {
    /// Key of the produced PDF object
    pub key: String,
}
