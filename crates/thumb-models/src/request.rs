//! Request payloads and object-key decoding.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A preview request as delivered by the invoker.
///
/// The key arrives storage-notification encoded: percent-escaped with
/// spaces folded into `+`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ThumbnailRequest {
    /// Storage container (bucket) holding the object
    pub container: String,
    /// Raw, still-encoded object key
    pub key: String,
}

/// An immutable reference to a stored object with a decoded key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    pub container: String,
    pub key: String,
}

impl SourceReference {
    /// Build a reference from a raw request, decoding the key.
    pub fn from_request(request: &ThumbnailRequest) -> Self {
        Self {
            container: request.container.clone(),
            key: decode_object_key(&request.key),
        }
    }
}

/// Decode a storage-notification encoded object key.
///
/// `+` maps to a space before percent-decoding. Keys that do not decode
/// to valid UTF-8 are used as-is after the `+` substitution.
pub fn decode_object_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
