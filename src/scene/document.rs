//! Versioned scene document serialization.
//!
//! Hosts persist annotation drafts with this envelope. History never uses
//! it: undo snapshots are value copies, not serialized blobs.

use super::object::AnnotationObject;
use crate::error::SceneCorruptError;
use chrono::Utc;
use flate2::{Compression, bufread::GzDecoder, write::GzEncoder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Read, Write};

/// Current scene document format version.
pub const CURRENT_VERSION: u32 = 1;

/// JSON envelope for a serialized annotation list.
#[derive(Debug, Serialize, Deserialize)]
pub struct SceneDocument {
    pub version: u32,
    pub last_modified: String,
    #[serde(default)]
    pub objects: Vec<AnnotationObject>,
}

impl SceneDocument {
    pub fn new(objects: Vec<AnnotationObject>) -> Self {
        Self {
            version: CURRENT_VERSION,
            last_modified: Utc::now().to_rfc3339(),
            objects,
        }
    }

    pub fn to_json(&self) -> Result<String, SceneCorruptError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and validates a document. Unknown variant tags and duplicate
    /// ids are corruption, not data to repair.
    pub fn from_json(raw: &str) -> Result<Self, SceneCorruptError> {
        let document: SceneDocument = serde_json::from_str(raw)?;
        document.validate()?;
        Ok(document)
    }

    /// Gzip-compressed JSON for compact storage.
    pub fn to_gzip(&self) -> Result<Vec<u8>, SceneCorruptError> {
        let json = self.to_json()?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes())?;
        Ok(encoder.finish()?)
    }

    /// Parses raw bytes, inflating first when they carry the gzip magic.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SceneCorruptError> {
        if is_gzip(bytes) {
            let mut decoder = GzDecoder::new(bytes);
            let mut inflated = String::new();
            decoder.read_to_string(&mut inflated)?;
            Self::from_json(&inflated)
        } else {
            let document: SceneDocument = serde_json::from_slice(bytes)?;
            document.validate()?;
            Ok(document)
        }
    }

    fn validate(&self) -> Result<(), SceneCorruptError> {
        if self.version > CURRENT_VERSION {
            return Err(SceneCorruptError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_VERSION,
            });
        }
        let mut seen = HashSet::new();
        for object in &self.objects {
            if !seen.insert(object.id) {
                return Err(SceneCorruptError::DuplicateId(object.id.0));
            }
        }
        Ok(())
    }
}

/// Checks for the gzip magic bytes.
fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() > 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}
