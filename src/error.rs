//! Error types for the annotation engine.

use thiserror::Error;

/// Errors decoding or adopting the source image for a session.
///
/// These are fatal for the session being opened: without a background raster
/// there is no canvas space to anchor annotations to.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to decode source image: {0}")]
    Image(#[from] image::ImageError),

    #[error("source image has zero width or height")]
    EmptyImage,
}

/// Errors reconstructing a serialized scene document.
///
/// Always recovered by refusing the operation and leaving the live scene
/// untouched; a partially applied document would poison undo history.
#[derive(Debug, Error)]
pub enum SceneCorruptError {
    #[error("scene document version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("malformed scene document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("failed to decompress scene document: {0}")]
    Compression(#[from] std::io::Error),

    #[error("scene document reuses object id {0}")]
    DuplicateId(u64),
}

/// Top-level error for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    SceneCorrupt(#[from] SceneCorruptError),

    #[error("a raster remap is pending; finish it before mutating or exporting")]
    RemapPending,

    #[error("no crop rectangle is pending")]
    NoActiveCrop,

    #[error("no text annotation is being edited")]
    NoTextEditing,

    #[error("canvas container {width}x{height} is not drawable")]
    InvalidContainer { width: f64, height: f64 },

    #[error("failed to encode export image: {0}")]
    Encode(#[from] image::ImageError),
}
