//! Annotation scene engine for screenshot feedback markup.
//!
//! The crate models an annotation session over a background raster: vector
//! annotations (arrows, rectangles, ellipses, freehand paths, text) and
//! pixelate redaction zones drawn in canvas space, a pointer-gesture state
//! machine, a coordinate-remapping crop engine, linear snapshot undo/redo
//! that spans crop raster swaps, and a CPU flattening exporter.
//!
//! [`editor::Editor`] is the host-facing facade; everything else supports
//! it. The crate does no windowing and no painting of its own: hosts feed
//! pointer, text, and tool events in and read the scene back out.

pub mod color;
pub mod config;
pub mod crop;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod pixelate;
pub mod raster;
pub mod sampler;
pub mod scene;
pub mod tool;
pub mod util;

pub use color::Color;
pub use config::EngineOptions;
pub use editor::{CropOutcome, Editor, GestureState, HistoryOutcome, RemapTicket};
pub use error::{DecodeError, EngineError, SceneCorruptError};
pub use geometry::{CanvasPoint, CanvasRect, DisplayLayout, PixelRect};
pub use raster::Raster;
pub use scene::{AnnotationObject, ObjectId, ObjectKind, Scene};
pub use tool::Tool;
