//! Engine facade.
//!
//! One [`Editor`] owns one session: a background raster, the annotations
//! over it, and the history spanning both vector edits and crops. Hosts feed
//! it pointer and text events plus tool selection, and read the scene back
//! to paint it. Pointer gestures live in [`gesture`], inline text editing in
//! [`text`], raster-swap completion in [`remap`].

mod gesture;
mod remap;
mod text;


// Re-export the gesture and remap vocabulary at the module root.
#[allow(unused_imports)]
pub use gesture::{CropOutcome, GestureState};
#[allow(unused_imports)]
pub use remap::{RemapTicket, SceneGeneration};

use crate::color::{self, Color};
use crate::config::EngineOptions;
use crate::crop;
use crate::error::EngineError;
use crate::export;
use crate::geometry::{CanvasPoint, DisplayLayout};
use crate::history::{History, HistoryEntry};
use crate::pixelate;
use crate::raster::Raster;
use crate::scene::document::SceneDocument;
use crate::scene::{AnnotationObject, ObjectId, Scene};
use crate::tool::Tool;
use image::RgbaImage;
use log::{debug, info};
use remap::PendingRemap;
use std::sync::Arc;

/// Extra slop around an object's bounds when hit testing, in canvas units.
const HIT_SLOP: f64 = 2.0;

/// Result of an undo or redo call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// Nothing to step to.
    Unchanged,
    /// The entry was restored in place (same raster).
    Restored,
    /// The entry's raster was swapped in; geometry lands when the host calls
    /// [`Editor::finish_remap`] with the ticket.
    AwaitingRemap(RemapTicket),
}

/// The annotation engine.
#[derive(Debug)]
pub struct Editor {
    pub(crate) options: EngineOptions,
    pub(crate) scene: Scene,
    pub(crate) history: History,
    pub(crate) state: GestureState,
    pub(crate) pending_remap: Option<PendingRemap>,
    pub(crate) generation: SceneGeneration,
    pub(crate) container: (f64, f64),
    pub(crate) current_tool: Tool,
    pub(crate) current_color: Color,
    pub(crate) current_stroke_width: f64,
    pub(crate) current_font_size: f64,
    pub(crate) needs_redraw: bool,
    pub(crate) transform_dirty: bool,
}

impl Editor {
    /// Opens a session over a decoded raster, fitted to the host container.
    pub fn open(
        options: EngineOptions,
        raster: Raster,
        container_width: f64,
        container_height: f64,
    ) -> Result<Self, EngineError> {
        if !(container_width > 0.0 && container_height > 0.0) {
            return Err(EngineError::InvalidContainer {
                width: container_width,
                height: container_height,
            });
        }

        let raster = Arc::new(raster);
        let layout = DisplayLayout::fit(raster.width(), raster.height(), container_width, container_height);
        let current_stroke_width = options.default_stroke_width;
        let current_font_size = options.default_font_size;

        let mut editor = Self {
            options,
            scene: Scene::new(raster, layout),
            history: History::new(),
            state: GestureState::Idle,
            pending_remap: None,
            generation: SceneGeneration(0),
            container: (container_width, container_height),
            current_tool: Tool::Select,
            current_color: color::RED,
            current_stroke_width,
            current_font_size,
            needs_redraw: true,
            transform_dirty: false,
        };

        // Baseline entry, so the first mutation is undoable.
        editor.commit();
        info!(
            "session opened: {}x{} raster at scale {:.3}",
            editor.scene.raster().width(),
            editor.scene.raster().height(),
            layout.scale
        );
        Ok(editor)
    }

    /// Opens a session from encoded image bytes.
    pub fn open_from_bytes(
        options: EngineOptions,
        bytes: &[u8],
        container_width: f64,
        container_height: f64,
    ) -> Result<Self, EngineError> {
        let raster = Raster::decode(bytes)?;
        Self::open(options, raster, container_width, container_height)
    }

    // ========================================================================
    // Scene access
    // ========================================================================

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Annotations bottom to top, for the host to paint.
    pub fn objects(&self) -> &[AnnotationObject] {
        self.scene.objects_in_z_order()
    }

    pub fn layout(&self) -> DisplayLayout {
        self.scene.layout()
    }

    pub fn raster(&self) -> &Arc<Raster> {
        self.scene.raster()
    }

    pub fn tool(&self) -> Tool {
        self.current_tool
    }

    pub fn stroke_color(&self) -> Color {
        self.current_color
    }

    pub fn stroke_width(&self) -> f64 {
        self.current_stroke_width
    }

    pub fn font_size(&self) -> f64 {
        self.current_font_size
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Returns whether a repaint is due and clears the flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    // ========================================================================
    // Tool and style selection
    // ========================================================================

    /// Selects the active tool. Returns `false` (and changes nothing) while
    /// a drawing or cropping gesture is in flight; a switch during a text
    /// edit finishes the edit first.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        match self.state {
            GestureState::Drawing { .. } | GestureState::Cropping { .. } => {
                debug!("tool switch to {} refused mid-gesture", tool.name());
                false
            }
            GestureState::EditingText { .. } => {
                // Cannot fail: this arm guarantees an active edit.
                let _ = self.finish_text_edit();
                self.current_tool = tool;
                self.needs_redraw = true;
                true
            }
            GestureState::Idle => {
                self.current_tool = tool;
                true
            }
        }
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.current_color = color;
    }

    /// Stroke width for new annotations, clamped to 1.0-20.0.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.current_stroke_width = width.clamp(1.0, 20.0);
    }

    /// Font size for new text annotations, clamped to 8.0-72.0.
    pub fn set_font_size(&mut self, size: f64) {
        self.current_font_size = size.clamp(8.0, 72.0);
    }

    // ========================================================================
    // Selection operations
    // ========================================================================

    /// Topmost selectable object whose padded bounds contain `point`.
    pub fn object_at(&self, point: CanvasPoint) -> Option<ObjectId> {
        self.scene
            .objects_in_z_order()
            .iter()
            .rev()
            .filter(|o| o.selectable)
            .find(|o| {
                o.bounding_box()
                    .map(|b| b.inflate(HIT_SLOP).contains(point))
                    .unwrap_or(false)
            })
            .map(|o| o.id)
    }

    /// Removes the named objects and commits, cancelling any in-flight
    /// gesture first. Returns how many were removed; zero removals leave no
    /// history entry.
    pub fn delete_objects(&mut self, ids: &[ObjectId]) -> Result<usize, EngineError> {
        self.ensure_no_pending_remap()?;
        self.abort_gesture();
        let removed = self.scene.remove_objects(ids);
        if removed > 0 {
            self.commit();
            self.needs_redraw = true;
            debug!("deleted {removed} objects");
        }
        Ok(removed)
    }

    /// Removes every annotation, cancelling any in-flight gesture first.
    pub fn clear_annotations(&mut self) -> Result<usize, EngineError> {
        self.ensure_no_pending_remap()?;
        self.abort_gesture();
        let removed = self.scene.take_objects().len();
        if removed > 0 {
            self.commit();
            self.needs_redraw = true;
            info!("cleared {removed} annotations");
        }
        Ok(removed)
    }

    /// Moves objects live during a select-drag. Commit the result with
    /// [`Editor::commit_transform`] once the gesture ends.
    pub fn translate_objects(&mut self, ids: &[ObjectId], dx: f64, dy: f64) -> Result<(), EngineError> {
        self.ensure_no_pending_remap()?;
        let raster = self.scene.raster().clone();
        let layout = self.scene.layout();
        let block = self.options.pixelate_block;

        let mut moved = false;
        for id in ids {
            if let Some(object) = self.scene.object_mut(*id) {
                object.kind.translate(dx, dy);
                pixelate::refresh_zone(object, &raster, layout, block);
                moved = true;
            }
        }
        if moved {
            self.transform_dirty = true;
            self.needs_redraw = true;
        }
        Ok(())
    }

    /// Commits the scene after a completed move gesture. Cancels any gesture
    /// still in flight before the snapshot; returns `false` when nothing
    /// moved since the last commit.
    pub fn commit_transform(&mut self) -> Result<bool, EngineError> {
        self.ensure_no_pending_remap()?;
        if !self.transform_dirty {
            return Ok(false);
        }
        self.abort_gesture();
        self.transform_dirty = false;
        self.commit();
        Ok(true)
    }

    // ========================================================================
    // Container
    // ========================================================================

    /// Applies a new container size: recomputes the layout for the unchanged
    /// raster and carries all geometry into the new canvas space. This is a
    /// view change, not a scene mutation; nothing is committed.
    pub fn set_container_size(&mut self, width: f64, height: f64) -> Result<(), EngineError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(EngineError::InvalidContainer { width, height });
        }
        self.ensure_no_pending_remap()?;
        self.abort_gesture();

        let old_layout = self.scene.layout();
        self.container = (width, height);
        let new_layout = DisplayLayout::fit(
            self.scene.raster().width(),
            self.scene.raster().height(),
            width,
            height,
        );
        if new_layout == old_layout {
            return Ok(());
        }

        let objects = crop::relayout_objects(self.scene.objects_in_z_order(), old_layout, new_layout);
        self.scene.set_layout(new_layout);
        self.scene.set_objects(objects);
        self.refresh_pixelate_zones();
        self.needs_redraw = true;
        debug!("container resized to {width:.0}x{height:.0}, scale {:.3}", new_layout.scale);
        Ok(())
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Steps back one committed state. Entries sharing the live raster are
    /// restored in place; entries with a different raster swap it and hand
    /// back a ticket for [`Editor::finish_remap`]. An unfinished swap is
    /// superseded, never stacked.
    pub fn undo(&mut self) -> HistoryOutcome {
        match self.history.undo() {
            Some(entry) => self.restore_entry(entry, "undo"),
            None => HistoryOutcome::Unchanged,
        }
    }

    /// Steps forward one committed state. Same contract as [`Editor::undo`].
    pub fn redo(&mut self) -> HistoryOutcome {
        match self.history.redo() {
            Some(entry) => self.restore_entry(entry, "redo"),
            None => HistoryOutcome::Unchanged,
        }
    }

    fn restore_entry(&mut self, entry: HistoryEntry, action: &str) -> HistoryOutcome {
        self.abort_gesture();
        if self.pending_remap.take().is_some() {
            debug!("{action} supersedes an unfinished remap");
        }

        let HistoryEntry { objects, raster, layout } = entry;

        if Arc::ptr_eq(&raster, self.scene.raster()) {
            let current_layout = self.scene.layout();
            let objects = if layout == current_layout {
                objects
            } else {
                // The container changed since this entry was recorded.
                crop::relayout_objects(&objects, layout, current_layout)
            };
            self.scene.set_objects(objects);
            self.refresh_pixelate_zones();
            self.needs_redraw = true;
            debug!("{action}: restored {} objects in place", self.scene.objects_in_z_order().len());
            HistoryOutcome::Restored
        } else {
            let new_layout = DisplayLayout::fit(
                raster.width(),
                raster.height(),
                self.container.0,
                self.container.1,
            );
            let objects = if layout == new_layout {
                objects
            } else {
                crop::relayout_objects(&objects, layout, new_layout)
            };
            let ticket = self.begin_remap(raster, new_layout, objects);
            debug!("{action}: raster swap awaiting remap (generation {})", ticket.generation.0);
            HistoryOutcome::AwaitingRemap(ticket)
        }
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Serializes the committed annotations as a versioned JSON document.
    /// Provisional mid-gesture objects are excluded.
    pub fn save_document(&self) -> Result<String, EngineError> {
        self.ensure_no_pending_remap()?;
        Ok(self.committed_document().to_json()?)
    }

    /// Serializes the committed annotations as gzip-compressed JSON.
    pub fn save_document_bytes(&self) -> Result<Vec<u8>, EngineError> {
        self.ensure_no_pending_remap()?;
        Ok(self.committed_document().to_gzip()?)
    }

    /// Replaces the annotations from a serialized document and commits.
    /// Malformed documents are refused without touching the scene.
    pub fn load_document(&mut self, raw: &str) -> Result<(), EngineError> {
        self.ensure_no_pending_remap()?;
        let document = SceneDocument::from_json(raw)?;
        self.install_document(document);
        Ok(())
    }

    /// Replaces the annotations from document bytes, inflating gzip when
    /// present. Same contract as [`Editor::load_document`].
    pub fn load_document_bytes(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        self.ensure_no_pending_remap()?;
        let document = SceneDocument::from_bytes(bytes)?;
        self.install_document(document);
        Ok(())
    }

    fn committed_document(&self) -> SceneDocument {
        let committed: Vec<AnnotationObject> = self
            .scene
            .objects_in_z_order()
            .iter()
            .filter(|o| o.selectable)
            .cloned()
            .collect();
        SceneDocument::new(committed)
    }

    fn install_document(&mut self, document: SceneDocument) {
        self.abort_gesture();
        let count = document.objects.len();
        self.scene.set_objects(document.objects);
        self.refresh_pixelate_zones();
        self.commit();
        self.needs_redraw = true;
        info!("document loaded: {count} annotations");
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Flattens the scene into one raster at native resolution.
    pub fn flatten(&self) -> Result<RgbaImage, EngineError> {
        self.ensure_no_pending_remap()?;
        Ok(export::flatten(&self.scene, &self.options))
    }

    /// Flattened scene as encoded PNG bytes.
    pub fn flatten_png(&self) -> Result<Vec<u8>, EngineError> {
        Ok(Raster::from_rgba(self.flatten()?)?.encode_png()?)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    pub(crate) fn ensure_no_pending_remap(&self) -> Result<(), EngineError> {
        if self.pending_remap.is_some() {
            Err(EngineError::RemapPending)
        } else {
            Ok(())
        }
    }

    /// Records the live scene as a new history entry.
    pub(crate) fn commit(&mut self) {
        debug_assert!(self.pending_remap.is_none());
        self.history.record(HistoryEntry {
            objects: self.scene.objects_in_z_order().to_vec(),
            raster: self.scene.raster().clone(),
            layout: self.scene.layout(),
        });
    }

    pub(crate) fn refresh_pixelate_zones(&mut self) {
        let raster = self.scene.raster().clone();
        let layout = self.scene.layout();
        pixelate::refresh_zones(self.scene.objects_mut(), &raster, layout, self.options.pixelate_block);
    }
}
