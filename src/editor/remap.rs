//! Pending raster-swap remaps and the scene generation guard.
//!
//! Crop, and undo/redo across a crop boundary, replace the background
//! raster. The new raster's layout is computed immediately, but the remapped
//! geometry is parked until the host acknowledges the swap by calling
//! [`Editor::finish_remap`] with the ticket it was handed. Between those two
//! moments the scene has no objects and mutating operations are refused, so
//! stale canvas-space geometry can never be presented over the new raster.

use super::Editor;
use crate::geometry::DisplayLayout;
use crate::raster::Raster;
use crate::scene::AnnotationObject;
use log::{info, warn};
use std::sync::Arc;

/// Monotonic counter identifying the scene's raster epoch. Every raster swap
/// bumps it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SceneGeneration(pub(crate) u64);

impl SceneGeneration {
    pub(crate) fn next(self) -> SceneGeneration {
        SceneGeneration(self.0 + 1)
    }
}

/// Completion token for a pending remap, returned by every operation that
/// swaps the background raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemapTicket {
    pub(crate) generation: SceneGeneration,
}

/// Geometry held aside between a raster swap and the host's completion call.
#[derive(Debug)]
pub(crate) struct PendingRemap {
    pub(crate) generation: SceneGeneration,
    pub(crate) objects: Vec<AnnotationObject>,
}

impl Editor {
    /// Installs the geometry parked by the matching raster swap.
    ///
    /// Returns `true` when the completion applied. A ticket from a
    /// superseded swap (a newer crop, undo, or redo replaced it) or from an
    /// already-finished swap is ignored with a warning; stale completions
    /// never touch the scene.
    pub fn finish_remap(&mut self, ticket: RemapTicket) -> bool {
        match self.pending_remap.take() {
            Some(pending) if pending.generation == ticket.generation => {
                let count = pending.objects.len();
                self.scene.set_objects(pending.objects);
                self.refresh_pixelate_zones();
                self.needs_redraw = true;
                info!(
                    "remap finished: generation {}, {count} objects installed",
                    ticket.generation.0
                );
                true
            }
            Some(pending) => {
                warn!(
                    "stale remap completion for generation {} ignored (pending is {})",
                    ticket.generation.0, pending.generation.0
                );
                self.pending_remap = Some(pending);
                false
            }
            None => {
                warn!(
                    "remap completion for generation {} ignored: nothing pending",
                    ticket.generation.0
                );
                false
            }
        }
    }

    /// True while a raster swap awaits its completion call.
    pub fn is_remap_pending(&self) -> bool {
        self.pending_remap.is_some()
    }

    /// Ticket for the outstanding remap, if any.
    pub fn pending_ticket(&self) -> Option<RemapTicket> {
        self.pending_remap
            .as_ref()
            .map(|p| RemapTicket { generation: p.generation })
    }

    /// Swaps the raster in and parks `objects` until the host acknowledges
    /// the swap. Any previously pending remap is superseded.
    pub(crate) fn begin_remap(
        &mut self,
        raster: Arc<Raster>,
        layout: DisplayLayout,
        objects: Vec<AnnotationObject>,
    ) -> RemapTicket {
        self.generation = self.generation.next();
        self.scene.replace_background(raster, layout);
        self.scene.take_objects();
        self.pending_remap = Some(PendingRemap {
            generation: self.generation,
            objects,
        });
        self.needs_redraw = true;
        RemapTicket { generation: self.generation }
    }
}
