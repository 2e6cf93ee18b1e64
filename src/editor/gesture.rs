//! Pointer gesture state machine.

use super::{Editor, remap::RemapTicket};
use crate::crop;
use crate::error::EngineError;
use crate::geometry::{CanvasPoint, CanvasRect};
use crate::history::HistoryEntry;
use crate::pixelate;
use crate::scene::{ObjectId, ObjectKind};
use crate::tool::Tool;
use crate::util;
use log::{debug, info, warn};

/// Gesture phase of the tool state machine.
///
/// `Cropping` holds overlay state only: the pending rectangle is never an
/// object in the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    /// Tool armed, no gesture in progress.
    Idle,
    /// Pointer held down, a provisional object under construction.
    Drawing {
        tool: Tool,
        anchor: CanvasPoint,
        object: ObjectId,
    },
    /// Inline text edit in progress.
    EditingText { object: ObjectId },
    /// Crop rectangle being dragged out, or pending apply/cancel after
    /// release.
    Cropping {
        anchor: CanvasPoint,
        rect: CanvasRect,
        dragging: bool,
    },
}

/// Result of an [`Editor::apply_crop`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropOutcome {
    /// Raster swapped; geometry lands when the host finishes the remap.
    Applied(RemapTicket),
    /// Region was under the minimum extent or missed the raster. The gesture
    /// was cancelled: no history entry, no scene change.
    Rejected,
}

impl Editor {
    /// Begins a gesture at `point` with the current tool.
    ///
    /// A press during a text edit finishes the edit first and is then
    /// handled normally. Refused while a raster remap is pending.
    pub fn pointer_down(&mut self, point: CanvasPoint) -> Result<(), EngineError> {
        self.ensure_no_pending_remap()?;

        if matches!(self.state, GestureState::EditingText { .. }) {
            self.finish_text_edit()?;
        }

        match self.state {
            GestureState::Idle => {}
            GestureState::Cropping { .. } => {
                // A fresh press while a crop rectangle is pending re-anchors it.
                self.state = GestureState::Cropping {
                    anchor: point,
                    rect: CanvasRect::from_corners(point, point),
                    dragging: true,
                };
                self.needs_redraw = true;
                return Ok(());
            }
            GestureState::Drawing { .. } => {
                warn!("pointer down ignored: a drawing gesture is already active");
                return Ok(());
            }
            // Unreachable: the edit was finished above.
            GestureState::EditingText { .. } => return Ok(()),
        }

        match self.current_tool {
            Tool::Select => {
                // Selection presses are the host's business (hit tests and
                // transforms go through explicit calls).
            }
            Tool::Crop => {
                self.state = GestureState::Cropping {
                    anchor: point,
                    rect: CanvasRect::from_corners(point, point),
                    dragging: true,
                };
                debug!("crop gesture started at ({:.1}, {:.1})", point.x, point.y);
                self.needs_redraw = true;
            }
            Tool::Text => {
                if self.at_object_limit() {
                    return Ok(());
                }
                self.begin_text_edit(point);
            }
            tool => {
                if self.at_object_limit() {
                    return Ok(());
                }
                let Some(kind) = self.provisional_kind(tool, point) else {
                    return Ok(());
                };
                let object = self.scene.add_object(kind, false);
                self.state = GestureState::Drawing { tool, anchor: point, object };
                debug!("{} gesture started ({object})", tool.name());
                self.needs_redraw = true;
            }
        }

        Ok(())
    }

    /// Updates the active gesture with a new pointer position. Ignored when
    /// no gesture is in flight.
    pub fn pointer_move(&mut self, point: CanvasPoint) {
        let (tool, anchor, object) = match self.state {
            GestureState::Drawing { tool, anchor, object } => (tool, anchor, object),
            GestureState::Cropping { anchor, dragging: true, .. } => {
                self.state = GestureState::Cropping {
                    anchor,
                    rect: CanvasRect::from_corners(anchor, point),
                    dragging: true,
                };
                self.needs_redraw = true;
                return;
            }
            _ => return,
        };

        match tool {
            Tool::Arrow => {
                if let Some(obj) = self.scene.object_mut(object) {
                    if let ObjectKind::Arrow { end, .. } = &mut obj.kind {
                        *end = point;
                    }
                }
            }
            Tool::Rect => {
                if let Some(obj) = self.scene.object_mut(object) {
                    if let ObjectKind::Rect { rect, .. } = &mut obj.kind {
                        *rect = CanvasRect::from_corners(anchor, point);
                    }
                }
            }
            Tool::Ellipse => {
                let (center, radius_x, radius_y) = util::ellipse_from_corners(anchor, point);
                if let Some(obj) = self.scene.object_mut(object) {
                    if let ObjectKind::Ellipse { center: c, radius_x: rx, radius_y: ry, .. } =
                        &mut obj.kind
                    {
                        *c = center;
                        *rx = radius_x;
                        *ry = radius_y;
                    }
                }
            }
            Tool::Freehand => {
                let spacing = self.options.freehand_spacing;
                if let Some(obj) = self.scene.object_mut(object) {
                    if let ObjectKind::Freehand { points, .. } = &mut obj.kind {
                        let far_enough = points
                            .last()
                            .map(|last| last.distance_to(point) >= spacing)
                            .unwrap_or(true);
                        if far_enough {
                            points.push(point);
                        }
                    }
                }
            }
            Tool::Pixelate => {
                let raster = self.scene.raster().clone();
                let layout = self.scene.layout();
                let block = self.options.pixelate_block;
                if let Some(obj) = self.scene.object_mut(object) {
                    if let ObjectKind::Pixelate { rect, .. } = &mut obj.kind {
                        *rect = CanvasRect::from_corners(anchor, point);
                    }
                    pixelate::refresh_zone(obj, &raster, layout, block);
                }
            }
            _ => {}
        }
        self.needs_redraw = true;
    }

    /// Ends the active drawing gesture. Returns the committed object's id,
    /// or `None` when the result was degenerate and discarded. Releasing a
    /// crop drag leaves its rectangle pending apply/cancel.
    pub fn pointer_up(&mut self, point: CanvasPoint) -> Option<ObjectId> {
        let (tool, object) = match self.state {
            GestureState::Drawing { tool, object, .. } => (tool, object),
            GestureState::Cropping { anchor, rect, dragging: true } => {
                self.state = GestureState::Cropping { anchor, rect, dragging: false };
                debug!("crop rectangle pending: {:.1}x{:.1}", rect.width, rect.height);
                return None;
            }
            _ => return None,
        };

        self.pointer_move(point);
        self.state = GestureState::Idle;

        let degenerate = self
            .scene
            .object(object)
            .map(|o| {
                let (w, h) = o.kind.extent();
                w < self.options.min_shape_extent && h < self.options.min_shape_extent
            })
            .unwrap_or(true);

        if degenerate {
            self.scene.remove_objects(&[object]);
            self.needs_redraw = true;
            debug!("{} gesture discarded: degenerate extent", tool.name());
            return None;
        }

        if let Some(obj) = self.scene.object_mut(object) {
            obj.selectable = true;
        }
        self.commit();
        self.needs_redraw = true;
        info!("{} committed ({object})", tool.name());
        Some(object)
    }

    /// Applies the pending crop rectangle.
    ///
    /// A region under the minimum extent, or one that misses the raster,
    /// cancels the gesture: no history entry, no scene change. Otherwise the
    /// raster is replaced, the post-crop state is committed, and the
    /// returned ticket completes the geometry swap via
    /// [`Editor::finish_remap`].
    pub fn apply_crop(&mut self) -> Result<CropOutcome, EngineError> {
        let rect = match self.state {
            GestureState::Cropping { rect, .. } => rect,
            _ => return Err(EngineError::NoActiveCrop),
        };

        self.state = GestureState::Idle;
        self.needs_redraw = true;

        if rect.width < self.options.min_crop_extent || rect.height < self.options.min_crop_extent {
            debug!(
                "crop cancelled: region {:.1}x{:.1} under minimum {:.1}",
                rect.width, rect.height, self.options.min_crop_extent
            );
            return Ok(CropOutcome::Rejected);
        }

        let plan = match crop::plan_crop(
            rect,
            self.scene.raster(),
            self.scene.layout(),
            self.scene.objects_in_z_order(),
            self.container.0,
            self.container.1,
        ) {
            Some(plan) => plan,
            None => {
                debug!("crop cancelled: region misses the raster");
                return Ok(CropOutcome::Rejected);
            }
        };

        // The post-crop state becomes the committed tip; the previous tail
        // already holds the pre-crop raster and geometry for undo.
        self.history.record(HistoryEntry {
            objects: plan.objects.clone(),
            raster: plan.raster.clone(),
            layout: plan.layout,
        });
        let ticket = self.begin_remap(plan.raster, plan.layout, plan.objects);
        info!(
            "crop applied: raster now {}x{} px (generation {})",
            self.scene.raster().width(),
            self.scene.raster().height(),
            ticket.generation.0
        );
        Ok(CropOutcome::Applied(ticket))
    }

    /// Discards the pending crop rectangle.
    pub fn cancel_crop(&mut self) -> Result<(), EngineError> {
        match self.state {
            GestureState::Cropping { .. } => {
                self.state = GestureState::Idle;
                self.needs_redraw = true;
                debug!("crop cancelled");
                Ok(())
            }
            _ => Err(EngineError::NoActiveCrop),
        }
    }

    /// The crop overlay rectangle, when one is being dragged or pending.
    pub fn pending_crop_rect(&self) -> Option<CanvasRect> {
        match self.state {
            GestureState::Cropping { rect, .. } => Some(rect),
            _ => None,
        }
    }

    /// Current gesture phase, for host overlay painting.
    pub fn gesture(&self) -> &GestureState {
        &self.state
    }

    /// Cancels whatever gesture is active, discarding provisional state.
    pub(crate) fn abort_gesture(&mut self) {
        match self.state {
            GestureState::Idle => {}
            GestureState::Drawing { object, .. } => {
                self.scene.remove_objects(&[object]);
                self.state = GestureState::Idle;
                self.needs_redraw = true;
                debug!("drawing gesture aborted");
            }
            GestureState::EditingText { .. } => {
                // Cannot fail: this arm guarantees an active edit.
                let _ = self.cancel_text_edit();
            }
            GestureState::Cropping { .. } => {
                self.state = GestureState::Idle;
                self.needs_redraw = true;
                debug!("crop gesture aborted");
            }
        }
    }

    fn provisional_kind(&self, tool: Tool, point: CanvasPoint) -> Option<ObjectKind> {
        match tool {
            Tool::Arrow => Some(ObjectKind::Arrow {
                start: point,
                end: point,
                color: self.current_color,
                stroke_width: self.current_stroke_width,
                head_length: self.options.arrow_length,
                head_angle: self.options.arrow_angle,
            }),
            Tool::Rect => Some(ObjectKind::Rect {
                rect: CanvasRect::from_corners(point, point),
                color: self.current_color,
                stroke_width: self.current_stroke_width,
            }),
            Tool::Ellipse => Some(ObjectKind::Ellipse {
                center: point,
                radius_x: 0.0,
                radius_y: 0.0,
                color: self.current_color,
                stroke_width: self.current_stroke_width,
            }),
            Tool::Freehand => Some(ObjectKind::Freehand {
                points: vec![point],
                color: self.current_color,
                stroke_width: self.current_stroke_width,
            }),
            Tool::Pixelate => Some(ObjectKind::Pixelate {
                rect: CanvasRect::from_corners(point, point),
                patch: None,
            }),
            Tool::Select | Tool::Text | Tool::Crop => None,
        }
    }

    fn at_object_limit(&self) -> bool {
        let limit = self.options.max_objects;
        if limit > 0 && self.scene.objects_in_z_order().len() >= limit {
            warn!("annotation limit ({limit}) reached; gesture ignored");
            true
        } else {
            false
        }
    }
}
