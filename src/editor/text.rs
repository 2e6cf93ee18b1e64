//! Inline text editing.
//!
//! Text annotations skip the drawing phase: the press creates the object and
//! editing starts immediately. The active tool reverts to select when the
//! edit completes, so the next press manipulates instead of creating.

use super::{Editor, GestureState};
use crate::error::EngineError;
use crate::geometry::CanvasPoint;
use crate::scene::{ObjectId, ObjectKind};
use crate::tool::Tool;
use log::{debug, info};

impl Editor {
    pub(crate) fn begin_text_edit(&mut self, point: CanvasPoint) {
        let kind = ObjectKind::Text {
            origin: point,
            text: String::new(),
            color: self.current_color,
            font_size: self.current_font_size,
        };
        let object = self.scene.add_object(kind, false);
        self.state = GestureState::EditingText { object };
        self.needs_redraw = true;
        debug!("text edit started ({object})");
    }

    /// Appends a character to the text being edited.
    pub fn text_input(&mut self, c: char) -> Result<(), EngineError> {
        let object = self.editing_text_id()?;
        if let Some(obj) = self.scene.object_mut(object) {
            if let ObjectKind::Text { text, .. } = &mut obj.kind {
                text.push(c);
            }
        }
        self.needs_redraw = true;
        Ok(())
    }

    /// Removes the last character of the text being edited.
    pub fn text_backspace(&mut self) -> Result<(), EngineError> {
        let object = self.editing_text_id()?;
        if let Some(obj) = self.scene.object_mut(object) {
            if let ObjectKind::Text { text, .. } = &mut obj.kind {
                text.pop();
            }
        }
        self.needs_redraw = true;
        Ok(())
    }

    /// Completes the edit. Empty text removes the annotation without a
    /// commit; otherwise the object becomes selectable and is committed.
    /// Either way the active tool reverts to select.
    pub fn finish_text_edit(&mut self) -> Result<Option<ObjectId>, EngineError> {
        let object = self.editing_text_id()?;
        self.state = GestureState::Idle;
        self.current_tool = Tool::Select;
        self.needs_redraw = true;

        let empty = self
            .scene
            .object(object)
            .map(|o| match &o.kind {
                ObjectKind::Text { text, .. } => text.is_empty(),
                _ => true,
            })
            .unwrap_or(true);

        if empty {
            self.scene.remove_objects(&[object]);
            debug!("text edit finished empty; annotation discarded");
            return Ok(None);
        }

        if let Some(obj) = self.scene.object_mut(object) {
            obj.selectable = true;
        }
        self.commit();
        info!("text committed ({object})");
        Ok(Some(object))
    }

    /// Abandons the edit, removing the annotation. No history entry.
    pub fn cancel_text_edit(&mut self) -> Result<(), EngineError> {
        let object = self.editing_text_id()?;
        self.state = GestureState::Idle;
        self.current_tool = Tool::Select;
        self.scene.remove_objects(&[object]);
        self.needs_redraw = true;
        debug!("text edit cancelled");
        Ok(())
    }

    fn editing_text_id(&self) -> Result<ObjectId, EngineError> {
        match self.state {
            GestureState::EditingText { object } => Ok(object),
            _ => Err(EngineError::NoTextEditing),
        }
    }
}
