//! Linear snapshot history.

use crate::geometry::DisplayLayout;
use crate::raster::Raster;
use crate::scene::AnnotationObject;
use log::debug;
use std::sync::Arc;

/// Immutable value snapshot of one committed scene state.
///
/// The raster rides along by reference: entries either side of a crop share
/// raster allocations instead of copying pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub objects: Vec<AnnotationObject>,
    pub raster: Arc<Raster>,
    pub layout: DisplayLayout,
}

/// Ordered snapshots plus a cursor at the entry the live scene mirrors.
///
/// The first entry is the session baseline and is never stepped past; undo
/// at the baseline is a no-op.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// Appends a snapshot, discarding any redo tail past the cursor.
    pub fn record(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() && self.cursor + 1 < self.entries.len() {
            let dropped = self.entries.len() - self.cursor - 1;
            self.entries.truncate(self.cursor + 1);
            debug!("discarded {dropped} redo entries");
        }
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    /// Steps the cursor back and returns a copy of that entry.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Steps the cursor forward and returns a copy of that entry.
    pub fn redo(&mut self) -> Option<HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor + 1 < self.entries.len()
    }

    /// The entry the live scene mirrors, absent only before the baseline is
    /// recorded.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn entry(tag: u64) -> HistoryEntry {
        let raster = Arc::new(Raster::from_rgba(RgbaImage::new(10, 10)).unwrap());
        let layout = DisplayLayout::fit(10, 10, 10.0, 10.0);
        HistoryEntry {
            objects: vec![AnnotationObject {
                id: crate::scene::ObjectId(tag),
                selectable: true,
                kind: crate::scene::ObjectKind::Text {
                    origin: crate::geometry::CanvasPoint::new(0.0, 0.0),
                    text: format!("entry {tag}"),
                    color: crate::color::RED,
                    font_size: 24.0,
                },
            }],
            raster,
            layout,
        }
    }

    fn tag_of(entry: &HistoryEntry) -> u64 {
        match &entry.objects[0].kind {
            crate::scene::ObjectKind::Text { text, .. } => {
                text.strip_prefix("entry ").unwrap().parse().unwrap()
            }
            _ => panic!("text expected"),
        }
    }

    #[test]
    fn undo_walks_back_to_the_baseline_and_stops() {
        let mut history = History::new();
        history.record(entry(0));
        history.record(entry(1));
        history.record(entry(2));

        assert_eq!(tag_of(&history.undo().unwrap()), 1);
        assert_eq!(tag_of(&history.undo().unwrap()), 0);
        assert!(history.undo().is_none());
        assert!(!history.can_undo());
    }

    #[test]
    fn redo_walks_forward_to_the_tip_and_stops() {
        let mut history = History::new();
        history.record(entry(0));
        history.record(entry(1));
        let _ = history.undo();

        assert_eq!(tag_of(&history.redo().unwrap()), 1);
        assert!(history.redo().is_none());
        assert!(!history.can_redo());
    }

    #[test]
    fn recording_truncates_the_redo_tail() {
        let mut history = History::new();
        history.record(entry(0));
        history.record(entry(1));
        history.record(entry(2));
        let _ = history.undo();
        let _ = history.undo();
        assert!(history.can_redo());

        history.record(entry(9));
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(tag_of(history.current().unwrap()), 9);
        assert_eq!(tag_of(&history.undo().unwrap()), 0);
    }

    #[test]
    fn empty_history_has_nothing_to_step() {
        let mut history = History::new();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(history.current().is_none());
        assert!(history.is_empty());
    }
}
