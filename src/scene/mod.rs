//! Scene model: the background raster plus the ordered annotation list.
//!
//! The scene is the single source of truth for what is drawn. Hosts read it
//! through [`crate::editor::Editor`] accessors and mutate it only through
//! editor operations. Z-order equals insertion order and nothing reorders it.

pub mod document;
pub mod object;

// Re-export the object model at the module root.
#[allow(unused_imports)]
pub use object::{AnnotationObject, ObjectId, ObjectKind};

use crate::geometry::DisplayLayout;
use crate::raster::Raster;
use std::sync::Arc;

/// Background raster, its display layout, and the ordered object list.
#[derive(Clone, Debug)]
pub struct Scene {
    raster: Arc<Raster>,
    layout: DisplayLayout,
    objects: Vec<AnnotationObject>,
    next_id: u64,
}

impl Scene {
    pub(crate) fn new(raster: Arc<Raster>, layout: DisplayLayout) -> Self {
        Self {
            raster,
            layout,
            objects: Vec::new(),
            next_id: 1,
        }
    }

    pub fn raster(&self) -> &Arc<Raster> {
        &self.raster
    }

    pub fn layout(&self) -> DisplayLayout {
        self.layout
    }

    /// Objects bottom to top. Insertion order is z-order.
    pub fn objects_in_z_order(&self) -> &[AnnotationObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&AnnotationObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut AnnotationObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub(crate) fn objects_mut(&mut self) -> &mut [AnnotationObject] {
        &mut self.objects
    }

    /// Inserts a new object on top and returns its id.
    pub(crate) fn add_object(&mut self, kind: ObjectKind, selectable: bool) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(AnnotationObject { id, selectable, kind });
        id
    }

    /// Removes the named objects, preserving the order of the rest. Returns
    /// how many were removed.
    pub(crate) fn remove_objects(&mut self, ids: &[ObjectId]) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !ids.contains(&o.id));
        before - self.objects.len()
    }

    /// Swaps in a new background. Callers own clearing or remapping the
    /// object list; stale canvas-space geometry must never survive a swap.
    pub(crate) fn replace_background(&mut self, raster: Arc<Raster>, layout: DisplayLayout) {
        self.raster = raster;
        self.layout = layout;
    }

    pub(crate) fn set_layout(&mut self, layout: DisplayLayout) {
        self.layout = layout;
    }

    /// Replaces the object list wholesale (history restore, remap completion,
    /// document load). Keeps id allocation ahead of everything installed.
    pub(crate) fn set_objects(&mut self, objects: Vec<AnnotationObject>) {
        let max_id = objects.iter().map(|o| o.id.0).max().unwrap_or(0);
        if max_id >= self.next_id {
            self.next_id = max_id + 1;
        }
        self.objects = objects;
    }

    /// Takes the object list, leaving the scene empty.
    pub(crate) fn take_objects(&mut self) -> Vec<AnnotationObject> {
        std::mem::take(&mut self.objects)
    }
}
