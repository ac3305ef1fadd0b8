//! Retained canvas model: the visual stacking order, viewport, and selection.
//!
//! `Canvas` stands in for the rendering library's scene graph. It owns the
//! live `VisualObject`s in stacking order (index 0 is the bottom), the
//! viewport size, the single active object, and an optional multi-object
//! `ActiveGroup`. Drawing and hit-testing happen elsewhere; the host mutates
//! object geometry through [`Canvas::object_mut`] / [`Canvas::group_mut`]
//! while the user drags, and the editor reads it back on pointer release.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use tracing::debug;

use crate::doc::{BlockId, SceneId};
use crate::visual::{BlockHandle, VisualObject};

/// A multi-object selection. While a group is active its members'
/// positions are stored relative to the group's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveGroup {
    pub left: f64,
    pub top: f64,
    pub members: Vec<BlockId>,
}

/// Lightweight description of the live canvas, handed out with
/// render announcements.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasHandle {
    pub scene_id: SceneId,
    /// Render generation the handle was taken at.
    pub generation: u64,
    /// Block ids in stacking order, bottom first.
    pub stack: Vec<BlockId>,
    pub width: f64,
    pub height: f64,
}

/// Live visual canvas for one scene.
pub struct Canvas {
    scene_id: SceneId,
    width: f64,
    height: f64,
    objects: Vec<VisualObject>,
    active: Option<BlockId>,
    group: Option<ActiveGroup>,
    scene_block: Option<Box<dyn BlockHandle>>,
    commits: u64,
    generation: u64,
}

impl Canvas {
    /// Create an empty canvas with the given viewport size.
    #[must_use]
    pub fn new(scene_id: SceneId, width: f64, height: f64) -> Self {
        Self {
            scene_id,
            width,
            height,
            objects: Vec::new(),
            active: None,
            group: None,
            scene_block: None,
            commits: 0,
            generation: 0,
        }
    }

    #[must_use]
    pub fn scene_id(&self) -> SceneId {
        self.scene_id
    }

    /// Attach the scene background block. Any previous one is deleted.
    pub fn set_scene_block(&mut self, handle: Box<dyn BlockHandle>) {
        if let Some(mut previous) = self.scene_block.replace(handle) {
            previous.delete_block();
        }
    }

    // --- Viewport ---

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Multiply the viewport dimensions by `factor`.
    pub fn scale_viewport(&mut self, factor: f64) {
        self.width *= factor;
        self.height *= factor;
    }

    // --- Objects ---

    /// Live objects in stacking order, bottom first.
    #[must_use]
    pub fn objects(&self) -> &[VisualObject] {
        &self.objects
    }

    /// Mutable access to every live object.
    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut VisualObject> {
        self.objects.iter_mut()
    }

    /// Block ids in stacking order, bottom first.
    #[must_use]
    pub fn stack_order(&self) -> Vec<BlockId> {
        self.objects.iter().map(|o| o.block_id).collect()
    }

    #[must_use]
    pub fn object(&self, id: &BlockId) -> Option<&VisualObject> {
        self.objects.iter().find(|o| o.block_id == *id)
    }

    pub fn object_mut(&mut self, id: &BlockId) -> Option<&mut VisualObject> {
        self.objects.iter_mut().find(|o| o.block_id == *id)
    }

    /// Stacking index of an object.
    #[must_use]
    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.objects.iter().position(|o| o.block_id == *id)
    }

    /// Object at a stacking index.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&VisualObject> {
        self.objects.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Swap in a freshly built object set in one step. The previous objects
    /// are disposed and the selection is cleared.
    pub fn commit(&mut self, objects: Vec<VisualObject>) {
        self.active = None;
        self.group = None;
        self.dispose_objects();
        self.objects = objects;
        self.commits += 1;
        debug!(scene_id = %self.scene_id, count = self.objects.len(), commit = self.commits, "canvas commit");
    }

    /// Number of commits performed since creation.
    #[must_use]
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Mark the canvas as redrawn.
    pub fn render(&mut self) {
        self.generation += 1;
    }

    /// Render generation counter.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Snapshot handle for announcements.
    #[must_use]
    pub fn handle(&self) -> CanvasHandle {
        CanvasHandle {
            scene_id: self.scene_id,
            generation: self.generation,
            stack: self.stack_order(),
            width: self.width,
            height: self.height,
        }
    }

    // --- Stacking ---

    /// Move an object to the top of the stack.
    pub fn bring_to_front(&mut self, id: &BlockId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let obj = self.objects.remove(index);
        self.objects.push(obj);
        true
    }

    /// Move an object to the bottom of the stack.
    pub fn send_to_back(&mut self, id: &BlockId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let obj = self.objects.remove(index);
        self.objects.insert(0, obj);
        true
    }

    // --- Selection ---

    /// The active single object, if any.
    #[must_use]
    pub fn active(&self) -> Option<BlockId> {
        self.active
    }

    /// Make an object the active selection. Returns false if the object is
    /// not on the canvas.
    pub fn set_active(&mut self, id: &BlockId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        self.active = Some(*id);
        true
    }

    pub fn discard_active(&mut self) {
        self.active = None;
    }

    /// The active multi-object group, if any.
    #[must_use]
    pub fn group(&self) -> Option<&ActiveGroup> {
        self.group.as_ref()
    }

    pub fn group_mut(&mut self) -> Option<&mut ActiveGroup> {
        self.group.as_mut()
    }

    /// Group the given objects at the group origin `(left, top)`. Member
    /// positions become relative to the origin. Ids not on the canvas are
    /// dropped; an empty group is not created. Any previous group is
    /// dissolved first.
    pub fn set_group(&mut self, left: f64, top: f64, members: &[BlockId]) -> bool {
        self.discard_group();
        let members: Vec<BlockId> = members
            .iter()
            .filter(|id| self.index_of(id).is_some())
            .copied()
            .collect();
        if members.is_empty() {
            return false;
        }
        for id in &members {
            if let Some(obj) = self.object_mut(id) {
                obj.node.transform.left -= left;
                obj.node.transform.top -= top;
                obj.node.set_coords();
            }
        }
        self.active = None;
        self.group = Some(ActiveGroup { left, top, members });
        true
    }

    /// Dissolve the active group, restoring absolute member positions.
    pub fn discard_group(&mut self) {
        let Some(group) = self.group.take() else {
            return;
        };
        for id in &group.members {
            if let Some(obj) = self.object_mut(id) {
                obj.node.transform.left += group.left;
                obj.node.transform.top += group.top;
                obj.node.set_coords();
            }
        }
    }

    // --- Teardown ---

    fn dispose_objects(&mut self) {
        for obj in self.objects.drain(..) {
            obj.dispose();
        }
    }

    /// Tear down every object and the scene block.
    pub fn dispose(mut self) {
        self.group = None;
        self.active = None;
        self.dispose_objects();
        if let Some(mut scene_block) = self.scene_block.take() {
            scene_block.delete_block();
        }
        debug!(scene_id = %self.scene_id, "canvas disposed");
    }
}
