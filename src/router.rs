//! Selection and mutation router: user gestures to document writes.
//!
//! Every gesture that changes a scene goes through one of the methods here.
//! Each one follows the same shape: resolve the target from the canvas,
//! convert its geometry with the coordinate transform, write the block
//! record into the working document and the store, then raise the matching
//! notification and history snapshot.
//!
//! Missing context (no scene, no selection, unknown block) is a silent
//! no-op.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use tracing::debug;

use crate::bus::{Notification, SelectTarget};
use crate::canvas::Canvas;
use crate::doc::{BlockId, SceneDocument};
use crate::session::{EditorError, SceneEditor};
use crate::transform::{ViewGeometry, to_document_space};
use crate::visual::VisualNode;
use crate::zorder;

/// View-space geometry of a node at an absolute position.
fn node_geometry(node: &VisualNode, x: f64, y: f64) -> ViewGeometry {
    ViewGeometry { x, y, width: node.current_width(), height: node.current_height(), angle: node.transform.angle }
}

impl SceneEditor {
    // --- Pointer ---

    /// The user released the pointer after a click, drag, resize, or
    /// rotate. `target` is the object under the pointer.
    pub(crate) fn pointer_released(&mut self, target: Option<BlockId>) -> Result<(), EditorError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };

        if let Some(group) = session.canvas.group() {
            let updates: Vec<(BlockId, ViewGeometry)> = group
                .members
                .iter()
                .filter_map(|id| {
                    let obj = session.canvas.object(id)?;
                    let x = group.left + obj.node.transform.left;
                    let y = group.top + obj.node.transform.top;
                    if x < 0.0 && y < 0.0 {
                        debug!(block_id = %id, x, y, "group member position rejected");
                        return None;
                    }
                    Some((*id, node_geometry(&obj.node, x, y)))
                })
                .collect();
            for (block_id, geometry) in updates {
                self.update_block_coords(block_id, true, geometry)?;
            }
            self.update_zorder()?;
            self.record_history()?;
            self.deps.sink.notify(Notification::PropertiesReset);
            if let Some(session) = self.session.as_mut() {
                session.canvas.render();
            }
            return Ok(());
        }

        let hit = target
            .or_else(|| session.canvas.active())
            .filter(|id| session.canvas.index_of(id).is_some());
        match hit {
            Some(block_id) => {
                if self.select_block(block_id)? {
                    self.deps.sink.notify(Notification::BlockChanged(Some(block_id)));
                }
                self.record_history()
            }
            None => {
                self.scene_canvas_selected();
                Ok(())
            }
        }
    }

    /// Make a block the active object, write its current geometry back to
    /// the document, and reconcile z-order. Returns whether the layout
    /// changed.
    pub(crate) fn select_block(&mut self, block_id: BlockId) -> Result<bool, EditorError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };
        if !session.canvas.set_active(&block_id) {
            return Ok(false);
        }
        session.selected = Some(block_id);
        let Some(obj) = session.canvas.object(&block_id) else {
            return Ok(false);
        };
        let geometry = node_geometry(&obj.node, obj.node.transform.left, obj.node.transform.top);
        let written = self.update_block_coords(block_id, true, geometry)?;
        self.deps.sink.notify(Notification::BlockSelected(block_id));
        self.update_zorder()?;
        Ok(written)
    }

    /// Select the scene background or a block by id.
    pub(crate) fn select_item(&mut self, target: SelectTarget) -> Result<(), EditorError> {
        match target {
            SelectTarget::Scene => {
                self.scene_canvas_selected();
                Ok(())
            }
            SelectTarget::Block(block_id) => {
                self.select_block(block_id)?;
                Ok(())
            }
        }
    }

    /// Cycle the active selection forward through the stacking order,
    /// wrapping from the top back to the bottom.
    pub(crate) fn select_next(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let canvas = &mut session.canvas;
        if canvas.is_empty() {
            return;
        }
        let next = match canvas.active().and_then(|id| canvas.index_of(&id)) {
            Some(index) if index + 1 < canvas.len() => index + 1,
            _ => 0,
        };
        let Some(block_id) = canvas.item(next).map(|o| o.block_id) else {
            return;
        };
        canvas.set_active(&block_id);
        session.selected = Some(block_id);
        self.deps.sink.notify(Notification::BlockSelected(block_id));
    }

    // --- Geometry ---

    /// Write a block's layout into the working document and the store.
    /// With `calc_scale` the geometry is in view space and is divided by
    /// the current zoom. Returns whether anything was written.
    pub(crate) fn update_block_coords(
        &mut self,
        block_id: BlockId,
        calc_scale: bool,
        geometry: ViewGeometry,
    ) -> Result<bool, EditorError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };
        let layout = to_document_space(self.zoom.scale, geometry, calc_scale);
        let Some(record) = session.document.block_mut(&block_id) else {
            return Ok(false);
        };
        if record.layout == layout {
            return Ok(false);
        }
        record.layout = layout;
        let record = record.clone();
        self.deps.store.set_document_fragment(session.scene_id, block_id, record)?;
        debug!(scene_id = %session.scene_id, %block_id, ?layout, "block layout written");
        Ok(true)
    }

    /// Numeric values from the property panel, applied to the active block.
    pub(crate) fn properties_edited(&mut self, geometry: ViewGeometry) -> Result<(), EditorError> {
        let Some(block_id) = self.session.as_ref().and_then(|s| s.canvas.active()) else {
            return Ok(());
        };
        self.update_block_coords(block_id, false, geometry)?;
        self.block_changed(Some(block_id))
    }

    /// Bake in-flight scale into the size of an object being manipulated.
    pub(crate) fn object_transformed(&mut self, block_id: BlockId) {
        let Some(obj) = self.session.as_mut().and_then(|s| s.canvas.object_mut(&block_id)) else {
            return;
        };
        obj.node.normalize_scale();
    }

    // --- Z-order ---

    /// Rewrite document order from the canvas stack and persist it if it
    /// changed. No-op while a group is active.
    pub(crate) fn update_zorder(&mut self) -> Result<(), EditorError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let before = session.document.block_ids();
        if !zorder::reconcile_from_visual(&session.canvas, &mut session.document) {
            return Ok(());
        }
        if session.document.block_ids() != before {
            self.deps.store.set_document(session.scene_id, session.document.clone())?;
        }
        Ok(())
    }

    pub(crate) fn push_to_front(&mut self) -> Result<(), EditorError> {
        self.restack(zorder::bring_to_front)
    }

    pub(crate) fn push_to_back(&mut self) -> Result<(), EditorError> {
        self.restack(zorder::send_to_back)
    }

    fn restack(&mut self, op: fn(&mut Canvas, &mut SceneDocument, &BlockId) -> bool) -> Result<(), EditorError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let Some(block_id) = session.canvas.active() else {
            return Ok(());
        };
        if !op(&mut session.canvas, &mut session.document, &block_id) {
            return Ok(());
        }
        self.deps.store.set_document(session.scene_id, session.document.clone())?;
        self.record_history()
    }

    // --- Add / remove ---

    /// Append a default block of `block_type` and rebuild.
    pub(crate) fn add_block(&mut self, block_type: &str, resource_id: Option<&str>) -> Result<(), EditorError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let block_id = self.deps.store.generate_block_id();
        let record = self.deps.factory.default_record(block_type, resource_id, block_id);
        self.deps.store.append_block(session.scene_id, record.clone())?;
        session.document.push_block(record);
        debug!(scene_id = %session.scene_id, %block_id, block_type, "block added");
        self.block_changed(Some(block_id))
    }

    /// Delete the active block and rebuild.
    pub(crate) fn remove_selected_block(&mut self) -> Result<(), EditorError> {
        self.deps.sink.notify(Notification::PropertiesReset);
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let Some(block_id) = session.canvas.active() else {
            return Ok(());
        };
        session.canvas.discard_active();
        self.deps.store.remove_block(session.scene_id, block_id)?;
        session.document.remove_block(&block_id);
        debug!(scene_id = %session.scene_id, %block_id, "block removed");
        self.block_changed(None)
    }
}
