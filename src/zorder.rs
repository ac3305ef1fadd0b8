//! Z-order reconciliation between the canvas stack and document order.
//!
//! Both orders run bottom to top: index 0 of the canvas stack and of
//! `SceneDocument::blocks` is the lowest object. After any function here
//! returns `true`, `document.block_ids() == canvas.stack_order()` for every
//! block present on both sides.

#[cfg(test)]
#[path = "zorder_test.rs"]
mod zorder_test;

use tracing::debug;

use crate::canvas::Canvas;
use crate::doc::{BlockId, SceneDocument};

/// Raise a block to the top of the stack and mirror the change into the
/// document. Returns false if the block is not on the canvas.
pub fn bring_to_front(canvas: &mut Canvas, document: &mut SceneDocument, block_id: &BlockId) -> bool {
    if !canvas.bring_to_front(block_id) {
        return false;
    }
    document.reorder(&canvas.stack_order());
    debug!(%block_id, "brought to front");
    true
}

/// Lower a block to the bottom of the stack and mirror the change into the
/// document. Returns false if the block is not on the canvas.
pub fn send_to_back(canvas: &mut Canvas, document: &mut SceneDocument, block_id: &BlockId) -> bool {
    if !canvas.send_to_back(block_id) {
        return false;
    }
    document.reorder(&canvas.stack_order());
    debug!(%block_id, "sent to back");
    true
}

/// Rewrite document order from the current canvas stack. No-op while a
/// multi-object group is active.
pub fn reconcile_from_visual(canvas: &Canvas, document: &mut SceneDocument) -> bool {
    if canvas.group().is_some() {
        return false;
    }
    document.reorder(&canvas.stack_order());
    true
}
