//! Sequential block construction and atomic commit.
//!
//! DESIGN
//! ======
//! `prepare` queues every block of a document in document order. `build`
//! drains the queue one block at a time: the factory call for block *i* is
//! awaited to completion before block *i+1* is dequeued, so at most one
//! construction is ever in flight. Built objects are collected off-canvas
//! and handed to `commit`, which swaps them into the canvas in a single
//! call and renders once. A partially built scene is never visible.
//!
//! ERROR HANDLING
//! ==============
//! A block whose construction fails is logged and skipped. The rest of the
//! queue still builds.

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::blocks::{BlockFactory, Placement};
use crate::bus::ErrorCode;
use crate::canvas::Canvas;
use crate::doc::{BlockId, BlockRecord, SceneDocument, SceneId};
use crate::transform::{Zoom, to_view_space};
use crate::visual::{BlockHandle, VisualNode, VisualObject};

/// A block waiting for construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBlock {
    pub block_id: BlockId,
    pub record: BlockRecord,
}

/// Result of draining the queue.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    /// Built objects in document order.
    pub objects: Vec<VisualObject>,
    /// Blocks skipped because construction failed.
    pub failed: Vec<BlockId>,
}

/// Queue of blocks awaiting construction.
#[derive(Debug, Default)]
pub struct ConstructionPipeline {
    queue: VecDeque<PendingBlock>,
    in_flight: Option<BlockId>,
}

impl ConstructionPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with every block of `document`, bottom first.
    pub fn prepare(&mut self, document: &SceneDocument) {
        self.queue = document
            .blocks
            .iter()
            .map(|record| PendingBlock { block_id: record.id, record: record.clone() })
            .collect();
        debug!(scene_id = %document.id, pending = self.queue.len(), "construction queued");
    }

    /// Number of blocks still queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Block currently being constructed.
    #[must_use]
    pub fn in_flight(&self) -> Option<BlockId> {
        self.in_flight
    }

    /// Drop everything still queued.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Construct every queued block, strictly one after another.
    pub async fn build(&mut self, factory: &dyn BlockFactory, scene_id: SceneId) -> BuildOutcome {
        let mut outcome = BuildOutcome::default();
        while let Some(pending) = self.queue.pop_front() {
            let block_id = pending.block_id;
            self.in_flight = Some(block_id);
            let result = factory.create_visual_object(block_id, &pending.record, Placement::Block, scene_id).await;
            self.in_flight = None;

            match result {
                Ok(handle) => match adopt(handle, &pending) {
                    Some(obj) => outcome.objects.push(obj),
                    None => outcome.failed.push(block_id),
                },
                Err(e) => {
                    warn!(%scene_id, %block_id, error = %e, code = e.error_code(), "block construction failed; skipping");
                    outcome.failed.push(block_id);
                }
            }
        }
        debug!(%scene_id, built = outcome.objects.len(), failed = outcome.failed.len(), "construction drained");
        outcome
    }

    /// Scale `objects` to the current zoom and swap them into the canvas in
    /// one step, then render once.
    pub fn commit(canvas: &mut Canvas, mut objects: Vec<VisualObject>, zoom: &Zoom) {
        for obj in &mut objects {
            zoom.apply_to(&mut obj.node);
            obj.node.normalize_scale();
        }
        canvas.commit(objects);
        canvas.render();
    }
}

/// Build the scene background object. Failures are logged and yield `None`.
pub async fn build_scene_block(factory: &dyn BlockFactory, document: &SceneDocument) -> Option<Box<dyn BlockHandle>> {
    let record = document.as_scene_record();
    match factory.create_visual_object(document.id, &record, Placement::Scene, document.id).await {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(scene_id = %document.id, error = %e, "scene background construction failed");
            None
        }
    }
}

fn adopt(mut handle: Box<dyn BlockHandle>, pending: &PendingBlock) -> Option<VisualObject> {
    let reported = handle.block_data().block_id;
    if reported != pending.block_id {
        warn!(block_id = %pending.block_id, %reported, "factory returned a handle for another block; skipping");
        handle.delete_block();
        return None;
    }
    let geometry = to_view_space(pending.record.layout, 1.0);
    let node = VisualNode::new(geometry.x, geometry.y, geometry.width, geometry.height, geometry.angle);
    Some(VisualObject::new(handle, node))
}
