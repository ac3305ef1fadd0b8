//! Document model: scene documents, block records, and their layouts.
//!
//! This module defines the canonical persisted state of one scene
//! (`SceneDocument`), the placed elements inside it (`BlockRecord`), and the
//! unscaled document-space geometry they carry (`BlockLayout`).
//!
//! Block order inside `SceneDocument::blocks` is the authoritative z-order:
//! index 0 is the bottom of the visual stack and the last block renders on
//! top. Layout values are always document units; view-space scaling never
//! reaches this layer.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scene.
pub type SceneId = Uuid;

/// Unique identifier for a block within a scene.
pub type BlockId = Uuid;

/// Block type used for the scene's own background record.
pub const SCENE_BLOCK_TYPE: &str = "scene";

/// Unscaled position, size, and rotation of a block in document units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockLayout {
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Width.
    pub width: i64,
    /// Height.
    pub height: i64,
    /// Clockwise rotation in whole degrees.
    pub rotation: i64,
}

/// One placed element of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    /// Stable identifier assigned by the store.
    pub id: BlockId,
    /// Discriminator consumed by the block factory.
    #[serde(rename = "type")]
    pub block_type: String,
    /// Document-space geometry.
    pub layout: BlockLayout,
    /// Opaque type-specific data.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Scene-level canvas dimensions in document units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneLayout {
    pub width: i64,
    pub height: i64,
}

/// Canonical persisted state of one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Scene identifier. Overwritten by the store on creation.
    pub id: SceneId,
    /// Human-readable scene name.
    #[serde(default)]
    pub name: String,
    /// Canvas dimensions.
    pub layout: SceneLayout,
    /// Placed blocks, bottom of the stack first.
    #[serde(default)]
    pub blocks: Vec<BlockRecord>,
}

impl SceneDocument {
    /// Create an empty scene document.
    #[must_use]
    pub fn new(id: SceneId, name: impl Into<String>, width: i64, height: i64) -> Self {
        Self { id, name: name.into(), layout: SceneLayout { width, height }, blocks: Vec::new() }
    }

    /// Return a reference to a block by id.
    #[must_use]
    pub fn block(&self, id: &BlockId) -> Option<&BlockRecord> {
        self.blocks.iter().find(|b| b.id == *id)
    }

    /// Return a mutable reference to a block by id.
    pub fn block_mut(&mut self, id: &BlockId) -> Option<&mut BlockRecord> {
        self.blocks.iter_mut().find(|b| b.id == *id)
    }

    /// Index of a block within the document order.
    #[must_use]
    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == *id)
    }

    /// Block ids in document order.
    #[must_use]
    pub fn block_ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(|b| b.id).collect()
    }

    /// Append a block on top of the stack. Returns false (and leaves the
    /// document unchanged) if a block with the same id already exists.
    pub fn push_block(&mut self, record: BlockRecord) -> bool {
        if self.position(&record.id).is_some() {
            return false;
        }
        self.blocks.push(record);
        true
    }

    /// Replace an existing block in place, keeping its position. Returns
    /// false if no block has that id.
    pub fn replace_block(&mut self, record: BlockRecord) -> bool {
        let Some(slot) = self.block_mut(&record.id) else {
            return false;
        };
        *slot = record;
        true
    }

    /// Remove a block by id, returning it if it was present.
    pub fn remove_block(&mut self, id: &BlockId) -> Option<BlockRecord> {
        let index = self.position(id)?;
        Some(self.blocks.remove(index))
    }

    /// Rewrite the block sequence to follow `order`.
    ///
    /// Each listed id is removed from its current slot and reinserted at the
    /// index it occupies in `order`. Ids in `order` that are not in the
    /// document are ignored; blocks not named in `order` keep their relative
    /// order after the named ones.
    pub fn reorder(&mut self, order: &[BlockId]) {
        let previous: Vec<BlockId> = self.block_ids();
        let mut by_id: HashMap<BlockId, BlockRecord> = self.blocks.drain(..).map(|b| (b.id, b)).collect();
        let mut reordered = Vec::with_capacity(by_id.len());

        for id in order.iter().chain(previous.iter()) {
            if let Some(record) = by_id.remove(id) {
                reordered.push(record);
            }
        }
        self.blocks = reordered;
    }

    /// Serialize to the snapshot form used by history.
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error if the payload cannot be encoded.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a snapshot produced by [`SceneDocument::to_snapshot`].
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error for malformed snapshots.
    pub fn from_snapshot(snapshot: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(snapshot)
    }

    /// A record describing the scene itself, handed to the block factory
    /// when building the scene background.
    #[must_use]
    pub fn as_scene_record(&self) -> BlockRecord {
        BlockRecord {
            id: self.id,
            block_type: SCENE_BLOCK_TYPE.to_owned(),
            layout: BlockLayout { x: 0, y: 0, width: self.layout.width, height: self.layout.height, rotation: 0 },
            payload: serde_json::json!({ "name": self.name }),
        }
    }

    /// Number of blocks in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the scene has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
