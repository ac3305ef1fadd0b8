//! Block-type factory interface and a generic placeholder implementation.
//!
//! The editor never knows how an RSS feed or an image is drawn. It hands a
//! block record to a [`BlockFactory`] and receives a disposable
//! [`BlockHandle`] back. Construction is asynchronous because real block
//! types may need to load vector artwork before they can report a shape.
//!
//! ERROR HANDLING
//! ==============
//! A factory returns [`ConstructError`] for records it cannot build. The
//! construction pipeline logs and skips such blocks; nothing here aborts a
//! scene.

#[cfg(test)]
#[path = "blocks_test.rs"]
mod blocks_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;

use crate::bus::ErrorCode;
use crate::consts::{DEFAULT_BLOCK_ORIGIN, DEFAULT_BLOCK_SIZE, DEFAULT_SCENE_HEIGHT, DEFAULT_SCENE_WIDTH};
use crate::doc::{BlockId, BlockLayout, BlockRecord, SceneDocument, SceneId};
use crate::visual::{BlockData, BlockHandle, VisualNode};

/// Where a constructed object will live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The scene's own background object.
    Scene,
    /// A regular block placed on the scene.
    Block,
}

#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    #[error("malformed payload for block {block_id}: {reason}")]
    MalformedPayload { block_id: BlockId, reason: String },
    #[error("invalid layout for block {block_id}: {width}x{height}")]
    InvalidLayout { block_id: BlockId, width: i64, height: i64 },
}

impl ErrorCode for ConstructError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedPayload { .. } => "E_MALFORMED_PAYLOAD",
            Self::InvalidLayout { .. } => "E_INVALID_LAYOUT",
        }
    }
}

/// Builds visual representations for block records.
#[async_trait::async_trait]
pub trait BlockFactory: Send + Sync {
    /// Construct the block-type specific object for one record.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructError`] when the record cannot be rendered.
    async fn create_visual_object(
        &self,
        block_id: BlockId,
        record: &BlockRecord,
        placement: Placement,
        scene_id: SceneId,
    ) -> Result<Box<dyn BlockHandle>, ConstructError>;

    /// A default-layout record for a newly added block.
    fn default_record(&self, block_type: &str, resource_id: Option<&str>, block_id: BlockId) -> BlockRecord;

    /// A blank document used when creating a new scene.
    fn default_scene(&self) -> SceneDocument;
}

// =============================================================================
// PLACEHOLDER FACTORY
// =============================================================================

/// Factory that draws every block type as a labelled frame.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderFactory {
    disposed: Arc<AtomicUsize>,
}

impl PlaceholderFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of handles this factory produced that were deleted.
    #[must_use]
    pub fn disposed_count(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BlockFactory for PlaceholderFactory {
    async fn create_visual_object(
        &self,
        block_id: BlockId,
        record: &BlockRecord,
        placement: Placement,
        _scene_id: SceneId,
    ) -> Result<Box<dyn BlockHandle>, ConstructError> {
        tokio::task::yield_now().await;

        let layout = record.layout;
        if layout.width <= 0 || layout.height <= 0 {
            return Err(ConstructError::InvalidLayout { block_id, width: layout.width, height: layout.height });
        }
        if placement == Placement::Block && !record.payload.is_object() && !record.payload.is_null() {
            return Err(ConstructError::MalformedPayload { block_id, reason: "payload must be an object".into() });
        }

        let name = record
            .payload
            .get("name")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| default_name(&record.block_type), str::to_owned);

        Ok(Box::new(PlaceholderBlock {
            data: BlockData { block_id, block_type: record.block_type.clone(), block_name: name },
            layout,
            disposed: Arc::clone(&self.disposed),
            deleted: false,
        }))
    }

    fn default_record(&self, block_type: &str, resource_id: Option<&str>, block_id: BlockId) -> BlockRecord {
        let mut payload = serde_json::Map::new();
        payload.insert("name".into(), serde_json::Value::String(default_name(block_type)));
        if let Some(resource_id) = resource_id {
            payload.insert("resourceId".into(), serde_json::Value::String(resource_id.to_owned()));
        }
        BlockRecord {
            id: block_id,
            block_type: block_type.to_owned(),
            layout: BlockLayout {
                x: DEFAULT_BLOCK_ORIGIN,
                y: DEFAULT_BLOCK_ORIGIN,
                width: DEFAULT_BLOCK_SIZE,
                height: DEFAULT_BLOCK_SIZE,
                rotation: 0,
            },
            payload: serde_json::Value::Object(payload),
        }
    }

    fn default_scene(&self) -> SceneDocument {
        SceneDocument::new(Uuid::nil(), "New scene", DEFAULT_SCENE_WIDTH, DEFAULT_SCENE_HEIGHT)
    }
}

fn default_name(block_type: &str) -> String {
    let mut chars = block_type.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Block".to_owned(),
    }
}

struct PlaceholderBlock {
    data: BlockData,
    layout: BlockLayout,
    disposed: Arc<AtomicUsize>,
    deleted: bool,
}

impl BlockHandle for PlaceholderBlock {
    fn block_data(&self) -> BlockData {
        self.data.clone()
    }

    fn delete_block(&mut self) {
        if self.deleted {
            return;
        }
        self.deleted = true;
        self.disposed.fetch_add(1, Ordering::SeqCst);
    }

    #[allow(clippy::cast_precision_loss)]
    fn artwork(&self) -> Vec<VisualNode> {
        let w = self.layout.width as f64;
        let h = self.layout.height as f64;
        let inset = (w.min(h) * 0.1).floor();
        let label = VisualNode::new(inset, inset, (w - 2.0 * inset).max(1.0), (h * 0.25).max(1.0), 0.0);
        vec![label]
    }
}
