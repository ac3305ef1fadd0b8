//! Shared fixtures for unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::blocks::{BlockFactory, ConstructError, Placement};
use crate::bus::{AutoConfirm, Confirmation, Notification, NotificationSink};
use crate::config::EditorConfig;
use crate::doc::{BlockId, BlockLayout, BlockRecord, SceneDocument, SceneId};
use crate::session::{Collaborators, SceneEditor};
use crate::store::{MemoryStore, SceneStore};
use crate::visual::{BlockData, BlockHandle, VisualNode, VisualObject};

// =============================================================================
// HANDLES
// =============================================================================

/// Records the ids of deleted block handles, in deletion order.
#[derive(Clone, Default)]
pub(crate) struct DisposeLog {
    deleted: Arc<Mutex<Vec<BlockId>>>,
}

impl DisposeLog {
    pub(crate) fn handle(&self, block_id: BlockId, block_type: &str) -> Box<dyn BlockHandle> {
        Box::new(LoggedHandle {
            data: BlockData { block_id, block_type: block_type.into(), block_name: format!("{block_type}-{block_id}") },
            log: self.clone(),
        })
    }

    pub(crate) fn deleted(&self) -> Vec<BlockId> {
        self.deleted.lock().unwrap().clone()
    }

    fn record(&self, block_id: BlockId) {
        self.deleted.lock().unwrap().push(block_id);
    }
}

struct LoggedHandle {
    data: BlockData,
    log: DisposeLog,
}

impl BlockHandle for LoggedHandle {
    fn block_data(&self) -> BlockData {
        self.data.clone()
    }

    fn delete_block(&mut self) {
        self.log.record(self.data.block_id);
    }
}

pub(crate) fn test_object(id: BlockId, left: f64, top: f64, width: f64, height: f64, log: &DisposeLog) -> VisualObject {
    VisualObject::new(log.handle(id, "test"), VisualNode::new(left, top, width, height, 0.0))
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

#[derive(Default)]
pub(crate) struct RecordingSink {
    notes: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub(crate) fn all(&self) -> Vec<Notification> {
        self.notes.lock().unwrap().clone()
    }

    /// Drain everything recorded so far.
    pub(crate) fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notes.lock().unwrap())
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.notes.lock().unwrap().push(notification);
    }
}

// =============================================================================
// FACTORY
// =============================================================================

/// Factory that yields inside every construction, fails on demand, and
/// tracks concurrency.
#[derive(Default)]
pub(crate) struct ScriptedFactory {
    pub(crate) failing: Mutex<HashSet<BlockId>>,
    pub(crate) calls: Mutex<Vec<BlockId>>,
    pub(crate) scene_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub(crate) max_in_flight: AtomicUsize,
    pub(crate) log: DisposeLog,
}

impl ScriptedFactory {
    pub(crate) fn fail(&self, block_id: BlockId) {
        self.failing.lock().unwrap().insert(block_id);
    }

    pub(crate) fn calls(&self) -> Vec<BlockId> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BlockFactory for ScriptedFactory {
    async fn create_visual_object(
        &self,
        block_id: BlockId,
        record: &BlockRecord,
        placement: Placement,
        _scene_id: SceneId,
    ) -> Result<Box<dyn BlockHandle>, ConstructError> {
        if placement == Placement::Scene {
            self.scene_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(self.log.handle(block_id, "scene"));
        }
        self.calls.lock().unwrap().push(block_id);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(&block_id) {
            return Err(ConstructError::MalformedPayload { block_id, reason: "scripted failure".into() });
        }
        Ok(self.log.handle(block_id, &record.block_type))
    }

    fn default_record(&self, block_type: &str, _resource_id: Option<&str>, block_id: BlockId) -> BlockRecord {
        BlockRecord {
            id: block_id,
            block_type: block_type.into(),
            layout: BlockLayout { x: 10, y: 10, width: 100, height: 100, rotation: 0 },
            payload: serde_json::json!({}),
        }
    }

    fn default_scene(&self) -> SceneDocument {
        SceneDocument::new(Uuid::nil(), "Untitled", 640, 480)
    }
}

// =============================================================================
// DOCUMENTS AND EDITORS
// =============================================================================

/// A document with `n` blocks laid out left to right.
pub(crate) fn scene_with_blocks(n: usize) -> SceneDocument {
    let mut doc = SceneDocument::new(Uuid::nil(), "Test scene", 800, 600);
    for i in 0..n {
        let offset = i64::try_from(i).unwrap();
        doc.push_block(BlockRecord {
            id: Uuid::new_v4(),
            block_type: "image".into(),
            layout: BlockLayout { x: 10 + offset * 50, y: 20, width: 40, height: 30, rotation: 0 },
            payload: serde_json::json!({ "name": format!("Block {i}") }),
        });
    }
    doc
}

pub(crate) struct Fixture {
    pub(crate) editor: SceneEditor,
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) factory: Arc<ScriptedFactory>,
    pub(crate) sink: Arc<RecordingSink>,
    pub(crate) scene_id: SceneId,
    pub(crate) blocks: Vec<BlockId>,
}

impl Fixture {
    /// Editor over a store holding one scene of `n` blocks. Nothing loaded.
    pub(crate) fn new(n: usize) -> Self {
        Self::with_confirm(n, Arc::new(AutoConfirm(true)))
    }

    pub(crate) fn with_confirm(n: usize, confirm: Arc<dyn Confirmation>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let doc = scene_with_blocks(n);
        let blocks = doc.block_ids();
        let scene_id = store.create_scene(doc).unwrap();
        let factory = Arc::new(ScriptedFactory::default());
        let sink = Arc::new(RecordingSink::default());
        let deps = Collaborators {
            store: store.clone(),
            factory: factory.clone(),
            sink: sink.clone(),
            confirm,
        };
        let editor = SceneEditor::new(EditorConfig::default(), deps).unwrap();
        Self { editor, store, factory, sink, scene_id, blocks }
    }

    /// Editor with the scene loaded and built.
    pub(crate) async fn loaded(n: usize) -> Self {
        let mut fx = Self::new(n);
        fx.editor.dispatch(crate::bus::Command::LoadScene(fx.scene_id)).await;
        fx.sink.take();
        fx
    }

    pub(crate) fn stored(&self) -> SceneDocument {
        self.store.get_document(self.scene_id).unwrap()
    }

    pub(crate) fn stack(&self) -> Vec<BlockId> {
        self.editor.session().map(|s| s.canvas.stack_order()).unwrap_or_default()
    }

    pub(crate) fn history_len(&self) -> usize {
        self.editor.history().entry(self.scene_id).map_or(0, |e| e.len())
    }
}
