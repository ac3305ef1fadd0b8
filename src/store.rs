//! Persistence collaborator interface and an in-memory implementation.
//!
//! DESIGN
//! ======
//! The editor reads and writes scene documents through [`SceneStore`]. All
//! calls are synchronous: a write has been committed by the time the call
//! returns, so a rebuild scheduled afterwards always reads the latest
//! document. [`MemoryStore`] keeps documents in a mutex-guarded map and is
//! what the binary and the tests run against.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;
use uuid::Uuid;

use crate::bus::ErrorCode;
use crate::doc::{BlockId, BlockRecord, SceneDocument, SceneId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("scene not found: {0}")]
    SceneNotFound(SceneId),
    #[error("block {block_id} not found in scene {scene_id}")]
    BlockNotFound { scene_id: SceneId, block_id: BlockId },
    #[error("block {block_id} already exists in scene {scene_id}")]
    DuplicateBlock { scene_id: SceneId, block_id: BlockId },
    #[error("store lock poisoned")]
    Poisoned,
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SceneNotFound(_) => "E_SCENE_NOT_FOUND",
            Self::BlockNotFound { .. } => "E_BLOCK_NOT_FOUND",
            Self::DuplicateBlock { .. } => "E_DUPLICATE_BLOCK",
            Self::Poisoned => "E_STORE_POISONED",
        }
    }
}

/// Scene document persistence.
pub trait SceneStore: Send + Sync {
    /// Fetch a full scene document.
    ///
    /// # Errors
    ///
    /// [`StoreError::SceneNotFound`] if the scene does not exist.
    fn get_document(&self, scene_id: SceneId) -> Result<SceneDocument, StoreError>;

    /// Fetch one block record.
    ///
    /// # Errors
    ///
    /// Fails if the scene or the block does not exist.
    fn get_document_fragment(&self, scene_id: SceneId, block_id: BlockId) -> Result<BlockRecord, StoreError>;

    /// Replace a whole scene document.
    ///
    /// # Errors
    ///
    /// [`StoreError::SceneNotFound`] if the scene does not exist.
    fn set_document(&self, scene_id: SceneId, document: SceneDocument) -> Result<(), StoreError>;

    /// Replace one block record in place.
    ///
    /// # Errors
    ///
    /// Fails if the scene or the block does not exist.
    fn set_document_fragment(&self, scene_id: SceneId, block_id: BlockId, record: BlockRecord)
    -> Result<(), StoreError>;

    /// Persist a new scene built from `document` and return its id.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn create_scene(&self, document: SceneDocument) -> Result<SceneId, StoreError>;

    /// Delete a scene.
    ///
    /// # Errors
    ///
    /// [`StoreError::SceneNotFound`] if the scene does not exist.
    fn remove_scene(&self, scene_id: SceneId) -> Result<(), StoreError>;

    /// Delete one block from a scene.
    ///
    /// # Errors
    ///
    /// Fails if the scene or the block does not exist.
    fn remove_block(&self, scene_id: SceneId, block_id: BlockId) -> Result<(), StoreError>;

    /// Append a block on top of a scene's stack.
    ///
    /// # Errors
    ///
    /// Fails if the scene does not exist or the block id is taken.
    fn append_block(&self, scene_id: SceneId, record: BlockRecord) -> Result<(), StoreError>;

    /// Allocate a fresh block id.
    fn generate_block_id(&self) -> BlockId;

    /// Ids of every stored scene, in creation order.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn scene_ids(&self) -> Result<Vec<SceneId>, StoreError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Default)]
struct Inner {
    scenes: HashMap<SceneId, SceneDocument>,
    order: Vec<SceneId>,
}

/// In-memory [`SceneStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl SceneStore for MemoryStore {
    fn get_document(&self, scene_id: SceneId) -> Result<SceneDocument, StoreError> {
        let inner = self.lock()?;
        inner.scenes.get(&scene_id).cloned().ok_or(StoreError::SceneNotFound(scene_id))
    }

    fn get_document_fragment(&self, scene_id: SceneId, block_id: BlockId) -> Result<BlockRecord, StoreError> {
        let inner = self.lock()?;
        let doc = inner.scenes.get(&scene_id).ok_or(StoreError::SceneNotFound(scene_id))?;
        doc.block(&block_id).cloned().ok_or(StoreError::BlockNotFound { scene_id, block_id })
    }

    fn set_document(&self, scene_id: SceneId, mut document: SceneDocument) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let slot = inner.scenes.get_mut(&scene_id).ok_or(StoreError::SceneNotFound(scene_id))?;
        document.id = scene_id;
        *slot = document;
        Ok(())
    }

    fn set_document_fragment(
        &self,
        scene_id: SceneId,
        block_id: BlockId,
        mut record: BlockRecord,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let doc = inner.scenes.get_mut(&scene_id).ok_or(StoreError::SceneNotFound(scene_id))?;
        record.id = block_id;
        if doc.replace_block(record) {
            Ok(())
        } else {
            Err(StoreError::BlockNotFound { scene_id, block_id })
        }
    }

    fn create_scene(&self, mut document: SceneDocument) -> Result<SceneId, StoreError> {
        let scene_id = Uuid::new_v4();
        document.id = scene_id;
        let mut inner = self.lock()?;
        inner.scenes.insert(scene_id, document);
        inner.order.push(scene_id);
        debug!(%scene_id, "scene created");
        Ok(scene_id)
    }

    fn remove_scene(&self, scene_id: SceneId) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.scenes.remove(&scene_id).is_none() {
            return Err(StoreError::SceneNotFound(scene_id));
        }
        inner.order.retain(|id| *id != scene_id);
        debug!(%scene_id, "scene removed");
        Ok(())
    }

    fn remove_block(&self, scene_id: SceneId, block_id: BlockId) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let doc = inner.scenes.get_mut(&scene_id).ok_or(StoreError::SceneNotFound(scene_id))?;
        doc.remove_block(&block_id).map(|_| ()).ok_or(StoreError::BlockNotFound { scene_id, block_id })
    }

    fn append_block(&self, scene_id: SceneId, record: BlockRecord) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let doc = inner.scenes.get_mut(&scene_id).ok_or(StoreError::SceneNotFound(scene_id))?;
        let block_id = record.id;
        if doc.push_block(record) {
            Ok(())
        } else {
            Err(StoreError::DuplicateBlock { scene_id, block_id })
        }
    }

    fn generate_block_id(&self) -> BlockId {
        Uuid::new_v4()
    }

    fn scene_ids(&self) -> Result<Vec<SceneId>, StoreError> {
        Ok(self.lock()?.order.clone())
    }
}
