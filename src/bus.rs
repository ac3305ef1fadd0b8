//! Typed command and notification bus.
//!
//! Collaborators (toolbar, property panel, block instances) talk to the
//! editor only through [`Command`] values, and the editor talks back only
//! through [`Notification`] values delivered to an injected
//! [`NotificationSink`]. Notifications are fire-and-forget: a sink that has
//! gone away is logged and otherwise ignored.

#[cfg(test)]
#[path = "bus_test.rs"]
mod bus_test;

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::canvas::CanvasHandle;
use crate::doc::{BlockId, SceneId};

/// Errors that carry a stable machine-readable code.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Target of a select-item request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectTarget {
    /// The scene background itself.
    Scene,
    Block(BlockId),
}

/// Requests accepted by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadScene(SceneId),
    NewScene,
    RemoveScene,
    RemoveSelectedBlock,
    AddBlock { block_type: String, resource_id: Option<String> },
    ZoomIn,
    ZoomOut,
    ZoomReset,
    PushToFront,
    PushToBack,
    SelectNext,
    Undo,
    Redo,
    SelectItem(SelectTarget),
    /// The user finished a pointer gesture. `target` is the object under the
    /// pointer, or `None` for the scene background.
    PointerReleased { target: Option<BlockId> },
    /// Numeric values typed into the property panel, in document units.
    PropertiesEdited { x: f64, y: f64, width: f64, height: f64, angle: f64 },
    /// An object is being scaled or moved interactively.
    ObjectTransformed(BlockId),
    /// A block changed its own payload; rebuild the scene.
    BlockChanged(Option<BlockId>),
}

impl Command {
    /// Short name used in log fields.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadScene(_) => "load_scene",
            Self::NewScene => "new_scene",
            Self::RemoveScene => "remove_scene",
            Self::RemoveSelectedBlock => "remove_selected_block",
            Self::AddBlock { .. } => "add_block",
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::ZoomReset => "zoom_reset",
            Self::PushToFront => "push_to_front",
            Self::PushToBack => "push_to_back",
            Self::SelectNext => "select_next",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::SelectItem(_) => "select_item",
            Self::PointerReleased { .. } => "pointer_released",
            Self::PropertiesEdited { .. } => "properties_edited",
            Self::ObjectTransformed(_) => "object_transformed",
            Self::BlockChanged(_) => "block_changed",
        }
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Entry of a block-list-changed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub id: BlockId,
    pub name: String,
}

/// Events raised by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    SceneListChanged,
    /// Current blocks in stacking order, or `None` when no scene is active.
    BlockListChanged(Option<Vec<BlockSummary>>),
    /// A block, or the scene itself when its background is selected.
    BlockSelected(Uuid),
    BlockChanged(Option<BlockId>),
    SceneRendered(CanvasHandle),
    /// Property panels should clear their fields.
    PropertiesReset,
    /// The active scene was torn down.
    SceneClosed,
}

/// Receiver for editor notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl NotificationSink for mpsc::UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        if let Err(err) = self.send(notification) {
            debug!(notification = ?err.0, "notification dropped; receiver closed");
        }
    }
}

/// Modal confirmation for destructive actions.
#[async_trait::async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation that always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait::async_trait]
impl Confirmation for AutoConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
