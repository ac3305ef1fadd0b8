//! Scene session lifecycle and editor orchestration.
//!
//! DESIGN
//! ======
//! `SceneEditor` owns every piece of mutable editing state: the active
//! `SceneSession` (working document, live canvas, selected block), the
//! zoom, the per-scene history, the construction pipeline, and the render
//! announcer. Collaborators are injected once through [`Collaborators`].
//!
//! Commands are applied one at a time by [`SceneEditor::handle`]. Document
//! writes are synchronous and reach the store before the command returns.
//! A command that needs the canvas rebuilt only schedules a
//! [`RebuildTicket`]; [`SceneEditor::run_pending`] performs the rebuild
//! once the caller has no more queued commands. Loading or removing a scene
//! bumps the editor epoch, so a ticket issued for a previous scene is
//! dropped without constructing anything.
//!
//! ERROR HANDLING
//! ==============
//! Commands that need a scene or a selection silently do nothing when there
//! is none. Store and snapshot failures abandon the current command with a
//! `warn!` and leave the session usable.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::blocks::BlockFactory;
use crate::bus::{BlockSummary, Command, Confirmation, ErrorCode, Notification, NotificationSink};
use crate::canvas::Canvas;
use crate::config::{ConfigError, EditorConfig};
use crate::debounce::Debouncer;
use crate::doc::{BlockId, SceneDocument, SceneId};
use crate::history::{Direction, HistoryStore};
use crate::pipeline::{ConstructionPipeline, build_scene_block};
use crate::store::{SceneStore, StoreError};
use crate::transform::{ViewGeometry, Zoom, normalize_all};

const REMOVE_SCENE_PROMPT: &str = "Are you sure you want to remove this scene?";

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl ErrorCode for EditorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
            Self::Snapshot(_) => "E_SNAPSHOT",
        }
    }
}

/// Services the editor depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn SceneStore>,
    pub factory: Arc<dyn BlockFactory>,
    pub sink: Arc<dyn NotificationSink>,
    pub confirm: Arc<dyn Confirmation>,
}

/// Live editing context for one scene.
pub struct SceneSession {
    pub scene_id: SceneId,
    /// Working copy of the scene document, kept in lockstep with the store.
    pub document: SceneDocument,
    pub canvas: Canvas,
    /// Block to re-select after the next rebuild.
    pub selected: Option<BlockId>,
}

/// A scheduled canvas rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildTicket {
    pub scene_id: SceneId,
    pub epoch: u64,
}

/// The scene editing engine.
pub struct SceneEditor {
    pub(crate) config: EditorConfig,
    pub(crate) deps: Collaborators,
    pub(crate) history: HistoryStore,
    pub(crate) session: Option<SceneSession>,
    pub(crate) zoom: Zoom,
    pub(crate) pipeline: ConstructionPipeline,
    pub(crate) pending_rebuild: Option<RebuildTicket>,
    pub(crate) epoch: u64,
    pub(crate) render_announcer: Debouncer,
}

impl SceneEditor {
    /// Build an editor over `deps`.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`EditorConfig::validate`] if the
    /// configuration is unusable.
    pub fn new(config: EditorConfig, deps: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            history: HistoryStore::new(config.history_limit),
            zoom: Zoom::new(config.zoom_step),
            render_announcer: Debouncer::new(config.render_debounce()),
            config,
            deps,
            session: None,
            pipeline: ConstructionPipeline::new(),
            pending_rebuild: None,
            epoch: 0,
        })
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> Option<&SceneSession> {
        self.session.as_ref()
    }

    /// Mutable session access for the host, which moves visual objects
    /// while the user drags.
    pub fn session_mut(&mut self) -> Option<&mut SceneSession> {
        self.session.as_mut()
    }

    #[must_use]
    pub fn scene_id(&self) -> Option<SceneId> {
        self.session.as_ref().map(|s| s.scene_id)
    }

    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    #[must_use]
    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    #[must_use]
    pub fn pipeline(&self) -> &ConstructionPipeline {
        &self.pipeline
    }

    #[must_use]
    pub fn pending_rebuild(&self) -> Option<RebuildTicket> {
        self.pending_rebuild
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// When the debounced scene-rendered announcement is due.
    #[must_use]
    pub fn render_deadline(&self) -> Option<Instant> {
        self.render_announcer.deadline()
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Apply one command. Rebuilds it requests are deferred to
    /// [`SceneEditor::run_pending`].
    pub async fn handle(&mut self, command: Command) {
        let name = command.name();
        debug!(command = name, scene_id = ?self.scene_id(), "command");
        let result = match command {
            Command::LoadScene(scene_id) => self.open_scene(scene_id).await,
            Command::NewScene => self.new_scene().await,
            Command::RemoveScene => self.remove_scene().await,
            Command::RemoveSelectedBlock => self.remove_selected_block(),
            Command::AddBlock { block_type, resource_id } => self.add_block(&block_type, resource_id.as_deref()),
            Command::ZoomIn => {
                self.zoom.zoom_in(self.session.as_mut().map(|s| &mut s.canvas));
                self.normalize_objects();
                Ok(())
            }
            Command::ZoomOut => {
                self.zoom.zoom_out(self.session.as_mut().map(|s| &mut s.canvas));
                self.normalize_objects();
                Ok(())
            }
            Command::ZoomReset => {
                self.zoom.zoom_reset(self.session.as_mut().map(|s| &mut s.canvas));
                self.normalize_objects();
                Ok(())
            }
            Command::PushToFront => self.push_to_front(),
            Command::PushToBack => self.push_to_back(),
            Command::SelectNext => {
                self.select_next();
                Ok(())
            }
            Command::Undo => self.step_history(Direction::Undo).await,
            Command::Redo => self.step_history(Direction::Redo).await,
            Command::SelectItem(target) => self.select_item(target),
            Command::PointerReleased { target } => self.pointer_released(target),
            Command::PropertiesEdited { x, y, width, height, angle } => {
                self.properties_edited(ViewGeometry { x, y, width, height, angle })
            }
            Command::ObjectTransformed(block_id) => {
                self.object_transformed(block_id);
                Ok(())
            }
            Command::BlockChanged(target) => self.block_changed(target),
        };
        if let Err(e) = result {
            warn!(command = name, scene_id = ?self.scene_id(), error = %e, code = e.error_code(), "command abandoned");
        }
    }

    /// Apply one command and run any rebuild it scheduled.
    pub async fn dispatch(&mut self, command: Command) {
        self.handle(command).await;
        self.run_pending().await;
    }

    /// Run the scheduled rebuild, if any. Returns whether construction ran.
    pub async fn run_pending(&mut self) -> bool {
        let Some(ticket) = self.pending_rebuild.take() else {
            return false;
        };
        if ticket.epoch != self.epoch || self.scene_id() != Some(ticket.scene_id) {
            debug!(scene_id = %ticket.scene_id, epoch = ticket.epoch, current = self.epoch, "stale rebuild discarded");
            return false;
        }
        if let Err(e) = self.rebuild(ticket).await {
            warn!(scene_id = %ticket.scene_id, error = %e, code = e.error_code(), "rebuild failed");
        }
        true
    }

    /// Emit the scene-rendered announcement if its debounce window elapsed.
    /// Returns whether it fired.
    pub fn flush_render_announcement(&mut self, now: Instant) -> bool {
        if !self.render_announcer.fire_if_due(now) {
            return false;
        }
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        debug!(scene_id = %session.scene_id, "announcing scene rendered");
        self.deps.sink.notify(Notification::SceneRendered(session.canvas.handle()));
        if let Err(e) = self.record_history() {
            warn!(scene_id = ?self.scene_id(), error = %e, "history snapshot failed");
        }
        true
    }

    // =========================================================================
    // SCENE LIFECYCLE
    // =========================================================================

    /// Load a scene, select its background, and seed its history on first
    /// visit.
    async fn open_scene(&mut self, scene_id: SceneId) -> Result<(), EditorError> {
        self.load_scene(scene_id).await?;
        self.scene_canvas_selected();
        if self.history.init(scene_id) {
            self.record_history()?;
        }
        Ok(())
    }

    /// Replace the active session with a fresh one for `scene_id`. The
    /// previous canvas is torn down before anything new is constructed.
    pub(crate) async fn load_scene(&mut self, scene_id: SceneId) -> Result<(), EditorError> {
        let document = self.deps.store.get_document(scene_id)?;
        self.close_session();
        self.zoom.zoom_reset(None);
        self.deps.sink.notify(Notification::PropertiesReset);

        #[allow(clippy::cast_precision_loss)]
        let mut canvas = Canvas::new(scene_id, document.layout.width as f64, document.layout.height as f64);
        let factory = Arc::clone(&self.deps.factory);
        if let Some(scene_block) = build_scene_block(factory.as_ref(), &document).await {
            canvas.set_scene_block(scene_block);
        }

        info!(%scene_id, blocks = document.len(), "scene loaded");
        self.session = Some(SceneSession { scene_id, document, canvas, selected: None });
        self.schedule_rebuild();
        Ok(())
    }

    async fn new_scene(&mut self) -> Result<(), EditorError> {
        let document = self.deps.factory.default_scene();
        let scene_id = self.deps.store.create_scene(document)?;
        info!(%scene_id, "scene created");
        self.open_scene(scene_id).await?;
        self.deps.sink.notify(Notification::SceneListChanged);
        Ok(())
    }

    async fn remove_scene(&mut self) -> Result<(), EditorError> {
        let Some(scene_id) = self.scene_id() else {
            return Ok(());
        };
        if !self.deps.confirm.confirm(REMOVE_SCENE_PROMPT).await {
            debug!(%scene_id, "scene removal declined");
            return Ok(());
        }
        self.deps.store.remove_scene(scene_id)?;
        self.deps.sink.notify(Notification::SceneListChanged);
        self.close_session();
        self.zoom.zoom_reset(None);
        self.history.forget(scene_id);
        self.deps.sink.notify(Notification::PropertiesReset);
        self.deps.sink.notify(Notification::SceneClosed);
        self.block_count_changed();
        info!(%scene_id, "scene removed");
        Ok(())
    }

    /// Dispose the active session's canvas and cancel everything queued for
    /// it.
    fn close_session(&mut self) {
        self.epoch += 1;
        self.pipeline.clear();
        self.render_announcer.cancel();
        if let Some(session) = self.session.take() {
            debug!(scene_id = %session.scene_id, "session closed");
            session.canvas.dispose();
        }
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    async fn step_history(&mut self, direction: Direction) -> Result<(), EditorError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let scene_id = session.scene_id;
        self.history.init(scene_id);
        let target = self.history.entry(scene_id).and_then(|e| match direction {
            Direction::Undo if e.can_undo() => e.cursor().and_then(|c| e.get(c - 1)),
            Direction::Redo if e.can_redo() => e.cursor().and_then(|c| e.get(c + 1)),
            _ => None,
        });
        let Some(snapshot) = target.map(str::to_owned) else {
            return Ok(());
        };

        // The cursor only moves once the snapshot has reached the store.
        let document = SceneDocument::from_snapshot(&snapshot)?;
        self.deps.store.set_document(scene_id, document)?;
        self.history.load_state(scene_id, direction);

        session.selected = None;
        session.canvas.discard_group();
        session.canvas.discard_active();
        self.load_scene(scene_id).await?;
        self.deps.sink.notify(Notification::SceneListChanged);
        Ok(())
    }

    /// Snapshot the working document into history. A snapshot identical to
    /// the one at the cursor is not recorded again.
    pub(crate) fn record_history(&mut self) -> Result<(), EditorError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let snapshot = session.document.to_snapshot()?;
        let scene_id = session.scene_id;
        if self.history.entry(scene_id).and_then(|e| e.current()) == Some(snapshot.as_str()) {
            return Ok(());
        }
        self.history.add_state(scene_id, snapshot);
        Ok(())
    }

    // =========================================================================
    // REBUILD
    // =========================================================================

    fn schedule_rebuild(&mut self) {
        if let Some(scene_id) = self.scene_id() {
            self.pending_rebuild = Some(RebuildTicket { scene_id, epoch: self.epoch });
        }
    }

    /// A block changed: remember it for re-selection, rebuild, and snapshot.
    pub(crate) fn block_changed(&mut self, target: Option<BlockId>) -> Result<(), EditorError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        session.selected = target;
        self.deps.sink.notify(Notification::BlockChanged(target));
        self.schedule_rebuild();
        self.record_history()
    }

    async fn rebuild(&mut self, ticket: RebuildTicket) -> Result<(), EditorError> {
        let document = self.deps.store.get_document(ticket.scene_id)?;
        self.pipeline.prepare(&document);
        let factory = Arc::clone(&self.deps.factory);
        let outcome = self.pipeline.build(factory.as_ref(), ticket.scene_id).await;

        let Some(session) = self.session.as_mut().filter(|s| s.scene_id == ticket.scene_id) else {
            for obj in outcome.objects {
                obj.dispose();
            }
            return Ok(());
        };
        session.document = document;
        ConstructionPipeline::commit(&mut session.canvas, outcome.objects, &self.zoom);
        let selected = session.selected;

        self.block_count_changed();
        if let Some(block_id) = selected {
            let on_canvas = self.session.as_ref().is_some_and(|s| s.canvas.index_of(&block_id).is_some());
            if on_canvas {
                self.select_block(block_id)?;
            } else {
                self.deps.sink.notify(Notification::BlockSelected(block_id));
            }
        }
        self.render_announcer.poke(Instant::now());
        Ok(())
    }

    /// Announce the current block list in stacking order, or `None` when no
    /// scene is active.
    pub(crate) fn block_count_changed(&self) {
        let blocks = self.session.as_ref().map(|s| {
            s.canvas
                .objects()
                .iter()
                .map(|o| BlockSummary { id: o.block_id, name: o.name.clone() })
                .collect::<Vec<_>>()
        });
        self.deps.sink.notify(Notification::BlockListChanged(blocks));
    }

    // =========================================================================
    // SHARED HELPERS
    // =========================================================================

    fn normalize_objects(&mut self) {
        if let Some(session) = self.session.as_mut() {
            normalize_all(&mut session.canvas);
        }
    }

    /// Select the scene background.
    pub(crate) fn scene_canvas_selected(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.canvas.discard_group();
        session.canvas.discard_active();
        self.deps.sink.notify(Notification::BlockSelected(session.scene_id));
    }
}
