//! Shared numeric constants for the scene editor.

// ── Zoom ────────────────────────────────────────────────────────

/// Factor applied by a single zoom-in (and divided by a zoom-out) step.
pub const ZOOM_STEP: f64 = 1.2;

// ── History ─────────────────────────────────────────────────────

/// Snapshots kept per scene before the oldest is dropped.
pub const HISTORY_LIMIT: usize = 100;

// ── Timing ──────────────────────────────────────────────────────

/// Quiet window before the "scene rendered" announcement fires.
pub const RENDER_DEBOUNCE_MS: u64 = 200;

/// Bounded capacity of the editor command channel.
pub const COMMAND_QUEUE_CAPACITY: usize = 256;

// ── Block defaults ──────────────────────────────────────────────

/// Position of a freshly added block, in document units.
pub const DEFAULT_BLOCK_ORIGIN: i64 = 10;

/// Edge length of a freshly added block, in document units.
pub const DEFAULT_BLOCK_SIZE: i64 = 100;

/// Width of a freshly created scene, in document units.
pub const DEFAULT_SCENE_WIDTH: i64 = 640;

/// Height of a freshly created scene, in document units.
pub const DEFAULT_SCENE_HEIGHT: i64 = 480;
