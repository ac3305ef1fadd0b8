//! Per-scene bounded undo/redo over full document snapshots.
//!
//! DESIGN
//! ======
//! Each scene owns a `HistoryEntry`: an ordered list of serialized documents
//! and a cursor pointing at the snapshot that matches the current document.
//! Recording after an undo truncates everything past the cursor, so there is
//! no redo tree. The list is bounded; when full, the oldest snapshot is
//! dropped before the new one is appended, so the length never exceeds the
//! limit.
//!
//! Undo at the oldest snapshot and redo at the newest are no-ops, as is any
//! operation on a scene with no history.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::consts::HISTORY_LIMIT;
use crate::doc::SceneId;

/// Direction of a history step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

/// Snapshot list and cursor for one scene.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryEntry {
    snapshots: VecDeque<String>,
    cursor: Option<usize>,
}

impl HistoryEntry {
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index of the current snapshot; `None` while empty.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.snapshots.len())
    }

    /// Snapshot at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.cursor.and_then(|c| self.snapshots.get(c)).map(String::as_str)
    }

    /// Snapshot at an absolute index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.snapshots.get(index).map(String::as_str)
    }

    fn push(&mut self, snapshot: String, limit: usize) {
        if let Some(cursor) = self.cursor {
            self.snapshots.truncate(cursor + 1);
        }
        while self.snapshots.len() >= limit {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
        self.cursor = Some(self.snapshots.len() - 1);
    }

    fn step(&mut self, direction: Direction) -> Option<&str> {
        let cursor = self.cursor?;
        let next = match direction {
            Direction::Undo if cursor > 0 => cursor - 1,
            Direction::Redo if cursor + 1 < self.snapshots.len() => cursor + 1,
            _ => return None,
        };
        self.cursor = Some(next);
        self.snapshots.get(next).map(String::as_str)
    }
}

/// History for every scene touched in this editor session.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: HashMap<SceneId, HistoryEntry>,
    limit: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl HistoryStore {
    /// Create a store keeping at most `limit` snapshots per scene. A zero
    /// limit is treated as one.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { entries: HashMap::new(), limit: limit.max(1) }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Create an empty entry for `scene_id` if none exists. Returns whether
    /// a new entry was created.
    pub fn init(&mut self, scene_id: SceneId) -> bool {
        if self.entries.contains_key(&scene_id) {
            return false;
        }
        self.entries.insert(scene_id, HistoryEntry::default());
        true
    }

    /// Record a snapshot as the new current state, discarding any redo
    /// branch and the oldest snapshot if the entry is full.
    pub fn add_state(&mut self, scene_id: SceneId, snapshot: String) {
        let limit = self.limit;
        let entry = self.entries.entry(scene_id).or_default();
        entry.push(snapshot, limit);
        debug!(%scene_id, len = entry.len(), cursor = ?entry.cursor, "history snapshot recorded");
    }

    /// Move the cursor one step and return the snapshot it lands on. Returns
    /// `None` (leaving the cursor unchanged) when there is no entry, the
    /// entry is empty, or the cursor is already at the boundary.
    pub fn load_state(&mut self, scene_id: SceneId, direction: Direction) -> Option<&str> {
        let entry = self.entries.get_mut(&scene_id)?;
        let snapshot = entry.step(direction);
        if snapshot.is_some() {
            debug!(%scene_id, ?direction, "history step");
        }
        snapshot
    }

    #[must_use]
    pub fn entry(&self, scene_id: SceneId) -> Option<&HistoryEntry> {
        self.entries.get(&scene_id)
    }

    /// Drop all history for a scene.
    pub fn forget(&mut self, scene_id: SceneId) -> bool {
        self.entries.remove(&scene_id).is_some()
    }
}
