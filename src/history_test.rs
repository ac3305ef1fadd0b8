use uuid::Uuid;

use super::*;

fn snap(i: usize) -> String {
    format!("snapshot-{i}")
}

// =============================================================
// init
// =============================================================

#[test]
fn init_creates_entry_once() {
    let mut store = HistoryStore::default();
    let scene = Uuid::new_v4();
    assert!(store.init(scene));
    assert!(!store.init(scene));
    let entry = store.entry(scene).unwrap();
    assert!(entry.is_empty());
    assert_eq!(entry.cursor(), None);
}

#[test]
fn init_after_add_reports_existing() {
    let mut store = HistoryStore::default();
    let scene = Uuid::new_v4();
    store.add_state(scene, snap(0));
    assert!(!store.init(scene));
}

// =============================================================
// add_state
// =============================================================

#[test]
fn add_state_moves_cursor_to_end() {
    let mut store = HistoryStore::default();
    let scene = Uuid::new_v4();
    store.add_state(scene, snap(0));
    store.add_state(scene, snap(1));
    let entry = store.entry(scene).unwrap();
    assert_eq!(entry.len(), 2);
    assert_eq!(entry.cursor(), Some(1));
    assert_eq!(entry.current(), Some("snapshot-1"));
}

#[test]
fn bound_drops_oldest_snapshots() {
    let mut store = HistoryStore::new(100);
    let scene = Uuid::new_v4();
    for i in 0..150 {
        store.add_state(scene, snap(i));
    }
    let entry = store.entry(scene).unwrap();
    assert_eq!(entry.len(), 100);
    assert_eq!(entry.get(0), Some("snapshot-50"));
    assert_eq!(entry.current(), Some("snapshot-149"));
    assert_eq!(entry.cursor(), Some(99));
}

#[test]
fn length_never_exceeds_small_limit() {
    let mut store = HistoryStore::new(3);
    let scene = Uuid::new_v4();
    for i in 0..10 {
        store.add_state(scene, snap(i));
        assert!(store.entry(scene).unwrap().len() <= 3);
    }
}

#[test]
fn zero_limit_keeps_one() {
    let mut store = HistoryStore::new(0);
    let scene = Uuid::new_v4();
    store.add_state(scene, snap(0));
    store.add_state(scene, snap(1));
    assert_eq!(store.limit(), 1);
    assert_eq!(store.entry(scene).unwrap().current(), Some("snapshot-1"));
}

#[test]
fn push_after_undo_discards_redo_branch() {
    let mut store = HistoryStore::default();
    let scene = Uuid::new_v4();
    store.add_state(scene, "A".into());
    store.add_state(scene, "B".into());
    store.add_state(scene, "C".into());

    assert_eq!(store.load_state(scene, Direction::Undo), Some("B"));
    store.add_state(scene, "D".into());

    let entry = store.entry(scene).unwrap();
    assert_eq!(entry.len(), 3);
    assert!(!entry.can_redo());
    assert_eq!(store.load_state(scene, Direction::Redo), None);
    assert_eq!(store.load_state(scene, Direction::Undo), Some("B"));
    assert_eq!(store.load_state(scene, Direction::Redo), Some("D"));
}

// =============================================================
// load_state
// =============================================================

#[test]
fn load_state_without_entry_is_noop() {
    let mut store = HistoryStore::default();
    assert_eq!(store.load_state(Uuid::new_v4(), Direction::Undo), None);
}

#[test]
fn load_state_on_empty_entry_is_noop() {
    let mut store = HistoryStore::default();
    let scene = Uuid::new_v4();
    store.init(scene);
    assert_eq!(store.load_state(scene, Direction::Undo), None);
    assert_eq!(store.load_state(scene, Direction::Redo), None);
    assert_eq!(store.entry(scene).unwrap().cursor(), None);
}

#[test]
fn undo_stops_at_oldest() {
    let mut store = HistoryStore::default();
    let scene = Uuid::new_v4();
    store.add_state(scene, "A".into());
    store.add_state(scene, "B".into());
    assert_eq!(store.load_state(scene, Direction::Undo), Some("A"));
    assert_eq!(store.load_state(scene, Direction::Undo), None);
    assert_eq!(store.entry(scene).unwrap().cursor(), Some(0));
}

#[test]
fn redo_stops_at_newest() {
    let mut store = HistoryStore::default();
    let scene = Uuid::new_v4();
    store.add_state(scene, "A".into());
    assert_eq!(store.load_state(scene, Direction::Redo), None);
    assert_eq!(store.entry(scene).unwrap().cursor(), Some(0));
}

#[test]
fn scenes_are_independent() {
    let mut store = HistoryStore::default();
    let (s1, s2) = (Uuid::new_v4(), Uuid::new_v4());
    store.add_state(s1, "A".into());
    store.add_state(s1, "B".into());
    store.add_state(s2, "X".into());
    assert_eq!(store.load_state(s2, Direction::Undo), None);
    assert_eq!(store.load_state(s1, Direction::Undo), Some("A"));
    assert_eq!(store.entry(s2).unwrap().current(), Some("X"));
}

#[test]
fn can_undo_and_redo_track_cursor() {
    let mut store = HistoryStore::default();
    let scene = Uuid::new_v4();
    store.add_state(scene, "A".into());
    let entry = store.entry(scene).unwrap();
    assert!(!entry.can_undo());
    assert!(!entry.can_redo());
    store.add_state(scene, "B".into());
    assert!(store.entry(scene).unwrap().can_undo());
    store.load_state(scene, Direction::Undo);
    assert!(store.entry(scene).unwrap().can_redo());
}

#[test]
fn forget_drops_entry() {
    let mut store = HistoryStore::default();
    let scene = Uuid::new_v4();
    store.add_state(scene, "A".into());
    assert!(store.forget(scene));
    assert!(store.entry(scene).is_none());
    assert!(!store.forget(scene));
}
