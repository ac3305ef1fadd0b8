use std::time::Duration;

use super::*;
use crate::bus::Notification;
use crate::store::SceneStore;
use crate::test_helpers::Fixture;

#[tokio::test]
async fn applies_commands_and_returns_editor_on_close() {
    let Fixture { editor, store, scene_id, blocks, .. } = Fixture::new(3);
    let (tx, handle) = spawn_editor(editor);

    tx.send(Command::LoadScene(scene_id)).await.unwrap();
    tx.send(Command::AddBlock { block_type: "label".into(), resource_id: None }).await.unwrap();
    drop(tx);
    let editor = handle.await.unwrap();

    let stored = store.get_document(scene_id).unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(stored.block_ids()[..3], blocks[..]);
    let session = editor.session().unwrap();
    assert_eq!(session.canvas.stack_order(), stored.block_ids());
    assert_eq!(session.canvas.active(), Some(stored.blocks[3].id));
}

#[tokio::test]
async fn queued_burst_rebuilds_once() {
    let Fixture { editor, factory, scene_id, .. } = Fixture::new(3);
    let (tx, handle) = spawn_editor(editor);

    tx.send(Command::LoadScene(scene_id)).await.unwrap();
    for _ in 0..3 {
        tx.send(Command::BlockChanged(None)).await.unwrap();
    }
    drop(tx);
    let editor = handle.await.unwrap();

    assert_eq!(factory.calls().len(), 3);
    assert_eq!(editor.session().unwrap().canvas.commits(), 1);
}

#[tokio::test(start_paused = true)]
async fn render_announcement_is_flushed_by_the_loop() {
    let Fixture { editor, sink, scene_id, .. } = Fixture::new(2);
    let (tx, handle) = spawn_editor(editor);

    tx.send(Command::LoadScene(scene_id)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    drop(tx);
    let editor = handle.await.unwrap();

    let rendered: Vec<_> = sink.all().into_iter().filter(|n| matches!(n, Notification::SceneRendered(_))).collect();
    assert_eq!(rendered.len(), 1);
    assert!(editor.render_deadline().is_none());
    assert_eq!(editor.history().entry(scene_id).map(|e| e.len()), Some(1));
}

#[tokio::test]
async fn exits_immediately_without_commands() {
    let Fixture { editor, .. } = Fixture::new(0);
    let (tx, handle) = spawn_editor(editor);
    drop(tx);
    let editor = handle.await.unwrap();
    assert!(editor.session().is_none());
}
