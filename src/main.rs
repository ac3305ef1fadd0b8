use std::sync::Arc;

use scene_composer::blocks::{BlockFactory, PlaceholderFactory};
use scene_composer::bus::{AutoConfirm, Command, ErrorCode, Notification, SelectTarget};
use scene_composer::config::EditorConfig;
use scene_composer::service::spawn_editor;
use scene_composer::session::{Collaborators, SceneEditor};
use scene_composer::store::{MemoryStore, SceneStore};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = EditorConfig::from_env().unwrap_or_else(|e| {
        warn!(error = %e, "invalid editor config; using defaults");
        EditorConfig::default()
    });

    let store = Arc::new(MemoryStore::new());
    let factory = Arc::new(PlaceholderFactory::new());

    // Seed one scene with a few blocks so the demo has something to edit.
    let mut scene = factory.default_scene();
    scene.name = "Lobby".into();
    let mut first = None;
    for block_type in ["image", "rss", "label"] {
        let block_id = store.generate_block_id();
        if first.is_none() {
            first = Some(block_id);
        }
        let mut record = factory.default_record(block_type, None, block_id);
        record.layout.x += i64::try_from(scene.len()).unwrap_or(0) * 40;
        scene.push_block(record);
    }
    let scene_id = match store.create_scene(scene) {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "failed to seed scene");
            return;
        }
    };

    let (note_tx, mut note_rx) = mpsc::unbounded_channel::<Notification>();
    let notes = tokio::spawn(async move {
        while let Some(note) = note_rx.recv().await {
            match note {
                Notification::BlockListChanged(Some(blocks)) => {
                    let names: Vec<&str> = blocks.iter().map(|b| b.name.as_str()).collect();
                    info!(?names, "block list changed");
                }
                Notification::SceneRendered(handle) => {
                    info!(scene_id = %handle.scene_id, generation = handle.generation, "scene rendered");
                }
                other => info!(notification = ?other, "notification"),
            }
        }
    });

    let deps = Collaborators {
        store: store.clone(),
        factory: factory.clone(),
        sink: Arc::new(note_tx),
        confirm: Arc::new(AutoConfirm(true)),
    };
    let editor = match SceneEditor::new(config, deps) {
        Ok(editor) => editor,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "editor config rejected");
            return;
        }
    };
    let (tx, editor) = spawn_editor(editor);

    let mut script = vec![Command::LoadScene(scene_id)];
    if let Some(block_id) = first {
        script.push(Command::SelectItem(SelectTarget::Block(block_id)));
        script.push(Command::PushToFront);
    }
    script.extend([Command::ZoomIn, Command::ZoomIn, Command::ZoomReset, Command::Undo]);

    for command in script {
        if let Err(e) = tx.send(command).await {
            error!(error = %e, "editor stopped early");
            break;
        }
        tokio::time::sleep(config.render_debounce() * 2).await;
    }
    drop(tx);

    match editor.await {
        Ok(editor) => {
            let history_len = editor.scene_id().and_then(|id| editor.history().entry(id)).map_or(0, |e| e.len());
            let order = editor.session().map(|s| s.document.block_ids()).unwrap_or_default();
            info!(?order, history_len, zoom = editor.zoom().scale, "editor finished");
        }
        Err(e) => error!(error = %e, "editor task failed"),
    }
    drop(notes);
}
