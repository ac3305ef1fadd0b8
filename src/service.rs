//! Editor actor: runs a `SceneEditor` on its own task.
//!
//! DESIGN
//! ======
//! Commands arrive on a bounded channel and are applied strictly one at a
//! time. After each wake-up the loop drains every command already queued
//! and only then runs the scheduled rebuild, so a burst of edits produces a
//! single construction pass. The same loop sleeps until the render
//! announcer's deadline and flushes the scene-rendered notification when it
//! passes.
//!
//! When every sender is dropped the loop exits and hands the editor back
//! through the join handle.

#[cfg(test)]
#[path = "service_test.rs"]
mod service_test;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::bus::Command;
use crate::session::SceneEditor;

/// Spawn the editor loop. Returns the command sender and the task handle.
#[must_use]
pub fn spawn_editor(mut editor: SceneEditor) -> (mpsc::Sender<Command>, JoinHandle<SceneEditor>) {
    let capacity = editor.config().command_queue_capacity.max(1);
    let (tx, mut rx) = mpsc::channel::<Command>(capacity);
    info!(queue_capacity = capacity, "scene editor started");

    let handle = tokio::spawn(async move {
        loop {
            let deadline = editor.render_deadline();
            tokio::select! {
                maybe_command = rx.recv() => {
                    let Some(command) = maybe_command else {
                        break;
                    };
                    editor.handle(command).await;
                    while let Ok(command) = rx.try_recv() {
                        editor.handle(command).await;
                    }
                    editor.run_pending().await;
                }
                () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    editor.flush_render_announcement(Instant::now());
                }
            }
        }
        debug!("scene editor command channel closed");
        editor
    });

    (tx, handle)
}
