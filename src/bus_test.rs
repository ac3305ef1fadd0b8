use super::*;

#[test]
fn command_names_are_snake_case() {
    let commands = [
        Command::LoadScene(Uuid::nil()),
        Command::AddBlock { block_type: "rss".into(), resource_id: None },
        Command::PointerReleased { target: None },
        Command::SelectItem(SelectTarget::Scene),
    ];
    let names: Vec<&str> = commands.iter().map(Command::name).collect();
    assert_eq!(names, vec!["load_scene", "add_block", "pointer_released", "select_item"]);
}

#[test]
fn unbounded_sender_delivers_notifications() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tx.notify(Notification::SceneListChanged);
    tx.notify(Notification::BlockChanged(None));
    assert_eq!(rx.try_recv().unwrap(), Notification::SceneListChanged);
    assert_eq!(rx.try_recv().unwrap(), Notification::BlockChanged(None));
}

#[test]
fn closed_receiver_is_ignored() {
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    tx.notify(Notification::SceneClosed);
}

#[tokio::test]
async fn auto_confirm_answers_fixed_value() {
    assert!(AutoConfirm(true).confirm("remove?").await);
    assert!(!AutoConfirm(false).confirm("remove?").await);
}
