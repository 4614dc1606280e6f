use super::*;
use crate::core::app::test_support::test_app;
use crate::core::app::StatusKind;
use crate::core::message::Role;
use std::io::Write;
use tempfile::TempDir;

#[test]
fn plain_text_is_a_message() {
    let mut app = test_app();
    assert_eq!(
        process_input(&mut app, "hello there"),
        CommandResult::ProcessAsMessage("hello there".to_string())
    );
}

#[test]
fn unknown_commands_are_sent_as_text() {
    let mut app = test_app();
    assert_eq!(
        process_input(&mut app, "/usr/bin is a path"),
        CommandResult::ProcessAsMessage("/usr/bin is a path".to_string())
    );
    assert_eq!(
        process_input(&mut app, "/"),
        CommandResult::ProcessAsMessage("/".to_string())
    );
}

#[test]
fn commands_dispatch_case_insensitively() {
    let mut app = test_app();
    assert_eq!(process_input(&mut app, "/HELP"), CommandResult::Continue);
    let overlay = app.ui.overlay.as_ref().expect("help overlay");
    assert_eq!(overlay.title, "Help");
    assert!(overlay.lines.iter().any(|line| line.starts_with("/attach <path>")));
}

#[test]
fn attach_requires_a_path() {
    let mut app = test_app();
    assert_eq!(process_input(&mut app, "/attach"), CommandResult::Continue);
    assert_eq!(app.ui.status.as_ref().unwrap().kind, StatusKind::Error);

    assert_eq!(
        process_input(&mut app, "/attach src/main.ts"),
        CommandResult::Attach(PathBuf::from("src/main.ts"))
    );
}

#[tokio::test]
async fn detach_clears_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("x.js");
    std::fs::File::create(&path)
        .and_then(|mut f| f.write_all(b"1"))
        .unwrap();
    let mut app = test_app();
    app.chat.uploads_mut().attach(&path).await.unwrap();

    process_input(&mut app, "/detach");
    assert!(app.chat.uploads().file().is_none());
    assert_eq!(app.ui.status.as_ref().unwrap().text, "Attachment removed");
}

#[test]
fn model_command_validates_and_selects() {
    let mut app = test_app();

    process_input(&mut app, "/model qwen-3-32b");
    assert_eq!(app.chat.models().current(), "qwen-3-32b");
    assert_eq!(app.ui.status.as_ref().unwrap().text, "Model set: Qwen 3 32B");

    process_input(&mut app, "/model gpt-2");
    assert_eq!(app.chat.models().current(), "qwen-3-32b");
    assert_eq!(app.ui.status.as_ref().unwrap().kind, StatusKind::Error);
}

#[test]
fn models_overlay_marks_current_selection() {
    let mut app = test_app();
    process_input(&mut app, "/models");
    let lines = &app.ui.overlay.as_ref().unwrap().lines;
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("* gpt-oss-120b"));
    assert!(lines[1].starts_with("  llama-3.3-70b"));
}

#[test]
fn copy_defaults_to_latest_block_and_checks_range() {
    let mut app = test_app();
    assert_eq!(process_input(&mut app, "/copy"), CommandResult::Continue);
    assert_eq!(app.ui.status.as_ref().unwrap().kind, StatusKind::Error);

    app.chat
        .log_mut()
        .push(Role::Assistant, "```\none\n```\n\n```\ntwo\n```");
    assert_eq!(process_input(&mut app, "/copy"), CommandResult::Copy(2));
    assert_eq!(process_input(&mut app, "/copy 1"), CommandResult::Copy(1));
    assert_eq!(process_input(&mut app, "/copy 3"), CommandResult::Continue);
    assert_eq!(process_input(&mut app, "/copy x"), CommandResult::Continue);
}
