use super::*;
use crate::core::answer::NO_ANSWER;
use crate::core::message::Message;
use crate::core::model_selection::builtin_models;
use crate::core::preferences::MemoryPreferences;
use crate::core::upload::TOO_LARGE_MESSAGE;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

enum Scripted {
    Reply(ChatReply),
    NetworkDown,
    Status(u16),
    StatusWithError(u16, &'static str),
    Hang,
}

#[derive(Default)]
struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    seen: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    fn with(steps: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.seen.lock().unwrap().clone()
    }
}

async fn network_error() -> TransportError {
    // An unparsable URL fails inside reqwest before any socket is opened.
    let err = reqwest::Client::new()
        .post("not a url")
        .send()
        .await
        .expect_err("invalid url");
    TransportError::Network(err)
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        self.seen.lock().unwrap().push(request.clone());
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::NetworkDown) => Err(network_error().await),
            Some(Scripted::Status(status)) => Err(TransportError::Status {
                status,
                body: "upstream exploded".to_string(),
                backend_error: None,
            }),
            Some(Scripted::StatusWithError(status, error)) => Err(TransportError::Status {
                status,
                body: format!(r#"{{"error":"{error}"}}"#),
                backend_error: Some(error.to_string()),
            }),
            Some(Scripted::Hang) => std::future::pending().await,
            None => Ok(ChatReply::default()),
        }
    }

    fn endpoint(&self) -> &str {
        "http://test.invalid/api/chat"
    }
}

fn orchestrator(transport: Arc<ScriptedTransport>) -> ChatOrchestrator {
    let models =
        ModelSelectionStore::new(builtin_models(), MemoryPreferences::new(), "gpt-oss-120b");
    ChatOrchestrator::new(transport, models)
}

fn roles_and_contents(log: &ConversationLog) -> Vec<(Role, String)> {
    log.all()
        .iter()
        .map(|Message { role, content, .. }| (*role, content.clone()))
        .collect()
}

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::File::create(&path)
        .and_then(|mut f| f.write_all(contents))
        .expect("write fixture");
    path
}

#[tokio::test]
async fn hello_round_trip_produces_user_then_assistant() {
    let transport = ScriptedTransport::with([Scripted::Reply(ChatReply::answered("hi"))]);
    let mut chat = orchestrator(transport.clone());

    let outcome = chat.send("hello").await.unwrap();
    assert!(matches!(outcome, SendOutcome::Answered { .. }));

    assert_eq!(
        transport.requests(),
        vec![ChatRequest {
            question: "hello".to_string(),
            model: "gpt-oss-120b".to_string(),
        }]
    );
    assert_eq!(
        roles_and_contents(chat.log()),
        vec![
            (Role::User, "hello".to_string()),
            (Role::Assistant, "hi".to_string()),
        ]
    );
    assert!(!chat.is_loading());
}

#[tokio::test]
async fn empty_submission_is_rejected_without_network() {
    let transport = ScriptedTransport::with([]);
    let mut chat = orchestrator(transport.clone());

    let err = chat.send("   \n\t").await.unwrap_err();
    assert_eq!(err, SendRejected::Empty);
    assert_eq!(chat.notice(), Some(EMPTY_SUBMISSION_MESSAGE));
    assert!(transport.requests().is_empty());
    assert!(chat.log().is_empty());
    assert!(!chat.is_loading());
}

#[tokio::test]
async fn network_failure_appends_single_apology() {
    let transport = ScriptedTransport::with([Scripted::NetworkDown]);
    let mut chat = orchestrator(transport);

    let outcome = chat.send("hello").await.unwrap();
    assert!(matches!(outcome, SendOutcome::Failed { .. }));

    let assistant: Vec<_> = chat
        .log()
        .all()
        .iter()
        .filter(|m| m.is_assistant())
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(assistant, vec![FAILURE_REPLY]);
    assert!(!chat.is_loading());
}

#[tokio::test]
async fn error_status_is_a_failure_not_an_answer() {
    let transport = ScriptedTransport::with([Scripted::Status(500)]);
    let mut chat = orchestrator(transport);

    chat.send("hello").await.unwrap();
    assert_eq!(chat.log().last().unwrap().content, FAILURE_REPLY);
}

#[tokio::test]
async fn attachment_is_appended_to_question_but_not_to_transcript() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "main.ts", b"console.log('x');");
    let transport = ScriptedTransport::with([Scripted::Reply(ChatReply::answered("looks fine"))]);
    let mut chat = orchestrator(transport.clone());
    chat.uploads_mut().attach(&path).await.unwrap();

    chat.send("  review this  ").await.unwrap();

    let sent = transport.requests();
    assert_eq!(
        sent[0].question,
        "review this\n\n[File content from main.ts:]\nconsole.log('x');"
    );
    assert_eq!(chat.log().all()[0].content, "review this");
}

#[tokio::test]
async fn file_alone_is_enough_to_send() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.css", b"body {}");
    let transport = ScriptedTransport::with([Scripted::Reply(ChatReply::answered("ok"))]);
    let mut chat = orchestrator(transport.clone());
    chat.uploads_mut().attach(&path).await.unwrap();

    assert!(chat.can_send());
    chat.send("").await.unwrap();
    assert_eq!(
        transport.requests()[0].question,
        "\n\n[File content from a.css:]\nbody {}"
    );
}

#[tokio::test]
async fn pending_attachment_blocks_send() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "slow.js", b"1");
    let transport = ScriptedTransport::with([]);
    let mut chat = orchestrator(transport.clone());

    let pending = chat.uploads_mut().begin(&path).await.unwrap();
    assert_eq!(chat.send("hi").await.unwrap_err(), SendRejected::AttachmentPending);
    assert!(chat.log().is_empty());

    let outcome = pending.read().await;
    chat.uploads_mut().complete(outcome).unwrap();
    assert!(chat.send("hi").await.is_ok());
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn second_send_while_loading_is_busy() {
    let transport = ScriptedTransport::with([]);
    let mut chat = orchestrator(transport);

    let request = chat.begin_send("first").unwrap();
    assert!(chat.is_loading());
    assert!(!chat.can_send());
    assert_eq!(chat.begin_send("second").unwrap_err(), SendRejected::Busy);

    chat.finish_send(&request, Ok(ChatReply::answered("done")));
    assert_eq!(chat.log().len(), 2);
    assert!(!chat.is_loading());
}

#[tokio::test]
async fn user_turn_precedes_late_reply() {
    let transport = ScriptedTransport::with([]);
    let mut chat = orchestrator(transport);

    let first = chat.begin_send("one").unwrap();
    assert_eq!(roles_and_contents(chat.log()), vec![(Role::User, "one".into())]);

    tokio::time::sleep(Duration::from_millis(10)).await;
    chat.finish_send(&first, Ok(ChatReply::answered("uno")));

    let log = chat.log().all();
    assert!(log[0].is_user() && log[1].is_assistant());
    assert!(log[0].id < log[1].id);
}

#[tokio::test]
async fn reasoning_is_stripped_and_missing_answer_has_fallback() {
    let transport = ScriptedTransport::with([
        Scripted::Reply(ChatReply::answered("<think>hmm</think>Final.")),
        Scripted::Reply(ChatReply::default()),
    ]);
    let mut chat = orchestrator(transport);

    chat.send("q1").await.unwrap();
    chat.send("q2").await.unwrap();

    let answers: Vec<_> = chat
        .log()
        .all()
        .iter()
        .filter(|m| m.is_assistant())
        .map(|m| m.content.clone())
        .collect();
    assert_eq!(answers, vec!["Final.".to_string(), NO_ANSWER.to_string()]);
}

#[tokio::test]
async fn user_text_keeps_think_markers() {
    let transport = ScriptedTransport::with([Scripted::Reply(ChatReply::answered("ok"))]);
    let mut chat = orchestrator(transport);

    chat.send("what does <think>x</think> mean?").await.unwrap();
    assert_eq!(chat.log().all()[0].content, "what does <think>x</think> mean?");
}

#[tokio::test]
async fn backend_size_error_detaches_local_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.html", b"<p>hi</p>");
    let reply: ChatReply = serde_json::from_str(
        r#"{"answer":"I could not read your file.","error":"File exceeds allowed size"}"#,
    )
    .unwrap();
    let transport = ScriptedTransport::with([Scripted::Reply(reply)]);
    let mut chat = orchestrator(transport);
    chat.uploads_mut().attach(&path).await.unwrap();

    chat.send("check").await.unwrap();
    assert!(chat.uploads().file().is_none());
    assert_eq!(chat.log().last().unwrap().content, "I could not read your file.");
}

#[tokio::test]
async fn size_error_on_failed_status_detaches_local_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.scss", b"a { b: c }");
    let transport =
        ScriptedTransport::with([Scripted::StatusWithError(413, "File exceeds 5KB limit")]);
    let mut chat = orchestrator(transport);
    chat.uploads_mut().attach(&path).await.unwrap();

    let outcome = chat.send("check").await.unwrap();
    assert!(matches!(outcome, SendOutcome::Failed { .. }));
    assert_eq!(chat.log().last().unwrap().content, FAILURE_REPLY);
    assert!(chat.uploads().file().is_none());
}

#[tokio::test]
async fn plain_failed_status_keeps_the_attachment() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.scss", b"a { b: c }");
    let transport = ScriptedTransport::with([Scripted::Status(500)]);
    let mut chat = orchestrator(transport);
    chat.uploads_mut().attach(&path).await.unwrap();

    chat.send("check").await.unwrap();
    assert!(chat.uploads().file().is_some());
}

#[tokio::test]
async fn oversized_attach_leaves_nothing_to_send() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "big.tsx", &vec![b'a'; 6 * 1024]);
    let transport = ScriptedTransport::with([]);
    let mut chat = orchestrator(transport.clone());

    assert!(chat.uploads_mut().attach(&path).await.is_err());
    assert_eq!(chat.uploads().error(), Some(TOO_LARGE_MESSAGE));
    assert!(chat.send("").await.is_err());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn request_uses_currently_selected_model() {
    let transport = ScriptedTransport::with([Scripted::Reply(ChatReply::answered("ok"))]);
    let mut chat = orchestrator(transport.clone());
    chat.models_mut().select("qwen-3-32b");

    chat.send("hi").await.unwrap();
    assert_eq!(transport.requests()[0].model, "qwen-3-32b");
}

#[tokio::test]
async fn send_input_clears_the_draft() {
    let transport = ScriptedTransport::with([Scripted::Reply(ChatReply::answered("ok"))]);
    let mut chat = orchestrator(transport);
    chat.input_mut().push_str("draft text");

    chat.send_input().await.unwrap();
    assert_eq!(chat.input(), "");
    assert_eq!(chat.log().all()[0].content, "draft text");
}

#[tokio::test]
async fn cancelled_send_still_lowers_loading() {
    let transport = ScriptedTransport::with([Scripted::Hang]);
    let mut chat = orchestrator(transport);

    let result = tokio::time::timeout(Duration::from_millis(20), chat.send("hello")).await;
    assert!(result.is_err());
    assert!(!chat.is_loading());
    assert_eq!(chat.log().len(), 1);
}
