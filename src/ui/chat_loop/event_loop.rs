use std::{error::Error, io, path::PathBuf, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::{ChatReply, ChatRequest, TransportError};
use crate::commands::{process_input, CommandResult};
use crate::core::app::App;
use crate::core::chat::SendRejected;
use crate::core::upload::ReadOutcome;
use crate::ui::markdown::copy_code_block;
use crate::ui::renderer::ui;
use crate::utils::clipboard::ClipboardMethod;

use super::lifecycle::ChatTerminal;

const TICK: Duration = Duration::from_millis(120);

#[derive(Debug)]
enum UiEvent {
    Crossterm(Event),
}

/// Work finished off the loop, waiting to be applied to the app.
#[derive(Debug)]
pub enum LoopEvent {
    Reply {
        request: ChatRequest,
        result: Result<ChatReply, TransportError>,
    },
    FileRead(ReadOutcome),
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

pub(super) async fn run<W: io::Write>(
    terminal: &mut ChatTerminal<W>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let (work_tx, mut work_rx) = mpsc::unbounded_channel::<LoopEvent>();
    let mut scroll_rx = app.chat.log_mut().subscribe_scroll();
    let mut ticker = tokio::time::interval(TICK);

    let result = loop {
        if let Err(err) = terminal.draw(|f| ui(f, app)) {
            break Err(err.into());
        }
        if app.ui.exit_requested {
            break Ok(());
        }

        tokio::select! {
            Some(UiEvent::Crossterm(ev)) = event_rx.recv() => match ev {
                Event::Key(key) => handle_key(app, key, &work_tx).await,
                Event::Paste(text) => handle_paste(app, &text),
                _ => {}
            },
            Some(done) = work_rx.recv() => handle_loop_event(app, done),
            Some(_) = scroll_rx.recv() => app.ui.scroll.follow_latest(),
            _ = ticker.tick() => {
                if app.chat.is_loading() {
                    app.ui.loading_frame = app.ui.loading_frame.wrapping_add(1);
                }
            }
        }
    };

    event_reader_handle.abort();
    result
}

/// Apply the result of a spawned transport call or file read.
pub fn handle_loop_event(app: &mut App, event: LoopEvent) {
    match event {
        LoopEvent::Reply { request, result } => {
            let outcome = app.chat.finish_send(&request, result);
            debug!(?outcome, "reply applied");
        }
        LoopEvent::FileRead(outcome) => {
            if let Err(rejection) = app.chat.uploads_mut().complete(outcome) {
                debug!(error = %rejection, "attachment read failed");
            }
        }
    }
}

pub async fn handle_key(app: &mut App, key: KeyEvent, work_tx: &mpsc::UnboundedSender<LoopEvent>) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if app.ui.overlay.take().is_some() {
        return;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.request_exit(),
        KeyCode::Esc => app.request_exit(),
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            app.ui.textarea.insert_newline();
            app.sync_input();
        }
        KeyCode::Enter => submit(app, work_tx).await,
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => {
            let page = app.page_size();
            app.scroll_up(page);
        }
        KeyCode::PageDown => {
            let page = app.page_size();
            app.scroll_down(page);
        }
        KeyCode::End => app.ui.scroll.follow_latest(),
        _ => {
            app.ui.textarea.input(tui_textarea::Input::from(key));
            app.sync_input();
            app.clear_status();
        }
    }
}

pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    let without_crlf = text.replace("\r\n", "\n");
    let without_cr = without_crlf.replace('\r', "\n");
    let expanded_tabs = without_cr.replace('\t', "    ");
    expanded_tabs
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

pub fn handle_paste(app: &mut App, text: &str) {
    let sanitized = sanitize_pasted_text(text);
    if sanitized.is_empty() {
        return;
    }
    app.ui.textarea.insert_str(sanitized);
    app.sync_input();
}

async fn submit(app: &mut App, work_tx: &mpsc::UnboundedSender<LoopEvent>) {
    let input = app.input_text();
    match process_input(app, &input) {
        CommandResult::Continue => app.clear_input(),
        CommandResult::ProcessAsMessage(text) => start_send(app, &text, work_tx),
        CommandResult::Attach(path) => {
            app.clear_input();
            start_attach(app, path, work_tx).await;
        }
        CommandResult::Copy(index) => {
            app.clear_input();
            copy_block(app, index);
        }
    }
}

fn start_send(app: &mut App, text: &str, work_tx: &mpsc::UnboundedSender<LoopEvent>) {
    match app.chat.begin_send(text) {
        Ok(request) => {
            app.clear_input();
            app.ui.status = None;
            let transport = app.chat.transport();
            let tx = work_tx.clone();
            tokio::spawn(async move {
                let result = transport.send(&request).await;
                let _ = tx.send(LoopEvent::Reply { request, result });
            });
        }
        // The orchestrator's notice already explains this one.
        Err(SendRejected::Empty) => {}
        Err(rejected) => app.set_error(format!("Cannot send yet: {rejected}")),
    }
}

async fn start_attach(app: &mut App, path: PathBuf, work_tx: &mpsc::UnboundedSender<LoopEvent>) {
    app.clear_status();
    match app.chat.uploads_mut().begin(&path).await {
        Ok(pending) => {
            let tx = work_tx.clone();
            tokio::spawn(async move {
                let outcome = pending.read().await;
                let _ = tx.send(LoopEvent::FileRead(outcome));
            });
        }
        Err(rejection) => debug!(error = %rejection, "attachment rejected"),
    }
}

fn copy_block(app: &mut App, index: usize) {
    let mut stdout = io::stdout();
    match copy_code_block(app.chat.log().all(), index, &mut stdout) {
        Ok(ClipboardMethod::Command) => app.set_status(format!("Copied code block [{index}]")),
        Ok(ClipboardMethod::Osc52) => {
            app.set_status(format!("Sent code block [{index}] to the terminal clipboard"))
        }
        Err(err) => app.set_error(err.to_string()),
    }
}
