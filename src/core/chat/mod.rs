//! Request composition and reply routing.
//!
//! A send is two transitions on the orchestrator. [`ChatOrchestrator::begin_send`]
//! validates the draft, appends the user turn, and raises `loading`, all
//! before any I/O. [`ChatOrchestrator::finish_send`] takes whatever the
//! transport produced and appends exactly one assistant turn. `send` runs
//! both around the transport call; the interactive loop instead runs the
//! call on a spawned task and feeds the result back.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::api::{ChatReply, ChatRequest, ChatTransport, TransportError};
use crate::core::answer::clean_answer;
use crate::core::conversation::ConversationLog;
use crate::core::message::Role;
use crate::core::model_selection::ModelSelectionStore;
use crate::core::upload::FileUploadManager;

#[cfg(test)]
mod tests;

pub const EMPTY_SUBMISSION_MESSAGE: &str = "Please enter a message or upload a file.";
pub const FAILURE_REPLY: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejected {
    /// A request is already in flight.
    Busy,
    /// The attached file has not finished reading.
    AttachmentPending,
    /// Neither text nor file content to send.
    Empty,
}

impl fmt::Display for SendRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendRejected::Busy => write!(f, "a message is already being sent"),
            SendRejected::AttachmentPending => write!(f, "the attached file is still loading"),
            SendRejected::Empty => write!(f, "{EMPTY_SUBMISSION_MESSAGE}"),
        }
    }
}

impl StdError for SendRejected {}

/// What `finish_send` did with a transport result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Answered { message_id: u64 },
    Failed { message_id: u64 },
}

/// Build the `question` field: the user's text plus the attached file.
pub fn compose_question(text: &str, attachment: Option<(&str, &str)>) -> String {
    match attachment {
        Some((name, content)) => {
            format!("{text}\n\n[File content from {name}:]\n{content}")
        }
        None => text.to_string(),
    }
}

pub struct ChatOrchestrator {
    transport: Arc<dyn ChatTransport>,
    log: ConversationLog,
    uploads: FileUploadManager,
    models: ModelSelectionStore,
    input: String,
    notice: Option<String>,
}

impl ChatOrchestrator {
    pub fn new(transport: Arc<dyn ChatTransport>, models: ModelSelectionStore) -> Self {
        Self {
            transport,
            log: ConversationLog::new(),
            uploads: FileUploadManager::new(),
            models,
            input: String::new(),
            notice: None,
        }
    }

    pub fn transport(&self) -> Arc<dyn ChatTransport> {
        Arc::clone(&self.transport)
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ConversationLog {
        &mut self.log
    }

    pub fn uploads(&self) -> &FileUploadManager {
        &self.uploads
    }

    pub fn uploads_mut(&mut self) -> &mut FileUploadManager {
        &mut self.uploads
    }

    pub fn models(&self) -> &ModelSelectionStore {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut ModelSelectionStore {
        &mut self.models
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    /// Validation message from the last rejected send, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_loading(&self) -> bool {
        self.log.is_loading()
    }

    /// Whether a send issued now would get past the gating checks.
    pub fn can_send(&self) -> bool {
        !self.is_loading()
            && !self.uploads.is_pending()
            && (!self.input.trim().is_empty() || self.has_attachment_content())
    }

    fn has_attachment_content(&self) -> bool {
        self.uploads
            .content()
            .map(|content| !content.is_empty())
            .unwrap_or(false)
    }

    /// First phase of a send. Appends the user turn and raises `loading`.
    ///
    /// On success the draft input is cleared and the returned request is
    /// ready for the transport.
    pub fn begin_send(&mut self, text: &str) -> Result<ChatRequest, SendRejected> {
        if self.is_loading() {
            return Err(SendRejected::Busy);
        }
        if self.uploads.is_pending() {
            return Err(SendRejected::AttachmentPending);
        }

        let trimmed = text.trim();
        if trimmed.is_empty() && !self.has_attachment_content() {
            self.notice = Some(EMPTY_SUBMISSION_MESSAGE.to_string());
            return Err(SendRejected::Empty);
        }
        self.notice = None;

        let attachment = self
            .uploads
            .file()
            .filter(|file| !file.text_content.is_empty())
            .map(|file| (file.name.as_str(), file.text_content.as_str()));
        let request = ChatRequest {
            question: compose_question(trimmed, attachment),
            model: self.models.current().to_string(),
        };

        self.log.push(Role::User, trimmed);
        self.input.clear();
        self.log.set_loading(true);
        Ok(request)
    }

    /// Second phase of a send. Appends the assistant turn, lowers `loading`.
    pub fn finish_send(
        &mut self,
        request: &ChatRequest,
        result: Result<ChatReply, TransportError>,
    ) -> SendOutcome {
        let outcome = match result {
            Ok(reply) => self.apply_reply(reply),
            Err(err) => self.apply_failure(request, &err),
        };
        self.log.set_loading(false);
        outcome
    }

    fn apply_reply(&mut self, reply: ChatReply) -> SendOutcome {
        let answer = clean_answer(reply.answer.as_ref());
        let message_id = self.log.push(Role::Assistant, answer);

        if reply.rejects_attachment() {
            warn!(
                error = %reply.error_text().unwrap_or_default(),
                "backend rejected the attached file; detaching it"
            );
            self.uploads.remove();
        } else if let Some(backend_error) = reply.error_text() {
            debug!(error = %backend_error, "backend reported an error alongside its answer");
        }

        SendOutcome::Answered { message_id }
    }

    fn apply_failure(&mut self, request: &ChatRequest, err: &TransportError) -> SendOutcome {
        error!(
            endpoint = %self.transport.endpoint(),
            status = ?err.status(),
            body = err.body_snapshot().unwrap_or(""),
            model = %request.model,
            question_len = request.question.len(),
            error = %err,
            "chat request failed"
        );
        if err.rejects_attachment() {
            warn!("backend rejected the attached file; detaching it");
            self.uploads.remove();
        }
        let message_id = self.log.push(Role::Assistant, FAILURE_REPLY);
        SendOutcome::Failed { message_id }
    }

    /// Validate, send, and route the reply, all in one call.
    ///
    /// `loading` is lowered on every exit path, including when this future
    /// is dropped before the transport answers.
    pub async fn send(&mut self, text: &str) -> Result<SendOutcome, SendRejected> {
        let request = self.begin_send(text)?;
        let transport = self.transport();

        let guard = LoadingGuard {
            log: Some(&mut self.log),
        };
        let result = transport.send(&request).await;
        guard.disarm();

        Ok(self.finish_send(&request, result))
    }

    pub async fn send_input(&mut self) -> Result<SendOutcome, SendRejected> {
        let text = self.input.clone();
        self.send(&text).await
    }
}

/// Lowers `loading` if dropped while still armed.
struct LoadingGuard<'a> {
    log: Option<&'a mut ConversationLog>,
}

impl LoadingGuard<'_> {
    fn disarm(mut self) {
        self.log = None;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if let Some(log) = self.log.take() {
            log.set_loading(false);
        }
    }
}
