//! In-memory transcript for the live session.
//!
//! The log is append-only: messages keep their insertion order, which is
//! also the display order. It owns the `loading` flag as well, because the
//! presentation layer scrolls to the newest entry whenever either the
//! transcript or the loading indicator changes.

use tokio::sync::mpsc;

use crate::core::message::{Message, Role};

/// Notification sent to the presentation layer after a visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    Latest,
}

#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
    next_id: u64,
    loading: bool,
    scroll_subscribers: Vec<mpsc::UnboundedSender<ScrollRequest>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Build a message carrying the next session-unique id.
    pub fn compose(&mut self, role: Role, content: impl Into<String>) -> Message {
        let id = self.next_id.max(1);
        self.next_id = id.saturating_add(1);
        Message::new(id, role, content)
    }

    pub fn append(&mut self, message: Message) {
        if message.id >= self.next_id {
            self.next_id = message.id.saturating_add(1);
        }
        self.messages.push(message);
        self.notify_scroll();
    }

    /// Compose and append in one step, returning the new message id.
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> u64 {
        let message = self.compose(role, content);
        let id = message.id;
        self.append(message);
        id
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.notify_scroll();
        }
    }

    pub fn subscribe_scroll(&mut self) -> mpsc::UnboundedReceiver<ScrollRequest> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.scroll_subscribers.push(tx);
        rx
    }

    fn notify_scroll(&mut self) {
        self.scroll_subscribers
            .retain(|tx| tx.send(ScrollRequest::Latest).is_ok());
    }
}
