//! Wire types and transport for the backend chat endpoint.
//!
//! The backend exposes a single `POST {base_url}/api/chat` that takes a
//! multipart form (`question`, `model`) and answers with JSON.

use serde::Deserialize;
use serde_json::Value;

pub mod chat;

pub use chat::{ChatTransport, HttpTransport, TransportError};

/// Path of the chat endpoint relative to the base URL.
pub const CHAT_ENDPOINT: &str = "api/chat";

/// Outbound payload, sent as multipart form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub question: String,
    pub model: String,
}

/// Parsed response body. Both fields are optional on the wire and may be
/// of any JSON type.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ChatReply {
    #[serde(default)]
    pub answer: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ChatReply {
    pub fn answered(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(Value::String(answer.into())),
            error: None,
        }
    }

    /// The `error` field as text, when present and non-null.
    pub fn error_text(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Whether the backend reports that the attached file was too large.
    pub fn rejects_attachment(&self) -> bool {
        self.error_text()
            .map(|text| mentions_size_limit(&text))
            .unwrap_or(false)
    }
}

/// The backend's wording for an oversized upload, whatever the status code.
pub fn mentions_size_limit(error: &str) -> bool {
    error.to_ascii_lowercase().contains("exceed")
}
