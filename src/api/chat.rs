use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use reqwest::multipart::Form;
use tracing::debug;

use crate::api::{mentions_size_limit, ChatReply, ChatRequest, CHAT_ENDPOINT};
use crate::utils::url::construct_api_url;

/// Longest body excerpt kept in errors and logs.
const BODY_SNAPSHOT_LIMIT: usize = 512;

#[derive(Debug)]
pub enum TransportError {
    /// The request never produced a response.
    Network(reqwest::Error),
    /// The backend answered with a non-success status. `backend_error` is
    /// the body's `error` field when the body was the usual JSON.
    Status {
        status: u16,
        body: String,
        backend_error: Option<String>,
    },
    /// The body was not the expected JSON.
    Decode {
        source: serde_json::Error,
        body: String,
    },
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Network(err) => err.status().map(|s| s.as_u16()),
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Decode { .. } => None,
        }
    }

    /// Whether a failed reply still says the attached file was too large.
    pub fn rejects_attachment(&self) -> bool {
        match self {
            TransportError::Status {
                backend_error: Some(error),
                ..
            } => mentions_size_limit(error),
            _ => false,
        }
    }

    pub fn body_snapshot(&self) -> Option<&str> {
        match self {
            TransportError::Network(_) => None,
            TransportError::Status { body, .. } | TransportError::Decode { body, .. } => {
                Some(body)
            }
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(err) => write!(f, "request failed: {err}"),
            TransportError::Status { status, body, .. } => {
                write!(f, "API request failed with status {status}: {body}")
            }
            TransportError::Decode { source, .. } => {
                write!(f, "could not decode response: {source}")
            }
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Network(err) => Some(err),
            TransportError::Status { .. } => None,
            TransportError::Decode { source, .. } => Some(source),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err)
    }
}

/// Sends one chat request and returns the parsed reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError>;

    /// Where requests go, for diagnostics.
    fn endpoint(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: construct_api_url(base_url, CHAT_ENDPOINT),
        }
    }
}

fn snapshot(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_SNAPSHOT_LIMIT) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

pub(crate) fn parse_reply(body: &str) -> Result<ChatReply, TransportError> {
    serde_json::from_str::<ChatReply>(body).map_err(|source| TransportError::Decode {
        source,
        body: snapshot(body),
    })
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        let form = Form::new()
            .text("question", request.question.clone())
            .text("model", request.model.clone());

        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            question_len = request.question.len(),
            "posting chat request"
        );

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let backend_error = parse_reply(&body).ok().and_then(|reply| reply.error_text());
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: snapshot(&body),
                backend_error,
            });
        }

        parse_reply(&body)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
