//! Normalizing assistant answers before they reach the transcript.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static THINK_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<think\b[^>]*>.*?</think\s*>").expect("valid regex"));
static THINK_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<think\b[^>]*>").expect("valid regex"));
static THINK_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</think\s*>").expect("valid regex"));

pub const NO_ANSWER: &str = "No answer received.";

/// Turn an arbitrary JSON answer into display text.
///
/// `null` becomes empty, strings pass through, and anything else is
/// pretty-printed rather than dropped.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Remove `<think>` reasoning from assistant output.
///
/// Complete pairs are removed with their content. A leftover closing tag
/// means the reasoning started before the text did, so everything up to it
/// goes. A leftover opening tag means it never finished, so everything from
/// it on goes. Text without markers is returned untouched.
pub fn strip_reasoning(text: &str) -> Cow<'_, str> {
    if !THINK_OPEN.is_match(text) && !THINK_CLOSE.is_match(text) {
        return Cow::Borrowed(text);
    }

    let without_pairs = THINK_PAIR.replace_all(text, "");
    let mut rest: &str = &without_pairs;

    if let Some(last_close) = THINK_CLOSE.find_iter(rest).last() {
        rest = &rest[last_close.end()..];
    }
    if let Some(open) = THINK_OPEN.find(rest) {
        rest = &rest[..open.start()];
    }

    Cow::Owned(rest.trim().to_string())
}

/// Coerce, strip, and fall back to [`NO_ANSWER`] when nothing is left.
pub fn clean_answer(answer: Option<&Value>) -> String {
    let raw = answer.map(coerce_text).unwrap_or_default();
    let cleaned = strip_reasoning(&raw);
    if cleaned.trim().is_empty() {
        NO_ANSWER.to_string()
    } else {
        cleaned.into_owned()
    }
}
