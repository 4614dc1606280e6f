use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

// CSI, OSC (terminated by BEL or ST, or left open), and two-byte escapes.
static ESCAPE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]?|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)?|\x1b[@-_]?")
        .expect("valid regex")
});

/// Remove terminal escape sequences and control characters from text that
/// came from the backend. Tabs and newlines survive.
pub fn sanitize_display(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_stripped_control) {
        return Cow::Borrowed(text);
    }
    let without_sequences = ESCAPE_SEQUENCE.replace_all(text, "");
    Cow::Owned(
        without_sequences
            .chars()
            .filter(|c| !is_stripped_control(*c))
            .collect(),
    )
}

fn is_stripped_control(c: char) -> bool {
    match c {
        '\t' | '\n' => false,
        '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}' => true,
        _ => false,
    }
}
