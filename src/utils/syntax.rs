//! syntect highlighting for fenced code blocks.

use std::collections::{HashMap, VecDeque};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{LazyLock, Mutex};

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::ui::theme::Theme;

const CACHE_CAPACITY: usize = 64;
const DARK_THEME: &str = "base16-ocean.dark";
const LIGHT_THEME: &str = "InspiredGitHub";

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);
static CACHE: LazyLock<Mutex<HighlightCache>> =
    LazyLock::new(|| Mutex::new(HighlightCache::new(CACHE_CAPACITY)));

/// Bounded FIFO of highlighted blocks, keyed by a hash of language, code,
/// and the colors they were highlighted against.
struct HighlightCache {
    entries: HashMap<u64, Vec<Line<'static>>>,
    order: VecDeque<u64>,
    capacity: usize,
}

impl HighlightCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, key: u64) -> Option<Vec<Line<'static>>> {
        self.entries.get(&key).cloned()
    }

    fn put(&mut self, key: u64, lines: Vec<Line<'static>>) {
        if self.entries.insert(key, lines).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }
}

pub(crate) fn normalize_language(hint: &str) -> String {
    let lower = hint.trim().to_ascii_lowercase();
    match lower.as_str() {
        "py" => "python".into(),
        "sh" | "zsh" | "shell" => "bash".into(),
        "js" | "jsx" | "mjs" => "javascript".into(),
        "ts" | "tsx" => "typescript".into(),
        "yml" => "yaml".into(),
        "rs" => "rust".into(),
        "h" => "c".into(),
        "cc" | "cxx" | "hpp" | "hxx" => "cpp".into(),
        "kt" => "kotlin".into(),
        "scss" | "sass" => "css".into(),
        "htm" => "html".into(),
        _ => lower,
    }
}

pub(crate) fn syntect_theme_name(theme: &Theme) -> &'static str {
    if theme.is_dark() {
        DARK_THEME
    } else {
        LIGHT_THEME
    }
}

fn cache_key(language: &str, code: &str, theme: &Theme) -> u64 {
    let mut hasher = DefaultHasher::new();
    language.hash(&mut hasher);
    code.hash(&mut hasher);
    syntect_theme_name(theme).hash(&mut hasher);
    format!("{:?}", theme.md_codeblock_bg).hash(&mut hasher);
    hasher.finish()
}

/// Highlight `code` as `language`. `None` means the caller should fall back
/// to plain lines.
pub fn highlight_code_block(
    language: &str,
    code: &str,
    theme: &Theme,
) -> Option<Vec<Line<'static>>> {
    let language = normalize_language(language);
    let key = cache_key(&language, code, theme);
    if let Some(lines) = CACHE.lock().ok().and_then(|cache| cache.get(key)) {
        return Some(lines);
    }

    let syntax_theme = THEMES.themes.get(syntect_theme_name(theme))?;
    let syntax = SYNTAXES
        .find_syntax_by_token(&language)
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, syntax_theme);

    let mut lines = Vec::new();
    for source_line in LinesWithEndings::from(code) {
        let ranges = highlighter.highlight_line(source_line, &SYNTAXES).ok()?;
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .map(|(style, fragment)| {
                let fragment = fragment.trim_end_matches(['\n', '\r']);
                let fg = style.foreground;
                let mut span_style = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
                if let Some(bg) = theme.md_codeblock_bg {
                    span_style = span_style.bg(bg);
                }
                Span::styled(fragment.replace('\t', "    "), span_style)
            })
            .filter(|span| !span.content.is_empty())
            .collect();
        lines.push(Line::from(spans));
    }

    if let Ok(mut cache) = CACHE.lock() {
        cache.put(key, lines.clone());
    }
    Some(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_aliases() {
        assert_eq!(normalize_language("py"), "python");
        assert_eq!(normalize_language(" JS "), "javascript");
        assert_eq!(normalize_language("TsX"), "typescript");
        assert_eq!(normalize_language("scss"), "css");
        assert_eq!(normalize_language("rust"), "rust");
    }

    #[test]
    fn theme_choice_follows_background() {
        assert_eq!(syntect_theme_name(&Theme::dark_default()), DARK_THEME);
        assert_eq!(syntect_theme_name(&Theme::light()), LIGHT_THEME);
    }

    #[test]
    fn highlighting_keeps_text_and_line_count() {
        let code = "fn main() {\n\tprintln!(\"hi\");\n}";
        let lines = highlight_code_block("rs", code, &Theme::dark_default()).expect("highlighted");
        assert_eq!(lines.len(), 3);
        let second: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(second, "    println!(\"hi\");");
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text_syntax() {
        let lines =
            highlight_code_block("no-such-lang", "a\nb", &Theme::light()).expect("highlighted");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn cache_evicts_oldest_entry() {
        let mut cache = HighlightCache::new(2);
        cache.put(1, vec![Line::from("one")]);
        cache.put(2, vec![Line::from("two")]);
        cache.put(3, vec![Line::from("three")]);
        assert!(cache.get(1).is_none());
        assert!(cache.get(3).is_some());
    }
}
