use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use super::sanitize::sanitize_display;
use crate::ui::theme::Theme;

const RULE_WIDTH: usize = 24;

#[derive(Clone, Copy, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

/// Render a prose segment as styled lines.
///
/// Fenced code never reaches this renderer; tilde and indented blocks that
/// do are shown as literal lines without a copy index.
pub(super) fn render_prose(text: &str, theme: &Theme) -> Vec<Line<'static>> {
    // Entities can still decode to controls, so spans are sanitized again.
    ProseRenderer::new(theme).render(&sanitize_display(text))
}

struct ProseRenderer<'t> {
    theme: &'t Theme,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    link_stack: Vec<(String, usize)>,
    pending_marker: Option<String>,
    marker_width: usize,
    quote_depth: usize,
    in_code_block: bool,
    needs_gap: bool,
}

impl<'t> ProseRenderer<'t> {
    fn new(theme: &'t Theme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: vec![theme.assistant_text_style],
            list_stack: Vec::new(),
            link_stack: Vec::new(),
            pending_marker: None,
            marker_width: 0,
            quote_depth: 0,
            in_code_block: false,
            needs_gap: false,
        }
    }

    fn render(mut self, text: &str) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        for event in Parser::new_ext(text, options) {
            match event {
                Event::Start(tag) => self.start(tag),
                Event::End(tag) => self.end(tag),
                Event::Text(text) => {
                    let text = sanitize_display(&text).into_owned();
                    if self.in_code_block {
                        let style = self.theme.md_codeblock_text();
                        for line in text.lines() {
                            self.current
                                .push(Span::styled(line.replace('\t', "    "), style));
                            self.flush();
                        }
                    } else {
                        self.push_text(text);
                    }
                }
                Event::Code(code) => {
                    let span = Span::styled(
                        sanitize_display(&code).into_owned(),
                        self.theme.md_inline_code_style,
                    );
                    self.current.push(span);
                }
                Event::Html(html) => {
                    for line in sanitize_display(&html).lines() {
                        self.push_text(line.to_string());
                        self.flush();
                    }
                }
                Event::InlineHtml(html) => self.push_text(sanitize_display(&html).into_owned()),
                Event::SoftBreak => self.push_text(" ".to_string()),
                Event::HardBreak => self.flush(),
                Event::Rule => {
                    self.start_block();
                    self.current.push(Span::styled(
                        "─".repeat(RULE_WIDTH),
                        self.theme.md_rule_style,
                    ));
                    self.flush();
                    self.needs_gap = true;
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "[x] " } else { "[ ] " };
                    self.current
                        .push(Span::styled(marker, self.theme.md_list_marker_style));
                }
                _ => {}
            }
        }
        self.flush();
        self.lines
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::HtmlBlock => self.start_block(),
            Tag::Heading { .. } => {
                self.start_block();
                self.push_style(self.theme.md_heading_style);
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.quote_depth += 1;
                self.push_style(self.theme.md_quote_style);
            }
            Tag::CodeBlock(_) => {
                self.start_block();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.list_stack.is_empty() {
                    self.start_block();
                } else {
                    self.flush();
                }
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
            }
            Tag::Item => {
                self.flush();
                if self.needs_gap {
                    self.lines.push(Line::from(""));
                    self.needs_gap = false;
                }
                let marker = match self.list_stack.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                self.marker_width = marker.chars().count();
                self.pending_marker = Some(marker);
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.link_stack
                    .push((dest_url.to_string(), self.current.len()));
                self.push_style(self.theme.md_link_style);
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::HtmlBlock => {
                self.flush();
                self.needs_gap = true;
            }
            TagEnd::Heading(_) => {
                self.flush();
                self.style_stack.pop();
                self.needs_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.style_stack.pop();
                self.needs_gap = true;
            }
            TagEnd::CodeBlock => {
                self.flush();
                self.in_code_block = false;
                self.needs_gap = true;
            }
            TagEnd::List(_) => {
                self.flush();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.needs_gap = true;
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.style_stack.pop();
            }
            TagEnd::Link | TagEnd::Image => {
                self.style_stack.pop();
                if let Some((url, first_span)) = self.link_stack.pop() {
                    let label: String = self.current[first_span.min(self.current.len())..]
                        .iter()
                        .map(|span| span.content.as_ref())
                        .collect();
                    if !url.is_empty() && label != url {
                        self.current.push(Span::styled(
                            format!(" ({})", sanitize_display(&url)),
                            self.theme.md_link_url_style,
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack
            .last()
            .copied()
            .unwrap_or(self.theme.assistant_text_style)
    }

    fn push_style(&mut self, style: Style) {
        let next = self.current_style().patch(style);
        self.style_stack.push(next);
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let next = self.current_style().add_modifier(modifier);
        self.style_stack.push(next);
    }

    fn push_text(&mut self, text: String) {
        if !text.is_empty() {
            let style = self.current_style();
            self.current.push(Span::styled(text, style));
        }
    }

    /// Separate this block from the previous one with a blank line.
    fn start_block(&mut self) {
        self.flush();
        if self.needs_gap && !self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        self.needs_gap = false;
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = self.line_prefix();
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn line_prefix(&mut self) -> Vec<Span<'static>> {
        let mut prefix = Vec::new();
        if self.quote_depth > 0 {
            prefix.push(Span::styled(
                "│ ".repeat(self.quote_depth),
                self.theme.md_quote_style,
            ));
        }
        if let Some(depth) = self.list_stack.len().checked_sub(1) {
            let indent = "  ".repeat(depth);
            match self.pending_marker.take() {
                Some(marker) => {
                    prefix.push(Span::raw(indent));
                    prefix.push(Span::styled(marker, self.theme.md_list_marker_style));
                }
                None => prefix.push(Span::raw(format!(
                    "{indent}{}",
                    " ".repeat(self.marker_width)
                ))),
            }
        }
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn render(text: &str) -> Vec<Line<'static>> {
        render_prose(text, &Theme::dark_default())
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        assert_eq!(plain(&render("one\ntwo\n\nthree")), vec!["one two", "", "three"]);
    }

    #[test]
    fn emphasis_and_strong_apply_modifiers() {
        let lines = render("*it* **bold** ~~gone~~");
        let spans = &lines[0].spans;
        let find = |text: &str| spans.iter().find(|s| s.content == text).unwrap().style;
        assert!(find("it").add_modifier.contains(Modifier::ITALIC));
        assert!(find("bold").add_modifier.contains(Modifier::BOLD));
        assert!(find("gone").add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn lists_get_markers_and_nesting() {
        let lines = render("- a\n- b\n  - c\n\n1. x\n2. y");
        assert_eq!(plain(&lines), vec!["- a", "- b", "  - c", "", "1. x", "2. y"]);
    }

    #[test]
    fn links_show_their_target() {
        assert_eq!(
            plain(&render("[docs](https://example.com)")),
            vec!["docs (https://example.com)"]
        );
        assert_eq!(
            plain(&render("<https://example.com>")),
            vec!["https://example.com"]
        );
    }

    #[test]
    fn inline_code_is_literal_and_styled() {
        let theme = Theme::dark_default();
        let lines = render_prose("run `**not bold**` now", &theme);
        let code = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "**not bold**")
            .expect("inline code span");
        assert_eq!(code.style, theme.md_inline_code_style);
    }

    #[test]
    fn raw_html_is_shown_literally() {
        assert_eq!(plain(&render("a <b>tag</b>")), vec!["a <b>tag</b>"]);
        assert_eq!(
            plain(&render("<div>\nblock\n</div>")),
            vec!["<div>", "block", "</div>"]
        );
    }

    #[test]
    fn quotes_headings_and_rules() {
        let lines = plain(&render("# Title\n\n> quoted\n\n---\n\nend"));
        assert_eq!(lines[0], "Title");
        assert_eq!(lines[2], "│ quoted");
        assert_eq!(lines[4], "─".repeat(RULE_WIDTH));
        assert_eq!(lines[6], "end");
    }

    #[test]
    fn escape_sequences_are_removed() {
        let lines = plain(&render("safe \u{1b}[2Jtext\u{7}"));
        assert_eq!(lines, vec!["safe text"]);
    }

    #[test]
    fn tilde_block_renders_literally() {
        assert_eq!(plain(&render("~~~\n*raw*\n~~~")), vec!["*raw*"]);
    }
}
