use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Pre-wrap `lines` to `width` columns at word boundaries, breaking words
/// that are longer than a full row. Rendering the result without ratatui's
/// own wrapping keeps the scroll math exact.
pub fn prewrap_lines(lines: &[Line<'_>], width: u16) -> Vec<Line<'static>> {
    let width = width as usize;
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if width == 0 {
            out.push(owned_line(line));
            continue;
        }
        wrap_line(line, width, &mut out);
    }
    out
}

fn owned_line(line: &Line<'_>) -> Line<'static> {
    Line::from(
        line.spans
            .iter()
            .map(|span| Span::styled(span.content.to_string(), span.style))
            .collect::<Vec<_>>(),
    )
}

/// Characters of the word being collected, with their style and width.
type Glyphs = Vec<(char, Style, usize)>;

#[derive(Default)]
struct Row {
    cells: Vec<(char, Style)>,
    width: usize,
}

impl Row {
    fn push(&mut self, ch: char, style: Style, ch_width: usize) {
        self.cells.push((ch, style));
        self.width += ch_width;
    }

    fn take_line(&mut self) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut text = String::new();
        let mut style = None;
        for (ch, cell_style) in self.cells.drain(..) {
            if style.is_some_and(|s| s != cell_style) {
                spans.push(Span::styled(std::mem::take(&mut text), style.unwrap_or_default()));
            }
            style = Some(cell_style);
            text.push(ch);
        }
        if !text.is_empty() {
            spans.push(Span::styled(text, style.unwrap_or_default()));
        }
        self.width = 0;
        Line::from(spans)
    }
}

fn wrap_line(line: &Line<'_>, width: usize, out: &mut Vec<Line<'static>>) {
    let mut row = Row::default();
    let mut word: Glyphs = Vec::new();
    let mut emitted = false;

    let place_word = |row: &mut Row, word: &mut Glyphs, out: &mut Vec<Line<'static>>| {
        let word_width: usize = word.iter().map(|(_, _, w)| w).sum();
        if word_width == 0 {
            word.clear();
            return false;
        }
        let mut wrapped = false;
        if row.width > 0 && row.width + word_width > width {
            out.push(row.take_line());
            wrapped = true;
        }
        for (ch, style, ch_width) in word.drain(..) {
            if row.width > 0 && row.width + ch_width > width {
                out.push(row.take_line());
                wrapped = true;
            }
            row.push(ch, style, ch_width);
        }
        wrapped
    };

    for span in &line.spans {
        for ch in span.content.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if ch == ' ' {
                emitted |= place_word(&mut row, &mut word, out);
                if row.width < width {
                    row.push(' ', span.style, 1);
                } else {
                    out.push(row.take_line());
                    emitted = true;
                }
            } else {
                word.push((ch, span.style, ch_width));
            }
        }
    }
    emitted |= place_word(&mut row, &mut word, out);

    if !row.cells.is_empty() || !emitted {
        out.push(row.take_line());
    }
}

/// Vertical position of the transcript view.
///
/// While following, the view sticks to the newest line. Scrolling up
/// detaches it; reaching the bottom again or a scroll-to-latest request
/// reattaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    offset: u16,
    follow_latest: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            follow_latest: true,
        }
    }
}

impl ScrollState {
    pub fn max_offset(total_lines: usize, viewport_height: u16) -> u16 {
        let total = u16::try_from(total_lines).unwrap_or(u16::MAX);
        total.saturating_sub(viewport_height)
    }

    /// Offset to draw with, clamped to the content.
    pub fn offset(&self, total_lines: usize, viewport_height: u16) -> u16 {
        let max = Self::max_offset(total_lines, viewport_height);
        if self.follow_latest {
            max
        } else {
            self.offset.min(max)
        }
    }

    pub fn is_following(&self) -> bool {
        self.follow_latest
    }

    pub fn follow_latest(&mut self) {
        self.follow_latest = true;
    }

    pub fn scroll_up(&mut self, lines: u16, total_lines: usize, viewport_height: u16) {
        let current = self.offset(total_lines, viewport_height);
        self.offset = current.saturating_sub(lines);
        self.follow_latest = false;
    }

    pub fn scroll_down(&mut self, lines: u16, total_lines: usize, viewport_height: u16) {
        let max = Self::max_offset(total_lines, viewport_height);
        let next = self.offset(total_lines, viewport_height).saturating_add(lines);
        if next >= max {
            self.follow_latest = true;
        } else {
            self.offset = next;
        }
    }
}
