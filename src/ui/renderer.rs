use crate::core::app::{App, StatusKind};
use crate::ui::markdown::render_transcript;
use crate::utils::scroll::prewrap_lines;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const MAX_INPUT_ROWS: u16 = 6;
const LOADING_TEXT: &str = "Thinking";
const EMPTY_HINT: &str = "Ask a question, or /attach a source file first. /help lists commands.";

pub fn ui(f: &mut Frame, app: &mut App) {
    let theme = app.ui.theme.clone();
    let background = Style::default().bg(theme.background_color);
    f.render_widget(Block::default().style(background), f.area());

    let banner = app.banner();
    let attachment = app.attachment_summary();
    let input_rows = (app.ui.textarea.lines().len() as u16).clamp(1, MAX_INPUT_ROWS);

    let mut constraints = vec![Constraint::Min(3)];
    if banner.is_some() {
        constraints.push(Constraint::Length(1));
    }
    if attachment.is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(input_rows + 2)); // +2 for borders

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());
    let mut next = 1;

    draw_transcript(f, app, chunks[0]);

    if let Some(status) = banner {
        let style = match status.kind {
            StatusKind::Error => theme.error_text_style,
            StatusKind::Info => theme.system_text_style,
        };
        f.render_widget(Paragraph::new(Line::styled(status.text, style)), chunks[next]);
        next += 1;
    }
    if let Some(summary) = attachment {
        f.render_widget(
            Paragraph::new(Line::styled(summary, theme.system_text_style)),
            chunks[next],
        );
        next += 1;
    }

    let input_title = if app.chat.is_loading() {
        "Waiting for the reply (Esc to quit)"
    } else {
        "Type your message (Alt+Enter for new line, /help for help, Esc to quit)"
    };
    let textarea = &mut app.ui.textarea;
    textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.input_border_style)
            .title(Line::styled(input_title, theme.input_title_style)),
    );
    textarea.set_style(theme.input_text_style);
    textarea.set_cursor_style(theme.input_cursor_style);
    f.render_widget(&*textarea, chunks[next]);

    if let Some(overlay) = &app.ui.overlay {
        let lines: Vec<Line> = overlay
            .lines
            .iter()
            .map(|line| Line::styled(line.clone(), theme.assistant_text_style))
            .collect();
        let area = centered_rect(f.area(), lines.len() as u16 + 2);
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(lines).style(background).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.input_border_style)
                    .title(Line::styled(
                        format!("{} (any key to close)", overlay.title),
                        theme.title_style,
                    )),
            ),
            area,
        );
    }
}

fn draw_transcript(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.ui.theme;
    let title = format!(
        "chatdesk v{} - {}",
        env!("CARGO_PKG_VERSION"),
        app.chat.models().display_name()
    );
    let block = Block::default().title(Line::styled(title, theme.title_style));
    let inner = block.inner(area);

    let messages = app.chat.log().all();
    let mut lines = render_transcript(messages, theme, app.ui.syntax_enabled).lines;
    if messages.is_empty() && !app.chat.is_loading() {
        lines.push(Line::styled(EMPTY_HINT, theme.system_text_style));
    }
    if app.chat.is_loading() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::styled(
            loading_text(app.ui.loading_frame),
            theme.loading_indicator_style,
        ));
    }

    let wrapped = prewrap_lines(&lines, inner.width);
    let offset = app.ui.scroll.offset(wrapped.len(), inner.height);
    app.ui.transcript_lines = wrapped.len();
    app.ui.viewport_height = inner.height;

    f.render_widget(Paragraph::new(wrapped).block(block).scroll((offset, 0)), area);
}

fn loading_text(frame: usize) -> String {
    format!("{LOADING_TEXT}{}", ".".repeat(frame % 4))
}

fn centered_rect(area: Rect, height: u16) -> Rect {
    let width = area.width.saturating_sub(4).min(72);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}
