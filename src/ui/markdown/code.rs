use ratatui::text::{Line, Span};

use super::sanitize::sanitize_display;
use crate::ui::theme::Theme;

/// `[n] language`, or `[n] code` when the fence had no tag.
pub(super) fn code_block_header(index: usize, language: &str, theme: &Theme) -> Line<'static> {
    let label = if language.is_empty() { "code" } else { language };
    Line::from(vec![Span::styled(
        format!("[{index}] {}", sanitize_display(label)),
        theme.md_codeblock_header_style,
    )])
}

fn detab(line: &str) -> String {
    line.replace('\t', "    ")
}

fn plain_code_lines(code: &str, theme: &Theme) -> Vec<Line<'static>> {
    let style = theme.md_codeblock_text();
    code.lines()
        .map(|line| Line::from(vec![Span::styled(detab(line), style)]))
        .collect()
}

/// Header plus body lines for one fenced block.
pub(super) fn render_code_block(
    index: usize,
    language: &str,
    code: &str,
    theme: &Theme,
    syntax_enabled: bool,
) -> Vec<Line<'static>> {
    let code = sanitize_display(code);
    let body = if syntax_enabled && !code.is_empty() {
        crate::utils::syntax::highlight_code_block(language, &code, theme)
            .unwrap_or_else(|| plain_code_lines(&code, theme))
    } else {
        plain_code_lines(&code, theme)
    };

    let mut lines = Vec::with_capacity(body.len() + 1);
    lines.push(code_block_header(index, language, theme));
    lines.extend(body);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn header_names_block_and_language() {
        let theme = Theme::monochrome();
        assert_eq!(text(&code_block_header(2, "python", &theme)), "[2] python");
        assert_eq!(text(&code_block_header(1, "", &theme)), "[1] code");
    }

    #[test]
    fn plain_rendering_keeps_literal_text() {
        let theme = Theme::monochrome();
        let lines = render_code_block(1, "html", "<b>not bold</b>\n\tindented", &theme, false);
        let rendered: Vec<_> = lines.iter().map(text).collect();
        assert_eq!(rendered, vec!["[1] html", "<b>not bold</b>", "    indented"]);
    }

    #[test]
    fn escape_sequences_never_reach_the_terminal() {
        let theme = Theme::dark_default();
        let lines = render_code_block(1, "sh", "echo \u{1b}[2Jhi", &theme, true);
        assert!(lines.iter().all(|l| !text(l).contains('\u{1b}')));
    }
}
