use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub system_text_style: Style,
    pub error_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub loading_indicator_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,

    // Markdown
    pub md_heading_style: Style,
    pub md_link_style: Style,
    pub md_link_url_style: Style,
    pub md_inline_code_style: Style,
    pub md_quote_style: Style,
    pub md_list_marker_style: Style,
    pub md_rule_style: Style,
    pub md_codeblock_header_style: Style,
    pub md_codeblock_text_style: Style,
    pub md_codeblock_bg: Option<Color>,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Black,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_prefix_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::White),
            system_text_style: Style::default().fg(Color::DarkGray),
            error_text_style: Style::default().fg(Color::LightRed),

            title_style: Style::default().fg(Color::Gray),
            loading_indicator_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),

            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),

            md_heading_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            md_link_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED),
            md_link_url_style: Style::default().fg(Color::DarkGray),
            md_inline_code_style: Style::default().fg(Color::LightYellow),
            md_quote_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            md_list_marker_style: Style::default().fg(Color::LightBlue),
            md_rule_style: Style::default().fg(Color::DarkGray),
            md_codeblock_header_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            md_codeblock_text_style: Style::default().fg(Color::Gray),
            md_codeblock_bg: Some(Color::Rgb(30, 30, 30)),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::White,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_prefix_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Black),
            system_text_style: Style::default().fg(Color::Gray),
            error_text_style: Style::default().fg(Color::Red),

            title_style: Style::default().fg(Color::DarkGray),
            loading_indicator_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),
            input_border_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),

            input_text_style: Style::default().fg(Color::Black),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),

            md_heading_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            md_link_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            md_link_url_style: Style::default().fg(Color::Gray),
            md_inline_code_style: Style::default().fg(Color::Magenta),
            md_quote_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            md_list_marker_style: Style::default().fg(Color::Blue),
            md_rule_style: Style::default().fg(Color::Gray),
            md_codeblock_header_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            md_codeblock_text_style: Style::default().fg(Color::Black),
            md_codeblock_bg: Some(Color::Rgb(238, 238, 238)),
        }
    }

    /// No colors at all. Used when printing to a plain stream.
    pub fn monochrome() -> Self {
        let plain = Style::default();
        Theme {
            background_color: Color::Reset,
            user_prefix_style: plain,
            user_text_style: plain,
            assistant_prefix_style: plain,
            assistant_text_style: plain,
            system_text_style: plain,
            error_text_style: plain,
            title_style: plain,
            loading_indicator_style: plain,
            input_border_style: plain,
            input_title_style: plain,
            input_text_style: plain,
            input_cursor_style: plain,
            md_heading_style: plain,
            md_link_style: plain,
            md_link_url_style: plain,
            md_inline_code_style: plain,
            md_quote_style: plain,
            md_list_marker_style: plain,
            md_rule_style: plain,
            md_codeblock_header_style: plain,
            md_codeblock_text_style: plain,
            md_codeblock_bg: None,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "monochrome" | "none" => Self::monochrome(),
            // Fallback
            _ => Self::dark_default(),
        }
    }

    pub fn md_codeblock_text(&self) -> Style {
        match self.md_codeblock_bg {
            Some(bg) => self.md_codeblock_text_style.bg(bg),
            None => self.md_codeblock_text_style,
        }
    }

    pub fn is_dark(&self) -> bool {
        match self.background_color {
            Color::Rgb(r, g, b) => {
                let luminance = 0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32;
                luminance < 128.0
            }
            Color::White | Color::Gray => false,
            _ => true,
        }
    }
}
