//! TUI color theme

use ratatui::style::Color;

/// TUI color theme
#[derive(Debug, Clone)]
pub struct Theme {
    pub text: Color,
    pub text_muted: Color,
    pub border: Color,
    pub accent: Color,
    pub error: Color,
    pub user_label: Color,
    pub assistant_label: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            text: Color::Rgb(212, 212, 212),
            text_muted: Color::Rgb(128, 128, 128),
            border: Color::Rgb(60, 60, 60),
            accent: Color::Rgb(0, 122, 204),
            error: Color::Rgb(244, 67, 54),
            // bc-yellow / bc-red from the web palette
            user_label: Color::Rgb(243, 189, 72),
            assistant_label: Color::Rgb(136, 35, 70),
        }
    }
}
