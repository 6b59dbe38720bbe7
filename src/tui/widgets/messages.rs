//! Message list widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, StatefulWidget, Widget},
};

use crate::chat::{ChatMessage, Content, Role};
use crate::tui::theme::Theme;

/// Shown in place of an assistant reply that has no text yet
const PENDING_TEXT: &str = "Thinking...";

/// Scroll state for the message list
#[derive(Debug)]
pub struct MessageListState {
    /// Current scroll offset (in lines)
    pub offset: usize,
    /// Total content height (in lines)
    pub content_height: usize,
    /// Viewport height
    pub viewport_height: usize,
    /// Stick to the bottom as new text streams in
    pub follow: bool,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self {
            offset: 0,
            content_height: 0,
            viewport_height: 0,
            follow: true,
        }
    }
}

impl MessageListState {
    fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.offset = self.offset.min(self.max_offset()).saturating_sub(amount);
        self.follow = false;
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.offset = (self.offset + amount).min(self.max_offset());
        self.follow = self.offset >= self.max_offset();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.follow = true;
    }
}

/// Widget for rendering the message list
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    is_generating: bool,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            is_generating: false,
        }
    }

    pub fn generating(mut self, is_generating: bool) -> Self {
        self.is_generating = is_generating;
        self
    }

    /// Lay out every message at `width` columns.
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let width = width.max(1);
        let mut lines = Vec::new();

        for msg in self.messages {
            let (label, color) = match msg.role {
                Role::User => ("You", self.theme.user_label),
                Role::Assistant => ("Assistant", self.theme.assistant_label),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));

            match &msg.content {
                Content::Pending => lines.push(Line::from(Span::styled(
                    PENDING_TEXT,
                    Style::default()
                        .fg(self.theme.text_muted)
                        .add_modifier(Modifier::ITALIC),
                ))),
                Content::Text(text) => {
                    let style = Style::default().fg(self.theme.text);
                    for line in textwrap::wrap(text, width) {
                        lines.push(Line::from(Span::styled(line.into_owned(), style)));
                    }
                }
            }

            // Spacer
            lines.push(Line::default());
        }

        if self.is_generating {
            lines.push(Line::from(Span::styled(
                "● Generating...",
                Style::default().fg(self.theme.accent),
            )));
        }

        lines
    }
}

impl StatefulWidget for MessageList<'_> {
    type State = MessageListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let lines = self.lines(area.width as usize);

        state.content_height = lines.len();
        state.viewport_height = area.height as usize;
        if state.follow {
            state.offset = state.max_offset();
        } else {
            state.offset = state.offset.min(state.max_offset());
        }

        let visible: Vec<Line<'static>> = lines
            .into_iter()
            .skip(state.offset)
            .take(area.height as usize)
            .collect();
        Paragraph::new(visible).render(area, buf);
    }
}
