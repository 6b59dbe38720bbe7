//! Main UI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

use super::theme::Theme;
use super::widgets::{MessageList, MessageListState};
use crate::chat::{ChatView, Phase};

/// Everything a frame needs, borrowed from the app for the draw call
pub struct RenderContext<'a> {
    pub view: &'a ChatView,
    pub input: &'a mut TextArea<'static>,
    pub list_state: &'a mut MessageListState,
    pub theme: &'a Theme,
    pub backend_label: &'a str,
    pub show_help: bool,
}

/// Render the entire UI
pub fn render(frame: &mut Frame, ctx: RenderContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(0),    // Messages
            Constraint::Length(1), // Status
            Constraint::Length(3), // Input
        ])
        .split(frame.area());

    render_header(frame, &ctx, chunks[0]);
    render_messages(frame, &mut *ctx.list_state, ctx.view, ctx.theme, chunks[1]);
    render_status(frame, &ctx, chunks[2]);
    render_input(frame, &mut *ctx.input, ctx.view, ctx.theme, chunks[3]);

    if ctx.show_help {
        render_help(frame, ctx.theme, frame.area());
    }
}

fn render_header(frame: &mut Frame, ctx: &RenderContext<'_>, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "bccs club | 🤖 chat",
            Style::default()
                .fg(ctx.theme.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::styled(ctx.backend_label, Style::default().fg(ctx.theme.text_muted)),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(ctx.theme.border)),
    );

    frame.render_widget(header, area);
}

fn render_messages(
    frame: &mut Frame,
    list_state: &mut MessageListState,
    view: &ChatView,
    theme: &Theme,
    area: Rect,
) {
    if view.messages().is_empty() {
        let welcome = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "🤖",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Type a message below to get started",
                Style::default().fg(theme.text_muted),
            )),
            Line::from(Span::styled(
                "Press F1 for keyboard shortcuts",
                Style::default()
                    .fg(theme.text_muted)
                    .add_modifier(Modifier::ITALIC),
            )),
        ])
        .alignment(Alignment::Center);

        frame.render_widget(welcome, area);
        return;
    }

    let message_list = MessageList::new(view.messages(), theme).generating(view.is_busy());
    frame.render_stateful_widget(message_list, area, list_state);
}

fn render_status(frame: &mut Frame, ctx: &RenderContext<'_>, area: Rect) {
    let line = if let Some(error) = ctx.view.last_error() {
        Line::from(Span::styled(
            format!(" ✗ {}", error),
            Style::default().fg(ctx.theme.error),
        ))
    } else {
        let text = match ctx.view.phase() {
            Phase::Idle => " Ready",
            Phase::Submitting => " Sending...",
            Phase::Streaming => " Receiving...",
        };
        Line::from(Span::styled(text, Style::default().fg(ctx.theme.text_muted)))
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(
    frame: &mut Frame,
    input: &mut TextArea<'static>,
    view: &ChatView,
    theme: &Theme,
    area: Rect,
) {
    let (title, border_color) = if view.is_busy() {
        (" Generating... ", theme.border)
    } else {
        (" Message ", theme.accent)
    };

    input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title),
    );

    frame.render_widget(&*input, area);
}

fn render_help(frame: &mut Frame, theme: &Theme, area: Rect) {
    let key = Style::default().fg(theme.accent);
    let help_lines = vec![
        Line::from(vec![Span::styled(
            " Keyboard Shortcuts ",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Ctrl+Q/Ctrl+C ", key),
            Span::raw("Quit"),
        ]),
        Line::from(vec![
            Span::styled(" Enter         ", key),
            Span::raw("Send message"),
        ]),
        Line::from(vec![
            Span::styled(" Alt+Enter     ", key),
            Span::raw("New line"),
        ]),
        Line::from(vec![
            Span::styled(" PgUp/PgDn     ", key),
            Span::raw("Scroll messages"),
        ]),
        Line::from(vec![
            Span::styled(" Ctrl+End      ", key),
            Span::raw("Jump to latest"),
        ]),
        Line::from(vec![
            Span::styled(" Esc / F1      ", key),
            Span::raw("Close this help"),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(" Help ");

    let paragraph = Paragraph::new(help_lines)
        .block(block)
        .alignment(Alignment::Left);

    let area = centered_rect(60, 50, area);
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(view: &ChatView, show_help: bool) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut input = TextArea::default();
        let mut list_state = MessageListState::default();
        let theme = Theme::default();

        terminal
            .draw(|frame| {
                render(
                    frame,
                    RenderContext {
                        view,
                        input: &mut input,
                        list_state: &mut list_state,
                        theme: &theme,
                        backend_label: "http://127.0.0.1:5000",
                        show_help,
                    },
                )
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_renders_conversation_and_status() {
        let mut view = ChatView::with_greeting("Hello, how can I help you?");
        view.set_input("Hi");
        view.submit();

        let screen = draw(&view, false);
        assert!(screen.contains("bccs club"));
        assert!(screen.contains("Hello, how can I help you?"));
        assert!(screen.contains("Thinking..."));
        assert!(screen.contains("Sending..."));
    }

    #[test]
    fn test_renders_error_in_status_line() {
        let mut view = ChatView::new();
        view.set_input("Hi");
        view.submit();
        let id = view.active_request().unwrap();
        view.apply(crate::chat::ChatEvent::Failed {
            request: id,
            error: "connection refused".into(),
        });

        let screen = draw(&view, false);
        assert!(screen.contains("connection refused"));
    }

    #[test]
    fn test_welcome_on_empty_conversation() {
        let screen = draw(&ChatView::new(), false);
        assert!(screen.contains("Type a message below"));
        assert!(!screen.contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_help_overlay() {
        let screen = draw(&ChatView::new(), true);
        assert!(screen.contains("Keyboard Shortcuts"));
        assert!(screen.contains("Send message"));
    }
}
