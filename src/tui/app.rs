//! Main TUI application state and logic

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        KeyCode, KeyEvent, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::Terminal;
use tui_textarea::{CursorMove, TextArea};

use super::event::{AppEvent, EventHandler};
use super::theme::Theme;
use super::ui::{self, RenderContext};
use super::widgets::MessageListState;
use crate::chat::ChatSession;

/// Lines moved per PageUp/PageDown
const PAGE_SCROLL: usize = 10;
/// Lines moved per mouse wheel notch
const WHEEL_SCROLL: usize = 3;

/// Main TUI application
pub struct TuiApp {
    /// Terminal instance
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Event handler (optional so we can take it out in run loop)
    events: Option<EventHandler>,
    /// Whether the app should quit
    should_quit: bool,
    /// Color theme
    pub theme: Theme,
    /// Chat state and request driver
    pub session: ChatSession,
    /// Text input area
    pub input: TextArea<'static>,
    /// Message list scroll state
    pub message_list_state: MessageListState,
    /// Backend URL shown in the header
    pub backend_label: String,
    /// Show help overlay
    pub show_help: bool,
}

impl TuiApp {
    pub fn new(session: ChatSession, backend_label: String) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            events: Some(EventHandler::new(Duration::from_millis(250))),
            should_quit: false,
            theme: Theme::default(),
            session,
            input: Self::build_input(),
            message_list_state: MessageListState::default(),
            backend_label,
            show_help: false,
        })
    }

    /// Run the main event loop
    pub async fn run(&mut self) -> Result<()> {
        // Take receivers out of self to avoid borrow conflicts in select! loop
        let mut events = self.events.take().context("Events not initialized")?;
        let mut chat_events = self
            .session
            .take_events()
            .context("Chat events already taken")?;

        while !self.should_quit {
            self.draw()?;

            tokio::select! {
                biased;  // Drain streamed text before UI input

                Some(event) = chat_events.recv() => {
                    self.session.apply(event);
                }
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(event) => self.handle_event(event),
                        None => self.should_quit = true,
                    }
                }
            }
        }

        self.events = Some(events);
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let Self {
            terminal,
            session,
            input,
            message_list_state,
            theme,
            backend_label,
            show_help,
            ..
        } = self;

        terminal.draw(|frame| {
            ui::render(
                frame,
                RenderContext {
                    view: session.view(),
                    input,
                    list_state: message_list_state,
                    theme: &*theme,
                    backend_label: backend_label.as_str(),
                    show_help: *show_help,
                },
            )
        })?;
        Ok(())
    }

    /// Handle a terminal event
    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::ScrollUp => self.message_list_state.scroll_up(WHEEL_SCROLL),
            AppEvent::ScrollDown => self.message_list_state.scroll_down(WHEEL_SCROLL),
            AppEvent::Paste(text) => {
                self.input.insert_str(text);
            }
            // Redrawn at the top of the loop
            AppEvent::Resize | AppEvent::Tick => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                self.should_quit = true;
            }
            (_, KeyCode::F(1)) => {
                self.show_help = !self.show_help;
            }
            (_, KeyCode::Esc) => {
                self.show_help = false;
            }
            (_, KeyCode::PageUp) => self.message_list_state.scroll_up(PAGE_SCROLL),
            (_, KeyCode::PageDown) => self.message_list_state.scroll_down(PAGE_SCROLL),
            (KeyModifiers::CONTROL, KeyCode::End) => self.message_list_state.scroll_to_bottom(),
            (KeyModifiers::ALT, KeyCode::Enter) | (KeyModifiers::SHIFT, KeyCode::Enter) => {
                self.input.insert_newline();
            }
            (_, KeyCode::Enter) => self.send_message(),
            _ => {
                self.input.input(key);
            }
        }
    }

    /// Send the current input as a message
    fn send_message(&mut self) {
        let content = self.input.lines().join("\n");
        self.session.set_input(content);

        if self.session.submit().is_some() {
            self.input = Self::build_input();
            self.message_list_state.scroll_to_bottom();
        }
    }

    fn build_input() -> TextArea<'static> {
        let mut input = TextArea::default();
        input.set_cursor_line_style(Style::default());
        input.set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        input.set_placeholder_text("Messages");
        input.set_placeholder_style(Style::default().fg(Color::DarkGray));
        input.move_cursor(CursorMove::End);
        input
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}
