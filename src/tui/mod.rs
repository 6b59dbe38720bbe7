//! TUI (Terminal User Interface) mode
//!
//! A scrollable message list above an input box. Replies stream into the
//! list as they arrive.

mod app;
mod event;
pub mod theme;
mod ui;

pub mod widgets;

pub use app::TuiApp;

use anyhow::Result;

use crate::chat::ChatSession;

/// Run the TUI application
pub async fn run(session: ChatSession, backend_label: String) -> Result<()> {
    let mut app = TuiApp::new(session, backend_label)?;
    app.run().await
}
