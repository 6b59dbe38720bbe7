//! REPL slash commands.

use std::io::Write;

use crate::chat::{ChatView, Content, Role};

/// Parsed REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    History,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse a line starting with `/`. Anything else is a chat message.
    pub fn parse(line: &str) -> Option<Self> {
        let name = line.strip_prefix('/')?.split_whitespace().next()?;
        Some(match name {
            "help" | "h" | "?" => Command::Help,
            "history" => Command::History,
            "quit" | "exit" | "q" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        })
    }
}

pub fn show_help(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "\n\x1b[1mCommands\x1b[0m")?;
    writeln!(out, "  /help      Show this help")?;
    writeln!(out, "  /history   Show the conversation so far")?;
    writeln!(out, "  /quit      Exit")?;
    writeln!(out)
}

pub fn show_history(view: &ChatView, out: &mut impl Write) -> std::io::Result<()> {
    if view.messages().is_empty() {
        return writeln!(out, "\x1b[2m(no messages yet)\x1b[0m");
    }
    for msg in view.messages() {
        let label = match msg.role {
            Role::User => "\x1b[1;36myou\x1b[0m",
            Role::Assistant => "\x1b[1;33mbot\x1b[0m",
        };
        match &msg.content {
            Content::Pending => writeln!(out, "{} \x1b[2m(no reply)\x1b[0m", label)?,
            Content::Text(text) => writeln!(out, "{} {}", label, text)?,
        }
    }
    Ok(())
}
