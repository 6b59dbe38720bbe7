//! bccs-chat Library
//!
//! Chat client core for the bccs club assistant: the conversation state,
//! the streaming HTTP transport and the front-ends built on them.

pub mod chat;
pub mod cli;
pub mod client;
pub mod config;
pub mod runner;

#[cfg(feature = "tui")]
pub mod tui;
