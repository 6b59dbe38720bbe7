//! Chat message types.
//!
//! [`ChatMessage`] is the view-side form shown in the message list;
//! [`Message`] is the `{ role, content }` shape posted to the endpoint.

use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Content of a message in the view.
///
/// `Pending` marks an assistant placeholder that has not received any text
/// yet. It is never confused with real (possibly empty) text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Pending,
    Text(String),
}

impl Content {
    pub fn is_pending(&self) -> bool {
        matches!(self, Content::Pending)
    }

    /// Text so far; empty for a pending placeholder.
    pub fn as_str(&self) -> &str {
        match self {
            Content::Pending => "",
            Content::Text(text) => text,
        }
    }

    /// Append streamed text, replacing the pending marker on first real text.
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self {
            Content::Pending => *self = Content::Text(text.to_string()),
            Content::Text(existing) => existing.push_str(text),
        }
    }
}

/// A single chat message as held by the view
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: Content,
    pub is_streaming: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content: Content::Text(content.into()),
            is_streaming: false,
        }
    }

    /// A finished assistant message (e.g. the greeting).
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: Content::Text(content.into()),
            is_streaming: false,
        }
    }

    /// The optimistic assistant placeholder inserted on submit.
    pub fn placeholder() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: Content::Pending,
            is_streaming: true,
        }
    }

    pub fn append(&mut self, text: &str) {
        self.content.append(text);
    }

    pub fn finish_streaming(&mut self) {
        self.is_streaming = false;
    }

    /// Wire form of this message. A pending placeholder goes out as `""`.
    pub fn to_wire(&self) -> Message {
        Message {
            role: self.role,
            content: self.content.as_str().to_string(),
        }
    }
}

/// Wire message: one element of the JSON array posted to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
