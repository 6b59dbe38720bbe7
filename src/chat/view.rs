//! Chat view state container.
//!
//! Holds the input line, the ordered message sequence and the request
//! currently in flight. All mutation goes through [`ChatView::submit`] and
//! [`ChatView::apply`], so the whole state machine is testable without a
//! terminal or a network.

use tracing::{debug, info, warn};

use super::message::{ChatMessage, Message};

/// Monotonic token identifying one submission.
pub type RequestId = u64;

/// Where the view is in the request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Streaming,
}

/// Request the driver must send on the view's behalf
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub id: RequestId,
    /// Full history up to and including the new user message
    pub history: Vec<Message>,
}

/// Side effect produced by a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send {
        request: OutgoingRequest,
        /// Earlier request that is no longer wanted and should be aborted
        supersedes: Option<RequestId>,
    },
}

/// Events reported by an exchange, tagged with the request they belong to
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Response headers arrived and a body is being read
    StreamOpened { request: RequestId },
    /// Decoded text from one or more body chunks
    Chunk { request: RequestId, text: String },
    /// Body reached end-of-stream
    StreamEnded { request: RequestId },
    /// Response carried no body
    NoBody { request: RequestId },
    /// Status error, network failure or mid-stream read error
    Failed { request: RequestId, error: String },
}

impl ChatEvent {
    pub fn request(&self) -> RequestId {
        match self {
            ChatEvent::StreamOpened { request }
            | ChatEvent::Chunk { request, .. }
            | ChatEvent::StreamEnded { request }
            | ChatEvent::NoBody { request }
            | ChatEvent::Failed { request, .. } => *request,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveRequest {
    id: RequestId,
    placeholder: usize,
}

/// The chat view: input text plus an append-only message sequence
#[derive(Debug, Clone)]
pub struct ChatView {
    input: String,
    messages: Vec<ChatMessage>,
    phase: Phase,
    active: Option<ActiveRequest>,
    next_request: RequestId,
    last_error: Option<String>,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            messages: Vec::new(),
            phase: Phase::Idle,
            active: None,
            next_request: 1,
            last_error: None,
        }
    }

    /// Start the conversation with an assistant greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut view = Self::new();
        view.messages.push(ChatMessage::assistant(greeting));
        view
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn active_request(&self) -> Option<RequestId> {
        self.active.map(|a| a.id)
    }

    /// Error from the most recent failed exchange, for the status line
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Submit the current input.
    ///
    /// Empty input is rejected without touching any state. Otherwise the user
    /// message and a pending assistant placeholder are appended, the input is
    /// cleared, and a [`Effect::Send`] carrying the prior history plus the new
    /// user message is returned. A request still in flight is superseded.
    pub fn submit(&mut self) -> Option<Effect> {
        if self.input.is_empty() {
            debug!("Ignoring submit with empty input");
            return None;
        }

        let text = std::mem::take(&mut self.input);

        let mut history: Vec<Message> = self.messages.iter().map(ChatMessage::to_wire).collect();
        history.push(Message::user(text.clone()));

        let supersedes = self.active.take().map(|old| {
            if let Some(msg) = self.messages.get_mut(old.placeholder) {
                msg.finish_streaming();
            }
            info!(request = old.id, "Superseding in-flight request");
            old.id
        });

        self.messages.push(ChatMessage::user(text));
        self.messages.push(ChatMessage::placeholder());

        let id = self.next_request;
        self.next_request += 1;
        self.active = Some(ActiveRequest {
            id,
            placeholder: self.messages.len() - 1,
        });
        self.phase = Phase::Submitting;
        self.last_error = None;

        info!(request = id, history_len = history.len(), "Submitting message");

        Some(Effect::Send {
            request: OutgoingRequest { id, history },
            supersedes,
        })
    }

    /// Apply an exchange event. Returns `false` when the event was stale
    /// (belongs to a superseded or finished request) and was ignored.
    pub fn apply(&mut self, event: ChatEvent) -> bool {
        let Some(active) = self.active else {
            debug!(request = event.request(), "Dropping event with no active request");
            return false;
        };
        if event.request() != active.id {
            debug!(
                request = event.request(),
                active = active.id,
                "Dropping event from superseded request"
            );
            return false;
        }

        match event {
            ChatEvent::StreamOpened { .. } => {
                self.phase = Phase::Streaming;
            }
            ChatEvent::Chunk { text, .. } => {
                if let Some(msg) = self.messages.get_mut(active.placeholder) {
                    msg.append(&text);
                }
                self.phase = Phase::Streaming;
            }
            ChatEvent::StreamEnded { .. } => {
                debug!(request = active.id, "Stream ended");
                self.finish_active();
            }
            ChatEvent::NoBody { .. } => {
                debug!(request = active.id, "Response had no body");
                self.finish_active();
            }
            ChatEvent::Failed { error, .. } => {
                warn!(request = active.id, %error, "Exchange failed");
                self.finish_active();
                self.last_error = Some(error);
            }
        }
        true
    }

    fn finish_active(&mut self) {
        if let Some(active) = self.active.take() {
            if let Some(msg) = self.messages.get_mut(active.placeholder) {
                msg.finish_streaming();
            }
        }
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::{Content, Role};

    fn send_request(effect: Option<Effect>) -> (OutgoingRequest, Option<RequestId>) {
        match effect {
            Some(Effect::Send {
                request,
                supersedes,
            }) => (request, supersedes),
            None => panic!("expected a send effect"),
        }
    }

    fn contents(view: &ChatView) -> Vec<(Role, Content)> {
        view.messages()
            .iter()
            .map(|m| (m.role, m.content.clone()))
            .collect()
    }

    #[test]
    fn test_submit_appends_user_and_placeholder() {
        let mut view = ChatView::new();
        view.set_input("Hi");

        let (request, supersedes) = send_request(view.submit());

        assert_eq!(view.input(), "");
        assert_eq!(view.phase(), Phase::Submitting);
        assert!(supersedes.is_none());
        assert_eq!(
            contents(&view),
            vec![
                (Role::User, Content::Text("Hi".into())),
                (Role::Assistant, Content::Pending),
            ]
        );
        assert_eq!(request.history, vec![Message::user("Hi")]);
    }

    #[test]
    fn test_second_to_last_is_user_input() {
        for text in ["a", " ", "multi\nline", "ünïcödé 🍲"] {
            let mut view = ChatView::with_greeting("Hello, how can I help you?");
            view.set_input(text);
            view.submit();

            let msgs = view.messages();
            let user = &msgs[msgs.len() - 2];
            assert_eq!(user.role, Role::User);
            assert_eq!(user.content.as_str(), text);
        }
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let mut view = ChatView::with_greeting("hello");
        let before = contents(&view);

        assert!(view.submit().is_none());
        assert_eq!(contents(&view), before);
        assert_eq!(view.phase(), Phase::Idle);
        assert!(view.active_request().is_none());
    }

    #[test]
    fn test_streamed_chunks_fill_placeholder() {
        let mut view = ChatView::new();
        view.set_input("Hi");
        let (request, _) = send_request(view.submit());

        assert!(view.apply(ChatEvent::StreamOpened { request: request.id }));
        assert_eq!(view.phase(), Phase::Streaming);
        assert!(view.apply(ChatEvent::Chunk {
            request: request.id,
            text: "Hel".into()
        }));
        assert!(view.apply(ChatEvent::Chunk {
            request: request.id,
            text: "lo!".into()
        }));
        assert!(view.apply(ChatEvent::StreamEnded { request: request.id }));

        let last = view.messages().last().unwrap();
        assert_eq!(last.content, Content::Text("Hello!".into()));
        assert!(!last.is_streaming);
        assert_eq!(view.phase(), Phase::Idle);
        assert!(view.active_request().is_none());
    }

    #[test]
    fn test_no_body_leaves_placeholder_untouched() {
        let mut view = ChatView::new();
        view.set_input("Hi");
        let (request, _) = send_request(view.submit());
        let after_submit = contents(&view);

        assert!(view.apply(ChatEvent::NoBody { request: request.id }));

        assert_eq!(contents(&view), after_submit);
        assert_eq!(view.phase(), Phase::Idle);
        assert!(view.last_error().is_none());
    }

    #[test]
    fn test_failure_records_error_and_keeps_messages() {
        let mut view = ChatView::new();
        view.set_input("Hi");
        let (request, _) = send_request(view.submit());
        let after_submit = contents(&view);

        view.apply(ChatEvent::Failed {
            request: request.id,
            error: "HTTP 500".into(),
        });

        assert_eq!(contents(&view), after_submit);
        assert_eq!(view.last_error(), Some("HTTP 500"));
        assert_eq!(view.phase(), Phase::Idle);

        // A new submission clears the stale error.
        view.set_input("again");
        view.submit();
        assert!(view.last_error().is_none());
    }

    #[test]
    fn test_history_includes_prior_messages_not_new_placeholder() {
        let mut view = ChatView::with_greeting("Hello, how can I help you?");
        view.set_input("first");
        let (first, _) = send_request(view.submit());
        view.apply(ChatEvent::Chunk {
            request: first.id,
            text: "answer".into(),
        });
        view.apply(ChatEvent::StreamEnded { request: first.id });

        view.set_input("second");
        let (second, _) = send_request(view.submit());

        assert_eq!(
            second.history,
            vec![
                Message::assistant("Hello, how can I help you?"),
                Message::user("first"),
                Message::assistant("answer"),
                Message::user("second"),
            ]
        );
        assert!(second.id > first.id);
    }

    #[test]
    fn test_new_submit_supersedes_in_flight_request() {
        let mut view = ChatView::new();
        view.set_input("one");
        let (first, _) = send_request(view.submit());
        view.apply(ChatEvent::Chunk {
            request: first.id,
            text: "partial".into(),
        });

        view.set_input("two");
        let (second, supersedes) = send_request(view.submit());
        assert_eq!(supersedes, Some(first.id));

        // The interrupted placeholder keeps its partial text and stops streaming.
        let old = &view.messages()[1];
        assert_eq!(old.content.as_str(), "partial");
        assert!(!old.is_streaming);
        // Its partial text is part of the new history.
        assert_eq!(second.history[1], Message::assistant("partial"));

        let snapshot = contents(&view);
        assert!(!view.apply(ChatEvent::Chunk {
            request: first.id,
            text: "stray".into()
        }));
        assert!(!view.apply(ChatEvent::StreamEnded { request: first.id }));
        assert_eq!(contents(&view), snapshot);
        assert_eq!(view.active_request(), Some(second.id));

        view.apply(ChatEvent::Chunk {
            request: second.id,
            text: "fresh".into(),
        });
        assert_eq!(view.messages().last().unwrap().content.as_str(), "fresh");
    }

    #[test]
    fn test_events_after_completion_are_ignored() {
        let mut view = ChatView::new();
        view.set_input("Hi");
        let (request, _) = send_request(view.submit());
        view.apply(ChatEvent::StreamEnded { request: request.id });

        assert!(!view.apply(ChatEvent::Chunk {
            request: request.id,
            text: "late".into()
        }));
        assert!(view.messages().last().unwrap().content.is_pending());
    }
}
