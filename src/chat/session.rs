//! Chat session: the view plus the machinery that runs its requests.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::exchange::run_exchange;
use super::view::{ChatEvent, ChatView, Effect, RequestId};
use crate::client::ChatTransport;

struct InFlight {
    id: RequestId,
    handle: JoinHandle<()>,
}

/// Drives a [`ChatView`] against a [`ChatTransport`].
///
/// Exchanges run as spawned tasks and only ever talk back through the event
/// channel; the view itself is mutated solely by the owner of the session,
/// one event at a time.
pub struct ChatSession {
    view: ChatView,
    transport: Arc<dyn ChatTransport>,
    tx: mpsc::UnboundedSender<ChatEvent>,
    rx: Option<mpsc::UnboundedReceiver<ChatEvent>>,
    in_flight: Option<InFlight>,
}

impl ChatSession {
    pub fn new(view: ChatView, transport: Arc<dyn ChatTransport>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            view,
            transport,
            tx,
            rx: Some(rx),
            in_flight: None,
        }
    }

    pub fn view(&self) -> &ChatView {
        &self.view
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.view.set_input(text);
    }

    /// Submit the view's input and spawn the exchange for it.
    ///
    /// Returns the new request id, or `None` when the view rejected the
    /// submission (empty input). Must be called within a Tokio runtime.
    pub fn submit(&mut self) -> Option<RequestId> {
        let Effect::Send {
            request,
            supersedes,
        } = self.view.submit()?;

        if let Some(old) = supersedes {
            self.abort(old);
        }

        let id = request.id;
        let handle = tokio::spawn(run_exchange(
            self.transport.clone(),
            request,
            self.tx.clone(),
        ));
        self.in_flight = Some(InFlight { id, handle });
        Some(id)
    }

    /// Take the event receiver to drive it from an outer `select!` loop.
    /// After this, [`ChatSession::next_event`] always returns `None`.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ChatEvent>> {
        self.rx.take()
    }

    /// Wait for the next event from any exchange.
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Feed an event into the view. Returns `false` if it was stale.
    pub fn apply(&mut self, event: ChatEvent) -> bool {
        let applied = self.view.apply(event);
        if self.view.active_request() != self.in_flight.as_ref().map(|f| f.id) {
            // Finished normally; the task is exiting on its own.
            self.in_flight = None;
        }
        applied
    }

    /// Wait until the active request finishes, applying every event.
    /// `on_event` sees each applied event, e.g. to print chunks as they land.
    pub async fn run_until_idle<F>(&mut self, mut on_event: F)
    where
        F: FnMut(&ChatEvent),
    {
        while self.view.is_busy() {
            let Some(event) = self.next_event().await else {
                break;
            };
            if self.apply(event.clone()) {
                on_event(&event);
            }
        }
    }

    fn abort(&mut self, id: RequestId) {
        if let Some(in_flight) = self.in_flight.take() {
            if in_flight.id == id {
                debug!(request = id, "Aborting superseded exchange");
                in_flight.handle.abort();
            } else {
                self.in_flight = Some(in_flight);
            }
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
        }
    }
}
