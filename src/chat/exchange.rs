//! One request/response exchange with the endpoint.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::decoder::Utf8StreamDecoder;
use super::view::{ChatEvent, OutgoingRequest};
use crate::client::ChatTransport;

/// Send the request and report its progress as [`ChatEvent`]s.
///
/// Every event carries `request.id`, so the view can tell events of a
/// superseded exchange apart. Returns early if the receiver goes away.
pub async fn run_exchange(
    transport: Arc<dyn ChatTransport>,
    request: OutgoingRequest,
    events: mpsc::UnboundedSender<ChatEvent>,
) {
    let id = request.id;
    let emit = |event: ChatEvent| events.send(event).is_ok();

    let mut stream = match transport.open(&request.history).await {
        Ok(Some(stream)) => stream,
        Ok(None) => {
            emit(ChatEvent::NoBody { request: id });
            return;
        }
        Err(e) => {
            emit(ChatEvent::Failed {
                request: id,
                error: e.to_string(),
            });
            return;
        }
    };

    if !emit(ChatEvent::StreamOpened { request: id }) {
        return;
    }

    let mut decoder = Utf8StreamDecoder::new();
    let mut chunk_count = 0usize;
    let mut byte_count = 0usize;

    while let Some(next) = stream.next().await {
        match next {
            Ok(bytes) => {
                chunk_count += 1;
                byte_count += bytes.len();
                let text = decoder.decode(&bytes);
                if !text.is_empty() && !emit(ChatEvent::Chunk { request: id, text }) {
                    debug!(request = id, "Receiver dropped, abandoning stream");
                    return;
                }
            }
            Err(e) => {
                // A half-received character is dropped, not flushed as U+FFFD.
                emit(ChatEvent::Failed {
                    request: id,
                    error: e.to_string(),
                });
                return;
            }
        }
    }

    let tail = decoder.finish();
    if !tail.is_empty() {
        emit(ChatEvent::Chunk {
            request: id,
            text: tail,
        });
    }

    info!(request = id, chunks = chunk_count, bytes = byte_count, "Response complete");
    emit(ChatEvent::StreamEnded { request: id });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::test_support::ScriptedTransport;
    use crate::chat::Message;

    async fn collect(transport: ScriptedTransport) -> Vec<ChatEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = OutgoingRequest {
            id: 7,
            history: vec![Message::user("Hi")],
        };
        run_exchange(Arc::new(transport), request, tx).await;

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_chunks_are_decoded_in_order() {
        let events = collect(ScriptedTransport::chunks(vec![b"Hel".to_vec(), b"lo!".to_vec()])).await;
        assert_eq!(
            events,
            vec![
                ChatEvent::StreamOpened { request: 7 },
                ChatEvent::Chunk {
                    request: 7,
                    text: "Hel".into()
                },
                ChatEvent::Chunk {
                    request: 7,
                    text: "lo!".into()
                },
                ChatEvent::StreamEnded { request: 7 },
            ]
        );
    }

    #[tokio::test]
    async fn test_split_character_is_joined() {
        let euro = "€".as_bytes();
        let events =
            collect(ScriptedTransport::chunks(vec![euro[..1].to_vec(), euro[1..].to_vec()])).await;
        let text: String = events
            .iter()
            .filter_map(|e| match e {
                ChatEvent::Chunk { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "€");
        assert_eq!(events.last(), Some(&ChatEvent::StreamEnded { request: 7 }));
    }

    #[tokio::test]
    async fn test_no_body_is_reported() {
        let events = collect(ScriptedTransport::no_body()).await;
        assert_eq!(events, vec![ChatEvent::NoBody { request: 7 }]);
    }

    #[tokio::test]
    async fn test_open_failure_is_reported() {
        let events = collect(ScriptedTransport::status(503, "down")).await;
        match events.as_slice() {
            [ChatEvent::Failed { request: 7, error }] => assert!(error.contains("503")),
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_failure_drops_incomplete_tail() {
        let euro = "€".as_bytes();
        let events = collect(ScriptedTransport::chunks_then_error(
            vec![b"Hel".to_vec(), euro[..2].to_vec()],
            "stream reset",
        ))
        .await;

        match events.as_slice() {
            [ChatEvent::StreamOpened { request: 7 }, ChatEvent::Chunk { request: 7, text }, ChatEvent::Failed { request: 7, error }] =>
            {
                assert_eq!(text, "Hel");
                assert!(error.contains("stream reset"));
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_truncated_tail_flushed_at_end() {
        let euro = "€".as_bytes();
        let events = collect(ScriptedTransport::chunks(vec![euro[..2].to_vec()])).await;
        assert!(events.contains(&ChatEvent::Chunk {
            request: 7,
            text: "\u{FFFD}".into()
        }));
    }
}
