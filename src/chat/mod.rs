//! Chat core: message model, streaming decoder, view state and the
//! session that drives requests.

pub mod decoder;
pub mod exchange;
pub mod message;
pub mod session;
pub mod view;

pub use decoder::Utf8StreamDecoder;
pub use exchange::run_exchange;
pub use message::{ChatMessage, Content, Message, Role};
pub use session::ChatSession;
pub use view::{ChatEvent, ChatView, Effect, OutgoingRequest, Phase, RequestId};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream::{self, StreamExt};

    use super::Message;
    use crate::client::{ChatTransport, ChunkStream, ClientError};

    enum Script {
        Chunks(Vec<Vec<u8>>),
        NoBody,
        Status(u16, String),
        /// First call never yields a chunk; later calls return the chunks.
        HangThenChunks(Vec<Vec<u8>>),
        /// Body yields the chunks, then a read error.
        ChunksThenError(Vec<Vec<u8>>, String),
    }

    /// In-memory transport that replays a fixed response and records requests.
    pub struct ScriptedTransport {
        script: Script,
        calls: AtomicUsize,
        requests: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedTransport {
        fn new(script: Script) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn chunks(chunks: Vec<Vec<u8>>) -> Self {
            Self::new(Script::Chunks(chunks))
        }

        pub fn no_body() -> Self {
            Self::new(Script::NoBody)
        }

        pub fn status(status: u16, body: &str) -> Self {
            Self::new(Script::Status(status, body.to_string()))
        }

        pub fn hang_then_chunks(chunks: Vec<Vec<u8>>) -> Self {
            Self::new(Script::HangThenChunks(chunks))
        }

        pub fn chunks_then_error(chunks: Vec<Vec<u8>>, error: &str) -> Self {
            Self::new(Script::ChunksThenError(chunks, error.to_string()))
        }

        pub fn requests(&self) -> Vec<Vec<Message>> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn replay(chunks: &[Vec<u8>]) -> ChunkStream {
        let items: Vec<Result<Bytes, ClientError>> = chunks
            .iter()
            .map(|c| Ok(Bytes::from(c.clone())))
            .collect();
        stream::iter(items).boxed()
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn open(&self, history: &[Message]) -> Result<Option<ChunkStream>, ClientError> {
            self.requests.lock().unwrap().push(history.to_vec());
            let call = self.calls.fetch_add(1, Ordering::SeqCst);

            match &self.script {
                Script::Chunks(chunks) => Ok(Some(replay(chunks))),
                Script::NoBody => Ok(None),
                Script::Status(status, body) => Err(ClientError::Status {
                    status: *status,
                    body: body.clone(),
                }),
                Script::ChunksThenError(chunks, error) => {
                    let failure = ClientError::Status {
                        status: 502,
                        body: error.clone(),
                    };
                    Ok(Some(replay(chunks).chain(stream::iter([Err(failure)])).boxed()))
                }
                Script::HangThenChunks(chunks) => {
                    if call == 0 {
                        Ok(Some(stream::pending().boxed()))
                    } else {
                        Ok(Some(replay(chunks)))
                    }
                }
            }
        }
    }
}
