//! HTTP transport for the inference endpoint.
//!
//! The endpoint takes the whole conversation as a JSON array of
//! `{ role, content }` objects and answers with a raw UTF-8 text body,
//! streamed in arbitrary chunks with no framing.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::debug;

use crate::chat::Message;

/// Path of the chat endpoint, relative to the configured base URL.
pub const ENDPOINT_PATH: &str = "/api/v1/llm";

/// Longest error-body preview kept in [`ClientError::Status`].
const ERROR_BODY_PREVIEW: usize = 200;

/// Errors from talking to the endpoint.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Lazy, finite sequence of response body chunks in arrival order.
pub type ChunkStream = BoxStream<'static, Result<Bytes, ClientError>>;

/// Something that can post a conversation and hand back the response body.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post `history`. `Ok(None)` means the response carried no body.
    async fn open(&self, history: &[Message]) -> Result<Option<ChunkStream>, ClientError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport for `{base_url}/api/v1/llm`.
    pub fn new(base_url: &str, connect_timeout: Option<Duration>) -> Result<Self, ClientError> {
        let endpoint = endpoint_url(base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, history: &[Message]) -> Result<Option<ChunkStream>, ClientError> {
        debug!(endpoint = %self.endpoint, messages = history.len(), "POST conversation");

        // `.json()` sets `Content-Type: application/json`.
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(history)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: truncate_preview(&body, ERROR_BODY_PREVIEW),
            });
        }

        if is_bodiless(status, response.content_length()) {
            debug!(%status, "Response has no body");
            return Ok(None);
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ClientError::from))
            .boxed();
        Ok(Some(stream))
    }
}

/// Join the base URL and the endpoint path.
pub fn endpoint_url(base_url: &str) -> Result<Url, ClientError> {
    let base = base_url.trim().trim_end_matches('/');
    let joined = format!("{}{}", base, ENDPOINT_PATH);
    let url = Url::parse(&joined).map_err(|e| ClientError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn is_bodiless(status: StatusCode, content_length: Option<u64>) -> bool {
    status == StatusCode::NO_CONTENT
        || status == StatusCode::RESET_CONTENT
        || content_length == Some(0)
}

/// Cut `text` to at most `max_chars` characters, marking the cut.
fn truncate_preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
