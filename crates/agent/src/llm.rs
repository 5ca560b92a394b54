use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use mater_core::config::LlmConfig;
use mater_core::errors::ApplicationError;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use thiserror::Error;

use crate::conversation::{ChatMessage, ChatRequest, Role};

/// Upstream failures, classified so callers can phrase them differently.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("upstream assistant is rate limited")]
    RateLimited,
    #[error("upstream assistant requires payment")]
    PaymentRequired,
    #[error("upstream assistant returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("stream transport failed: {0}")]
    Transport(String),
}

impl StreamError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            429 => Self::RateLimited,
            402 => Self::PaymentRequired,
            _ => Self::Upstream { status, message: message.into() },
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limit",
            Self::PaymentRequired => "payment_required",
            Self::Upstream { .. } => "upstream",
            Self::Transport(_) => "transport",
        }
    }
}

impl From<StreamError> for ApplicationError {
    fn from(value: StreamError) -> Self {
        match value {
            StreamError::RateLimited => Self::UpstreamRateLimited,
            StreamError::PaymentRequired => Self::UpstreamPaymentRequired,
            other => Self::Integration(other.to_string()),
        }
    }
}

/// Raw body chunks of an open stream. Dropping the source closes the channel.
#[async_trait]
pub trait ChunkSource: Send {
    /// `Ok(None)` once the peer has finished sending.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError>;
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open(
        &self,
        system_prompt: &str,
        request: &ChatRequest,
    ) -> Result<Box<dyn ChunkSource>, StreamError>;
}

/// Streams from an OpenAI-compatible `chat/completions` endpoint.
pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
}

impl HttpChatTransport {
    pub fn from_config(config: &LlmConfig) -> Result<Self, StreamError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|error| StreamError::Transport(error.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn open(
        &self,
        system_prompt: &str,
        request: &ChatRequest,
    ) -> Result<Box<dyn ChunkSource>, StreamError> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(ChatMessage { role: Role::System, content: system_prompt.to_string() });
        messages.extend(request.messages.iter().cloned());
        let body = json!({ "model": self.model, "messages": messages, "stream": true });

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response =
            builder.send().await.map_err(|error| StreamError::Transport(error.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StreamError::from_status(status.as_u16(), truncate(&message, 200)));
        }

        Ok(Box::new(HttpChunkSource { response }))
    }
}

struct HttpChunkSource {
    response: reqwest::Response,
}

#[async_trait]
impl ChunkSource for HttpChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        self.response
            .chunk()
            .await
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .map_err(|error| StreamError::Transport(error.to_string()))
    }
}

fn truncate(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_string(),
    }
}

/// Plays back a recorded event stream in fixed-size chunks.
///
/// Used to re-run captured transcripts offline and as a deterministic
/// stand-in for the HTTP transport.
#[derive(Clone, Debug, Default)]
pub struct ReplayTransport {
    chunks: Vec<Vec<u8>>,
    open_error: Option<StreamError>,
    trailing_error: Option<StreamError>,
}

impl ReplayTransport {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self { chunks, ..Self::default() }
    }

    pub fn from_transcript(transcript: &[u8], chunk_size: usize) -> Self {
        let chunks = transcript.chunks(chunk_size.max(1)).map(<[u8]>::to_vec).collect();
        Self::new(chunks)
    }

    /// Rejects every `open` with `error`.
    pub fn refusing(error: StreamError) -> Self {
        Self { open_error: Some(error), ..Self::default() }
    }

    /// Fails with `error` after the recorded chunks instead of ending cleanly.
    pub fn then_fail(mut self, error: StreamError) -> Self {
        self.trailing_error = Some(error);
        self
    }
}

#[async_trait]
impl ChatTransport for ReplayTransport {
    async fn open(
        &self,
        _system_prompt: &str,
        _request: &ChatRequest,
    ) -> Result<Box<dyn ChunkSource>, StreamError> {
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        Ok(Box::new(ReplaySource {
            chunks: self.chunks.iter().cloned().collect(),
            trailing_error: self.trailing_error.clone(),
        }))
    }
}

struct ReplaySource {
    chunks: VecDeque<Vec<u8>>,
    trailing_error: Option<StreamError>,
}

#[async_trait]
impl ChunkSource for ReplaySource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        if let Some(chunk) = self.chunks.pop_front() {
            return Ok(Some(chunk));
        }
        match self.trailing_error.take() {
            Some(error) => Err(error),
            None => Ok(None),
        }
    }
}
