use std::sync::Arc;

use mater_core::cards::{CardExtraction, CardExtractor, ParsedCard};
use mater_core::errors::{ApplicationError, DomainError};
use mater_core::Catalog;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::conversation::ChatRequest;
use crate::guardrails::{GuardrailFinding, GuardrailPolicy};
use crate::llm::{ChatTransport, StreamError};
use crate::prompt;
use crate::sse::StreamIngestor;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid chat request: {0}")]
    InvalidRequest(#[from] DomainError),
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl From<AgentError> for ApplicationError {
    fn from(value: AgentError) -> Self {
        match value {
            AgentError::InvalidRequest(error) => Self::Domain(error),
            AgentError::Stream(error) => error.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub text: String,
    pub clean_text: String,
    pub cards: Vec<ParsedCard>,
    pub findings: Vec<GuardrailFinding>,
    /// False when the stream closed before the `[DONE]` sentinel.
    pub completed: bool,
}

/// Ties the chat transport, stream ingestion and card extraction together
/// for one catalog.
#[derive(Clone)]
pub struct AgentRuntime {
    catalog: Arc<Catalog>,
    transport: Arc<dyn ChatTransport>,
    extractor: CardExtractor,
}

impl AgentRuntime {
    pub fn new(catalog: Arc<Catalog>, transport: Arc<dyn ChatTransport>) -> Self {
        Self { catalog, transport, extractor: CardExtractor::default() }
    }

    pub fn with_extractor(mut self, extractor: CardExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn system_prompt(&self, request: &ChatRequest) -> String {
        prompt::system_prompt(&self.catalog, request)
    }

    /// Speculative extraction over a partially streamed reply.
    pub fn preview(&self, text: &str) -> CardExtraction {
        self.extractor.extract(text)
    }

    /// Streams one assistant turn, forwarding each text delta to `on_delta`
    /// in arrival order, then extracts and reviews the cards of the full reply.
    pub async fn ask<F>(
        &self,
        request: &ChatRequest,
        correlation_id: &str,
        on_delta: F,
    ) -> Result<AssistantReply, AgentError>
    where
        F: FnMut(&str) + Send,
    {
        request.validate()?;
        let system_prompt = self.system_prompt(request);

        let source = match self.transport.open(&system_prompt, request).await {
            Ok(source) => source,
            Err(error) => {
                warn!(
                    event_name = "agent.stream.failed",
                    correlation_id = %correlation_id,
                    error_class = error.error_class(),
                    error = %error,
                    "chat stream could not be opened"
                );
                return Err(error.into());
            }
        };
        info!(
            event_name = "agent.stream.opened",
            correlation_id = %correlation_id,
            field = request.field.as_str(),
            turns = request.messages.len(),
            "chat stream opened"
        );

        let transcript = match StreamIngestor::new().drive(source, on_delta).await {
            Ok(transcript) => transcript,
            Err(error) => {
                warn!(
                    event_name = "agent.stream.failed",
                    correlation_id = %correlation_id,
                    error_class = error.error_class(),
                    error = %error,
                    "chat stream aborted"
                );
                return Err(error.into());
            }
        };

        let CardExtraction { cards, clean_text } = self.extractor.extract(&transcript.text);
        let findings = GuardrailPolicy::for_field(&self.catalog, request.field).review(&cards);
        for finding in &findings {
            warn!(
                event_name = "agent.guardrail.finding",
                correlation_id = %correlation_id,
                reason_code = finding.reason_code(),
                "{}",
                finding.user_message()
            );
        }
        info!(
            event_name = "agent.stream.done",
            correlation_id = %correlation_id,
            deltas = transcript.deltas,
            cards = cards.len(),
            completed = transcript.completed,
            "chat stream finished"
        );

        Ok(AssistantReply {
            text: transcript.text,
            clean_text,
            cards,
            findings,
            completed: transcript.completed,
        })
    }
}
