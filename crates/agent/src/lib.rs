//! Assistant runtime for material recommendations.
//!
//! The assistant answers in prose with embedded `---CARD---` blocks. This
//! crate streams that answer and turns it into structured records:
//!
//! 1. **Prompting** (`prompt`) - field-specific system prompt carrying the
//!    allowed-materials list from the catalog
//! 2. **Transport** (`llm`) - opens an OpenAI-compatible event stream
//! 3. **Ingestion** (`sse`) - reassembles `data:` lines across chunk
//!    boundaries and yields text deltas
//! 4. **Review** (`guardrails`) - flags cards naming unlisted materials or
//!    unknown profiles
//!
//! # Key Types
//!
//! - `AgentRuntime` - runs one assistant turn end to end (see `runtime`)
//! - `ChatTransport` - pluggable stream source (HTTP or recorded replay)
//! - `StreamIngestor` - server-sent-event line state machine
//!
//! # Safety Principle
//!
//! Scores in cards are the assistant's claims. The deterministic ranking in
//! `mater-core` stays the reference; guardrail findings annotate, they never
//! rewrite a reply.

pub mod conversation;
pub mod guardrails;
pub mod llm;
pub mod prompt;
pub mod runtime;
pub mod sse;

pub use conversation::{ChatMessage, ChatRequest, Role};
pub use guardrails::{GuardrailFinding, GuardrailPolicy};
pub use llm::{ChatTransport, ChunkSource, HttpChatTransport, ReplayTransport, StreamError};
pub use runtime::{AgentError, AgentRuntime, AssistantReply};
pub use sse::{IngestState, StreamIngestor, StreamTranscript};
