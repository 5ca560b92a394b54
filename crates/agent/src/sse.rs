//! Server-sent-event ingestion for streamed chat completions.
//!
//! Lines are reassembled from raw byte chunks, so a chunk boundary may fall
//! anywhere, including inside a multi-byte character. Only `data: ` lines
//! carry payloads; `[DONE]` ends the read loop.

use serde_json::Value;
use tracing::debug;

use crate::llm::{ChunkSource, StreamError};

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IngestState {
    #[default]
    Open,
    Streaming,
    /// Buffered bytes that do not yet form a parseable line.
    IncompleteLine,
    Done,
    Failed,
}

impl IngestState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamTranscript {
    pub text: String,
    pub deltas: usize,
    /// Whether the `[DONE]` sentinel arrived before the stream closed.
    pub completed: bool,
}

impl StreamTranscript {
    fn push(&mut self, delta: &str) {
        self.text.push_str(delta);
        self.deltas += 1;
    }
}

#[derive(Debug, Default)]
pub struct StreamIngestor {
    buffer: Vec<u8>,
    /// Leading buffered bytes already known to hold no newline.
    scanned: usize,
    /// A malformed complete line sits at the head of the buffer.
    blocked: bool,
    state: IngestState,
    saw_done: bool,
}

enum Line<'a> {
    Ignored,
    Done,
    Payload(&'a str),
}

enum Step {
    Skip,
    Emit(String),
    Done,
    Rebuffer,
}

impl StreamIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    pub fn saw_done(&self) -> bool {
        self.saw_done
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Appends `chunk` and returns the deltas of every complete line, in order.
    ///
    /// A complete line whose payload is not valid JSON stays at the head of the
    /// buffer and pauses the scan until [`StreamIngestor::finish`].
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.state.is_terminal() {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);
        if self.blocked {
            self.state = IngestState::IncompleteLine;
            return Vec::new();
        }

        let mut deltas = Vec::new();
        let mut consumed = 0;
        let mut search_from = self.scanned;
        while let Some(offset) = self.buffer[search_from..].iter().position(|byte| *byte == b'\n')
        {
            let end = search_from + offset;
            let step = {
                let line = String::from_utf8_lossy(&self.buffer[consumed..end]);
                match classify(&line) {
                    Line::Ignored => Step::Skip,
                    Line::Done => Step::Done,
                    Line::Payload(payload) => match delta_content(payload) {
                        Ok(Some(content)) => Step::Emit(content),
                        Ok(None) => Step::Skip,
                        Err(error) => {
                            debug!(
                                event_name = "agent.stream.line_rebuffered",
                                line_bytes = end - consumed,
                                error = %error,
                                "data line is not valid JSON yet"
                            );
                            Step::Rebuffer
                        }
                    },
                }
            };

            match step {
                Step::Rebuffer => {
                    self.blocked = true;
                    break;
                }
                Step::Done => {
                    consumed = end + 1;
                    self.saw_done = true;
                    break;
                }
                Step::Emit(content) => deltas.push(content),
                Step::Skip => {}
            }
            consumed = end + 1;
            search_from = consumed;
        }
        self.buffer.drain(..consumed);
        self.scanned = if self.blocked || self.saw_done { 0 } else { self.buffer.len() };

        self.state = if self.saw_done {
            IngestState::Done
        } else if self.blocked || !self.buffer.is_empty() {
            IngestState::IncompleteLine
        } else {
            IngestState::Streaming
        };
        deltas
    }

    /// Final pass over whatever is still buffered once the peer stops sending.
    ///
    /// Unlike [`StreamIngestor::feed`] nothing is retried: malformed lines are
    /// dropped, `[DONE]` lines are skipped and a last line without a trailing
    /// newline is still read.
    pub fn finish(&mut self) -> Vec<String> {
        if self.state == IngestState::Failed {
            return Vec::new();
        }
        let residue = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        self.blocked = false;
        self.state = IngestState::Done;

        let text = String::from_utf8_lossy(&residue);
        if text.trim().is_empty() {
            return Vec::new();
        }
        text.split('\n')
            .filter_map(|raw| match classify(raw) {
                Line::Payload(payload) => delta_content(payload).ok().flatten(),
                Line::Ignored | Line::Done => None,
            })
            .collect()
    }

    pub fn fail(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
        self.blocked = false;
        self.state = IngestState::Failed;
    }

    /// Reads `source` to the end, forwarding each delta to `on_delta` as it is
    /// decoded. Dropping the returned future closes the source.
    pub async fn drive<F>(
        mut self,
        mut source: Box<dyn ChunkSource>,
        mut on_delta: F,
    ) -> Result<StreamTranscript, StreamError>
    where
        F: FnMut(&str) + Send,
    {
        let mut transcript = StreamTranscript::default();
        while !self.state.is_terminal() {
            match source.next_chunk().await {
                Ok(Some(chunk)) => {
                    for delta in self.feed(&chunk) {
                        on_delta(&delta);
                        transcript.push(&delta);
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    self.fail();
                    return Err(error);
                }
            }
        }
        drop(source);

        for delta in self.finish() {
            on_delta(&delta);
            transcript.push(&delta);
        }
        transcript.completed = self.saw_done;
        Ok(transcript)
    }
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if line.starts_with(':') || line.trim().is_empty() {
        return Line::Ignored;
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Line::Ignored;
    };
    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        Line::Done
    } else {
        Line::Payload(payload)
    }
}

fn delta_content(payload: &str) -> Result<Option<String>, serde_json::Error> {
    let value: Value = serde_json::from_str(payload)?;
    Ok(value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .map(str::to_owned))
}
