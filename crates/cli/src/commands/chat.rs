use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use mater_agent::conversation::{ChatMessage, ChatRequest};
use mater_agent::llm::{ChatTransport, HttpChatTransport, ReplayTransport};
use mater_agent::runtime::{AgentError, AgentRuntime, AssistantReply};
use mater_core::Field;
use serde::Serialize;
use tracing::{debug, warn};

use crate::commands::{load_catalog, CommandResult, EXIT_INPUT, EXIT_UPSTREAM};

const COMMAND: &str = "chat";
const REPLAY_CHUNK_BYTES: usize = 64;

#[derive(Debug, Default)]
pub struct ChatOptions<'a> {
    pub message: &'a str,
    pub field: Option<&'a str>,
    pub specialty: Option<&'a str>,
    pub optimization: Option<&'a str>,
    /// Recorded event-stream transcript played instead of calling the endpoint.
    pub replay: Option<&'a Path>,
}

#[derive(Debug, Serialize)]
struct ChatSummary<'a> {
    field: Field,
    completed: bool,
    clean_text: &'a str,
    cards: &'a [mater_core::cards::ParsedCard],
    findings: Vec<FindingView>,
}

#[derive(Debug, Serialize)]
struct FindingView {
    reason_code: &'static str,
    message: String,
}

/// Streams the answer to stdout as it arrives, then returns the parsed cards.
pub fn run(options: ChatOptions<'_>) -> CommandResult {
    let field = match options.field.map(str::parse::<Field>).transpose() {
        Ok(field) => field.unwrap_or_default(),
        Err(error) => {
            warn!(
                event_name = "cli.chat.field_defaulted",
                error = %error,
                "unknown field, answering as medicine"
            );
            Field::Medicine
        }
    };
    let (config, catalog) = match load_catalog(COMMAND) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let transport: Arc<dyn ChatTransport> = match options.replay {
        Some(path) => match fs::read(path) {
            Ok(bytes) => Arc::new(ReplayTransport::from_transcript(&bytes, REPLAY_CHUNK_BYTES)),
            Err(error) => {
                return CommandResult::failure(
                    COMMAND,
                    "io",
                    format!("could not read transcript `{}`: {error}", path.display()),
                    EXIT_INPUT,
                );
            }
        },
        None => match HttpChatTransport::from_config(&config.llm) {
            Ok(transport) => Arc::new(transport),
            Err(error) => {
                return CommandResult::failure(
                    COMMAND,
                    error.error_class(),
                    error.to_string(),
                    EXIT_UPSTREAM,
                );
            }
        },
    };

    let mut request = ChatRequest::new(field, vec![ChatMessage::user(options.message)]);
    request.specialty = options.specialty.map(str::to_string);
    request.optimization = options.optimization.map(str::to_string);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            );
        }
    };

    let agent = AgentRuntime::new(Arc::new(catalog), transport);
    let correlation_id = format!("cli-{}", std::process::id());
    let mut echo = DeltaEcho::new(io::stdout());
    let result = runtime.block_on(agent.ask(&request, &correlation_id, |delta| echo.forward(delta)));
    if let Some(error) = echo.finish() {
        debug!(
            event_name = "cli.chat.stdout_closed",
            correlation_id = %correlation_id,
            error = %error,
            "stopped echoing deltas after a stdout write failure"
        );
    }

    match result {
        Ok(reply) => summarize(field, &reply),
        Err(AgentError::InvalidRequest(error)) => {
            CommandResult::failure(COMMAND, "invalid_input", error.to_string(), EXIT_INPUT)
        }
        Err(AgentError::Stream(error)) => {
            CommandResult::failure(COMMAND, error.error_class(), error.to_string(), EXIT_UPSTREAM)
        }
    }
}

/// Echoes deltas to a writer until the first write fails.
struct DeltaEcho<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> DeltaEcho<W> {
    fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn forward(&mut self, delta: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.out.write_all(delta.as_bytes()).and_then(|()| self.out.flush()) {
            self.error = Some(error);
        }
    }

    /// Terminates the echoed line and reports the first write failure.
    fn finish(mut self) -> Option<io::Error> {
        if self.error.is_none() {
            self.error = writeln!(self.out).err();
        }
        self.error
    }
}

fn summarize(field: Field, reply: &AssistantReply) -> CommandResult {
    let summary = ChatSummary {
        field,
        completed: reply.completed,
        clean_text: &reply.clean_text,
        cards: &reply.cards,
        findings: reply
            .findings
            .iter()
            .map(|finding| FindingView {
                reason_code: finding.reason_code(),
                message: finding.user_message(),
            })
            .collect(),
    };
    let message = format!(
        "{} card(s), {} guardrail finding(s)",
        summary.cards.len(),
        summary.findings.len()
    );
    CommandResult::success_with(COMMAND, message, Some(&summary))
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use super::DeltaEcho;

    struct ClosedPipe {
        attempts: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts += 1;
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn echo_writes_deltas_then_newline() {
        let mut echo = DeltaEcho::new(Vec::new());
        echo.forward("Hel");
        echo.forward("lo");
        assert!(echo.error.is_none());
        assert_eq!(echo.out, b"Hello");
        assert!(echo.finish().is_none());
    }

    #[test]
    fn echo_stops_after_first_write_failure() {
        let mut pipe = ClosedPipe { attempts: 0 };
        let mut echo = DeltaEcho::new(&mut pipe);
        echo.forward("first");
        echo.forward("second");
        let error = echo.finish().expect("write failure is reported");

        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(pipe.attempts, 1);
    }
}
