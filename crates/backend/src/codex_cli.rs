//! Codex session CLI executor.
//!
//! Drives a CLI that emits JSON-Lines events, one per stdout line, with
//! thread lifecycle events interleaved with message events. Fresh turns use
//! the `exec` subcommand; resumed turns use `exec resume <thread_id>`.

use crate::runner::{CommandRunner, Invocation, RunOutput};
use async_trait::async_trait;
use counsel_types::{
    Capabilities, CounselError, ExecutionRequest, ExecutionResult, Executor, ReasoningEffort,
    Result,
};
use serde_json::Value;
use std::sync::Arc;

/// Default program name.
const DEFAULT_PROGRAM: &str = "codex";

/// Executor for the Codex CLI.
pub struct CodexCliExecutor {
    program: String,
    reasoning_effort: Option<ReasoningEffort>,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for CodexCliExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodexCliExecutor")
            .field("program", &self.program)
            .field("reasoning_effort", &self.reasoning_effort)
            .finish_non_exhaustive()
    }
}

/// What the event-stream parser accumulated over a full run.
#[derive(Debug, Default, PartialEq)]
struct ParsedEvents {
    thread_id: Option<String>,
    messages: Vec<String>,
}

impl CodexCliExecutor {
    /// Creates an executor using the default program name.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_program(runner, DEFAULT_PROGRAM)
    }

    /// Creates an executor with a custom program name or path.
    #[must_use]
    pub fn with_program(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            reasoning_effort: None,
            runner,
        }
    }

    /// Sets the reasoning-effort override forwarded to the CLI.
    #[must_use]
    pub fn with_reasoning_effort(mut self, effort: Option<ReasoningEffort>) -> Self {
        self.reasoning_effort = effort;
        self
    }

    /// Composes the prompt text for one turn. The system prompt is sent only
    /// on session start; file references are resent every turn.
    fn compose_prompt(request: &ExecutionRequest) -> String {
        let mut prompt = if request.thread_id.is_some() {
            request.prompt.clone()
        } else {
            format!("{}\n\n{}", request.system_prompt, request.prompt)
        };
        if !request.file_paths.is_empty() {
            prompt.push_str("\n\nRead these files for context:\n");
            for path in &request.file_paths {
                prompt.push_str(&format!("- {path}\n"));
            }
        }
        prompt
    }

    /// Builds the argument vector for one turn.
    fn build_args(&self, request: &ExecutionRequest) -> Vec<String> {
        let mut args = vec!["exec".to_string()];
        match &request.thread_id {
            Some(thread) => {
                args.push("resume".to_string());
                args.push(thread.clone());
                args.push("--json".to_string());
            }
            None => {
                args.push("--json".to_string());
                args.push("--model".to_string());
                args.push(request.model.clone());
            }
        }
        if let Some(effort) = self.reasoning_effort {
            args.push("-c".to_string());
            args.push(format!("model_reasoning_effort={effort}"));
        }
        args.push("--".to_string());
        args.push(Self::compose_prompt(request));
        args
    }
}

/// Scans every stdout line independently, ignoring lines that are not JSON
/// and JSON lines of irrelevant event types.
fn parse_events(stdout: &str) -> ParsedEvents {
    let mut parsed = ParsedEvents::default();
    for line in stdout.lines() {
        let Ok(event) = serde_json::from_str::<Value>(line) else {
            continue;
        };
        match event.get("type").and_then(Value::as_str) {
            Some("thread.started") => {
                if let Some(id) = event.get("thread_id").and_then(Value::as_str) {
                    parsed.thread_id = Some(id.to_string());
                }
            }
            Some("item.completed") => {
                let item = &event["item"];
                if item.get("type").and_then(Value::as_str) == Some("agent_message")
                    && let Some(text) = item.get("text").and_then(Value::as_str)
                {
                    parsed.messages.push(text.to_string());
                }
            }
            _ => {}
        }
    }
    parsed
}

#[async_trait]
impl Executor for CodexCliExecutor {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            is_cli: true,
            supports_threads: true,
            supports_file_refs: true,
        }
    }

    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult> {
        let invocation = Invocation::new(self.program.clone(), self.build_args(&request));
        let output: RunOutput = self.runner.run(invocation).await?;

        if !output.success() {
            return Err(CounselError::Backend {
                exit_code: output.exit_code.unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            });
        }

        let parsed = parse_events(&output.stdout);
        if parsed.messages.is_empty() {
            // Exit code 0 with no agent message is still a failure.
            return Err(CounselError::parse_failure(
                "no message produced",
                &output.stdout,
            ));
        }

        Ok(ExecutionResult {
            response: parsed.messages.join("\n"),
            usage: None,
            thread_id: parsed.thread_id,
        })
    }
}
