//! Gemini session CLI executor.
//!
//! Drives a CLI that prints one JSON document per run and resumes prior
//! conversations by session id. File context has no dedicated parameter:
//! references are appended to the prompt text as `@path` tokens.

use crate::runner::{CommandRunner, Invocation, RunOutput};
use async_trait::async_trait;
use counsel_types::{
    Capabilities, CounselError, ExecutionRequest, ExecutionResult, Executor, Result,
};
use serde::Deserialize;
use std::sync::Arc;

/// Default program name.
const DEFAULT_PROGRAM: &str = "gemini";

/// Stderr marker the CLI emits when the account's quota is exhausted.
const QUOTA_MARKER: &str = "RESOURCE_EXHAUSTED";

/// Executor for the Gemini CLI.
pub struct GeminiCliExecutor {
    program: String,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for GeminiCliExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiCliExecutor")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

/// The single JSON document the CLI prints on stdout.
#[derive(Debug, Deserialize)]
struct SessionDocument {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    response: Option<String>,
}

impl GeminiCliExecutor {
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
            runner,
        }
    }

    /// Composes the prompt text for one turn.
    ///
    /// Fresh turns carry the system prompt; resumed turns do not (the
    /// backend retains it from session start). File references are resent
    /// every turn.
    fn compose_prompt(request: &ExecutionRequest) -> String {
        let mut prompt = if request.thread_id.is_some() {
            request.prompt.clone()
        } else {
            format!("{}\n\n{}", request.system_prompt, request.prompt)
        };
        if !request.file_paths.is_empty() {
            let refs: Vec<String> = request
                .file_paths
                .iter()
                .map(|p| format!("@{p}"))
                .collect();
            prompt.push_str("\n\n");
            prompt.push_str(&refs.join(" "));
        }
        prompt
    }

    /// Builds the argument vector for one turn.
    fn build_args(request: &ExecutionRequest) -> Vec<String> {
        let mut args = Vec::new();
        match &request.thread_id {
            Some(session) => {
                args.push("--resume".to_string());
                args.push(session.clone());
            }
            None => {
                args.push("--model".to_string());
                args.push(request.model.clone());
            }
        }
        args.push("--output-format".to_string());
        args.push("json".to_string());
        args.push("--prompt".to_string());
        args.push(Self::compose_prompt(request));
        args
    }

    /// Translates a failed run into the matching domain error.
    fn classify_failure(output: &RunOutput) -> CounselError {
        if output.stderr.contains(QUOTA_MARKER) {
            return CounselError::QuotaExceeded(output.stderr.trim().to_string());
        }
        CounselError::Backend {
            exit_code: output.exit_code.unwrap_or(-1),
            stderr: output.stderr.trim().to_string(),
        }
    }
}

#[async_trait]
impl Executor for GeminiCliExecutor {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            is_cli: true,
            supports_threads: true,
            supports_file_refs: true,
        }
    }

    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult> {
        let invocation = Invocation::new(self.program.clone(), Self::build_args(&request));
        let output = self.runner.run(invocation).await?;

        if !output.success() {
            return Err(Self::classify_failure(&output));
        }

        let doc: SessionDocument = serde_json::from_str(output.stdout.trim())
            .map_err(|_| CounselError::parse_failure("expected a JSON document", &output.stdout))?;
        let response = doc
            .response
            .filter(|r| !r.is_empty())
            .ok_or_else(|| CounselError::parse_failure("missing response field", &output.stdout))?;

        Ok(ExecutionResult {
            response,
            usage: None,
            thread_id: doc.session_id,
        })
    }
}
