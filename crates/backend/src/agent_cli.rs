//! General-purpose coding-agent CLI executor, ask-only mode.
//!
//! Drives a multi-model agent CLI with editing explicitly disabled: the
//! prompt is the last positional argument, output is one JSON document, and
//! resume goes through a `--resume` flag. Model-name quirks of this backend
//! are remapped here and never leak into the resolver.

use crate::runner::{CommandRunner, Invocation, RunOutput};
use async_trait::async_trait;
use counsel_types::{
    Capabilities, CounselError, ExecutionRequest, ExecutionResult, Executor, ReasoningEffort,
    Result,
};
use serde::Deserialize;
use std::sync::Arc;

/// Default program name.
const DEFAULT_PROGRAM: &str = "claude";

/// Tools the agent is forbidden to use in ask-only mode.
const DISALLOWED_TOOLS: &str = "Edit,Write,NotebookEdit";

/// Executor for a shared coding-agent CLI.
pub struct AgentCliExecutor {
    program: String,
    reasoning_effort: Option<ReasoningEffort>,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for AgentCliExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentCliExecutor")
            .field("program", &self.program)
            .field("reasoning_effort", &self.reasoning_effort)
            .finish_non_exhaustive()
    }
}

/// The single JSON document the CLI prints on stdout.
#[derive(Debug, Deserialize)]
struct ResultDocument {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    result: Option<String>,
}

impl AgentCliExecutor {
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

    /// Sets the reasoning-effort knob applied during model remapping.
    #[must_use]
    pub fn with_reasoning_effort(mut self, effort: Option<ReasoningEffort>) -> Self {
        self.reasoning_effort = effort;
        self
    }

    /// Rewrites a catalog model name into the form this backend recognises.
    ///
    /// The backend rejects the `-latest` suffix, and selects reasoning depth
    /// for `gpt-5` models through a name modifier.
    fn remap_model(&self, model: &str) -> String {
        let base = model.strip_suffix("-latest").unwrap_or(model);
        if let Some(effort) = self.reasoning_effort
            && base.starts_with("gpt-5")
        {
            return format!("{base}-{effort}");
        }
        base.to_string()
    }

    /// Composes the positional prompt for one turn.
    fn compose_prompt(request: &ExecutionRequest) -> String {
        let mut prompt = if request.thread_id.is_some() {
            request.prompt.clone()
        } else {
            format!("{}\n\n{}", request.system_prompt, request.prompt)
        };
        if !request.file_paths.is_empty() {
            prompt.push_str("\n\nPlease read these files for context:\n");
            for path in &request.file_paths {
                prompt.push_str(&format!("- {path}\n"));
            }
        }
        prompt
    }

    /// Builds the argument vector for one turn.
    fn build_args(&self, request: &ExecutionRequest) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            "--output-format".to_string(),
            "json".to_string(),
            "--disallowed-tools".to_string(),
            DISALLOWED_TOOLS.to_string(),
            "--model".to_string(),
            self.remap_model(&request.model),
        ];
        if let Some(session) = &request.thread_id {
            args.push("--resume".to_string());
            args.push(session.clone());
        }
        args.push("--".to_string());
        args.push(Self::compose_prompt(request));
        args
    }
}

#[async_trait]
impl Executor for AgentCliExecutor {
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

        let doc: ResultDocument = serde_json::from_str(output.stdout.trim())
            .map_err(|_| CounselError::parse_failure("expected a JSON document", &output.stdout))?;
        let response = doc
            .result
            .filter(|r| !r.is_empty())
            .ok_or_else(|| CounselError::parse_failure("missing result field", &output.stdout))?;

        Ok(ExecutionResult {
            response,
            usage: None,
            thread_id: doc.session_id,
        })
    }
}
