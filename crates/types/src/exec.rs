//! The executor contract shared by every backend shape.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a given executor instance supports, used to validate requests before
/// any network or process activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// The executor spawns a local CLI process rather than calling HTTP.
    pub is_cli: bool,
    /// The backend can resume a prior conversation via a thread id.
    pub supports_threads: bool,
    /// The backend accepts file references instead of inlined file content.
    pub supports_file_refs: bool,
}

/// Prompt and completion token counts as reported by an HTTP API.
///
/// CLI backends do not report usage; results from them carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// One prompt-submission request. Ephemeral; not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// The user prompt text (context already assembled by the caller).
    pub prompt: String,
    /// The model identifier, fixed at catalog-build time.
    pub model: String,
    /// The system prompt. Not resent on resumed turns.
    pub system_prompt: String,
    /// File references; only meaningful when `supports_file_refs`.
    /// An empty vector is equivalent to no files.
    pub file_paths: Vec<String>,
    /// Opaque backend-minted thread id to resume; only meaningful when
    /// `supports_threads`.
    pub thread_id: Option<String>,
}

impl ExecutionRequest {
    /// Creates a request with no file context and no thread.
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            system_prompt: system_prompt.into(),
            file_paths: Vec::new(),
            thread_id: None,
        }
    }

    /// Attaches file references to the request.
    #[must_use]
    pub fn with_files(mut self, file_paths: Vec<String>) -> Self {
        self.file_paths = file_paths;
        self
    }

    /// Marks the request as resuming a prior conversation.
    #[must_use]
    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }
}

/// The model's answer. Ephemeral; not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Response text; non-empty on success.
    pub response: String,
    /// Token usage; present only for API executors.
    pub usage: Option<TokenUsage>,
    /// Thread id for resuming; present only when the backend started or
    /// continued a session.
    pub thread_id: Option<String>,
}

/// Uniform prompt-submission-and-response unit for one backend shape.
///
/// Executors are stateless: created once per (model, backend preference)
/// pair, cached for the process lifetime, and never mutated after
/// construction.
#[async_trait]
pub trait Executor: std::fmt::Debug + Send + Sync {
    /// The capability set declared by this executor.
    fn capabilities(&self) -> Capabilities;

    /// Submits the prompt and awaits the backend's complete answer.
    ///
    /// # Errors
    ///
    /// Surfaces every failure to the caller: configuration errors, spawn
    /// failures, malformed backend output, and backend-reported errors.
    /// There are no internal retries at this layer.
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult>;
}
