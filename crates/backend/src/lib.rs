//! Backend selection and execution for the counsel tool.
//!
//! Hides three structurally different execution strategies behind one
//! contract: direct HTTP chat completion, spawned CLI processes with JSON or
//! JSON-Lines output, and (upstream of this crate) a manual hand-off mode
//! with no executor at all. The [`resolver::BackendResolver`] picks the
//! variant; [`dispatch`] validates a request against the chosen executor's
//! capability set before any network or process activity.

pub mod agent_cli;
pub mod api;
pub mod catalog;
pub mod client;
pub mod codex_cli;
pub mod gemini_cli;
pub mod resolver;
pub mod runner;

pub use agent_cli::AgentCliExecutor;
pub use api::ApiExecutor;
pub use client::{ApiClient, ChatClient, ClientFactory};
pub use codex_cli::CodexCliExecutor;
pub use gemini_cli::GeminiCliExecutor;
pub use resolver::BackendResolver;
pub use runner::{CommandRunner, Invocation, ProcessRunner, RunOutput};

use counsel_types::{CounselError, ExecutionRequest, ExecutionResult, Executor, Result};

/// Validates the request against the executor's capability set, then
/// executes it.
///
/// # Errors
///
/// Returns [`CounselError::Config`] when a thread id is supplied to an
/// executor that does not support threads; the rejection happens before any
/// spawn or HTTP call. All executor errors are surfaced unchanged.
pub async fn dispatch(
    executor: &dyn Executor,
    request: ExecutionRequest,
) -> Result<ExecutionResult> {
    let capabilities = executor.capabilities();
    if request.thread_id.is_some() && !capabilities.supports_threads {
        return Err(CounselError::Config(format!(
            "backend for model {} does not support thread resumption",
            request.model
        )));
    }
    executor.execute(request).await
}
