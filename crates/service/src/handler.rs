//! The single consultation operation: validate, assemble context, resolve a
//! backend, execute, and shape the reply.

use crate::{context, cost};
use counsel_backend::{BackendResolver, CommandRunner, catalog, dispatch};
use counsel_config::Config;
use counsel_types::{BackendKind, CounselError, ExecutionRequest, ExecutionResult, Result};
use std::sync::Arc;
use tracing::debug;

/// One incoming consultation.
#[derive(Debug, Clone, Default)]
pub struct ConsultRequest {
    pub prompt: String,
    pub model: String,
    /// Files offered as context; inlined or passed by reference depending on
    /// the resolved executor's capabilities.
    pub file_paths: Vec<String>,
    /// Include the current working-tree diff as context.
    pub include_diff: bool,
    /// Resume a prior conversation with the same model and backend.
    pub thread_id: Option<String>,
}

/// Owns the resolver and runner for the lifetime of the process; request
/// handlers borrow it. No global state.
pub struct Consultant {
    resolver: BackendResolver,
    runner: Arc<dyn CommandRunner>,
}

impl Consultant {
    /// Creates a consultant that spawns real subprocesses.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let resolver = BackendResolver::new(config);
        let runner = resolver.runner();
        Self { resolver, runner }
    }

    /// Creates a consultant over an explicit runner (injected in tests).
    #[must_use]
    pub fn with_runner(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            resolver: BackendResolver::with_runner(config, Arc::clone(&runner)),
            runner,
        }
    }

    /// The backend resolver, exposed for configuration reloads.
    #[must_use]
    pub fn resolver(&self) -> &BackendResolver {
        &self.resolver
    }

    /// Runs one consultation and returns the formatted reply.
    ///
    /// # Errors
    ///
    /// Surfaces validation, resolution, and execution errors unchanged.
    pub async fn consult(&self, request: ConsultRequest) -> Result<String> {
        if request.prompt.trim().is_empty() {
            return Err(CounselError::Config("prompt must not be empty".into()));
        }
        let family = catalog::resolve_family(&request.model)
            .ok_or_else(|| CounselError::UnknownModel(request.model.clone()))?;
        let config = self.resolver.config();

        // Web mode has no executor: hand the assembled prompt back for a
        // manual browser session.
        if config.backend(family) == BackendKind::Web {
            return self.web_handoff(&request, &config).await;
        }

        let executor = self.resolver.resolve(&request.model)?;
        let capabilities = executor.capabilities();

        let diff = if request.include_diff {
            context::capture_diff(self.runner.as_ref()).await?
        } else {
            None
        };

        // Executors that take file references get the paths verbatim;
        // everything else gets the contents inlined into the prompt.
        let (prompt, file_paths) = if capabilities.supports_file_refs {
            (
                context::compose("", diff.as_deref(), &request.prompt),
                request.file_paths.clone(),
            )
        } else {
            let blocks = context::inline_files(&request.file_paths).await?;
            (
                context::compose(&blocks, diff.as_deref(), &request.prompt),
                Vec::new(),
            )
        };

        debug!(
            model = %request.model,
            family = %family,
            is_cli = capabilities.is_cli,
            resumed = request.thread_id.is_some(),
            "dispatching consultation"
        );

        let mut execution =
            ExecutionRequest::new(prompt, request.model.clone(), config.system_prompt.clone())
                .with_files(file_paths);
        if let Some(thread) = &request.thread_id {
            execution = execution.with_thread(thread.clone());
        }

        let result = dispatch(executor.as_ref(), execution).await?;
        Ok(format_reply(&request.model, &result))
    }

    /// Assembles the full prompt for a manual browser hand-off.
    async fn web_handoff(&self, request: &ConsultRequest, config: &Config) -> Result<String> {
        if request.thread_id.is_some() {
            return Err(CounselError::Config(
                "web hand-off does not support thread resumption".into(),
            ));
        }
        let blocks = context::inline_files(&request.file_paths).await?;
        let diff = if request.include_diff {
            context::capture_diff(self.runner.as_ref()).await?
        } else {
            None
        };
        let composed = context::compose(&blocks, diff.as_deref(), &request.prompt);
        Ok(format!(
            "No executor is configured for model {} (backend: web).\n\
             Copy the prompt below into your browser chat:\n\n\
             {}\n\n{composed}",
            request.model, config.system_prompt
        ))
    }
}

/// Shapes the caller-facing reply: thread prefix, response body, usage
/// footer.
fn format_reply(model: &str, result: &ExecutionResult) -> String {
    let mut out = String::new();
    if let Some(thread) = &result.thread_id {
        out.push_str(&format!("[thread: {thread}]\n\n"));
    }
    out.push_str(&result.response);
    if let Some(usage) = result.usage {
        out.push_str("\n\n");
        out.push_str(&cost::footer(model, usage));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedRunner;
    use counsel_types::TokenUsage;

    fn consultant(yaml: &str, runner: Arc<ScriptedRunner>) -> Consultant {
        Consultant::with_runner(
            Config::from_yaml(yaml).unwrap(),
            runner as Arc<dyn CommandRunner>,
        )
    }

    fn gemini_request(prompt: &str) -> ConsultRequest {
        ConsultRequest {
            prompt: prompt.to_string(),
            model: "gemini-2.5-pro".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_reply_carries_thread_prefix() {
        let runner = Arc::new(ScriptedRunner::with_output(
            r#"{"session_id": "s1", "response": "hello"}"#,
            "",
            0,
        ));
        let consultant = consultant(
            "providers:\n  google:\n    backend: gemini-cli\n",
            Arc::clone(&runner),
        );
        let reply = consultant.consult(gemini_request("hi")).await.unwrap();
        assert!(reply.starts_with("[thread: s1]\n\n"));
        assert!(reply.contains("hello"));
        // CLI backends report no usage, so no cost footer.
        assert!(!reply.contains("tokens:"));
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let runner = Arc::new(ScriptedRunner::new());
        let consultant = consultant("providers: {}", Arc::clone(&runner));
        let err = consultant
            .consult(gemini_request("   "))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("prompt must not be empty"));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_model_rejected_before_any_work() {
        let runner = Arc::new(ScriptedRunner::new());
        let consultant = consultant("providers: {}", Arc::clone(&runner));
        let err = consultant
            .consult(ConsultRequest {
                prompt: "q".to_string(),
                model: "mystery-9000".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CounselError::UnknownModel(_)));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_file_refs_passed_through_to_capable_backend() {
        let runner = Arc::new(ScriptedRunner::with_output(
            r#"{"response": "ok"}"#,
            "",
            0,
        ));
        let consultant = consultant(
            "providers:\n  google:\n    backend: gemini-cli\n",
            Arc::clone(&runner),
        );
        let mut request = gemini_request("q");
        request.file_paths = vec!["src/lib.rs".to_string()];
        consultant.consult(request).await.unwrap();

        // The executor received the path as an @token; nothing was inlined.
        let prompt = runner.calls()[0].args.last().unwrap().clone();
        assert!(prompt.contains("@src/lib.rs"));
    }

    #[tokio::test]
    async fn test_diff_captured_through_runner_and_composed() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_output("+changed\n", "", 0); // git diff
        runner.push_output(r#"{"response": "ok"}"#, "", 0); // gemini
        let consultant = consultant(
            "providers:\n  google:\n    backend: gemini-cli\n",
            Arc::clone(&runner),
        );
        let mut request = gemini_request("what changed?");
        request.include_diff = true;
        consultant.consult(request).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].program, "git");
        let prompt = calls[1].args.last().unwrap();
        assert!(prompt.contains("+changed"));
        assert!(prompt.contains("what changed?"));
    }

    #[tokio::test]
    async fn test_web_mode_returns_prompt_without_resolving() {
        let runner = Arc::new(ScriptedRunner::new());
        let consultant = consultant(
            "providers:\n  google:\n    backend: web\n",
            Arc::clone(&runner),
        );
        let reply = consultant.consult(gemini_request("ponder this")).await.unwrap();
        assert!(reply.contains("backend: web"));
        assert!(reply.contains("ponder this"));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_web_mode_rejects_thread_resumption() {
        let runner = Arc::new(ScriptedRunner::new());
        let consultant = consultant(
            "providers:\n  google:\n    backend: web\n",
            Arc::clone(&runner),
        );
        let mut request = gemini_request("q");
        request.thread_id = Some("s1".to_string());
        let err = consultant.consult(request).await.unwrap_err();
        assert!(err.to_string().contains("does not support thread"));
    }

    #[test]
    fn test_format_reply_with_usage_footer() {
        let result = ExecutionResult {
            response: "4".to_string(),
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 1,
            }),
            thread_id: None,
        };
        let reply = format_reply("gpt-5.2", &result);
        assert!(reply.starts_with('4'));
        assert!(reply.contains("tokens: 10 in / 1 out"));
        assert!(!reply.contains("[thread:"));
    }
}
