//! Generic HTTP chat-completion executor.
//!
//! One implementation serves every HTTP-backed provider family; only the
//! [`ChatClient`] differs.

use crate::client::ChatClient;
use async_trait::async_trait;
use counsel_types::{
    Capabilities, CounselError, ExecutionRequest, ExecutionResult, Executor, Result, TokenUsage,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

/// Executor for direct chat-completion APIs.
pub struct ApiExecutor {
    client: Arc<dyn ChatClient>,
}

impl std::fmt::Debug for ApiExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiExecutor").finish_non_exhaustive()
    }
}

impl ApiExecutor {
    /// Creates an executor over the given client.
    #[must_use]
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Executor for ApiExecutor {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            is_cli: false,
            supports_threads: false,
            supports_file_refs: false,
        }
    }

    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult> {
        // File references are accepted for interface uniformity but cannot
        // be used here: callers must inline file contents into the prompt
        // before choosing this executor. Non-fatal by design.
        if !request.file_paths.is_empty() {
            warn!(
                model = %request.model,
                count = request.file_paths.len(),
                "file paths ignored by API backend; inline file contents into the prompt"
            );
        }

        let body = json!({
            "model": request.model,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.prompt},
            ],
        });
        let value = self.client.chat(&body).await?;

        let content = extract_content(&value).ok_or(CounselError::NoContent)?;
        let usage = extract_usage(&value);

        Ok(ExecutionResult {
            response: content,
            usage: Some(usage),
            thread_id: None,
        })
    }
}

/// Pulls the first completion choice's message content, if non-empty.
fn extract_content(value: &Value) -> Option<String> {
    let content = value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)?;
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

/// Reads the wire usage counters; missing fields count as zero.
fn extract_usage(value: &Value) -> TokenUsage {
    TokenUsage {
        prompt_tokens: value
            .pointer("/usage/prompt_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        completion_tokens: value
            .pointer("/usage/completion_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::RecordingChat;

    fn completion(content: &str) -> Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 1},
        })
    }

    #[tokio::test]
    async fn test_two_message_completion() {
        let chat = Arc::new(RecordingChat::new(completion("4")));
        let executor = ApiExecutor::new(Arc::clone(&chat) as Arc<dyn ChatClient>);

        let result = executor
            .execute(ExecutionRequest::new("What is 2+2?", "gpt-5.2", "be terse"))
            .await
            .unwrap();

        assert_eq!(result.response, "4");
        assert_eq!(
            result.usage,
            Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 1
            })
        );
        assert!(result.thread_id.is_none());

        let bodies = chat.bodies();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["model"], "gpt-5.2");
        assert_eq!(bodies[0]["messages"][0]["role"], "system");
        assert_eq!(bodies[0]["messages"][0]["content"], "be terse");
        assert_eq!(bodies[0]["messages"][1]["role"], "user");
        assert_eq!(bodies[0]["messages"][1]["content"], "What is 2+2?");
    }

    #[tokio::test]
    async fn test_file_paths_ignored_not_errored() {
        let with_files = Arc::new(RecordingChat::new(completion("4")));
        let without_files = Arc::new(RecordingChat::new(completion("4")));

        let result = ApiExecutor::new(Arc::clone(&with_files) as Arc<dyn ChatClient>)
            .execute(
                ExecutionRequest::new("What is 2+2?", "gpt-5.2", "be terse")
                    .with_files(vec!["a.rs".to_string()]),
            )
            .await
            .unwrap();
        assert_eq!(result.response, "4");

        ApiExecutor::new(Arc::clone(&without_files) as Arc<dyn ChatClient>)
            .execute(ExecutionRequest::new("What is 2+2?", "gpt-5.2", "be terse"))
            .await
            .unwrap();

        // The request body is identical to the no-files case.
        assert_eq!(with_files.bodies(), without_files.bodies());
    }

    #[tokio::test]
    async fn test_empty_content_is_reported_not_retried() {
        let chat = Arc::new(RecordingChat::new(completion("")));
        let err = ApiExecutor::new(Arc::clone(&chat) as Arc<dyn ChatClient>)
            .execute(ExecutionRequest::new("p", "gpt-5.2", "s"))
            .await
            .unwrap_err();
        assert!(matches!(err, CounselError::NoContent));
        assert_eq!(chat.bodies().len(), 1, "no internal retry");
    }

    #[tokio::test]
    async fn test_missing_choices_is_no_content() {
        let chat = Arc::new(RecordingChat::new(json!({"usage": {}})));
        let err = ApiExecutor::new(chat as Arc<dyn ChatClient>)
            .execute(ExecutionRequest::new("p", "gpt-5.2", "s"))
            .await
            .unwrap_err();
        assert!(matches!(err, CounselError::NoContent));
    }

    #[test]
    fn test_capabilities() {
        let chat = Arc::new(RecordingChat::new(completion("x")));
        let caps = ApiExecutor::new(chat as Arc<dyn ChatClient>).capabilities();
        assert!(!caps.is_cli);
        assert!(!caps.supports_threads);
        assert!(!caps.supports_file_refs);
    }
}
