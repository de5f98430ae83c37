//! Prompt-text assembly from files and git diffs.
//!
//! Pure concatenation: file contents are wrapped in fenced blocks labelled
//! with their path, the working-tree diff is captured through the shared
//! subprocess runner (argument vector, no shell), and everything is joined
//! ahead of the user's question.

use counsel_backend::{CommandRunner, Invocation};
use counsel_types::{CounselError, Result};

/// Reads each file and renders it as a labelled fenced block.
///
/// # Errors
///
/// Returns [`CounselError::Io`] naming the first unreadable file.
pub async fn inline_files(paths: &[String]) -> Result<String> {
    let mut blocks = String::new();
    for path in paths {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CounselError::Io(format!("reading {path}: {e}")))?;
        blocks.push_str(&format!("## {path}\n```\n{content}\n```\n\n"));
    }
    Ok(blocks)
}

/// Captures the working-tree diff via `git diff --no-color`.
///
/// Returns `None` when the tree is clean.
///
/// # Errors
///
/// Returns [`CounselError::Io`] when git cannot produce a diff.
pub async fn capture_diff(runner: &dyn CommandRunner) -> Result<Option<String>> {
    let output = runner
        .run(Invocation::new(
            "git",
            vec!["diff".to_string(), "--no-color".to_string()],
        ))
        .await?;
    if !output.success() {
        return Err(CounselError::Io(format!(
            "git diff failed: {}",
            output.stderr.trim()
        )));
    }
    let diff = output.stdout.trim().to_string();
    Ok(if diff.is_empty() { None } else { Some(diff) })
}

/// Joins context blocks and the user's question into the final prompt text.
#[must_use]
pub fn compose(file_blocks: &str, diff: Option<&str>, prompt: &str) -> String {
    let mut out = String::new();
    if !file_blocks.is_empty() {
        out.push_str(file_blocks);
    }
    if let Some(diff) = diff {
        out.push_str(&format!("## git diff\n```diff\n{diff}\n```\n\n"));
    }
    out.push_str(prompt);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedRunner;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_inline_files_renders_labelled_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "remember the invariant").unwrap();

        let blocks = inline_files(&[path.to_string_lossy().into_owned()])
            .await
            .unwrap();
        assert!(blocks.contains("notes.txt"));
        assert!(blocks.contains("remember the invariant"));
        assert!(blocks.contains("```"));
    }

    #[tokio::test]
    async fn test_inline_files_names_unreadable_file() {
        let err = inline_files(&["definitely/missing.rs".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("definitely/missing.rs"));
    }

    #[tokio::test]
    async fn test_capture_diff_uses_argument_vector() {
        let runner = Arc::new(ScriptedRunner::with_output("+added line\n", "", 0));
        let diff = capture_diff(runner.as_ref()).await.unwrap();
        assert_eq!(diff.as_deref(), Some("+added line"));

        let call = &runner.calls()[0];
        assert_eq!(call.program, "git");
        assert_eq!(call.args, vec!["diff".to_string(), "--no-color".to_string()]);
    }

    #[tokio::test]
    async fn test_capture_diff_clean_tree_is_none() {
        let runner = Arc::new(ScriptedRunner::with_output("", "", 0));
        assert!(capture_diff(runner.as_ref()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_capture_diff_failure_surfaces_stderr() {
        let runner = Arc::new(ScriptedRunner::with_output(
            "",
            "fatal: not a git repository",
            128,
        ));
        let err = capture_diff(runner.as_ref()).await.unwrap_err();
        assert!(err.to_string().contains("not a git repository"));
    }

    #[test]
    fn test_compose_orders_context_before_question() {
        let out = compose("## a.rs\n```\nfn a() {}\n```\n\n", Some("+x"), "why?");
        let files_at = out.find("a.rs").unwrap();
        let diff_at = out.find("git diff").unwrap();
        let question_at = out.find("why?").unwrap();
        assert!(files_at < diff_at);
        assert!(diff_at < question_at);
    }

    #[test]
    fn test_compose_without_context_is_the_prompt() {
        assert_eq!(compose("", None, "just ask"), "just ask");
    }
}
