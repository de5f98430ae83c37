//! Unified error type for the counsel workspace.

use thiserror::Error;

/// Maximum number of bytes of raw backend output included in a parse error.
///
/// Error messages must stay log-sized even when a CLI dumps megabytes of
/// unexpected output.
pub const SNIPPET_MAX: usize = 400;

/// Enumerates all error kinds that can occur across counsel crates.
#[derive(Debug, Error)]
pub enum CounselError {
    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A provider is selected but has no API key configured.
    #[error("missing API key for provider {provider}: set {key}")]
    MissingApiKey {
        provider: crate::ProviderId,
        key: &'static str,
    },

    /// The model string does not match any known provider family.
    #[error("cannot determine provider for model {0}")]
    UnknownModel(String),

    /// A CLI executable could not be launched.
    #[error("failed to launch '{program}': {message} (is it installed and on PATH?)")]
    Spawn { program: String, message: String },

    /// Backend output did not conform to the expected JSON shape.
    #[error("unexpected backend output: {message}: {snippet}")]
    Parse { message: String, snippet: String },

    /// A CLI backend exited with a non-zero status.
    #[error("backend exited with code {exit_code}: {stderr}")]
    Backend { exit_code: i32, stderr: String },

    /// The backend reported quota exhaustion.
    ///
    /// Distinct from [`CounselError::Backend`] so callers can react (e.g.
    /// suggest a cheaper model) rather than retry blindly.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The API returned a completion with no content.
    #[error("no content returned by API")]
    NoContent,

    /// The upstream HTTP API returned a non-success status.
    #[error("upstream error: status={status}, body={body}")]
    Upstream { status: u16, body: String },

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(String),

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while assembling context.
    #[error("io error: {0}")]
    Io(String),
}

// ── Feature-gated From impls ──────────────────────────────────────────────────

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for CounselError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl From<std::io::Error> for CounselError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl CounselError {
    /// Builds a [`CounselError::Parse`] with the raw output truncated to
    /// [`SNIPPET_MAX`] bytes.
    #[must_use]
    pub fn parse_failure(message: impl Into<String>, raw: &str) -> Self {
        Self::Parse {
            message: message.into(),
            snippet: truncate_snippet(raw),
        }
    }

    /// Returns `true` if the error is a quota-exhaustion report.
    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }
}

/// Truncates raw output to [`SNIPPET_MAX`] bytes on a char boundary.
fn truncate_snippet(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() <= SNIPPET_MAX {
        return trimmed.to_string();
    }
    let mut end = SNIPPET_MAX;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated {} bytes]", &trimmed[..end], trimmed.len() - end)
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CounselError>;
