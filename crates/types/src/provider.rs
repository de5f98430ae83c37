//! Provider family and backend preference definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a provider family: the group of models served by the same HTTP
/// client configuration or CLI program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "xai")]
    XAi,
    #[serde(rename = "deepseek")]
    DeepSeek,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Google => write!(f, "google"),
            Self::XAi => write!(f, "xai"),
            Self::DeepSeek => write!(f, "deepseek"),
        }
    }
}

impl std::str::FromStr for ProviderId {
    type Err = crate::CounselError;

    /// Parse a provider name or well-known alias into a [`ProviderId`].
    ///
    /// # Errors
    ///
    /// Returns [`CounselError::Config`] if the string does not match any
    /// known provider name or alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" | "oai" => Ok(Self::OpenAi),
            "google" | "gemini" => Ok(Self::Google),
            "xai" | "grok" => Ok(Self::XAi),
            "deepseek" => Ok(Self::DeepSeek),
            other => Err(crate::CounselError::Config(format!(
                "unknown provider '{other}'"
            ))),
        }
    }
}

impl ProviderId {
    /// Returns all known provider families.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::OpenAi, Self::Google, Self::XAi, Self::DeepSeek]
    }

    /// The environment variable conventionally holding this family's API key.
    #[must_use]
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Google => "GEMINI_API_KEY",
            Self::XAi => "XAI_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }
}

/// How requests for a provider family are executed.
///
/// At most one preference is active per family at any time; the resolver's
/// executor cache is keyed on it so a changed preference can never serve a
/// stale executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Direct HTTP chat completion.
    #[default]
    Api,
    /// The Gemini session CLI (single JSON document output).
    GeminiCli,
    /// The Codex session CLI (JSON-Lines event output).
    CodexCli,
    /// A general-purpose coding-agent CLI in ask-only mode.
    AgentCli,
    /// Manual browser hand-off; no executor exists for this mode.
    Web,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::GeminiCli => write!(f, "gemini-cli"),
            Self::CodexCli => write!(f, "codex-cli"),
            Self::AgentCli => write!(f, "agent-cli"),
            Self::Web => write!(f, "web"),
        }
    }
}

/// Reasoning-effort knob forwarded to CLI backends that support one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}
