use counsel_types::{BackendKind, ProviderId, ReasoningEffort};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for a single provider family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Raw API key for the family's HTTP endpoint. Falls back to the
    /// family's conventional environment variable when absent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// How requests for this family are executed (defaults to `api`).
    #[serde(default)]
    pub backend: BackendKind,
    /// Reasoning-effort knob forwarded to CLI backends that support one.
    #[serde(default)]
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Override for the CLI program name or path.
    #[serde(default)]
    pub command: Option<String>,
}

fn default_system_prompt() -> String {
    "You are a careful senior engineer consulted for a second opinion. \
     Answer precisely; refer to files by path."
        .to_string()
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// System prompt sent on every fresh conversation turn.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Per-family provider configuration.
    #[serde(default)]
    pub providers: HashMap<ProviderId, ProviderSettings>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            providers: HashMap::new(),
        }
    }
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults and the
    /// `COUNSEL_` environment overlay.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &std::path::Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("COUNSEL_").split("__"))
            .extract()
    }

    /// Returns the settings for a family, defaulted when not configured.
    #[must_use]
    pub fn provider(&self, id: ProviderId) -> ProviderSettings {
        self.providers.get(&id).cloned().unwrap_or_default()
    }

    /// Returns the active backend preference for a family.
    #[must_use]
    pub fn backend(&self, id: ProviderId) -> BackendKind {
        self.provider(id).backend
    }

    /// Resolves the API key for a family: explicit config first, then the
    /// family's conventional environment variable.
    #[must_use]
    pub fn api_key(&self, id: ProviderId) -> Option<String> {
        self.provider(id)
            .api_key
            .or_else(|| std::env::var(id.api_key_var()).ok())
    }
}
