//! Model catalog: static model lists and provider-family resolution.

use counsel_types::ProviderId;

/// Returns the list of supported `OpenAI` model identifiers.
#[must_use]
pub fn openai_models() -> Vec<String> {
    vec![
        "gpt-5.2".into(),
        "gpt-5.2-codex".into(),
        "gpt-5-mini".into(),
        "o4-mini".into(),
        "o3".into(),
        "codex-mini-latest".into(),
    ]
}

/// Returns the list of supported Gemini model identifiers.
#[must_use]
pub fn google_models() -> Vec<String> {
    vec![
        "gemini-2.5-pro".into(),
        "gemini-2.5-flash".into(),
        "gemini-2.0-flash".into(),
    ]
}

/// Returns the list of supported xAI model identifiers.
#[must_use]
pub fn xai_models() -> Vec<String> {
    vec!["grok-4".into(), "grok-code-fast-1".into()]
}

/// Returns the list of supported `DeepSeek` model identifiers.
#[must_use]
pub fn deepseek_models() -> Vec<String> {
    vec!["deepseek-chat".into(), "deepseek-reasoner".into()]
}

/// Returns the model identifiers for one family.
#[must_use]
pub fn models(family: ProviderId) -> Vec<String> {
    match family {
        ProviderId::OpenAi => openai_models(),
        ProviderId::Google => google_models(),
        ProviderId::XAi => xai_models(),
        ProviderId::DeepSeek => deepseek_models(),
    }
}

/// Map a model string to its provider family.
///
/// Families are prefix-disjoint by convention; the first matching pattern
/// wins. Returns `None` if the model is not recognised.
#[must_use]
pub fn resolve_family(model: &str) -> Option<ProviderId> {
    if model.starts_with("gemini-") {
        Some(ProviderId::Google)
    } else if model.starts_with("grok-") {
        Some(ProviderId::XAi)
    } else if model.starts_with("deepseek-") {
        Some(ProviderId::DeepSeek)
    } else if model.starts_with("gpt-")
        || model.starts_with("codex-")
        || model == "o3"
        || model.starts_with("o3-")
        || model.starts_with("o4-")
    {
        Some(ProviderId::OpenAi)
    } else {
        None
    }
}
