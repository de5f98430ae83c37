//! Cost estimation from a static per-model price table.

use counsel_types::TokenUsage;

/// Price per million tokens, USD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Price {
    pub input: f64,
    pub output: f64,
}

/// Returns the price entry for a catalog model, if listed.
#[must_use]
pub fn price_for(model: &str) -> Option<Price> {
    let (input, output) = match model {
        "gpt-5.2" | "gpt-5.2-codex" => (1.25, 10.0),
        "gpt-5-mini" => (0.25, 2.0),
        "o4-mini" => (1.1, 4.4),
        "o3" => (2.0, 8.0),
        "codex-mini-latest" => (1.5, 6.0),
        "gemini-2.5-pro" => (1.25, 10.0),
        "gemini-2.5-flash" => (0.3, 2.5),
        "gemini-2.0-flash" => (0.1, 0.4),
        "grok-4" => (3.0, 15.0),
        "grok-code-fast-1" => (0.2, 1.5),
        "deepseek-chat" => (0.27, 1.1),
        "deepseek-reasoner" => (0.55, 2.19),
        _ => return None,
    };
    Some(Price { input, output })
}

/// Estimated request cost in USD; `None` when the model has no price entry.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate(model: &str, usage: TokenUsage) -> Option<f64> {
    let price = price_for(model)?;
    Some(
        (usage.prompt_tokens as f64 * price.input + usage.completion_tokens as f64 * price.output)
            / 1_000_000.0,
    )
}

/// Renders the one-line usage footer shown under a response.
#[must_use]
pub fn footer(model: &str, usage: TokenUsage) -> String {
    let mut line = format!(
        "tokens: {} in / {} out",
        usage.prompt_tokens, usage.completion_tokens
    );
    if let Some(cost) = estimate(model, usage) {
        line.push_str(&format!(", est. cost ${cost:.4}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_known_model() {
        let usage = TokenUsage {
            prompt_tokens: 1_000_000,
            completion_tokens: 100_000,
        };
        let cost = estimate("gpt-5.2", usage).unwrap();
        assert!((cost - 2.25).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_unknown_model_is_none() {
        let usage = TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 10,
        };
        assert!(estimate("mystery-9000", usage).is_none());
    }

    #[test]
    fn test_footer_with_price_entry() {
        let usage = TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 1,
        };
        let line = footer("gpt-5.2", usage);
        assert!(line.starts_with("tokens: 10 in / 1 out"));
        assert!(line.contains("est. cost $"));
    }

    #[test]
    fn test_footer_without_price_entry_omits_cost() {
        let usage = TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 1,
        };
        let line = footer("mystery-9000", usage);
        assert_eq!(line, "tokens: 10 in / 1 out");
    }

    #[test]
    fn test_catalog_models_are_priced() {
        for family in counsel_types::ProviderId::all() {
            for model in counsel_backend::catalog::models(*family) {
                assert!(
                    price_for(&model).is_some(),
                    "model {model} is missing a price entry"
                );
            }
        }
    }
}
