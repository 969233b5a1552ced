//! Per-model pricing used for cost estimation.
//!
//! Prices are USD per million tokens and matched by model-family substring.
//! Unknown models fall back to a conservative default tier so spend is
//! over- rather than under-reported.

use super::ProviderKind;
use crate::session::response::Usage;

/// Input/output price in USD per million tokens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelPrice {
    pub const fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    pub const FREE: ModelPrice = ModelPrice::new(0.0, 0.0);

    pub fn cost(&self, usage: &Usage) -> f64 {
        (usage.prompt_tokens as f64 * self.input_per_million
            + usage.completion_tokens as f64 * self.output_per_million)
            / 1_000_000.0
    }
}

pub const DEFAULT_PRICE: ModelPrice = ModelPrice::new(3.0, 15.0);

/// Family → price, checked in order (more specific families first)
const FAMILY_PRICES: &[(&str, ModelPrice)] = &[
    ("gemini-2.0-flash-lite", ModelPrice::new(0.075, 0.30)),
    ("gemini-2.0-flash", ModelPrice::new(0.10, 0.40)),
    ("gemini-1.5-flash", ModelPrice::new(0.075, 0.30)),
    ("flash", ModelPrice::new(0.075, 0.30)),
    ("gemini-1.5-pro", ModelPrice::new(1.25, 5.00)),
    ("gemini-2.5-pro", ModelPrice::new(1.25, 10.00)),
    ("gemini", ModelPrice::new(1.25, 5.00)),
    ("claude-3-haiku", ModelPrice::new(0.25, 1.25)),
    ("claude-3-5-haiku", ModelPrice::new(0.80, 4.00)),
    ("claude-3.5-haiku", ModelPrice::new(0.80, 4.00)),
    ("haiku", ModelPrice::new(0.80, 4.00)),
    ("opus", ModelPrice::new(15.0, 75.0)),
    ("sonnet", ModelPrice::new(3.0, 15.0)),
    ("gpt-4o-mini", ModelPrice::new(0.15, 0.60)),
    ("gpt-4o", ModelPrice::new(2.50, 10.00)),
    ("gpt-4.1-mini", ModelPrice::new(0.40, 1.60)),
    ("gpt-4.1", ModelPrice::new(2.00, 8.00)),
    ("llama", ModelPrice::new(0.20, 0.20)),
    ("mistral", ModelPrice::new(0.25, 0.25)),
    ("deepseek", ModelPrice::new(0.55, 2.19)),
];

/// Price for a model served by `kind`.
pub fn price_for(kind: ProviderKind, model: &str) -> ModelPrice {
    if kind == ProviderKind::Ollama {
        return ModelPrice::FREE;
    }
    let model = model.to_lowercase();
    FAMILY_PRICES
        .iter()
        .find(|(family, _)| model.contains(family))
        .map(|(_, price)| *price)
        .unwrap_or(DEFAULT_PRICE)
}

/// Estimated USD cost of `usage` on `model`.
pub fn estimate_cost(kind: ProviderKind, model: &str, usage: &Usage) -> f64 {
    price_for(kind, model).cost(usage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_models_are_free() {
        let usage = Usage::new(10_000, 5_000);
        assert_eq!(estimate_cost(ProviderKind::Ollama, "llama3.2", &usage), 0.0);
    }

    #[test]
    fn test_unknown_model_uses_conservative_default() {
        let usage = Usage::new(1_000_000, 1_000_000);
        let cost = estimate_cost(ProviderKind::OpenRouter, "acme/mystery-1", &usage);
        assert!((cost - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_family_match() {
        assert_eq!(
            price_for(ProviderKind::Gemini, "gemini-1.5-flash-002"),
            ModelPrice::new(0.075, 0.30)
        );
        assert_eq!(
            price_for(ProviderKind::Gemini, "gemini-1.5-pro"),
            ModelPrice::new(1.25, 5.00)
        );
        assert_eq!(
            price_for(ProviderKind::OpenRouter, "anthropic/claude-sonnet-4-20250514"),
            ModelPrice::new(3.0, 15.0)
        );
        assert_eq!(
            price_for(ProviderKind::OpenRouter, "openai/gpt-4o-mini"),
            ModelPrice::new(0.15, 0.60)
        );
    }

    #[test]
    fn test_empty_usage_costs_nothing() {
        assert_eq!(
            estimate_cost(ProviderKind::OpenRouter, "x", &Usage::default()),
            0.0
        );
    }
}
