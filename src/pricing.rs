//! Model pricing resolution
//!
//! Maps free-form model identifiers to per-million-token tariffs. The table
//! is immutable and constructed once at collector startup; resolution is an
//! ordered case-insensitive substring match with the most expensive tier as
//! the fallback, so an unknown model never silently undercounts
//! hypothetical spend.

/// USD per one million tokens, per token class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
    pub cache_read: f64,
    pub cache_write: f64,
}

pub struct PricingTable {
    // Checked in order, first substring match wins
    entries: Vec<(&'static str, ModelPricing)>,
    fallback: ModelPricing,
}

const OPUS: ModelPricing = ModelPricing {
    input: 15.00,
    output: 75.00,
    cache_read: 1.875,
    cache_write: 18.75,
};

const SONNET: ModelPricing = ModelPricing {
    input: 3.00,
    output: 15.00,
    cache_read: 0.30,
    cache_write: 3.75,
};

const HAIKU: ModelPricing = ModelPricing {
    input: 0.80,
    output: 4.00,
    cache_read: 0.08,
    cache_write: 1.00,
};

impl Default for PricingTable {
    fn default() -> Self {
        Self::anthropic()
    }
}

impl PricingTable {
    /// Anthropic list pricing for the model families seen in session logs.
    pub fn anthropic() -> Self {
        Self {
            entries: vec![
                ("claude-opus-4-5", OPUS),
                ("claude-sonnet-4", SONNET),
                ("claude-3-5-sonnet", SONNET),
                ("claude-3-opus", OPUS),
                ("claude-3-5-haiku", HAIKU),
            ],
            fallback: OPUS,
        }
    }

    pub fn resolve(&self, model: &str) -> ModelPricing {
        let model_lower = model.to_ascii_lowercase();
        for (family, pricing) in &self.entries {
            if model_lower.contains(family) {
                return *pricing;
            }
        }
        tracing::debug!(model, "unknown model, using default pricing");
        self.fallback
    }

    /// Cost in USD for the given token counts, rounded to 6 decimal places.
    pub fn cost(
        &self,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
        cache_read_tokens: u64,
        cache_write_tokens: u64,
    ) -> f64 {
        let pricing = self.resolve(model);
        let cost = (input_tokens as f64 / 1_000_000.0) * pricing.input
            + (output_tokens as f64 / 1_000_000.0) * pricing.output
            + (cache_read_tokens as f64 / 1_000_000.0) * pricing.cache_read
            + (cache_write_tokens as f64 / 1_000_000.0) * pricing.cache_write;
        (cost * 1e6).round() / 1e6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_families_in_order() {
        let table = PricingTable::anthropic();
        assert_eq!(table.resolve("claude-sonnet-4-20250514"), SONNET);
        assert_eq!(table.resolve("claude-3-5-haiku-20241022"), HAIKU);
        assert_eq!(table.resolve("CLAUDE-OPUS-4-5"), OPUS);
    }

    #[test]
    fn unknown_model_falls_back_to_most_expensive_tier() {
        let table = PricingTable::anthropic();
        assert_eq!(table.resolve("some-future-model"), OPUS);
    }

    #[test]
    fn sonnet_cost_example() {
        let table = PricingTable::anthropic();
        let cost = table.cost("claude-sonnet-4", 1_000_000, 500_000, 0, 0);
        assert!((cost - 10.50).abs() < 1e-9);
    }

    #[test]
    fn cost_includes_cache_classes() {
        let table = PricingTable::anthropic();
        // 1M cache reads + 1M cache writes at haiku rates
        let cost = table.cost("claude-3-5-haiku", 0, 0, 1_000_000, 1_000_000);
        assert!((cost - 1.08).abs() < 1e-9);
    }

    #[test]
    fn cost_rounds_to_six_decimals() {
        let table = PricingTable::anthropic();
        let cost = table.cost("claude-sonnet-4", 1, 1, 1, 1);
        assert_eq!(cost, 0.000022);
    }
}
