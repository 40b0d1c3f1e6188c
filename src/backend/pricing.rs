//! Static $/Mtok price table, consulted read-only for cost accounting.

use std::sync::OnceLock;

use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

fn price(input_per_million: f64, output_per_million: f64) -> ModelPrice {
    ModelPrice {
        input_per_million,
        output_per_million,
    }
}

fn price_table() -> &'static IndexMap<&'static str, ModelPrice> {
    static TABLE: OnceLock<IndexMap<&'static str, ModelPrice>> = OnceLock::new();
    TABLE.get_or_init(|| {
        IndexMap::from([
            ("gpt-4o", price(2.50, 10.00)),
            ("gpt-4o-mini", price(0.15, 0.60)),
            ("gpt-4.1", price(2.00, 8.00)),
            ("gpt-4.1-mini", price(0.40, 1.60)),
            ("claude-sonnet-4-20250514", price(3.00, 15.00)),
            ("claude-opus-4-20250514", price(15.00, 75.00)),
            ("claude-3-5-haiku-20241022", price(0.80, 4.00)),
        ])
    })
}

pub fn price_for(model: &str) -> Option<ModelPrice> {
    price_table().get(model).copied()
}

/// Dollar cost of an invocation, or `None` when the model has no table entry.
pub fn cost(model: &str, input_tokens: u64, output_tokens: u64) -> Option<f64> {
    price_for(model).map(|price| {
        input_tokens as f64 * price.input_per_million / 1e6
            + output_tokens as f64 * price.output_per_million / 1e6
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_cost() {
        // 1000 in at $2.50/M plus 100 out at $10.00/M.
        let dollars = cost("gpt-4o", 1000, 100).unwrap();
        assert!((dollars - 0.0035).abs() < 1e-12);
    }

    #[test]
    fn unknown_model_has_no_price() {
        assert!(price_for("llava-13b").is_none());
        assert!(cost("llava-13b", 1000, 100).is_none());
    }
}
