use serde::Serialize;
use tracing::warn;

use crate::backend::pricing;
use crate::backend::TokenUsage;

/// Running token accumulator for one analysis invocation. Created fresh at
/// invocation start and owned by the orchestrator; passes report their usage
/// back through their results rather than sharing the ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenLedger {
    input: u64,
    output: u64,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, usage: TokenUsage) {
        self.input += usage.input_tokens;
        self.output += usage.output_tokens;
    }

    pub fn input(&self) -> u64 {
        self.input
    }

    pub fn output(&self) -> u64 {
        self.output
    }

    /// Close the ledger into the report attached to the final result. A model
    /// without a price entry reports zero cost; the analysis still succeeds.
    pub fn report(&self, model: &str) -> TokenReport {
        let cost = match pricing::cost(model, self.input, self.output) {
            Some(dollars) => dollars,
            None => {
                warn!(model, "no price table entry; reporting zero cost");
                0.0
            }
        };
        TokenReport {
            input: self.input,
            output: self.output,
            total: self.input + self.output,
            cost,
            model_name: model.to_string(),
        }
    }
}

/// Token and cost summary for one completed invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenReport {
    pub input: u64,
    pub output: u64,
    pub total: u64,
    pub cost: f64,
    pub model_name: String,
}
