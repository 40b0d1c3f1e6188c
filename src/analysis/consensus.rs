//! Multi-pass consensus stage.
//!
//! Runs N independent "which cells contain the feature" queries concurrently
//! at spread temperatures, with the first pass biased liberal and the last
//! biased conservative, then aggregates the votes. A pass whose backend call
//! fails or whose content cannot be parsed contributes nothing; the failure
//! surfaces at the fan-in point and is logged there, never silently inside
//! the call.

use std::sync::Arc;

use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use super::ledger::TokenLedger;
use super::prompts::{self, PassBias};
use super::votes::VoteTally;
use crate::backend::VisionBackend;
use crate::error::ParseError;
use crate::grid::{CellId, GridSpec};

/// Orchestrates the N-pass initial analysis and vote aggregation.
pub struct ConsensusAnalyzer {
    backend: Arc<dyn VisionBackend>,
    num_passes: usize,
}

#[derive(Deserialize)]
struct CellsPayload {
    cells: Vec<String>,
}

impl ConsensusAnalyzer {
    pub fn new(backend: Arc<dyn VisionBackend>, num_passes: usize) -> Self {
        Self {
            backend,
            num_passes,
        }
    }

    /// Evenly spaced temperatures over the backend's range. The spacing
    /// formula is undefined for a single pass, which gets the midpoint.
    pub fn temperature_schedule(num_passes: usize, range: (f32, f32)) -> Vec<f32> {
        let (low, high) = range;
        if num_passes == 1 {
            return vec![(low + high) / 2.0];
        }
        (0..num_passes)
            .map(|i| low + i as f32 * (high - low) / (num_passes - 1) as f32)
            .collect()
    }

    fn bias_for(index: usize, num_passes: usize) -> PassBias {
        if num_passes == 1 {
            PassBias::Neutral
        } else if index == 0 {
            PassBias::Liberal
        } else if index == num_passes - 1 {
            PassBias::Conservative
        } else {
            PassBias::Neutral
        }
    }

    /// Run all passes against the original/overlay pair and aggregate.
    /// Output repetition is vote weight, with the ≥2-vote threshold applied.
    pub async fn run(
        &self,
        original: &[u8],
        overlay: &[u8],
        user_prompt: &str,
        grid: &GridSpec,
        ledger: &mut TokenLedger,
    ) -> Vec<CellId> {
        let temperatures =
            Self::temperature_schedule(self.num_passes, self.backend.temperature_range());

        let passes = temperatures.iter().enumerate().map(|(index, &temperature)| {
            let prompt =
                prompts::consensus_prompt(user_prompt, grid, Self::bias_for(index, self.num_passes));
            let backend = Arc::clone(&self.backend);
            async move {
                let outcome = backend
                    .analyze_pair(original, overlay, &prompt, temperature)
                    .await;
                (index, temperature, outcome)
            }
        });

        // All-complete barrier: aggregation starts only once every pass settled.
        let settled = join_all(passes).await;

        let mut tally = VoteTally::new();
        for (index, temperature, outcome) in settled {
            match outcome {
                Ok(response) => {
                    ledger.add(response.usage);
                    match parse_pass_cells(&response.text, grid) {
                        Ok(cells) => {
                            debug!(pass = index, temperature, cells = cells.len(), "pass reported");
                            tally.record_pass(&cells);
                        }
                        Err(error) => {
                            warn!(pass = index, %error, "discarding unparseable pass response");
                            tally.record_pass(&[]);
                        }
                    }
                }
                Err(error) => {
                    warn!(pass = index, %error, "pass failed, contributing no cells");
                    tally.record_pass(&[]);
                }
            }
        }
        tally.consensus()
    }
}

/// Extract the `{"cells": [...]}` object from raw model text. Labels that do
/// not parse or fall outside the grid are dropped from the pass.
fn parse_pass_cells(text: &str, grid: &GridSpec) -> Result<Vec<CellId>, ParseError> {
    let object = extract_json_object(text)?;
    let payload: CellsPayload = serde_json::from_str(object)?;
    let mut cells = Vec::new();
    for label in payload.cells {
        match label.parse::<CellId>() {
            Ok(cell) if grid.contains(cell) => cells.push(cell),
            Ok(cell) => debug!(%cell, "dropping cell outside the grid"),
            Err(error) => debug!(label = %label, %error, "dropping unparseable cell label"),
        }
    }
    Ok(cells)
}

/// Models wrap JSON in prose or code fences often enough that we take the
/// outermost brace pair instead of parsing the text as-is.
pub(crate) fn extract_json_object(text: &str) -> Result<&str, ParseError> {
    let start = text.find('{').ok_or(ParseError::MissingObject)?;
    let end = text.rfind('}').ok_or(ParseError::MissingObject)?;
    if end < start {
        return Err(ParseError::MissingObject);
    }
    Ok(&text[start..=end])
}
