//! Refinement stage: one verification call that prunes the aggregated cell
//! list and groups the survivors into titled regions.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::consensus::extract_json_object;
use super::ledger::TokenLedger;
use super::prompts;
use super::types::Region;
use crate::backend::VisionBackend;
use crate::error::{AppError, ParseError};
use crate::grid::CellId;

/// The verification pass wants stability, not spread.
const REFINE_TEMPERATURE: f32 = 0.2;

pub struct RegionRefiner {
    backend: Arc<dyn VisionBackend>,
}

/// Refiner verdict before result assembly.
#[derive(Debug)]
pub struct Refinement {
    pub regions: Vec<Region>,
    pub summary: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefinePayload {
    #[serde(default)]
    regions: Vec<RegionPayload>,
    #[serde(default)]
    removed_cells: Option<RemovedCells>,
    #[serde(default)]
    summary: String,
}

#[derive(Deserialize)]
struct RegionPayload {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    cells: Vec<String>,
}

#[derive(Deserialize)]
struct RemovedCells {
    #[serde(default)]
    cells: Vec<String>,
    #[serde(default)]
    explanation: String,
}

impl RegionRefiner {
    pub fn new(backend: Arc<dyn VisionBackend>) -> Self {
        Self { backend }
    }

    /// Issue the verification call over the vote-weighted highlight image.
    /// Backend and top-level parse failures are fatal here: there is no safe
    /// default region set to fabricate.
    pub async fn refine(
        &self,
        highlight: &[u8],
        user_prompt: &str,
        cells: &[CellId],
        contiguous: bool,
        ledger: &mut TokenLedger,
    ) -> Result<Refinement, AppError> {
        if cells.is_empty() {
            debug!("no consensus cells; skipping the refinement call");
            return Ok(Refinement {
                regions: Vec::new(),
                summary: String::new(),
            });
        }

        let prompt = prompts::refinement_prompt(user_prompt, cells, contiguous);
        let response = self
            .backend
            .analyze_single(highlight, &prompt, REFINE_TEMPERATURE)
            .await?;
        ledger.add(response.usage);

        let object = extract_json_object(&response.text)?;
        let payload: RefinePayload = serde_json::from_str(object).map_err(ParseError::from)?;

        if let Some(removed) = &payload.removed_cells {
            info!(
                removed = ?removed.cells,
                explanation = %removed.explanation,
                "refiner pruned cells"
            );
        }

        let regions = payload.regions.into_iter().map(build_region).collect();
        Ok(Refinement {
            regions,
            summary: payload.summary,
        })
    }
}

fn build_region(payload: RegionPayload) -> Region {
    let mut cells = Vec::new();
    for label in payload.cells {
        match label.parse::<CellId>() {
            Ok(cell) => cells.push(cell),
            Err(error) => {
                warn!(label = %label, %error, "dropping unparseable cell label in region")
            }
        }
    }
    let details = region_details(&cells);
    Region {
        title: payload.title,
        description: payload.description,
        details,
        cells,
    }
}

/// Caption line for the annotation renderer.
fn region_details(cells: &[CellId]) -> String {
    let carrier = Region::highlight(cells);
    format!(
        "{} cells, peak vote {}",
        carrier.distinct_cells().len(),
        carrier.peak_votes()
    )
}
