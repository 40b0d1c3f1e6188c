//! Full pipeline sequencing: overlay render, consensus, highlight render,
//! refinement, token accounting.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::consensus::ConsensusAnalyzer;
use super::ledger::TokenLedger;
use super::refine::RegionRefiner;
use super::types::{AnalysisResult, AnalyzeOptions, Region};
use crate::backend::VisionBackend;
use crate::config::Configuration;
use crate::error::{AppError, ConfigError, RenderError};
use crate::grid::{CellId, GridSpec};
use crate::render::{AnnotationOptions, Renderer};

pub struct AnalysisOrchestrator {
    backend: Arc<dyn VisionBackend>,
    renderer: Arc<dyn Renderer>,
    consensus: ConsensusAnalyzer,
    refiner: RegionRefiner,
    target_cell_px: u32,
}

impl AnalysisOrchestrator {
    pub fn new(
        backend: Arc<dyn VisionBackend>,
        renderer: Arc<dyn Renderer>,
        config: &Configuration,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            consensus: ConsensusAnalyzer::new(Arc::clone(&backend), config.num_passes),
            refiner: RegionRefiner::new(Arc::clone(&backend)),
            backend,
            renderer,
            target_cell_px: config.target_cell_px,
        })
    }

    /// Run one full analysis over a PNG image. Stages are strictly ordered;
    /// a hard failure in overlay rendering or refinement aborts the
    /// invocation with no partial result.
    pub async fn analyze(
        &self,
        image: &[u8],
        prompt: &str,
        options: AnalyzeOptions,
    ) -> Result<AnalysisResult, AppError> {
        let invocation = Uuid::new_v4();
        let mut ledger = TokenLedger::new();

        let (width, height) = image_dimensions(image)?;
        let grid = GridSpec::from_dimensions(width, height, self.target_cell_px);
        info!(
            %invocation,
            width,
            height,
            rows = grid.rows(),
            cols = grid.cols(),
            "starting analysis"
        );

        // Plain lettered grid for the consensus passes.
        let overlay =
            self.renderer
                .render_overlay(image, &grid, &[], &AnnotationOptions::grid_only())?;

        let aggregated = self
            .consensus
            .run(image, &overlay, prompt, &grid, &mut ledger)
            .await;
        info!(%invocation, cells = aggregated.len(), "consensus complete");

        // Vote-weighted highlight, kept for inspection and fed to the refiner.
        let carrier = Region::highlight(&aggregated);
        let highlight = self.renderer.render_overlay(
            image,
            &grid,
            std::slice::from_ref(&carrier),
            &AnnotationOptions::highlight(),
        )?;

        let refinement = self
            .refiner
            .refine(
                &highlight,
                prompt,
                &aggregated,
                options.contiguous_regions,
                &mut ledger,
            )
            .await?;
        log_cell_delta(invocation, &aggregated, &refinement.regions);

        let tokens = ledger.report(self.backend.model());
        info!(
            %invocation,
            regions = refinement.regions.len(),
            total_tokens = tokens.total,
            cost = tokens.cost,
            "analysis complete"
        );
        Ok(AnalysisResult {
            regions: refinement.regions,
            summary: refinement.summary,
            tokens,
        })
    }

    /// Annotated output for the caller: final regions drawn over the source.
    pub fn render_result(
        &self,
        image: &[u8],
        result: &AnalysisResult,
    ) -> Result<Vec<u8>, AppError> {
        let (width, height) = image_dimensions(image)?;
        let grid = GridSpec::from_dimensions(width, height, self.target_cell_px);
        Ok(self.renderer.render_overlay(
            image,
            &grid,
            &result.regions,
            &AnnotationOptions::regions(),
        )?)
    }
}

/// Informational only: which aggregated cells the refiner dropped.
fn log_cell_delta(invocation: Uuid, aggregated: &[CellId], regions: &[Region]) {
    let before: BTreeSet<CellId> = aggregated.iter().copied().collect();
    let after: BTreeSet<CellId> = regions
        .iter()
        .flat_map(|region| region.cells.iter().copied())
        .collect();
    let dropped: Vec<CellId> = before.difference(&after).copied().collect();
    debug!(
        %invocation,
        kept = after.len(),
        dropped = ?dropped,
        "refinement cell delta"
    );
}

fn image_dimensions(image: &[u8]) -> Result<(u32, u32), AppError> {
    let reader = image::ImageReader::new(std::io::Cursor::new(image)).with_guessed_format()?;
    Ok(reader.into_dimensions().map_err(RenderError::Decode)?)
}
