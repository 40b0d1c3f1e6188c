use std::collections::BTreeMap;

use serde::Serialize;

use super::ledger::TokenReport;
use crate::grid::CellId;

/// A named, described group of cells in the final output. Duplicate cells
/// encode retained votes: a cell listed three times survived three passes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub title: String,
    pub description: String,
    pub details: String,
    pub cells: Vec<CellId>,
}

impl Region {
    /// Unnamed carrier for the aggregated cell list between the consensus and
    /// refinement stages; repetition is the vote weight the renderer shades by.
    pub fn highlight(cells: &[CellId]) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            details: String::new(),
            cells: cells.to_vec(),
        }
    }

    /// Per-cell vote weights, in label order.
    pub fn cell_weights(&self) -> BTreeMap<CellId, u32> {
        let mut weights = BTreeMap::new();
        for &cell in &self.cells {
            *weights.entry(cell).or_insert(0) += 1;
        }
        weights
    }

    pub fn distinct_cells(&self) -> Vec<CellId> {
        self.cell_weights().into_keys().collect()
    }

    pub fn peak_votes(&self) -> u32 {
        self.cell_weights().into_values().max().unwrap_or(0)
    }
}

/// Terminal artifact of one analysis invocation. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub regions: Vec<Region>,
    pub summary: String,
    pub tokens: TokenReport,
}

/// Caller-facing switches for one invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    /// When set, the refiner is instructed that touching cells (edge or
    /// corner) must land in the same region.
    pub contiguous_regions: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(label: &str) -> CellId {
        label.parse().unwrap()
    }

    #[test]
    fn weights_come_from_repetition() {
        let region = Region::highlight(&[cell("B2"), cell("A1"), cell("B2"), cell("B2")]);
        let weights = region.cell_weights();
        assert_eq!(weights[&cell("A1")], 1);
        assert_eq!(weights[&cell("B2")], 3);
        assert_eq!(region.peak_votes(), 3);
        assert_eq!(region.distinct_cells(), vec![cell("A1"), cell("B2")]);
    }

    #[test]
    fn empty_region_has_no_peak() {
        let region = Region::highlight(&[]);
        assert_eq!(region.peak_votes(), 0);
        assert!(region.distinct_cells().is_empty());
    }
}
