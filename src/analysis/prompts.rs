//! Prompt assembly for both LLM stages, kept in one place so tests can
//! assert exactly what reaches the backend.

use std::fmt::Write as _;

use crate::grid::{CellId, GridSpec};

/// Opinion-spread instruction for the first consensus pass.
pub const LIBERAL_BIAS: &str = "Be maximally inclusive: report every cell that might contain the \
     requested feature, including borderline or partial matches.";

/// Opinion-spread instruction for the last consensus pass.
pub const CONSERVATIVE_BIAS: &str = "Be maximally strict: report only cells where you are certain the \
     requested feature is present.";

/// Hard grouping constraint forwarded verbatim when contiguous regions are
/// requested. Grouping judgment stays with the model; this crate does not
/// run connected-component labeling on its output.
pub const CONTIGUITY_RULE: &str = "Any two listed cells that touch by edge or corner MUST be placed in \
     the same region.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassBias {
    Liberal,
    Neutral,
    Conservative,
}

/// Prompt for one consensus pass over the original/overlay image pair.
pub fn consensus_prompt(user_prompt: &str, grid: &GridSpec, bias: PassBias) -> String {
    let mut prompt = format!(
        "The second image is the first image with a {rows}x{cols} coordinate grid \
         overlaid. Rows are lettered A-{last_row} top to bottom and columns are \
         numbered 1-{cols} left to right, so cells read like \"B3\".\n\n\
         Task: {user_prompt}\n",
        rows = grid.rows(),
        cols = grid.cols(),
        last_row = grid.last_row_letter(),
    );
    match bias {
        PassBias::Liberal => {
            let _ = write!(prompt, "\n{LIBERAL_BIAS}\n");
        }
        PassBias::Conservative => {
            let _ = write!(prompt, "\n{CONSERVATIVE_BIAS}\n");
        }
        PassBias::Neutral => {}
    }
    prompt.push_str(
        "\nRespond with only a JSON object of the form {\"cells\": [\"A1\", \"B2\"]} \
         listing every grid cell that contains the requested feature. No other text.",
    );
    prompt
}

/// Prompt for the single refinement pass over the vote-weighted highlight.
pub fn refinement_prompt(user_prompt: &str, cells: &[CellId], contiguous: bool) -> String {
    let mut prompt = format!(
        "The image shows the grid cells a first analysis flagged for this task: \
         {user_prompt}\n\
         Shaded cells were flagged; darker shading means more independent passes \
         agreed.\n\n\
         Flagged cells (repetition encodes agreement): [{cell_list}]\n\n\
         Re-examine each flagged cell against the task. Remove any cell that does \
         not stand up to scrutiny. Never add a cell that is not in the list above. \
         Group the cells you keep into coherent, titled regions and keep each \
         cell's repetition count in your output.\n",
        cell_list = serialize_cells(cells),
    );
    if contiguous {
        let _ = write!(prompt, "{CONTIGUITY_RULE}\n");
    }
    prompt.push_str(
        "\nRespond with only a JSON object of the form {\"regions\": [{\"title\": \
         \"...\", \"description\": \"...\", \"cells\": [\"B2\", \"B2\"]}], \
         \"removedCells\": {\"cells\": [\"A1\"], \"explanation\": \"...\"}, \
         \"summary\": \"...\"}. No other text.",
    );
    prompt
}

/// Comma-separated labels with repetitions intact; this is the boundary
/// where vote weight is materialized for the model.
pub fn serialize_cells(cells: &[CellId]) -> String {
    cells
        .iter()
        .map(|cell| format!("\"{cell}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridSpec {
        GridSpec::from_dimensions(512, 256, 64)
    }

    fn cells(labels: &[&str]) -> Vec<CellId> {
        labels.iter().map(|label| label.parse().unwrap()).collect()
    }

    #[test]
    fn consensus_prompt_describes_the_grid() {
        let prompt = consensus_prompt("Find rust spots", &grid(), PassBias::Neutral);
        assert!(prompt.contains("4x8 coordinate grid"));
        assert!(prompt.contains("A-D"));
        assert!(prompt.contains("Find rust spots"));
        assert!(!prompt.contains(LIBERAL_BIAS));
        assert!(!prompt.contains(CONSERVATIVE_BIAS));
    }

    #[test]
    fn bias_lines_only_appear_when_assigned() {
        let liberal = consensus_prompt("x", &grid(), PassBias::Liberal);
        assert!(liberal.contains(LIBERAL_BIAS));
        assert!(!liberal.contains(CONSERVATIVE_BIAS));

        let conservative = consensus_prompt("x", &grid(), PassBias::Conservative);
        assert!(conservative.contains(CONSERVATIVE_BIAS));
        assert!(!conservative.contains(LIBERAL_BIAS));
    }

    #[test]
    fn refinement_prompt_keeps_repetitions() {
        let prompt = refinement_prompt("x", &cells(&["B2", "B2", "B3"]), false);
        assert!(prompt.contains("[\"B2\", \"B2\", \"B3\"]"));
        assert!(!prompt.contains(CONTIGUITY_RULE));
    }

    #[test]
    fn contiguity_rule_is_forwarded_verbatim_when_flagged() {
        let prompt = refinement_prompt("x", &cells(&["A1", "A2", "C3"]), true);
        assert!(prompt.contains(CONTIGUITY_RULE));
    }
}
