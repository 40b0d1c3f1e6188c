use serde::Serialize;

use super::address::{CellId, MAX_COLS, MAX_ROWS};

/// Grid geometry for one analysis invocation. Derived once from the image
/// dimensions before any backend call and never changed mid-analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSpec {
    rows: u32,
    cols: u32,
}

impl GridSpec {
    /// Divide the image into roughly `target_cell_px` squares, clamped to
    /// what the addressing scheme can label.
    pub fn from_dimensions(width: u32, height: u32, target_cell_px: u32) -> Self {
        let target = target_cell_px.max(1);
        Self {
            rows: (height / target).clamp(1, MAX_ROWS),
            cols: (width / target).clamp(1, MAX_COLS),
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cell_count(&self) -> u32 {
        self.rows * self.cols
    }

    pub fn contains(&self, cell: CellId) -> bool {
        cell.row() < self.rows && cell.col() <= self.cols
    }

    pub fn last_row_letter(&self) -> char {
        (b'A' + (self.rows - 1) as u8) as char
    }

    /// Pixel rectangle of a cell within an image of the given dimensions.
    /// Boundaries are rounded so the rectangles tile the image exactly.
    pub fn cell_rect(&self, cell: CellId, width: u32, height: u32) -> CellRect {
        let col = cell.col() - 1;
        let row = cell.row();
        let x0 = col * width / self.cols;
        let x1 = (col + 1) * width / self.cols;
        let y0 = row * height / self.rows;
        let y1 = (row + 1) * height / self.rows;
        CellRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

/// Rectangular pixel region of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CellRect {
    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}
