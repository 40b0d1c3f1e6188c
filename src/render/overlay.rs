//! Pixel-level overlay renderer: grid lines, labels, vote-weighted cell
//! shading, region outlines.

use image::{Rgba, RgbaImage};

use super::font;
use super::{AnnotationOptions, Renderer};
use crate::analysis::Region;
use crate::error::RenderError;
use crate::grid::{CellId, GridSpec};

const GRID_INK: [u8; 3] = [20, 20, 20];
const GRID_ALPHA: f32 = 0.55;
const LABEL_INK: Rgba<u8> = Rgba([255, 255, 255, 255]);
const LABEL_SHADOW: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fill colors cycle per region; the unnamed highlight carrier gets the first.
const REGION_COLORS: [[u8; 3]; 6] = [
    [220, 50, 47],
    [38, 139, 210],
    [133, 153, 0],
    [181, 137, 0],
    [211, 54, 130],
    [42, 161, 152],
];

/// Shading floor and ceiling for vote-weighted fills.
const FILL_ALPHA_MIN: f32 = 0.25;
const FILL_ALPHA_MAX: f32 = 0.65;

#[derive(Debug, Default)]
pub struct GridOverlayRenderer;

impl GridOverlayRenderer {
    pub fn new() -> Self {
        Self
    }

    fn draw_grid_lines(canvas: &mut RgbaImage, grid: &GridSpec) {
        let (width, height) = canvas.dimensions();
        for col in 1..grid.cols() {
            let x = col * width / grid.cols();
            for y in 0..height {
                blend(canvas.get_pixel_mut(x, y), GRID_INK, GRID_ALPHA);
            }
        }
        for row in 1..grid.rows() {
            let y = row * height / grid.rows();
            for x in 0..width {
                blend(canvas.get_pixel_mut(x, y), GRID_INK, GRID_ALPHA);
            }
        }
    }

    fn draw_cell_labels(canvas: &mut RgbaImage, grid: &GridSpec) {
        let (width, height) = canvas.dimensions();
        for row in 0..grid.rows() {
            for col in 1..=grid.cols() {
                let Ok(cell) = CellId::new(row, col) else {
                    continue;
                };
                let rect = grid.cell_rect(cell, width, height);
                let scale = if rect.width.min(rect.height) >= 96 { 2 } else { 1 };
                let label = cell.to_string();
                if font::text_width(&label, scale) + 4 > rect.width {
                    continue;
                }
                let x = rect.x + 2;
                let y = rect.y + 2;
                font::draw_text(canvas, x + 1, y + 1, scale, LABEL_SHADOW, &label);
                font::draw_text(canvas, x, y, scale, LABEL_INK, &label);
            }
        }
    }

    fn fill_region_cells(
        canvas: &mut RgbaImage,
        grid: &GridSpec,
        region: &Region,
        color: [u8; 3],
    ) {
        let weights = region.cell_weights();
        let peak = weights.values().copied().max().unwrap_or(1).max(1);
        let (width, height) = canvas.dimensions();
        for (cell, votes) in weights {
            if !grid.contains(cell) {
                continue;
            }
            let strength = votes as f32 / peak as f32;
            let alpha = FILL_ALPHA_MIN + (FILL_ALPHA_MAX - FILL_ALPHA_MIN) * strength;
            let rect = grid.cell_rect(cell, width, height);
            for y in rect.y..rect.y + rect.height {
                for x in rect.x..rect.x + rect.width {
                    blend(canvas.get_pixel_mut(x, y), color, alpha);
                }
            }
        }
    }

    fn outline_region_cells(
        canvas: &mut RgbaImage,
        grid: &GridSpec,
        region: &Region,
        color: [u8; 3],
    ) {
        let (width, height) = canvas.dimensions();
        let ink = Rgba([color[0], color[1], color[2], 255]);
        for cell in region.distinct_cells() {
            if !grid.contains(cell) {
                continue;
            }
            let rect = grid.cell_rect(cell, width, height);
            let x1 = rect.x + rect.width - 1;
            let y1 = rect.y + rect.height - 1;
            for x in rect.x..=x1 {
                canvas.put_pixel(x, rect.y, ink);
                canvas.put_pixel(x, y1, ink);
            }
            for y in rect.y..=y1 {
                canvas.put_pixel(rect.x, y, ink);
                canvas.put_pixel(x1, y, ink);
            }
        }
        if let Some(&anchor) = region.distinct_cells().first() {
            if !region.title.is_empty() && grid.contains(anchor) {
                let rect = grid.cell_rect(anchor, width, height);
                let label = region.title.to_ascii_uppercase();
                font::draw_text(canvas, rect.x + 3, rect.y + 3, 1, LABEL_SHADOW, &label);
                font::draw_text(canvas, rect.x + 2, rect.y + 2, 1, LABEL_INK, &label);
            }
        }
    }
}

impl Renderer for GridOverlayRenderer {
    fn render_overlay(
        &self,
        image: &[u8],
        grid: &GridSpec,
        regions: &[Region],
        options: &AnnotationOptions,
    ) -> Result<Vec<u8>, RenderError> {
        let mut canvas = image::load_from_memory(image)
            .map_err(RenderError::Decode)?
            .to_rgba8();

        if options.fill_cells {
            for (index, region) in regions.iter().enumerate() {
                let color = REGION_COLORS[index % REGION_COLORS.len()];
                Self::fill_region_cells(&mut canvas, grid, region, color);
            }
        }
        if options.grid_lines {
            Self::draw_grid_lines(&mut canvas, grid);
        }
        if options.cell_labels {
            Self::draw_cell_labels(&mut canvas, grid);
        }
        if options.outline_regions {
            for (index, region) in regions.iter().enumerate() {
                let color = REGION_COLORS[index % REGION_COLORS.len()];
                Self::outline_region_cells(&mut canvas, grid, region, color);
            }
        }

        let mut bytes = std::io::Cursor::new(Vec::new());
        canvas
            .write_to(&mut bytes, image::ImageFormat::Png)
            .map_err(RenderError::Encode)?;
        Ok(bytes.into_inner())
    }
}

fn blend(pixel: &mut Rgba<u8>, color: [u8; 3], alpha: f32) {
    for channel in 0..3 {
        let src = color[channel] as f32;
        let dst = pixel.0[channel] as f32;
        pixel.0[channel] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
    }
    pixel.0[3] = 255;
}
