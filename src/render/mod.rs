//! Overlay drawing capability consumed by the orchestrator.

mod font;
mod overlay;

pub use overlay::GridOverlayRenderer;

use crate::analysis::Region;
use crate::error::RenderError;
use crate::grid::GridSpec;

/// What one overlay render should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationOptions {
    pub grid_lines: bool,
    pub cell_labels: bool,
    pub fill_cells: bool,
    pub outline_regions: bool,
}

impl AnnotationOptions {
    /// Plain lettered grid: the image the consensus passes see.
    pub fn grid_only() -> Self {
        Self {
            grid_lines: true,
            cell_labels: true,
            fill_cells: false,
            outline_regions: false,
        }
    }

    /// Vote-weighted shading fed back to the refiner.
    pub fn highlight() -> Self {
        Self {
            grid_lines: true,
            cell_labels: true,
            fill_cells: true,
            outline_regions: false,
        }
    }

    /// Final annotated output.
    pub fn regions() -> Self {
        Self {
            grid_lines: false,
            cell_labels: false,
            fill_cells: true,
            outline_regions: true,
        }
    }
}

pub trait Renderer: Send + Sync {
    /// Draw the requested annotations over a PNG image and return PNG bytes.
    fn render_overlay(
        &self,
        image: &[u8],
        grid: &GridSpec,
        regions: &[Region],
        options: &AnnotationOptions,
    ) -> Result<Vec<u8>, RenderError>;
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Clone)]
    pub struct RecordedRender {
        pub regions: Vec<Region>,
        pub options: AnnotationOptions,
    }

    /// Renderer double: passes the image through untouched and records what
    /// it was asked to draw.
    pub struct RecordingRenderer {
        renders: Mutex<Vec<RecordedRender>>,
        fail: bool,
    }

    impl RecordingRenderer {
        pub fn new() -> Self {
            Self {
                renders: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                renders: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn renders(&self) -> Vec<RecordedRender> {
            self.renders.lock().unwrap().clone()
        }
    }

    impl Renderer for RecordingRenderer {
        fn render_overlay(
            &self,
            image: &[u8],
            _grid: &GridSpec,
            regions: &[Region],
            options: &AnnotationOptions,
        ) -> Result<Vec<u8>, RenderError> {
            if self.fail {
                return Err(RenderError::Encode(image::ImageError::IoError(
                    std::io::Error::other("scripted render failure"),
                )));
            }
            self.renders.lock().unwrap().push(RecordedRender {
                regions: regions.to_vec(),
                options: *options,
            });
            Ok(image.to_vec())
        }
    }
}
