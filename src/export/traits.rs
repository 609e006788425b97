//! Renderer seam for the exporter.

use async_trait::async_trait;

use super::ExportError;
use crate::layout::PadLayout;

/// Physical page size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_in: f32,
    pub height_in: f32,
}

impl PageSize {
    /// 5.5in x 4.25in prescription pad.
    pub const PAD: PageSize = PageSize {
        width_in: 5.5,
        height_in: 4.25,
    };

    pub fn from_layout(layout: &PadLayout) -> Self {
        Self {
            width_in: layout.width_inches(),
            height_in: layout.height_inches(),
        }
    }
}

/// Renders an SVG document onto exactly one page of the given size.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, svg: &str, page: PageSize) -> Result<Vec<u8>, ExportError>;
}
