//! Export of a pad layout to a print-ready single-page PDF.
//!
//! The layout is converted to monochrome, serialised to SVG and handed to a
//! [`DocumentRenderer`]. The production renderer is [`TypstRenderEngine`].

pub mod engine;
pub mod monochrome;
pub mod traits;

pub use engine::TypstRenderEngine;
pub use monochrome::to_monochrome;
pub use traits::{DocumentRenderer, PageSize};

use std::sync::Arc;

use thiserror::Error;

use crate::layout::PadLayout;

/// Errors that can occur while producing a PDF.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write renderer source: {0}")]
    WriteSource(#[source] std::io::Error),
    #[error("renderer execution failed: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("renderer exited with status {code}: {stderr}")]
    RendererExit { code: i32, stderr: String },
    #[error("failed to read generated PDF: {0}")]
    ReadOutput(#[source] std::io::Error),
}

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
}

/// `RxPad-<context>.pdf`, with the context made safe for a file name.
pub fn export_filename(context: &str) -> String {
    let safe = sanitize_filename::sanitize(context.trim());
    if safe.is_empty() {
        "RxPad.pdf".to_string()
    } else {
        format!("RxPad-{}.pdf", safe)
    }
}

/// Monochrome PDF export through a pluggable renderer.
#[derive(Clone)]
pub struct PadExporter {
    renderer: Arc<dyn DocumentRenderer>,
}

impl PadExporter {
    pub fn new(renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self { renderer }
    }

    /// Returns `Ok(None)` when there is nothing to render.
    pub async fn export(
        &self,
        layout: &PadLayout,
        context: &str,
    ) -> Result<Option<ExportedDocument>, ExportError> {
        if layout.is_empty() {
            log::warn!("Skipping export of {}: layout has no elements", context);
            return Ok(None);
        }

        let svg = to_monochrome(layout).to_svg();
        let page = PageSize::from_layout(layout);
        let pdf = self.renderer.render(&svg, page).await?;
        let filename = export_filename(context);

        log::info!("Exported {} ({} bytes)", filename, pdf.len());
        Ok(Some(ExportedDocument { filename, pdf }))
    }
}
