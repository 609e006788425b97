//! Typst rendering engine.
//!
//! Writes the SVG and a one-page Typst wrapper to a temporary directory,
//! invokes the compiler and reads the PDF back.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::tempdir;
use tokio::fs;
use tokio::process::Command;

use super::traits::{DocumentRenderer, PageSize};
use super::ExportError;

const SVG_FILENAME: &str = "pad.svg";
const TYP_FILENAME: &str = "pad.typ";
const PDF_FILENAME: &str = "pad.pdf";

/// Shells out to the `typst` CLI.
#[derive(Debug, Clone)]
pub struct TypstRenderEngine {
    binary: PathBuf,
}

impl TypstRenderEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &PathBuf {
        &self.binary
    }
}

impl Default for TypstRenderEngine {
    fn default() -> Self {
        Self::new("typst")
    }
}

/// Typst source placing the SVG on a margin-less page of the given size.
pub fn page_source(page: PageSize) -> String {
    format!(
        "#set page(width: {}in, height: {}in, margin: 0pt)\n#image(\"{}\", width: 100%, height: 100%, fit: \"contain\")\n",
        page.width_in, page.height_in, SVG_FILENAME
    )
}

async fn write_sources(dir: &Path, svg: &str, page: PageSize) -> Result<(), ExportError> {
    fs::write(dir.join(SVG_FILENAME), svg)
        .await
        .map_err(ExportError::WriteSource)?;
    fs::write(dir.join(TYP_FILENAME), page_source(page))
        .await
        .map_err(ExportError::WriteSource)
}

#[async_trait]
impl DocumentRenderer for TypstRenderEngine {
    async fn render(&self, svg: &str, page: PageSize) -> Result<Vec<u8>, ExportError> {
        let temp_dir = tempdir().map_err(ExportError::TempDir)?;
        write_sources(temp_dir.path(), svg, page).await?;

        let output_path = temp_dir.path().join(PDF_FILENAME);
        log::debug!(
            "Compiling {} with {}",
            TYP_FILENAME,
            self.binary.display()
        );

        let output = Command::new(&self.binary)
            .arg("compile")
            .arg(TYP_FILENAME)
            .arg(PDF_FILENAME)
            .current_dir(temp_dir.path())
            .output()
            .await
            .map_err(ExportError::Spawn)?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::error!("typst exited with status {}: {}", code, stderr);
            return Err(ExportError::RendererExit { code, stderr });
        }

        fs::read(&output_path)
            .await
            .map_err(ExportError::ReadOutput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_source_sets_exact_size() {
        let source = page_source(PageSize::PAD);
        assert!(source.contains("width: 5.5in, height: 4.25in, margin: 0pt"));
        assert!(source.contains("#image(\"pad.svg\""));
    }

    #[tokio::test]
    async fn test_write_sources_places_both_files() {
        let dir = tempdir().unwrap();
        write_sources(dir.path(), "<svg/>", PageSize::PAD)
            .await
            .unwrap();
        let svg = fs::read_to_string(dir.path().join(SVG_FILENAME)).await.unwrap();
        let typ = fs::read_to_string(dir.path().join(TYP_FILENAME)).await.unwrap();
        assert_eq!(svg, "<svg/>");
        assert_eq!(typ, page_source(PageSize::PAD));
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_error() {
        let engine = TypstRenderEngine::new("/nonexistent/typst-binary");
        let result = engine.render("<svg/>", PageSize::PAD).await;
        assert!(matches!(result, Err(ExportError::Spawn(_))));
    }
}
