#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rxpad_server::export::{DocumentRenderer, ExportError, PageSize};
use rxpad_server::jurisdiction::Jurisdiction;
use rxpad_server::models::{PracticeLocation, Prescriber};
use rxpad_server::AppState;

pub const FAKE_PDF: &[u8] = b"%PDF-1.7\n% fake\n%%EOF";

/// Renderer that records what it was asked to draw.
#[derive(Default)]
pub struct FakeRenderer {
    pub calls: Mutex<Vec<(String, PageSize)>>,
}

impl FakeRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_svg(&self) -> Option<String> {
        self.calls.lock().last().map(|(svg, _)| svg.clone())
    }
}

#[async_trait]
impl DocumentRenderer for FakeRenderer {
    async fn render(&self, svg: &str, page: PageSize) -> Result<Vec<u8>, ExportError> {
        self.calls.lock().push((svg.to_string(), page));
        Ok(FAKE_PDF.to_vec())
    }
}

/// Renderer that always fails like a crashed compiler.
pub struct FailingRenderer;

#[async_trait]
impl DocumentRenderer for FailingRenderer {
    async fn render(&self, _svg: &str, _page: PageSize) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::RendererExit {
            code: 1,
            stderr: "error: failed to load file".to_string(),
        })
    }
}

pub fn test_state(renderer: Arc<dyn DocumentRenderer>) -> AppState {
    AppState::new(
        Jurisdiction::arizona(),
        renderer,
        Duration::from_secs(60),
        100,
    )
}

/// Builds a DEA number whose check digit satisfies
/// `(d1 + d3 + d5) + 2 * (d2 + d4 + d6) ≡ d7 (mod 10)`.
pub fn solve_dea(letters: &str, first_six: [u32; 6]) -> String {
    let d = first_six;
    let check = ((d[0] + d[2] + d[4]) + 2 * (d[1] + d[3] + d[5])) % 10;
    let digits: String = d
        .iter()
        .chain(std::iter::once(&check))
        .map(|n| char::from_digit(*n, 10).unwrap())
        .collect();
    format!("{}{}", letters, digits)
}

/// Same as [`solve_dea`] with a check digit that is guaranteed wrong.
pub fn broken_dea(letters: &str, first_six: [u32; 6]) -> String {
    let mut dea = solve_dea(letters, first_six);
    let check = dea.pop().and_then(|c| c.to_digit(10)).unwrap();
    dea.push(char::from_digit((check + 1) % 10, 10).unwrap());
    dea
}

pub fn practice(name: &str) -> PracticeLocation {
    PracticeLocation {
        name: name.to_string(),
        address: "100 N Stone Ave".to_string(),
        city: "Tucson".to_string(),
        state: "AZ".to_string(),
        zip: "85701".to_string(),
        phone: "(520) 555-0100".to_string(),
        fax: String::new(),
    }
}

pub fn prescriber(name: &str) -> Prescriber {
    Prescriber {
        name: name.to_string(),
        credentials: "DO".to_string(),
        specialty: "Internal Medicine".to_string(),
        license_number: "DO-1001".to_string(),
        hide_license: false,
        npi_number: "1093817465".to_string(),
        dea_number: solve_dea("BW", [4, 8, 1, 5, 2, 9]),
    }
}
