//! Prescription pad layout: the vector description, its derivation from the
//! order data and SVG output.

pub mod deriver;
pub mod element;
pub mod svg;
pub mod templates;

pub use deriver::{derive_layout, derive_preview, LayoutInput};
pub use element::{Element, PadLayout, Paint};
pub use templates::PrescriberTemplate;
