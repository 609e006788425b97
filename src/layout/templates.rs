//! Prescriber block templates, selected by prescriber count.
//!
//! The block sits between the header (ends at y=50) and the warning band
//! (starts at y=95) and stays left of the sequence-number box (x >= 340).

use serde::Serialize;

/// Slots in the densest template.
pub const MAX_TEMPLATE_SLOTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrescriberTemplate {
    Single,
    TwoColumn,
    Quadrant,
    SixGrid,
}

/// Index = prescriber count. Zero prescribers still prints one placeholder.
const TEMPLATE_BY_COUNT: [PrescriberTemplate; MAX_TEMPLATE_SLOTS + 1] = [
    PrescriberTemplate::Single,
    PrescriberTemplate::Single,
    PrescriberTemplate::TwoColumn,
    PrescriberTemplate::Quadrant,
    PrescriberTemplate::Quadrant,
    PrescriberTemplate::SixGrid,
    PrescriberTemplate::SixGrid,
];

/// Anchor point of one prescriber's name line (text is centered on `x`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub x: f32,
    pub y: f32,
}

const fn slot(x: f32, y: f32) -> Slot {
    Slot { x, y }
}

const SINGLE_SLOTS: [Slot; 1] = [slot(198.0, 68.0)];
const TWO_COLUMN_SLOTS: [Slot; 2] = [slot(110.0, 68.0), slot(260.0, 68.0)];
const QUADRANT_SLOTS: [Slot; 4] = [
    slot(110.0, 64.0),
    slot(260.0, 64.0),
    slot(110.0, 80.0),
    slot(260.0, 80.0),
];
const SIX_GRID_SLOTS: [Slot; 6] = [
    slot(65.0, 64.0),
    slot(170.0, 64.0),
    slot(275.0, 64.0),
    slot(65.0, 80.0),
    slot(170.0, 80.0),
    slot(275.0, 80.0),
];

/// Font sizes of a template; the detail line sits `detail_offset` below the name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMetrics {
    pub name_size: f32,
    pub detail_size: f32,
    pub detail_offset: f32,
}

impl PrescriberTemplate {
    pub fn for_count(count: usize) -> Self {
        TEMPLATE_BY_COUNT[count.min(MAX_TEMPLATE_SLOTS)]
    }

    pub fn slots(self) -> &'static [Slot] {
        match self {
            PrescriberTemplate::Single => &SINGLE_SLOTS,
            PrescriberTemplate::TwoColumn => &TWO_COLUMN_SLOTS,
            PrescriberTemplate::Quadrant => &QUADRANT_SLOTS,
            PrescriberTemplate::SixGrid => &SIX_GRID_SLOTS,
        }
    }

    pub fn capacity(self) -> usize {
        self.slots().len()
    }

    pub fn metrics(self) -> TemplateMetrics {
        match self {
            PrescriberTemplate::Single => TemplateMetrics {
                name_size: 11.0,
                detail_size: 8.0,
                detail_offset: 12.0,
            },
            PrescriberTemplate::TwoColumn => TemplateMetrics {
                name_size: 10.0,
                detail_size: 7.0,
                detail_offset: 11.0,
            },
            PrescriberTemplate::Quadrant => TemplateMetrics {
                name_size: 8.5,
                detail_size: 6.0,
                detail_offset: 8.0,
            },
            PrescriberTemplate::SixGrid => TemplateMetrics {
                name_size: 7.0,
                detail_size: 5.0,
                detail_offset: 7.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_count() {
        assert_eq!(PrescriberTemplate::for_count(0), PrescriberTemplate::Single);
        assert_eq!(PrescriberTemplate::for_count(1), PrescriberTemplate::Single);
        assert_eq!(PrescriberTemplate::for_count(2), PrescriberTemplate::TwoColumn);
        assert_eq!(PrescriberTemplate::for_count(3), PrescriberTemplate::Quadrant);
        assert_eq!(PrescriberTemplate::for_count(4), PrescriberTemplate::Quadrant);
        assert_eq!(PrescriberTemplate::for_count(5), PrescriberTemplate::SixGrid);
        assert_eq!(PrescriberTemplate::for_count(6), PrescriberTemplate::SixGrid);
        assert_eq!(PrescriberTemplate::for_count(9), PrescriberTemplate::SixGrid);
    }

    #[test]
    fn test_every_count_fits_its_template() {
        for count in 1..=MAX_TEMPLATE_SLOTS {
            assert!(PrescriberTemplate::for_count(count).capacity() >= count);
        }
    }

    #[test]
    fn test_fonts_shrink_with_density() {
        let sizes: Vec<f32> = [
            PrescriberTemplate::Single,
            PrescriberTemplate::TwoColumn,
            PrescriberTemplate::Quadrant,
            PrescriberTemplate::SixGrid,
        ]
        .iter()
        .map(|t| t.metrics().name_size)
        .collect();
        assert!(sizes.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn test_slots_stay_clear_of_sequence_box_and_band() {
        for template in [
            PrescriberTemplate::Single,
            PrescriberTemplate::TwoColumn,
            PrescriberTemplate::Quadrant,
            PrescriberTemplate::SixGrid,
        ] {
            let metrics = template.metrics();
            for slot in template.slots() {
                assert!(slot.x < 340.0);
                assert!(slot.y > 50.0);
                assert!(slot.y + metrics.detail_offset < 95.0);
            }
        }
    }
}
