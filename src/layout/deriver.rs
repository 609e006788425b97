//! Derives the printed pad from the order data.
//!
//! Placement is fixed on the 396x306 canvas; only the prescriber block and
//! the tier-dependent security features vary with the input.

use crate::jurisdiction::{JurisdictionConfig, SecurityFeature, SecurityTier};
use crate::models::{OrderDraft, PadOptions, PracticeLocation, Prescriber, DEFAULT_STARTING_NUMBER};

use super::element::{
    Anchor, Element, Line, PadLayout, Paint, Rect, Text, CANVAS_HEIGHT, CANVAS_WIDTH,
};
use super::templates::PrescriberTemplate;

const CENTER_X: f32 = CANVAS_WIDTH / 2.0;

const PRACTICE_PLACEHOLDER: &str = "Practice Name";
const ADDRESS_PLACEHOLDER: &str = "Address, City, State ZIP";
const PRESCRIBER_PLACEHOLDER: &str = "Prescriber Name, MD";
const EMPTY_STATE_MESSAGE: &str = "Fill in the form to preview your prescription pad";

const WARNING_BAND_FILL: &str = "#8B7355";
const MICROPRINT_FILL: &str = "#999999";
const MICROPRINT_SIZE: f32 = 1.5;
const MICROPRINT_REPEAT: usize = 20;

pub const REFILL_LABELS: [&str; 7] = ["NR", "1", "2", "3", "4", "5", "PRN"];
pub const VENDOR_MARK: &str = "RxFORMS.com";

pub const WARNING_BAND_CLASS: &str = "warning-band";
pub const MICROPRINT_CLASS: &str = "microprint";
pub const PRESCRIBERS_CLASS: &str = "prescribers";
pub const EMPTY_STATE_CLASS: &str = "empty-state";

/// Borrowed view of the order data the pad is drawn from.
#[derive(Debug, Clone, Copy)]
pub struct LayoutInput<'a> {
    pub practices: &'a [PracticeLocation],
    pub prescribers: &'a [Prescriber],
    pub pad_options: &'a PadOptions,
    pub security_tier: SecurityTier,
}

impl<'a> From<&'a OrderDraft> for LayoutInput<'a> {
    fn from(draft: &'a OrderDraft) -> Self {
        Self {
            practices: &draft.practices,
            prescribers: &draft.prescribers,
            pad_options: &draft.pad_options,
            security_tier: draft.security_tier,
        }
    }
}

impl LayoutInput<'_> {
    /// True while no practice or prescriber name has been entered.
    pub fn is_blank(&self) -> bool {
        self.practices.iter().all(|p| p.name.trim().is_empty())
            && self.prescribers.iter().all(|p| p.name.trim().is_empty())
    }
}

/// Full pad layout. Missing data is replaced by placeholders.
pub fn derive_layout(input: &LayoutInput<'_>, rules: &JurisdictionConfig) -> PadLayout {
    let mut elements = Vec::new();

    elements.extend(header(input.practices.first()));
    elements.push(prescriber_block(input.prescribers));
    elements.extend(sequence_box(input.pad_options));

    if rules.shows(input.security_tier, SecurityFeature::WarningBand) {
        elements.push(warning_band(&rules.warning_band.text));
    }

    let microprint = rules
        .shows(input.security_tier, SecurityFeature::Microprint)
        .then(|| rules.microprint.text.repeat(MICROPRINT_REPEAT));
    elements.extend(form_lines(microprint.as_deref()));
    elements.extend(furniture(&rules.disclaimer));

    PadLayout::new(elements)
}

/// Empty-state placeholder until a practice or prescriber name is entered.
pub fn derive_preview(input: &LayoutInput<'_>, rules: &JurisdictionConfig) -> PadLayout {
    if input.is_blank() {
        empty_state()
    } else {
        derive_layout(input, rules)
    }
}

pub fn empty_state() -> PadLayout {
    PadLayout::new(vec![Element::group(
        EMPTY_STATE_CLASS,
        vec![
            Rect {
                stroke: Paint::color("#d1d5db"),
                ..Rect::outline(4.0, 4.0, CANVAS_WIDTH - 8.0, CANVAS_HEIGHT - 8.0)
            }
            .into(),
            Text::new(CENTER_X, CANVAS_HEIGHT / 2.0, EMPTY_STATE_MESSAGE, 10.0)
                .centered()
                .fill("#9ca3af")
                .into(),
        ],
    )])
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn header(practice: Option<&PracticeLocation>) -> Vec<Element> {
    let name = practice
        .and_then(|p| non_blank(&p.name))
        .unwrap_or(PRACTICE_PLACEHOLDER);

    let address = practice
        .map(PracticeLocation::address_line)
        .filter(|line| !line.is_empty())
        .unwrap_or_else(|| ADDRESS_PLACEHOLDER.to_string());

    let mut contact = Vec::new();
    if let Some(phone) = practice.and_then(|p| non_blank(&p.phone)) {
        contact.push(format!("P: {}", phone));
    }
    if let Some(fax) = practice.and_then(|p| non_blank(&p.fax)) {
        contact.push(format!("F: {}", fax));
    }

    vec![
        Text::new(CENTER_X, 24.0, name, 14.0).centered().bold().into(),
        Text::new(CENTER_X, 38.0, address, 8.0).centered().into(),
        Text::new(CENTER_X, 50.0, contact.join(" "), 8.0)
            .centered()
            .into(),
    ]
}

fn prescriber_name_line(prescriber: &Prescriber) -> String {
    match (
        non_blank(&prescriber.name),
        non_blank(&prescriber.credentials),
    ) {
        (Some(name), Some(credentials)) => format!("{}, {}", name, credentials),
        (Some(name), None) => name.to_string(),
        (None, _) => PRESCRIBER_PLACEHOLDER.to_string(),
    }
}

fn prescriber_detail_line(prescriber: &Prescriber) -> String {
    let mut parts = Vec::new();
    if !prescriber.hide_license {
        if let Some(license) = non_blank(&prescriber.license_number) {
            parts.push(format!("Lic# {}", license));
        }
    }
    if let Some(dea) = non_blank(&prescriber.dea_number) {
        parts.push(format!("DEA# {}", dea.to_ascii_uppercase()));
    }
    parts.join("    ")
}

fn prescriber_block(prescribers: &[Prescriber]) -> Element {
    let template = PrescriberTemplate::for_count(prescribers.len());
    let metrics = template.metrics();
    let placeholder = [Prescriber::default()];
    let entries = if prescribers.is_empty() {
        &placeholder[..]
    } else {
        prescribers
    };

    let mut children = Vec::new();
    for (prescriber, slot) in entries.iter().zip(template.slots()) {
        children.push(
            Text::new(slot.x, slot.y, prescriber_name_line(prescriber), metrics.name_size)
                .centered()
                .bold()
                .into(),
        );
        children.push(
            Text::new(
                slot.x,
                slot.y + metrics.detail_offset,
                prescriber_detail_line(prescriber),
                metrics.detail_size,
            )
            .centered()
            .into(),
        );
    }

    Element::group(PRESCRIBERS_CLASS, children)
}

fn sequence_box(pad_options: &PadOptions) -> Vec<Element> {
    let number = non_blank(&pad_options.starting_number).unwrap_or(DEFAULT_STARTING_NUMBER);
    vec![
        Rect::outline(340.0, 65.0, 45.0, 20.0).into(),
        Text::new(362.0, 79.0, format!("#{}", number), 10.0)
            .centered()
            .into(),
    ]
}

fn warning_band(text: &str) -> Element {
    Element::group(
        WARNING_BAND_CLASS,
        vec![
            Rect::filled(10.0, 95.0, 376.0, 14.0, WARNING_BAND_FILL).into(),
            Text::new(CENTER_X, 105.0, text, 5.0)
                .centered()
                .bold()
                .italic()
                .fill("#ffffff")
                .reversed()
                .into(),
        ],
    )
}

fn microprint(x: f32, y: f32, text: &str) -> Element {
    Element::group(
        MICROPRINT_CLASS,
        vec![Text::new(x, y, text, MICROPRINT_SIZE)
            .fill(MICROPRINT_FILL)
            .into()],
    )
}

fn form_lines(microprint_text: Option<&str>) -> Vec<Element> {
    let mut elements: Vec<Element> = vec![
        Text::new(15.0, 130.0, "Name", 9.0).into(),
        Line::rule(42.0, 130.0, 280.0, 130.0).into(),
    ];
    if let Some(text) = microprint_text {
        elements.push(microprint(42.0, 132.0, text));
    }
    elements.extend([
        Text::new(290.0, 130.0, "M / F", 9.0).into(),
        Text::new(320.0, 130.0, "DOB", 9.0).into(),
        Line::rule(340.0, 130.0, 385.0, 130.0).into(),
        Text::new(15.0, 150.0, "Address", 9.0).into(),
        Line::rule(52.0, 150.0, 300.0, 150.0).into(),
    ]);
    if let Some(text) = microprint_text {
        elements.push(microprint(52.0, 152.0, text));
    }
    elements.extend([
        Text::new(310.0, 150.0, "Date", 9.0).into(),
        Line::rule(335.0, 150.0, 385.0, 150.0).into(),
    ]);
    elements
}

fn furniture(disclaimer: &str) -> Vec<Element> {
    let mut elements: Vec<Element> = vec![
        Text::new(20.0, 200.0, "\u{211E}", 36.0)
            .family("serif")
            .bold()
            .into(),
        Text::new(365.0, 165.0, "Refill", 8.0).bold().underline().into(),
    ];

    for (i, label) in REFILL_LABELS.iter().enumerate() {
        elements.push(
            Text::new(370.0, 178.0 + i as f32 * 12.0, *label, 8.0)
                .centered()
                .into(),
        );
    }

    elements.extend([
        Text::new(15.0, 265.0, "Void After", 8.0).into(),
        Line::rule(55.0, 265.0, 150.0, 265.0).into(),
        Rect::outline(15.0, 275.0, 8.0, 8.0).into(),
        Text::new(27.0, 282.0, "Do Not Substitute - Dispense as Written", 7.0)
            .bold()
            .into(),
        Line::rule(200.0, 280.0, 320.0, 280.0).into(),
        Text::new(260.0, 290.0, "Signature", 10.0)
            .centered()
            .italic()
            .family("cursive")
            .into(),
        Text::new(CENTER_X, 300.0, disclaimer, 5.0).centered().into(),
        Text::new(380.0, 298.0, VENDOR_MARK, 8.0)
            .bold()
            .anchored(Anchor::End)
            .into(),
    ]);

    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_prescriber;

    #[test]
    fn test_name_line_without_credentials_has_no_trailing_comma() {
        let prescriber = Prescriber {
            name: "Sarah Chen".to_string(),
            ..Prescriber::default()
        };
        assert_eq!(prescriber_name_line(&prescriber), "Sarah Chen");
    }

    #[test]
    fn test_detail_line_hides_license() {
        let mut prescriber = sample_prescriber();
        assert_eq!(
            prescriber_detail_line(&prescriber),
            "Lic# MD-45892    DEA# FC1234563"
        );

        prescriber.hide_license = true;
        assert_eq!(prescriber_detail_line(&prescriber), "DEA# FC1234563");
    }

    #[test]
    fn test_blank_starting_number_falls_back() {
        let elements = sequence_box(&PadOptions {
            starting_number: "  ".to_string(),
        });
        let Element::Text(text) = &elements[1] else {
            panic!("expected sequence text");
        };
        assert_eq!(text.content, "#0001");
    }
}
