//! Black-and-white conversion for print.

use crate::layout::element::{Element, Group, Paint, BLACK, WHITE};
use crate::layout::PadLayout;

fn is_blank_paint(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "none" | "transparent" | "#fff" | "#ffffff" | "white"
    )
}

/// Blank paints are kept, every other colour becomes black.
fn to_black(paint: &Paint) -> Paint {
    match paint {
        Paint::None => Paint::None,
        Paint::Color(value) if is_blank_paint(value) => paint.clone(),
        Paint::Color(_) => Paint::color(BLACK),
    }
}

fn convert(element: &Element) -> Element {
    match element {
        Element::Text(text) => {
            let mut text = text.clone();
            text.fill = if text.reversed {
                Paint::color(WHITE)
            } else {
                to_black(&text.fill)
            };
            Element::Text(text)
        }
        Element::Line(line) => {
            let mut line = line.clone();
            line.stroke = to_black(&line.stroke);
            Element::Line(line)
        }
        Element::Rect(rect) => {
            let mut rect = rect.clone();
            rect.fill = to_black(&rect.fill);
            rect.stroke = to_black(&rect.stroke);
            Element::Rect(rect)
        }
        Element::Group(group) => Element::Group(Group {
            class: group.class.clone(),
            children: group.children.iter().map(convert).collect(),
        }),
    }
}

/// Copy of the layout with every colour reduced to black or white. Text
/// printed on a dark band stays legible as white.
pub fn to_monochrome(layout: &PadLayout) -> PadLayout {
    PadLayout {
        width: layout.width,
        height: layout.height,
        elements: layout.elements.iter().map(convert).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::element::{Rect, Text};

    #[test]
    fn test_blank_paints_are_preserved() {
        for value in ["none", "transparent", "#fff", "#FFFFFF", "white"] {
            assert_eq!(to_black(&Paint::color(value)), Paint::color(value));
        }
        assert_eq!(to_black(&Paint::None), Paint::None);
    }

    #[test]
    fn test_colours_become_black() {
        assert_eq!(to_black(&Paint::color("#8B7355")), Paint::color(BLACK));
        assert_eq!(to_black(&Paint::color("#999999")), Paint::color(BLACK));
    }

    #[test]
    fn test_nested_groups_are_converted() {
        let layout = PadLayout::new(vec![Element::group(
            "band",
            vec![
                Rect::filled(0.0, 0.0, 10.0, 10.0, "#8B7355").into(),
                Text::new(0.0, 0.0, "WARN", 5.0).fill("#ffffff").reversed().into(),
                Text::new(0.0, 0.0, "grey", 5.0).fill("#999999").into(),
            ],
        )]);

        let mono = to_monochrome(&layout);
        let Element::Group(group) = &mono.elements[0] else {
            panic!("expected group");
        };
        let Element::Rect(rect) = &group.children[0] else {
            panic!("expected rect");
        };
        assert_eq!(rect.fill, Paint::color(BLACK));
        assert_eq!(rect.stroke, Paint::None);

        let texts = mono.texts();
        assert_eq!(texts[0].fill, Paint::color(WHITE));
        assert_eq!(texts[1].fill, Paint::color(BLACK));
    }
}
