use std::fmt::Write;

use super::element::{Anchor, Element, FontStyle, FontWeight, Line, PadLayout, Rect, Text};

/// Characters XML 1.0 has no representation for, not even escaped.
fn is_forbidden_in_xml(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}

/// Escapes the five XML special characters and drops characters XML 1.0
/// does not allow.
pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            c if is_forbidden_in_xml(c) => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn anchor_attr(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::Start => "start",
        Anchor::Middle => "middle",
        Anchor::End => "end",
    }
}

fn write_text(out: &mut String, text: &Text) {
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" font-size="{}" font-family="{}" text-anchor="{}" fill="{}""#,
        text.x,
        text.y,
        text.font_size,
        escape_xml(&text.font_family),
        anchor_attr(text.anchor),
        escape_xml(text.fill.as_str()),
    );
    if text.font_weight == FontWeight::Bold {
        out.push_str(r#" font-weight="bold""#);
    }
    if text.font_style == FontStyle::Italic {
        out.push_str(r#" font-style="italic""#);
    }
    if text.underline {
        out.push_str(r#" text-decoration="underline""#);
    }
    let _ = write!(out, ">{}</text>", escape_xml(&text.content));
}

fn write_line(out: &mut String, line: &Line) {
    let _ = write!(
        out,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
        line.x1,
        line.y1,
        line.x2,
        line.y2,
        escape_xml(line.stroke.as_str()),
        line.stroke_width,
    );
}

fn write_rect(out: &mut String, rect: &Rect) {
    let _ = write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        escape_xml(rect.fill.as_str()),
        escape_xml(rect.stroke.as_str()),
        rect.stroke_width,
    );
}

fn write_element(out: &mut String, element: &Element) {
    match element {
        Element::Text(text) => write_text(out, text),
        Element::Line(line) => write_line(out, line),
        Element::Rect(rect) => write_rect(out, rect),
        Element::Group(group) => {
            match &group.class {
                Some(class) => {
                    let _ = write!(out, r#"<g class="{}">"#, escape_xml(class));
                }
                None => out.push_str("<g>"),
            }
            for child in &group.children {
                write_element(out, child);
            }
            out.push_str("</g>");
        }
    }
}

impl PadLayout {
    /// Standalone SVG document. The physical size is set in inches so the
    /// renderer maps it one-to-one onto the page.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}in" height="{}in" viewBox="0 0 {} {}">"#,
            self.width_inches(),
            self.height_inches(),
            self.width,
            self.height,
        );
        out.push_str(r##"<rect x="0" y="0" width="100%" height="100%" fill="#ffffff"/>"##);
        for element in &self.elements {
            write_element(&mut out, element);
        }
        out.push_str("</svg>");
        out
    }
}
