//! Vector description of a pad: a tree of positioned primitives on a fixed
//! canvas, independent of any output format.

use serde::Serialize;

pub const UNITS_PER_INCH: f32 = 72.0;
/// 5.5in
pub const CANVAS_WIDTH: f32 = 396.0;
/// 4.25in
pub const CANVAS_HEIGHT: f32 = 306.0;

pub const BLACK: &str = "#000000";
pub const WHITE: &str = "#ffffff";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Paint {
    None,
    Color(String),
}

impl Paint {
    pub fn color(value: &str) -> Self {
        Paint::Color(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Paint::None => "none",
            Paint::Color(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    Normal,
    Italic,
}

pub const SANS: &str = "Arial, sans-serif";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub x: f32,
    pub y: f32,
    pub content: String,
    pub font_size: f32,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub anchor: Anchor,
    pub fill: Paint,
    pub underline: bool,
    /// Light text printed on a dark band.
    pub reversed: bool,
}

impl Text {
    pub fn new(x: f32, y: f32, content: impl Into<String>, font_size: f32) -> Self {
        Self {
            x,
            y,
            content: content.into(),
            font_size,
            font_family: SANS.to_string(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            anchor: Anchor::Start,
            fill: Paint::color(BLACK),
            underline: false,
            reversed: false,
        }
    }

    pub fn centered(mut self) -> Self {
        self.anchor = Anchor::Middle;
        self
    }

    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn bold(mut self) -> Self {
        self.font_weight = FontWeight::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.font_style = FontStyle::Italic;
        self
    }

    pub fn family(mut self, family: &str) -> Self {
        self.font_family = family.to_string();
        self
    }

    pub fn fill(mut self, color: &str) -> Self {
        self.fill = Paint::color(color);
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stroke: Paint,
    pub stroke_width: f32,
}

impl Line {
    /// Thin black form rule.
    pub fn rule(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            stroke: Paint::color(BLACK),
            stroke_width: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: Paint,
    pub stroke: Paint,
    pub stroke_width: f32,
}

impl Rect {
    pub fn outline(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill: Paint::None,
            stroke: Paint::color(BLACK),
            stroke_width: 0.5,
        }
    }

    pub fn filled(x: f32, y: f32, width: f32, height: f32, color: &str) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill: Paint::color(color),
            stroke: Paint::None,
            stroke_width: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub class: Option<String>,
    pub children: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Text(Text),
    Line(Line),
    Rect(Rect),
    Group(Group),
}

impl Element {
    pub fn group(class: &str, children: Vec<Element>) -> Self {
        Element::Group(Group {
            class: Some(class.to_string()),
            children,
        })
    }

    pub fn class(&self) -> Option<&str> {
        match self {
            Element::Group(group) => group.class.as_deref(),
            _ => None,
        }
    }
}

impl From<Text> for Element {
    fn from(text: Text) -> Self {
        Element::Text(text)
    }
}

impl From<Line> for Element {
    fn from(line: Line) -> Self {
        Element::Line(line)
    }
}

impl From<Rect> for Element {
    fn from(rect: Rect) -> Self {
        Element::Rect(rect)
    }
}

/// A fixed-size canvas and the elements drawn on it, in paint order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PadLayout {
    pub width: f32,
    pub height: f32,
    pub elements: Vec<Element>,
}

impl PadLayout {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            elements,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn width_inches(&self) -> f32 {
        self.width / UNITS_PER_INCH
    }

    pub fn height_inches(&self) -> f32 {
        self.height / UNITS_PER_INCH
    }

    /// Top-level group with the given class, if present.
    pub fn find_group(&self, class: &str) -> Option<&Group> {
        self.elements.iter().find_map(|element| match element {
            Element::Group(group) if group.class.as_deref() == Some(class) => Some(group),
            _ => None,
        })
    }

    /// Every text element in paint order, descending into groups.
    pub fn texts(&self) -> Vec<&Text> {
        fn collect<'a>(elements: &'a [Element], out: &mut Vec<&'a Text>) {
            for element in elements {
                match element {
                    Element::Text(text) => out.push(text),
                    Element::Group(group) => collect(&group.children, out),
                    Element::Line(_) | Element::Rect(_) => {}
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.elements, &mut out);
        out
    }
}
