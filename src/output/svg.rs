//! SVG document model and serializer.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::color::Rgba;
use crate::error::Result;

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// Text starts at the position.
    #[default]
    Start,
    /// Text is centred on the position.
    Middle,
    /// Text ends at the position.
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Stroke of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// Color.
    pub color: Rgba,
    /// Width in pixels.
    pub width: f32,
    /// Dash pattern in pixels, solid when `None`.
    pub dash: Option<Vec<f32>>,
}

impl Stroke {
    /// Solid stroke.
    #[must_use]
    pub fn solid(color: Rgba, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }
}

/// One SVG node. Coordinates are pixels, origin top left.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Start of a named group.
    GroupStart { id: String },
    /// End of the innermost group.
    GroupEnd,
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    },
    Polyline {
        points: Vec<(f32, f32)>,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<(f32, f32)>,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        font_size: f32,
        fill: Rgba,
        anchor: TextAnchor,
        /// Rotated by -90 degrees around its position.
        vertical: bool,
    },
}

/// An SVG document under construction.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: u32,
    height: u32,
    background: Option<Rgba>,
    elements: Vec<SvgElement>,
}

impl SvgDocument {
    /// Empty document with a white background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Some(Rgba::WHITE),
            elements: Vec::new(),
        }
    }

    /// Set the background, transparent when `None`.
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Append a node.
    pub fn push(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    /// Nodes in document order.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Serialize the document.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(256 + 96 * self.elements.len());
        let (w, h) = (self.width, self.height);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        if let Some(bg) = self.background {
            let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="{}"/>"#, css(bg));
        }
        let mut depth = 0usize;
        for element in &self.elements {
            if matches!(element, SvgElement::GroupEnd) {
                depth = depth.saturating_sub(1);
            }
            let _ = writeln!(svg, "{}{}", "  ".repeat(depth + 1), node(element));
            if matches!(element, SvgElement::GroupStart { .. }) {
                depth += 1;
            }
        }
        for _ in 0..depth {
            svg.push_str("</g>\n");
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Write the serialized document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }
}

fn css(color: Rgba) -> String {
    if color.a == 255 {
        format!("rgb({},{},{})", color.r, color.g, color.b)
    } else {
        format!(
            "rgba({},{},{},{:.3})",
            color.r,
            color.g,
            color.b,
            f32::from(color.a) / 255.0
        )
    }
}

fn paint(fill: Option<Rgba>, stroke: Option<&Stroke>) -> String {
    let mut attrs = format!(r#" fill="{}""#, fill.map_or_else(|| "none".to_string(), css));
    if let Some(stroke) = stroke {
        let _ = write!(
            attrs,
            r#" stroke="{}" stroke-width="{}""#,
            css(stroke.color),
            stroke.width
        );
        if let Some(dash) = stroke.dash.as_ref().filter(|d| !d.is_empty()) {
            let pattern: Vec<String> = dash.iter().map(ToString::to_string).collect();
            let _ = write!(attrs, r#" stroke-dasharray="{}""#, pattern.join(","));
        }
    }
    attrs
}

fn points(points: &[(f32, f32)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape text content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
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

fn node(element: &SvgElement) -> String {
    match element {
        SvgElement::GroupStart { id } => format!(r#"<g id="{}">"#, escape(id)),
        SvgElement::GroupEnd => "</g>".to_string(),
        SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => format!(
            r#"<rect x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}"{}/>"#,
            paint(*fill, stroke.as_ref())
        ),
        SvgElement::Circle {
            cx,
            cy,
            r,
            fill,
            stroke,
        } => format!(
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}"{}/>"#,
            paint(*fill, stroke.as_ref())
        ),
        SvgElement::Polyline { points: pts, stroke } => format!(
            r#"<polyline points="{}"{}/>"#,
            points(pts),
            paint(None, Some(stroke))
        ),
        SvgElement::Polygon {
            points: pts,
            fill,
            stroke,
        } => format!(
            r#"<polygon points="{}"{}/>"#,
            points(pts),
            paint(*fill, stroke.as_ref())
        ),
        SvgElement::Text {
            x,
            y,
            text,
            font_size,
            fill,
            anchor,
            vertical,
        } => {
            let rotate = if *vertical {
                format!(r#" transform="rotate(-90 {x:.2} {y:.2})""#)
            } else {
                String::new()
            };
            format!(
                r#"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{font_size:.1}" fill="{}" text-anchor="{}"{rotate}>{}</text>"#,
                css(*fill),
                anchor.as_str(),
                escape(text)
            )
        }
    }
}
