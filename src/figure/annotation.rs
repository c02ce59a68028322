//! Free text and reference lines attached to a plot.

use crate::color::Rgba;
use crate::geometry::Point;
use crate::scale::AxisScale;
use crate::style::series_style::LineStyle;

/// Default text size (fraction of the figure height).
pub const DEFAULT_TEXT_SIZE: f64 = 0.02;

/// Text placed at a frame-relative position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    /// The text.
    pub text: String,
    /// Lower left corner in frame coordinates.
    pub position: Point,
    /// Text size as a fraction of the figure height.
    pub size: f64,
}

impl TextSpec {
    /// Text at `(x, y)` of the frame.
    #[must_use]
    pub fn new(text: impl Into<String>, x: f64, y: f64, size: f64) -> Self {
        Self {
            text: text.into(),
            position: Point::new(x, y),
            size,
        }
    }
}

/// How a line coordinate is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Fraction of the frame (`0..1`).
    #[default]
    Relative,
    /// Data coordinate on the axis.
    Data,
}

/// Reference line inside a plot frame.
///
/// A missing pair of endpoints spans the whole frame on that axis; a single
/// missing endpoint repeats the other one, which gives horizontal and
/// vertical lines.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    x: (Option<f64>, Option<f64>),
    y: (Option<f64>, Option<f64>),
    x_orientation: Orientation,
    y_orientation: Orientation,
    /// Stroke color.
    pub color: Rgba,
    /// Stroke width in pixels.
    pub width: f64,
    /// Stroke pattern.
    pub line_style: LineStyle,
}

impl Default for LineSpec {
    fn default() -> Self {
        Self {
            x: (None, None),
            y: (None, None),
            x_orientation: Orientation::Relative,
            y_orientation: Orientation::Relative,
            color: Rgba::BLACK,
            width: 1.0,
            line_style: LineStyle::Dashed,
        }
    }
}

impl LineSpec {
    /// Line spanning the frame diagonal until endpoints are given.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Horizontal line at data value `y`.
    #[must_use]
    pub fn horizontal(y: f64) -> Self {
        Self::new().y(Some(y), None, Orientation::Data)
    }

    /// Vertical line at data value `x`.
    #[must_use]
    pub fn vertical(x: f64) -> Self {
        Self::new().x(Some(x), None, Orientation::Data)
    }

    /// Set the x endpoints.
    #[must_use]
    pub fn x(mut self, low: Option<f64>, up: Option<f64>, orientation: Orientation) -> Self {
        self.x = (low, up);
        self.x_orientation = orientation;
        self
    }

    /// Set the y endpoints.
    #[must_use]
    pub fn y(mut self, low: Option<f64>, up: Option<f64>, orientation: Orientation) -> Self {
        self.y = (low, up);
        self.y_orientation = orientation;
        self
    }

    /// Set the stroke color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Set the stroke width and pattern.
    #[must_use]
    pub fn stroke(mut self, width: f64, line_style: LineStyle) -> Self {
        self.width = width;
        self.line_style = line_style;
        self
    }

    /// Endpoints `((x_low, x_up), (y_low, y_up))` in their own coordinates.
    #[must_use]
    pub fn endpoints(&self) -> ((f64, f64), (f64, f64)) {
        (complete(self.x), complete(self.y))
    }

    /// Endpoints mapped into frame coordinates.
    pub(crate) fn to_frame(&self, x_scale: &AxisScale, y_scale: &AxisScale) -> (Point, Point) {
        let ((x0, x1), (y0, y1)) = self.endpoints();
        let map = |v: f64, orientation: Orientation, scale: &AxisScale| match orientation {
            Orientation::Relative => v,
            Orientation::Data => scale.to_frame(v),
        };
        let (ox, oy) = (self.x_orientation, self.y_orientation);
        (
            Point::new(map(x0, ox, x_scale), map(y0, oy, y_scale)),
            Point::new(map(x1, ox, x_scale), map(y1, oy, y_scale)),
        )
    }
}

fn complete(pair: (Option<f64>, Option<f64>)) -> (f64, f64) {
    match pair {
        (None, None) => (0.0, 1.0),
        (Some(v), None) | (None, Some(v)) => (v, v),
        (Some(low), Some(up)) => (low, up),
    }
}

/// Line ready to draw, in frame coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLine {
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
    /// Stroke color.
    pub color: Rgba,
    /// Stroke width in pixels.
    pub width: f64,
    /// Stroke pattern.
    pub line_style: LineStyle,
}

/// Text ready to draw, in figure coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedText {
    /// The text.
    pub text: String,
    /// Lower left corner in figure coordinates.
    pub position: Point,
    /// Size as a fraction of the figure height.
    pub size: f64,
}
