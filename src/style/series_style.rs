//! Visual styles of data series and their cyclic generation.

use crate::color::{Rgba, SERIES_PALETTE};
use crate::error::{Error, Result};

/// Figure area (in square pixels) at which marker sizes are used unscaled.
pub const MARKER_SCALE_BASE: f64 = 600.0 * 600.0;

/// Stroke pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Long dashes.
    Dashed,
    /// Alternating dash and dot.
    DashDot,
    /// Dots.
    Dotted,
}

impl LineStyle {
    /// On/off lengths in pixels, `None` for a continuous line.
    #[must_use]
    pub fn dash_pattern(self) -> Option<&'static [f32]> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some(&[8.0, 4.0]),
            LineStyle::DashDot => Some(&[8.0, 3.0, 2.0, 3.0]),
            LineStyle::Dotted => Some(&[2.0, 3.0]),
        }
    }
}

/// Marker symbol drawn at data points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerShape {
    /// Filled circle.
    #[default]
    Circle,
    /// Circle outline.
    OpenCircle,
    /// Square outline.
    OpenSquare,
    /// Upward triangle outline.
    OpenTriangle,
    /// Diagonal cross.
    Cross,
}

/// Area fill of a series (histogram bars, graph area).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillStyle {
    /// No fill.
    #[default]
    Empty,
    /// Solid fill.
    Solid,
    /// Sparse dot pattern.
    Dotted,
    /// Diagonal hatching.
    Hatched,
}

impl FillStyle {
    /// Look up a fill style by name (`empty`, `solid`, `dotted`, `hatched`).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOptionValue`] for any other name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "empty" => Ok(FillStyle::Empty),
            "solid" => Ok(FillStyle::Solid),
            "dotted" => Ok(FillStyle::Dotted),
            "hatched" => Ok(FillStyle::Hatched),
            _ => Err(Error::InvalidOptionValue {
                key: format!("fill style {name}"),
                expected: "one of empty, solid, dotted, hatched",
            }),
        }
    }
}

/// Complete style of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    /// Line width in pixels.
    pub line_width: f64,
    /// Line pattern.
    pub line_style: LineStyle,
    /// Line color.
    pub line_color: Rgba,
    /// Marker size in pixels at the reference figure area.
    pub marker_size: f64,
    /// Marker symbol.
    pub marker_shape: MarkerShape,
    /// Marker color.
    pub marker_color: Rgba,
    /// Fill pattern.
    pub fill_style: FillStyle,
    /// Fill color.
    pub fill_color: Rgba,
    /// Fill opacity in `[0, 1]`.
    pub fill_alpha: f64,
}

impl Default for SeriesStyle {
    fn default() -> Self {
        StyleGenerator::new().style_at(0)
    }
}

/// Scale factor for marker sizes on a figure of the given pixel size.
#[must_use]
pub fn marker_scale(width: u32, height: u32) -> f64 {
    (f64::from(width) * f64::from(height) / MARKER_SCALE_BASE).sqrt()
}

/// Cyclic style generator. Every attribute cycles through its own list, so
/// lists of different lengths produce long non-repeating sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleGenerator {
    line_widths: Vec<f64>,
    line_styles: Vec<LineStyle>,
    line_colors: Vec<Rgba>,
    marker_sizes: Vec<f64>,
    marker_shapes: Vec<MarkerShape>,
    marker_colors: Vec<Rgba>,
    fill_styles: Vec<FillStyle>,
    fill_colors: Vec<Rgba>,
    fill_alphas: Vec<f64>,
}

impl Default for StyleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! cycle_setter {
    ($name:ident, $ty:ty) => {
        #[doc = concat!("Override the `", stringify!($name), "` cycle (ignored when empty).")]
        #[must_use]
        pub fn $name(mut self, values: Vec<$ty>) -> Self {
            if !values.is_empty() {
                self.$name = values;
            }
            self
        }
    };
}

impl StyleGenerator {
    /// Generator with the default cycles.
    #[must_use]
    pub fn new() -> Self {
        Self {
            line_widths: vec![2.0],
            line_styles: vec![LineStyle::Solid, LineStyle::Dashed, LineStyle::DashDot],
            line_colors: SERIES_PALETTE.to_vec(),
            marker_sizes: vec![1.0],
            marker_shapes: vec![
                MarkerShape::Circle,
                MarkerShape::OpenCircle,
                MarkerShape::OpenSquare,
                MarkerShape::OpenTriangle,
                MarkerShape::Cross,
            ],
            marker_colors: SERIES_PALETTE.to_vec(),
            fill_styles: vec![FillStyle::Empty],
            fill_colors: SERIES_PALETTE.to_vec(),
            fill_alphas: vec![1.0],
        }
    }

    cycle_setter!(line_widths, f64);
    cycle_setter!(line_styles, LineStyle);
    cycle_setter!(line_colors, Rgba);
    cycle_setter!(marker_sizes, f64);
    cycle_setter!(marker_shapes, MarkerShape);
    cycle_setter!(marker_colors, Rgba);
    cycle_setter!(fill_styles, FillStyle);
    cycle_setter!(fill_colors, Rgba);
    cycle_setter!(fill_alphas, f64);

    /// Use one color cycle for lines, markers and fills.
    #[must_use]
    pub fn colors(self, colors: Vec<Rgba>) -> Self {
        self.line_colors(colors.clone())
            .marker_colors(colors.clone())
            .fill_colors(colors)
    }

    /// The `i`-th style of the cycle.
    #[must_use]
    pub fn style_at(&self, i: usize) -> SeriesStyle {
        fn pick<T: Copy>(values: &[T], i: usize) -> T {
            values[i % values.len()]
        }
        SeriesStyle {
            line_width: pick(&self.line_widths, i),
            line_style: pick(&self.line_styles, i),
            line_color: pick(&self.line_colors, i),
            marker_size: pick(&self.marker_sizes, i),
            marker_shape: pick(&self.marker_shapes, i),
            marker_color: pick(&self.marker_colors, i),
            fill_style: pick(&self.fill_styles, i),
            fill_color: pick(&self.fill_colors, i),
            fill_alpha: pick(&self.fill_alphas, i).clamp(0.0, 1.0),
        }
    }

    /// The first `n` styles of the cycle.
    #[must_use]
    pub fn generate(&self, n: usize) -> Vec<SeriesStyle> {
        (0..n).map(|i| self.style_at(i)).collect()
    }
}

/// The first `n` default styles.
#[must_use]
pub fn generate_styles(n: usize) -> Vec<SeriesStyle> {
    StyleGenerator::new().generate(n)
}
