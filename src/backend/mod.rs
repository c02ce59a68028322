//! Backends: turn a [`FinalizedFigure`] into an output artifact.
//!
//! A backend owns a [`Canvas`] implementation and an [`ObjectRegistry`].
//! The shared [`FigurePainter`] walks the finalized figure and issues draw
//! calls in figure coordinates (`[0, 1]^2`, origin bottom left); each canvas
//! maps them onto its own pixel grid.

mod raster;
mod svg;

use std::collections::HashMap;
use std::path::Path;

use log::{debug, trace};

use crate::color::Rgba;
use crate::error::Result;
use crate::figure::{FinalizedFigure, FinalizedLegend, FinalizedPlot, FinalizedSeries, ResolvedAxis};
use crate::geometry::{Point, Rect};
use crate::output::TextAnchor;
use crate::series::SeriesData;
use crate::style::series_style::{marker_scale, FillStyle, LineStyle, MarkerShape};

pub use raster::{RasterBackend, RasterCanvas, RasterImage};
pub use svg::{SvgBackend, SvgCanvas, SvgImage};

/// Base marker radius in pixels at marker size 1 on a 600x600 figure.
pub const MARKER_RADIUS: f64 = 3.0;

/// Target number of ticks per axis.
const TICK_TARGET: usize = 5;

/// A rendered figure that can be written to disk.
pub trait Artifact {
    /// Write the artifact to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    fn save(&self, path: &Path) -> Result<()>;
}

/// Something that renders finalized figures.
pub trait RenderBackend {
    /// Rendered result.
    type Output: Artifact;

    /// Render a finalized figure.
    ///
    /// # Errors
    ///
    /// Returns an error if the figure cannot be drawn.
    fn render(&mut self, figure: &FinalizedFigure) -> Result<Self::Output>;
}

/// Draw calls in figure coordinates.
pub trait Canvas {
    /// Pixel size (width, height).
    fn size(&self) -> (u32, u32);

    /// Open a named group of draw calls.
    ///
    /// # Errors
    ///
    /// Canvas specific.
    fn begin_group(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    /// Close the innermost group.
    ///
    /// # Errors
    ///
    /// Canvas specific.
    fn end_group(&mut self) -> Result<()> {
        Ok(())
    }

    /// Fill and/or stroke a rectangle. Stroke width is in pixels.
    ///
    /// # Errors
    ///
    /// Canvas specific.
    fn rect(&mut self, rect: Rect, fill: Option<Rgba>, stroke: Option<(Rgba, f64)>) -> Result<()>;

    /// Connected segments. Width is in pixels.
    ///
    /// # Errors
    ///
    /// Canvas specific.
    fn polyline(&mut self, points: &[Point], color: Rgba, width: f64, style: LineStyle) -> Result<()>;

    /// A marker with a pixel radius.
    ///
    /// # Errors
    ///
    /// Canvas specific.
    fn marker(&mut self, center: Point, shape: MarkerShape, radius: f64, color: Rgba) -> Result<()>;

    /// Text with its baseline at `at`; `size` is a fraction of the figure
    /// height. `vertical` text runs bottom to top.
    ///
    /// # Errors
    ///
    /// Canvas specific.
    fn text(&mut self, text: &str, at: Point, size: f64, anchor: TextAnchor, vertical: bool) -> Result<()>;
}

/// Unique object names per base name, `name_0`, `name_1`, ...
///
/// A registry lives as long as its backend, so rendering the same figure
/// twice yields fresh names.
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    counters: HashMap<String, usize>,
}

impl ObjectRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unique name for `base`.
    pub fn name(&mut self, base: &str) -> String {
        let counter = self.counters.entry(base.to_string()).or_insert(0);
        let name = format!("{base}_{counter}");
        *counter += 1;
        name
    }

    /// Total number of names handed out.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.counters.values().sum()
    }
}

/// Walks a finalized figure and drives a [`Canvas`].
pub struct FigurePainter<'a, C: Canvas> {
    canvas: &'a mut C,
    registry: &'a mut ObjectRegistry,
    marker_scale: f64,
    aspect: f64,
}

impl<'a, C: Canvas> FigurePainter<'a, C> {
    /// Painter drawing onto `canvas`, naming objects through `registry`.
    pub fn new(canvas: &'a mut C, registry: &'a mut ObjectRegistry) -> Self {
        let (width, height) = canvas.size();
        Self {
            canvas,
            registry,
            marker_scale: marker_scale(width, height),
            aspect: f64::from(height) / f64::from(width.max(1)),
        }
    }

    /// Draw every non-empty plot and return the object names used.
    ///
    /// # Errors
    ///
    /// Propagates canvas errors.
    pub fn paint(&mut self, figure: &FinalizedFigure) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for plot in &figure.plots {
            if plot.is_empty() {
                debug!("{}: nothing to draw", plot.name);
                continue;
            }
            self.paint_plot(plot, &mut names)?;
        }
        Ok(names)
    }

    fn paint_plot(&mut self, plot: &FinalizedPlot, names: &mut Vec<String>) -> Result<()> {
        let pad = self.registry.name(&plot.name);
        self.canvas.begin_group(&pad)?;
        names.push(pad);

        let frame_name = self.registry.name("frame");
        self.canvas.begin_group(&frame_name)?;
        names.push(frame_name);
        self.canvas.rect(plot.frame, Some(Rgba::WHITE), None)?;
        for series in &plot.series {
            let name = self.registry.name(series.series.name());
            trace!("drawing {name}");
            self.canvas.begin_group(&name)?;
            self.paint_series(plot, series)?;
            self.canvas.end_group()?;
            names.push(name);
        }
        for line in &plot.lines {
            let points = [plot.to_figure(clamp(line.start)), plot.to_figure(clamp(line.end))];
            self.canvas
                .polyline(&points, line.color, line.width, line.line_style)?;
        }
        self.canvas.rect(plot.frame, None, Some((Rgba::BLACK, 1.0)))?;
        self.paint_x_axis(plot)?;
        self.paint_y_axis(plot)?;
        self.canvas.end_group()?;

        if let Some(legend) = &plot.legend {
            self.paint_legend(legend)?;
        }
        for text in &plot.texts {
            self.canvas
                .text(&text.text, text.position, text.size, TextAnchor::Start, false)?;
        }
        if let Some(title) = &plot.title {
            let size = plot.x_axis.spec.title_size * 1.2;
            let at = Point::new(plot.frame.center().x, plot.frame.y1 + 0.5 * size);
            self.canvas.text(title, at, size, TextAnchor::Middle, false)?;
        }
        self.canvas.end_group()
    }

    /// Data point to figure coordinates, clamped to the frame.
    fn project(plot: &FinalizedPlot, x: f64, y: f64) -> Option<Point> {
        let p = plot.data_to_frame(Point::new(x, y));
        (p.x.is_finite() && p.y.is_finite()).then(|| plot.to_figure(clamp(p)))
    }

    fn paint_series(&mut self, plot: &FinalizedPlot, series: &FinalizedSeries) -> Result<()> {
        let style = &series.style;
        match series.series.data() {
            SeriesData::Histogram {
                edges,
                contents,
                errors,
            } => {
                let base = plot.y_axis.limits.0;
                if style.fill_style != FillStyle::Empty {
                    let fill = style.fill_color.with_opacity(style.fill_alpha);
                    for (bin, &content) in edges.windows(2).zip(contents) {
                        let corners = (
                            Self::project(plot, bin[0], base),
                            Self::project(plot, bin[1], content),
                        );
                        if let (Some(a), Some(b)) = corners {
                            self.canvas
                                .rect(Rect::new(a.x, a.y, b.x, b.y), Some(fill), None)?;
                        }
                    }
                }

                let mut outline = Vec::with_capacity(2 * contents.len() + 2);
                outline.extend(Self::project(plot, edges[0], base));
                for (bin, &content) in edges.windows(2).zip(contents) {
                    outline.extend(Self::project(plot, bin[0], content));
                    outline.extend(Self::project(plot, bin[1], content));
                }
                outline.extend(Self::project(plot, edges[edges.len() - 1], base));
                self.canvas
                    .polyline(&outline, style.line_color, style.line_width, style.line_style)?;

                for ((bin, &content), &error) in edges.windows(2).zip(contents).zip(errors) {
                    if error <= 0.0 {
                        continue;
                    }
                    let center = 0.5 * (bin[0] + bin[1]);
                    let bar: Vec<Point> = [content - error, content + error]
                        .iter()
                        .filter_map(|&y| Self::project(plot, center, y))
                        .collect();
                    self.canvas
                        .polyline(&bar, style.line_color, 1.0, LineStyle::Solid)?;
                }
            }
            SeriesData::Graph { x, y } => {
                let points: Vec<Point> = x
                    .iter()
                    .zip(y)
                    .filter_map(|(&x, &y)| Self::project(plot, x, y))
                    .collect();
                self.canvas
                    .polyline(&points, style.line_color, style.line_width, style.line_style)?;
                let radius = MARKER_RADIUS * style.marker_size * self.marker_scale;
                for p in points {
                    self.canvas
                        .marker(p, style.marker_shape, radius, style.marker_color)?;
                }
            }
            SeriesData::Function { .. } => {
                let (low, high) = plot.x_axis.limits;
                let Some((low, high)) = series.series.visible_x_range(low, high) else {
                    return Ok(());
                };
                let points: Vec<Point> = series
                    .series
                    .sample(low, high)
                    .into_iter()
                    .filter_map(|p| Self::project(plot, p.x, p.y))
                    .collect();
                self.canvas
                    .polyline(&points, style.line_color, style.line_width, style.line_style)?;
            }
        }
        Ok(())
    }

    fn paint_x_axis(&mut self, plot: &FinalizedPlot) -> Result<()> {
        let axis = &plot.x_axis;
        let frame = plot.frame;
        let spec = &axis.spec;
        let ticks = axis.scale.ticks(TICK_TARGET);
        let step = tick_step(&ticks);
        for &tick in &ticks {
            let fx = axis.scale.to_frame(tick);
            if !(0.0..=1.0).contains(&fx) {
                continue;
            }
            let foot = frame.map_point(Point::new(fx, 0.0));
            let head = Point::new(foot.x, foot.y + spec.tick_size);
            self.canvas
                .polyline(&[foot, head], Rgba::BLACK, 1.0, LineStyle::Solid)?;
            if axis.shows_labels() {
                let offset = spec.label_offset.unwrap_or(0.01) + spec.label_size;
                let at = Point::new(foot.x, foot.y - offset);
                self.canvas.text(
                    &tick_label(tick, step, axis),
                    at,
                    spec.label_size,
                    TextAnchor::Middle,
                    false,
                )?;
            }
        }
        if axis.shows_labels() && !spec.title.is_empty() {
            let offset = spec.title_offset.unwrap_or(1.0) * 1.5 * (spec.label_size + spec.title_size);
            let at = Point::new(frame.x1, frame.y0 - offset);
            self.canvas
                .text(&spec.title, at, spec.title_size, TextAnchor::End, false)?;
        }
        Ok(())
    }

    fn paint_y_axis(&mut self, plot: &FinalizedPlot) -> Result<()> {
        let axis = &plot.y_axis;
        let frame = plot.frame;
        let spec = &axis.spec;
        let ticks = axis.scale.ticks(TICK_TARGET);
        let step = tick_step(&ticks);
        // tick sizes are fractions of the figure height
        let tick_width = spec.tick_size * self.aspect;
        for &tick in &ticks {
            let fy = axis.scale.to_frame(tick);
            if !(0.0..=1.0).contains(&fy) {
                continue;
            }
            let foot = frame.map_point(Point::new(0.0, fy));
            let head = Point::new(foot.x + tick_width, foot.y);
            self.canvas
                .polyline(&[foot, head], Rgba::BLACK, 1.0, LineStyle::Solid)?;
            if axis.shows_labels() {
                let offset = spec.label_offset.unwrap_or(0.01) * self.aspect;
                let at = Point::new(foot.x - offset, foot.y - spec.label_size / 3.0);
                self.canvas.text(
                    &tick_label(tick, step, axis),
                    at,
                    spec.label_size,
                    TextAnchor::End,
                    false,
                )?;
            }
        }
        if axis.shows_labels() && !spec.title.is_empty() {
            let offset =
                spec.title_offset.unwrap_or(1.0) * (3.0 * spec.label_size + spec.title_size) * self.aspect;
            let at = Point::new(frame.x0 - offset, frame.y1);
            self.canvas
                .text(&spec.title, at, spec.title_size, TextAnchor::End, true)?;
        }
        Ok(())
    }

    fn paint_legend(&mut self, legend: &FinalizedLegend) -> Result<()> {
        let name = self.registry.name("legend");
        self.canvas.begin_group(&name)?;
        let rect = legend.rect;
        self.canvas
            .rect(rect, Some(Rgba::WHITE), Some((Rgba::BLACK, 1.0)))?;

        let n_columns = legend.n_columns.max(1);
        let title_rows = usize::from(legend.title.is_some());
        let rows = legend.entries.len().div_ceil(n_columns) + title_rows;
        let (row_height, column_width) = (
            rect.height() / rows.max(1) as f64,
            rect.width() / n_columns as f64,
        );
        let baseline = |row: usize| {
            let mid = rect.y1 - (row as f64 + 0.5) * row_height;
            mid - legend.text_size / 3.0
        };

        if let Some(title) = &legend.title {
            let at = Point::new(rect.center().x, baseline(0));
            self.canvas
                .text(title, at, legend.text_size, TextAnchor::Middle, false)?;
        }
        for (i, entry) in legend.entries.iter().enumerate() {
            let row = i / n_columns + title_rows;
            let x0 = rect.x0 + (i % n_columns) as f64 * column_width;
            let y = baseline(row) + legend.text_size / 3.0;
            let (sample_start, sample_end) = (x0 + 0.05 * column_width, x0 + 0.3 * column_width);
            let style = &entry.style;
            if style.fill_style != FillStyle::Empty {
                let half = 0.3 * row_height;
                self.canvas.rect(
                    Rect::new(sample_start, y - half, sample_end, y + half),
                    Some(style.fill_color.with_opacity(style.fill_alpha)),
                    None,
                )?;
            }
            self.canvas.polyline(
                &[Point::new(sample_start, y), Point::new(sample_end, y)],
                style.line_color,
                style.line_width,
                style.line_style,
            )?;
            if entry.marker {
                let center = Point::new(0.5 * (sample_start + sample_end), y);
                let radius = MARKER_RADIUS * style.marker_size * self.marker_scale;
                self.canvas
                    .marker(center, style.marker_shape, radius, style.marker_color)?;
            }
            let at = Point::new(x0 + 0.35 * column_width, baseline(row));
            self.canvas
                .text(&entry.label, at, legend.text_size, TextAnchor::Start, false)?;
        }
        self.canvas.end_group()
    }
}

fn clamp(p: Point) -> Point {
    Point::new(p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0))
}

fn tick_step(ticks: &[f64]) -> f64 {
    match ticks {
        [a, b, ..] => (b - a).abs(),
        _ => 1.0,
    }
}

/// Tick label with as many decimals as the tick step needs.
fn tick_label(value: f64, step: f64, axis: &ResolvedAxis) -> String {
    let magnitude = if axis.spec.is_log { value.abs() } else { step };
    if value == 0.0 {
        return "0".to_string();
    }
    if value.abs() >= 1e5 || value.abs() < 1e-4 {
        return format!("{value:e}");
    }
    let decimals = if magnitude >= 1.0 || magnitude <= 0.0 {
        0
    } else {
        (-magnitude.log10() - 1e-9).ceil().max(0.0) as usize
    };
    format!("{value:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Figure;
    use crate::layout::{CellRequest, GridSpec};
    use crate::scale::AxisScale;
    use crate::series::DataSeries;
    use crate::style::options::Options;
    use crate::style::resolve::AxisSpec;

    /// Canvas recording the calls it receives.
    #[derive(Default)]
    struct Recorder {
        groups: Vec<String>,
        stack: Vec<String>,
        x_extent: HashMap<String, (f64, f64)>,
        open: usize,
        rects: usize,
        polylines: Vec<usize>,
        markers: usize,
        texts: Vec<String>,
    }

    impl Canvas for Recorder {
        fn size(&self) -> (u32, u32) {
            (600, 600)
        }
        fn begin_group(&mut self, name: &str) -> Result<()> {
            self.groups.push(name.to_string());
            self.stack.push(name.to_string());
            self.open += 1;
            Ok(())
        }
        fn end_group(&mut self) -> Result<()> {
            self.stack.pop();
            self.open -= 1;
            Ok(())
        }
        fn rect(&mut self, _: Rect, _: Option<Rgba>, _: Option<(Rgba, f64)>) -> Result<()> {
            self.rects += 1;
            Ok(())
        }
        fn polyline(&mut self, points: &[Point], _: Rgba, _: f64, _: LineStyle) -> Result<()> {
            assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)));
            self.polylines.push(points.len());
            if let Some(group) = self.stack.last() {
                let extent = self.x_extent.entry(group.clone()).or_insert((f64::INFINITY, f64::NEG_INFINITY));
                for p in points {
                    extent.0 = extent.0.min(p.x);
                    extent.1 = extent.1.max(p.x);
                }
            }
            Ok(())
        }
        fn marker(&mut self, _: Point, _: MarkerShape, radius: f64, _: Rgba) -> Result<()> {
            assert!(radius > 0.0);
            self.markers += 1;
            Ok(())
        }
        fn text(&mut self, text: &str, _: Point, _: f64, _: TextAnchor, _: bool) -> Result<()> {
            self.texts.push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_registry_counts_per_base() {
        let mut registry = ObjectRegistry::new();
        assert_eq!(registry.name("frame"), "frame_0");
        assert_eq!(registry.name("frame"), "frame_1");
        assert_eq!(registry.name("h"), "h_0");
        assert_eq!(registry.issued(), 3);
    }

    #[test]
    fn test_painter_names_and_balanced_groups() {
        let mut fig = Figure::with_name("fig", GridSpec::new(2, 1)).unwrap();
        fig.define_plot(CellRequest::Next, Options::new().with("title", "left")).unwrap();
        let g = DataSeries::graph("g", &[0.0, 1.0, 2.0], &[1.0, 3.0, 2.0]).unwrap();
        fig.add_series(&g, None, Some("points")).unwrap();
        fig.add_series(&g, None, None).unwrap();
        fig.define_plot(CellRequest::Next, Options::new()).unwrap();
        let done = fig.finalize().unwrap();

        let mut canvas = Recorder::default();
        let mut registry = ObjectRegistry::new();
        let names = FigurePainter::new(&mut canvas, &mut registry).paint(&done).unwrap();
        // the empty right plot is skipped
        assert_eq!(names, vec!["fig_pad_0_0", "frame_0", "g_0", "g_1"]);
        assert_eq!(canvas.open, 0);
        assert!(canvas.groups.contains(&"legend_0".to_string()));
        assert_eq!(canvas.markers, 3 * 2 + 1);
        assert!(canvas.texts.contains(&"left".to_string()));
        assert!(canvas.texts.contains(&"points".to_string()));
    }

    #[test]
    fn test_histogram_outline_points() {
        let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
        let h = DataSeries::histogram("h", &[0.0, 1.0, 2.0, 3.0], &[1.0, 4.0, 2.0]).unwrap();
        fig.add_series(&h, None, None).unwrap();
        let done = fig.finalize().unwrap();
        let mut canvas = Recorder::default();
        let mut registry = ObjectRegistry::new();
        FigurePainter::new(&mut canvas, &mut registry).paint(&done).unwrap();
        assert!(canvas.polylines.contains(&(2 * 3 + 2)));
    }

    #[test]
    fn test_function_drawn_over_its_own_range() {
        let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
        let g = DataSeries::graph("wide", &[0.0, 10.0], &[0.0, 10.0]).unwrap();
        let f = DataSeries::function("narrow", |x| x, (4.0, 5.0)).unwrap();
        let outside = DataSeries::function("outside", |x| x, (20.0, 30.0)).unwrap();
        fig.add_series(&g, None, None).unwrap();
        fig.add_series(&f, None, None).unwrap();
        let done = fig.finalize().unwrap();
        assert_eq!(done.plots[0].x_axis.limits, (0.0, 10.0));

        let mut canvas = Recorder::default();
        let mut registry = ObjectRegistry::new();
        FigurePainter::new(&mut canvas, &mut registry).paint(&done).unwrap();
        let frame = done.plots[0].frame;
        let (x0, x1) = canvas.x_extent["narrow_0"];
        let at = |t: f64| frame.x0 + t * frame.width();
        assert!((x0 - at(0.4)).abs() < 1e-9, "starts at {x0}");
        assert!((x1 - at(0.5)).abs() < 1e-9, "ends at {x1}");
        let (g0, g1) = canvas.x_extent["wide_0"];
        assert!((g0 - frame.x0).abs() < 1e-9 && (g1 - frame.x1).abs() < 1e-9);

        // a function entirely outside the x limits draws nothing
        let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
        fig.add_series(&g, None, None).unwrap();
        fig.add_series(&outside, None, None).unwrap();
        fig.axes(
            crate::style::resolve::Scope::Figure,
            crate::style::resolve::AxisSelector::X,
            Options::new().with("limits", (0.0, 10.0)),
        )
        .unwrap();
        let done = fig.finalize().unwrap();
        let mut canvas = Recorder::default();
        let mut registry = ObjectRegistry::new();
        FigurePainter::new(&mut canvas, &mut registry).paint(&done).unwrap();
        assert!(canvas.groups.contains(&"outside_0".to_string()));
        assert!(!canvas.x_extent.contains_key("outside_0"));
    }

    #[test]
    fn test_tick_labels() {
        let linear = ResolvedAxis {
            spec: AxisSpec::default(),
            limits: (0.0, 1.0),
            scale: AxisScale::new((0.0, 1.0), false).unwrap(),
            shared: false,
        };
        assert_eq!(tick_label(0.2, 0.2, &linear), "0.2");
        assert_eq!(tick_label(4.0, 2.0, &linear), "4");
        assert_eq!(tick_label(0.0, 0.2, &linear), "0");
        assert_eq!(tick_label(0.05, 0.05, &linear), "0.05");
    }
}
