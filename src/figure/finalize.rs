//! Finalize pass: resolve styles, limits, legends and annotations.

use std::path::Path;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::layout::{CellSpan, PlotId};
use crate::legend::{legend_size, Corner, LegendPlacer};
use crate::limits::{find_limits, AxisLimits, LimitRequest, Reserve};
use crate::scale::AxisScale;
use crate::series::{BoundsQuery, DataSeries, SeriesData};
use crate::style::resolve::{Axis, AxisSpec, LegendSpec};
use crate::style::series_style::{SeriesStyle, StyleGenerator};

use super::annotation::{ResolvedLine, ResolvedText};
use super::{Figure, PlotState};

/// Smallest extent of a series box in frame units. Flat lines still block
/// the legend.
const MIN_BOX_EXTENT: f64 = 0.01;

/// A resolved axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAxis {
    /// Attributes after the override pass.
    pub spec: AxisSpec,
    /// Data limits shown on the axis.
    pub limits: (f64, f64),
    /// Data to frame mapping.
    pub scale: AxisScale,
    /// Limits are taken from another plot; labels and title are hidden.
    pub shared: bool,
}

impl ResolvedAxis {
    /// True if tick labels and the title are drawn.
    #[must_use]
    pub fn shows_labels(&self) -> bool {
        !self.shared
    }
}

/// A series with its final style.
#[derive(Debug, Clone)]
pub struct FinalizedSeries {
    /// The data.
    pub series: DataSeries,
    /// Explicit or generated style.
    pub style: SeriesStyle,
    /// Legend label.
    pub label: Option<String>,
}

/// One legend row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// Label text.
    pub label: String,
    /// Style of the labelled series.
    pub style: SeriesStyle,
    /// The series is drawn with markers (graphs).
    pub marker: bool,
}

/// A placed legend.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedLegend {
    /// Box in frame coordinates.
    pub frame_rect: Rect,
    /// Box in figure coordinates.
    pub rect: Rect,
    /// Corner used, `None` for explicit boxes.
    pub corner: Option<Corner>,
    /// Number of entry columns.
    pub n_columns: usize,
    /// Optional title row.
    pub title: Option<String>,
    /// Text size as a fraction of the figure height.
    pub text_size: f64,
    /// Entries in series order.
    pub entries: Vec<LegendEntry>,
}

/// A plot with every setting resolved.
#[derive(Debug, Clone)]
pub struct FinalizedPlot {
    /// Plot handle.
    pub id: PlotId,
    /// Backend name, `{figure}_pad_{index}`.
    pub name: String,
    /// Claimed cells.
    pub span: CellSpan,
    /// Span rectangle before margins, figure coordinates.
    pub pad: Rect,
    /// Data frame, figure coordinates.
    pub frame: Rect,
    /// Plot title.
    pub title: Option<String>,
    /// Horizontal axis.
    pub x_axis: ResolvedAxis,
    /// Vertical axis.
    pub y_axis: ResolvedAxis,
    /// Series in drawing order.
    pub series: Vec<FinalizedSeries>,
    /// Legend, present when at least one series is labelled.
    pub legend: Option<FinalizedLegend>,
    /// Texts in figure coordinates.
    pub texts: Vec<ResolvedText>,
    /// Reference lines in frame coordinates.
    pub lines: Vec<ResolvedLine>,
}

impl FinalizedPlot {
    /// True if the plot has nothing to draw inside its frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.texts.is_empty() && self.lines.is_empty()
    }

    /// Map a frame point into figure coordinates.
    #[must_use]
    pub fn to_figure(&self, p: Point) -> Point {
        self.frame.map_point(p)
    }

    /// Map a data point into frame coordinates.
    #[must_use]
    pub fn data_to_frame(&self, p: Point) -> Point {
        Point::new(self.x_axis.scale.to_frame(p.x), self.y_axis.scale.to_frame(p.y))
    }
}

/// Immutable result of [`Figure::finalize`], consumed by backends.
#[derive(Debug, Clone)]
pub struct FinalizedFigure {
    /// Figure name.
    pub name: String,
    /// Pixel size (width, height).
    pub size: (u32, u32),
    /// Plots in definition order.
    pub plots: Vec<FinalizedPlot>,
}

impl FinalizedFigure {
    /// Plot by handle.
    #[must_use]
    pub fn plot(&self, id: PlotId) -> Option<&FinalizedPlot> {
        self.plots.get(id.index())
    }

    /// Render with the backend matching the file extension and save.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedFormat`] for extensions other than `png` and
    /// `svg`, rendering or I/O errors otherwise.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        use crate::backend::{Artifact, RasterBackend, RenderBackend, SvgBackend};

        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "png" => RasterBackend::new().render(self)?.save(path),
            "svg" => SvgBackend::new().render(self)?.save(path),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

pub(super) fn finalize(figure: Figure) -> Result<FinalizedFigure> {
    let (grid, plots, styles) = figure.parts();
    let placer = LegendPlacer::new();
    let mut finalized: Vec<FinalizedPlot> = Vec::with_capacity(plots.len());

    for (index, state) in plots.iter().enumerate() {
        let mut x_spec = styles.resolve_axis(index, Axis::X)?;
        let mut y_spec = styles.resolve_axis(index, Axis::Y)?;
        let legend_spec = styles.resolve_legend(index)?;

        let shared_x = share_limits(&mut x_spec, state.share_x, &finalized, |p| &p.x_axis);
        let shared_y = share_limits(&mut y_spec, state.share_y, &finalized, |p| &p.y_axis);
        fill_axis_titles(&mut x_spec, &mut y_spec, state);

        let series = style_series(state);
        let data: Vec<&DataSeries> = series.iter().map(|s| &s.series).collect();

        let mut request = LimitRequest {
            x: &x_spec,
            y: &y_spec,
            y_forced: shared_y,
            reserve: None,
        };
        let mut limits = find_limits(&data, &request);
        let (mut x_scale, mut y_scale) = scales(&limits, &x_spec, &y_spec)?;

        let mut legend = None;
        let entries: Vec<LegendEntry> = series
            .iter()
            .filter_map(|s| {
                s.label.as_ref().map(|label| LegendEntry {
                    label: label.clone(),
                    style: s.style.clone(),
                    marker: matches!(s.series.data(), SeriesData::Graph { .. }),
                })
            })
            .collect();
        if !entries.is_empty() {
            let size = legend_size(entries.len(), legend_spec.n_columns, legend_spec.title.is_some());
            let boxes = series_boxes(&data, &x_spec, &x_scale, &y_scale);
            let placement = placer.place_detailed(&boxes, &legend_spec.position, size);

            if !placement.clear && !shared_y {
                if let Some(reserve) = reservation(placement.corner, &placement.rect, &y_spec) {
                    info!("plot {index}: extending y limits to make room for the legend");
                    request.reserve = Some(reserve);
                    limits = find_limits(&data, &request);
                    (x_scale, y_scale) = scales(&limits, &x_spec, &y_spec)?;
                }
            }
            legend = Some((placement, entries));
        }

        let frame = grid.span_rect(state.span)?;
        let legend = legend.map(|(placement, entries)| {
            finalized_legend(&legend_spec, placement.rect, placement.corner, frame, entries)
        });

        let lines = state
            .lines
            .iter()
            .map(|line| {
                let (start, end) = line.to_frame(&x_scale, &y_scale);
                ResolvedLine {
                    start,
                    end,
                    color: line.color,
                    width: line.width,
                    line_style: line.line_style,
                }
            })
            .collect();
        let texts = state
            .texts
            .iter()
            .map(|t| ResolvedText {
                text: t.text.clone(),
                position: frame.map_point(t.position),
                size: t.size,
            })
            .collect();

        let title = match &state.title {
            Some(value) => Some(value.as_text("title")?.to_string()),
            None => None,
        };

        debug!(
            "plot {index}: x {:?}, y {:?}, {} series",
            limits.x,
            limits.y,
            series.len()
        );
        finalized.push(FinalizedPlot {
            id: PlotId(index),
            name: format!("{}_pad_{index}", figure.name),
            span: state.span,
            pad: grid.span_outer_rect(state.span)?,
            frame,
            title,
            x_axis: ResolvedAxis {
                spec: x_spec,
                limits: limits.x,
                scale: x_scale,
                shared: shared_x,
            },
            y_axis: ResolvedAxis {
                spec: y_spec,
                limits: limits.y,
                scale: y_scale,
                shared: shared_y,
            },
            series,
            legend,
            texts,
            lines,
        });
    }

    Ok(FinalizedFigure {
        name: figure.name,
        size: figure.size,
        plots: finalized,
    })
}

/// Copy the limits of an earlier plot's axis. Returns true if shared.
fn share_limits(
    spec: &mut AxisSpec,
    partner: Option<usize>,
    done: &[FinalizedPlot],
    axis: impl Fn(&FinalizedPlot) -> &ResolvedAxis,
) -> bool {
    let Some(partner) = partner.and_then(|p| done.get(p)) else {
        return false;
    };
    let source = axis(partner);
    spec.limits = (Some(source.limits.0), Some(source.limits.1));
    spec.is_log = source.spec.is_log;
    true
}

fn fill_axis_titles(x_spec: &mut AxisSpec, y_spec: &mut AxisSpec, state: &PlotState) {
    if x_spec.title.is_empty() {
        if let Some(title) = state.series.iter().find_map(|s| s.series.x_title()) {
            x_spec.title = title.to_string();
        }
    }
    if y_spec.title.is_empty() {
        if let Some(title) = state.series.iter().find_map(|s| s.series.y_title()) {
            y_spec.title = title.to_string();
        }
    }
}

fn style_series(state: &PlotState) -> Vec<FinalizedSeries> {
    let generator = StyleGenerator::new();
    state
        .series
        .iter()
        .enumerate()
        .map(|(i, attached)| FinalizedSeries {
            series: attached.series.clone(),
            style: attached
                .style
                .clone()
                .unwrap_or_else(|| generator.style_at(i)),
            label: attached.label.clone(),
        })
        .collect()
}

fn scales(limits: &AxisLimits, x: &AxisSpec, y: &AxisSpec) -> Result<(AxisScale, AxisScale)> {
    Ok((
        AxisScale::new(limits.x, x.is_log)?,
        AxisScale::new(limits.y, y.is_log)?,
    ))
}

/// Frame-coordinate bounding boxes of the visible part of each series.
fn series_boxes(
    series: &[&DataSeries],
    x_spec: &AxisSpec,
    x_scale: &AxisScale,
    y_scale: &AxisScale,
) -> Vec<Rect> {
    let (x_low, x_up) = x_scale.limits();
    let query = BoundsQuery {
        x_limits: (Some(x_low), Some(x_up)),
        y_limits: (None, None),
        x_log: x_spec.is_log,
        y_log: matches!(y_scale, AxisScale::Log(_)),
        account_for_errors: true,
    };
    series
        .iter()
        .filter_map(|s| s.bounds(&query))
        .filter_map(|b| {
            let rect = Rect::new(
                x_scale.to_frame(b.x_low),
                y_scale.to_frame(b.y_low),
                x_scale.to_frame(b.x_up),
                y_scale.to_frame(b.y_up),
            );
            let rect = thicken(rect);
            rect.intersection(&Rect::UNIT)
        })
        .collect()
}

fn thicken(r: Rect) -> Rect {
    let (x0, x1) = widen(r.x0.min(r.x1), r.x0.max(r.x1));
    let (y0, y1) = widen(r.y0.min(r.y1), r.y0.max(r.y1));
    Rect::new(x0, y0, x1, y1)
}

fn widen(low: f64, high: f64) -> (f64, f64) {
    if high - low >= MIN_BOX_EXTENT {
        (low, high)
    } else {
        let mid = 0.5 * (low + high);
        (mid - 0.5 * MIN_BOX_EXTENT, mid + 0.5 * MIN_BOX_EXTENT)
    }
}

/// Room to keep free for a legend stuck on an automatic y limit.
fn reservation(corner: Option<Corner>, rect: &Rect, y_spec: &AxisSpec) -> Option<Reserve> {
    let corner = corner?;
    if corner.is_top() && y_spec.limits.1.is_none() {
        Some(Reserve::Top((1.0 - rect.y0).clamp(0.0, 0.9)))
    } else if !corner.is_top() && y_spec.limits.0.is_none() {
        Some(Reserve::Bottom(rect.y1.clamp(0.0, 0.9)))
    } else {
        None
    }
}

fn finalized_legend(
    spec: &LegendSpec,
    frame_rect: Rect,
    corner: Option<Corner>,
    frame: Rect,
    entries: Vec<LegendEntry>,
) -> FinalizedLegend {
    FinalizedLegend {
        frame_rect,
        rect: frame.map_rect(&frame_rect),
        corner,
        n_columns: spec.n_columns,
        title: spec.title.clone(),
        text_size: spec.text_size,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::LineSpec;
    use crate::layout::{CellRequest, GridSpec};
    use crate::style::options::Options;
    use crate::style::resolve::{AxisSelector, Scope};
    use approx::assert_abs_diff_eq;

    fn graph(name: &str, x: &[f64], y: &[f64]) -> DataSeries {
        DataSeries::graph(name, x, y).unwrap()
    }

    #[test]
    fn test_plot_names_and_frames() {
        let mut fig = Figure::with_name("fig", GridSpec::new(2, 1)).unwrap();
        fig.define_plot(CellRequest::Next, Options::new()).unwrap();
        fig.define_plot(CellRequest::Next, Options::new()).unwrap();
        let done = fig.finalize().unwrap();
        assert_eq!(done.plots.len(), 2);
        assert_eq!(done.plots[1].name, "fig_pad_1");
        assert!(done.plots[0].frame.x1 <= done.plots[1].frame.x0);
        assert!(done.plots[0].is_empty());
    }

    #[test]
    fn test_axis_precedence_at_finalize() {
        let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
        fig.axes(Scope::Figure, AxisSelector::All, Options::new().with("title_size", 0.05))
            .unwrap();
        fig.axes(Scope::CurrentPlot, AxisSelector::X, Options::new().with("title_size", 0.08))
            .unwrap();
        let done = fig.finalize().unwrap();
        let plot = &done.plots[0];
        assert_abs_diff_eq!(plot.x_axis.spec.title_size, 0.08);
        assert_abs_diff_eq!(plot.y_axis.spec.title_size, 0.05);
    }

    #[test]
    fn test_invalid_value_surfaces_at_finalize() {
        let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
        fig.axes(Scope::Figure, AxisSelector::X, Options::new().with("is_log", "maybe"))
            .unwrap();
        assert!(matches!(
            fig.finalize(),
            Err(Error::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn test_generated_styles_follow_position() {
        let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
        fig.add_series(&graph("a", &[0.0, 1.0], &[0.0, 1.0]), None, None).unwrap();
        fig.add_series(&graph("b", &[0.0, 1.0], &[1.0, 0.0]), None, Some("b")).unwrap();
        let done = fig.finalize().unwrap();
        let plot = &done.plots[0];
        let generator = StyleGenerator::new();
        assert_eq!(plot.series[1].style, generator.style_at(1));
        let legend = plot.legend.as_ref().unwrap();
        assert_eq!(legend.entries.len(), 1);
        assert_eq!(legend.entries[0].label, "b");
    }

    #[test]
    fn test_no_labels_no_legend() {
        let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
        fig.add_series(&graph("a", &[0.0, 1.0], &[0.0, 1.0]), None, None).unwrap();
        assert!(fig.finalize().unwrap().plots[0].legend.is_none());
    }

    #[test]
    fn test_shared_x_copies_limits_and_hides_labels() {
        let mut fig = Figure::new(GridSpec::new(1, 2)).unwrap();
        let bottom = fig.define_plot(CellRequest::Cell(0, 0), Options::new()).unwrap();
        fig.add_series(&graph("a", &[0.0, 50.0], &[1.0, 2.0]), None, None).unwrap();
        let top = fig.define_plot(CellRequest::Cell(0, 1), Options::new()).unwrap();
        fig.add_series(&graph("b", &[10.0, 20.0], &[1.0, 2.0]), None, None).unwrap();
        fig.share_x(top, bottom).unwrap();
        let done = fig.finalize().unwrap();
        let (b, t) = (&done.plots[0], &done.plots[1]);
        assert_eq!(t.x_axis.limits, b.x_axis.limits);
        assert!(!t.x_axis.shows_labels());
        assert!(b.x_axis.shows_labels());
    }

    #[test]
    fn test_axis_title_from_series() {
        let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
        let s = graph("a", &[0.0, 1.0], &[0.0, 1.0]).with_axis_titles("time", "volts");
        fig.add_series(&s, None, None).unwrap();
        fig.axes(Scope::Figure, AxisSelector::Y, Options::new().with("title", "V"))
            .unwrap();
        let done = fig.finalize().unwrap();
        assert_eq!(done.plots[0].x_axis.spec.title, "time");
        assert_eq!(done.plots[0].y_axis.spec.title, "V");
    }

    #[test]
    fn test_legend_moves_away_from_data() {
        let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
        let high = graph("high", &[6.0, 10.0], &[9.0, 10.0]);
        let low = graph("low", &[0.0, 4.0], &[0.0, 1.0]);
        fig.add_series(&high, None, Some("high")).unwrap();
        fig.add_series(&low, None, Some("low")).unwrap();
        let done = fig.finalize().unwrap();
        let legend = done.plots[0].legend.as_ref().unwrap();
        assert_eq!(legend.corner, Some(Corner::TopLeft));
    }

    #[test]
    fn test_narrow_function_blocks_only_its_corner() {
        let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
        let floor = graph("floor", &[0.0, 10.0], &[0.0, 0.5]);
        let peak = DataSeries::function("peak", |x| x + 1.0, (8.0, 9.0)).unwrap();
        fig.add_series(&floor, None, Some("floor")).unwrap();
        fig.add_series(&peak, None, Some("peak")).unwrap();
        let done = fig.finalize().unwrap();
        let plot = &done.plots[0];
        assert_eq!(plot.x_axis.limits, (0.0, 10.0));
        let legend = plot.legend.as_ref().unwrap();
        assert_eq!(legend.corner, Some(Corner::TopLeft));
        // no room was reserved: the automatic top limit is the padded maximum
        assert_abs_diff_eq!(plot.y_axis.limits.1, 11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_legend_reserve_extends_y() {
        let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
        let flat = DataSeries::function("c", |_| 1.0, (0.0, 1.0)).unwrap();
        fig.add_series(&flat, None, Some("c")).unwrap();
        let low = DataSeries::function("d", |_| 0.0, (0.0, 1.0)).unwrap();
        fig.add_series(&low, None, Some("d")).unwrap();
        let done = fig.finalize().unwrap();
        let plot = &done.plots[0];
        let legend = plot.legend.as_ref().unwrap();
        // Both flat lines span the full width, so every corner collides and
        // the axis makes room above the data.
        assert_eq!(legend.corner, Some(Corner::TopRight));
        let top = plot.y_axis.scale.to_frame(1.0);
        assert!(top <= legend.frame_rect.y0 + 1e-9);
    }

    #[test]
    fn test_text_and_lines_are_mapped() {
        let mut fig = Figure::new(GridSpec::new(1, 1).column_margin(0.1).row_margin(0.1)).unwrap();
        fig.add_series(&graph("a", &[0.0, 10.0], &[0.0, 10.0]), None, None).unwrap();
        fig.add_text("note", 0.5, 0.5, 0.02).unwrap();
        fig.add_line(LineSpec::vertical(5.0)).unwrap();
        let done = fig.finalize().unwrap();
        let plot = &done.plots[0];
        assert_abs_diff_eq!(plot.texts[0].position.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(plot.lines[0].start.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(plot.lines[0].start.y, 0.0);
        assert_abs_diff_eq!(plot.lines[0].end.y, 1.0);
    }

    #[test]
    fn test_save_rejects_unknown_extension() {
        let fig = Figure::new(GridSpec::new(1, 1)).unwrap().finalize().unwrap();
        assert!(matches!(
            fig.save("figure.bmp"),
            Err(Error::UnsupportedFormat(ext)) if ext == "bmp"
        ));
    }
}
