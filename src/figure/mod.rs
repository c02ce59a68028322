//! Figures: a grid of plots, their styles and their data.
//!
//! A [`Figure`] is built by a sequence of calls (define plots, configure
//! axes and legends, attach data) and consumed by [`Figure::finalize`],
//! which resolves every deferred setting into a [`FinalizedFigure`].
//!
//! # Example
//!
//! ```rust,ignore
//! use trueno_figure::prelude::*;
//!
//! let mut figure = Figure::new(GridSpec::new(2, 1).width_ratios(&[2.0, 1.0]))?;
//! figure.define_plot(CellRequest::Next, Options::new().with("title", "signal"))?;
//! figure.add_series(&DataSeries::graph("g", &[0.0, 1.0], &[1.0, 2.0])?, None, Some("data"))?;
//! figure.axes(Scope::Figure, AxisSelector::X, Options::new().with("title", "time"))?;
//! figure.finalize()?.save("signal.png")?;
//! ```

pub mod annotation;
pub mod finalize;

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::layout::{CellRequest, CellSpan, GridGeometry, GridSpec, PlotId, PlotPlacement};
use crate::series::DataSeries;
use crate::style::options::{OptionGroup, OptionValue, Options};
use crate::style::resolve::{AxisSelector, ConfigTarget, Level, OverrideTable, Scope};
use crate::style::series_style::SeriesStyle;

pub use annotation::{LineSpec, Orientation, TextSpec, DEFAULT_TEXT_SIZE};
pub use finalize::{
    FinalizedFigure, FinalizedLegend, FinalizedPlot, FinalizedSeries, LegendEntry, ResolvedAxis,
};

static FIGURE_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn next_figure_name() -> String {
    format!("Figure_{}", FIGURE_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// A series attached to a plot.
#[derive(Debug, Clone)]
pub struct AttachedSeries {
    /// Exclusive copy of the data.
    pub series: DataSeries,
    /// Explicit style, generated at finalize when `None`.
    pub style: Option<SeriesStyle>,
    /// Legend label, no legend entry when `None`.
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct PlotState {
    pub(crate) span: CellSpan,
    pub(crate) title: Option<OptionValue>,
    pub(crate) series: Vec<AttachedSeries>,
    pub(crate) texts: Vec<TextSpec>,
    pub(crate) lines: Vec<LineSpec>,
    pub(crate) share_x: Option<usize>,
    pub(crate) share_y: Option<usize>,
}

impl PlotState {
    fn new(span: CellSpan) -> Self {
        Self {
            span,
            title: None,
            series: Vec::new(),
            texts: Vec::new(),
            lines: Vec::new(),
            share_x: None,
            share_y: None,
        }
    }
}

/// A figure under construction.
#[derive(Debug, Clone)]
pub struct Figure {
    name: String,
    size: (u32, u32),
    grid: GridGeometry,
    placement: PlotPlacement,
    plots: Vec<PlotState>,
    styles: OverrideTable,
    current: Option<usize>,
    /// Set while the plot of a 1x1 figure was only defined implicitly.
    implicit_plot: bool,
}

impl Figure {
    /// Create a figure with a generated unique name.
    ///
    /// A 1x1 figure defines its single plot right away; an explicit
    /// `define_plot` of that cell returns the same plot once.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for an invalid grid and
    /// [`Error::InvalidDimensions`] for a zero pixel size.
    pub fn new(spec: GridSpec) -> Result<Self> {
        Self::with_name(next_figure_name(), spec)
    }

    /// Create a figure with a given name.
    ///
    /// # Errors
    ///
    /// As [`Figure::new`].
    pub fn with_name(name: impl Into<String>, spec: GridSpec) -> Result<Self> {
        let (width, height) = spec.size;
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let grid = GridGeometry::new(&spec)?;
        let mut figure = Self {
            name: name.into(),
            size: spec.size,
            placement: PlotPlacement::new(grid.n_cols(), grid.n_rows()),
            grid,
            plots: Vec::new(),
            styles: OverrideTable::new(),
            current: None,
            implicit_plot: false,
        };
        if figure.grid.n_cells() == 1 {
            figure.claim(CellSpan::cell(0, 0));
            figure.implicit_plot = true;
        }
        debug!(
            "created {} with a {}x{} grid",
            figure.name,
            figure.grid.n_cols(),
            figure.grid.n_rows()
        );
        Ok(figure)
    }

    /// Figure name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pixel size (width, height).
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Grid geometry.
    #[must_use]
    pub fn grid(&self) -> &GridGeometry {
        &self.grid
    }

    /// Cell occupancy.
    #[must_use]
    pub fn placement(&self) -> &PlotPlacement {
        &self.placement
    }

    /// Number of defined plots.
    #[must_use]
    pub fn n_plots(&self) -> usize {
        self.plots.len()
    }

    /// Most recently defined or selected plot.
    #[must_use]
    pub fn current_plot(&self) -> Option<PlotId> {
        self.current.map(PlotId)
    }

    /// Span of a plot.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPlot`].
    pub fn plot_span(&self, plot: PlotId) -> Result<CellSpan> {
        Ok(self.plot(plot.0)?.span)
    }

    /// Define a plot on the grid and make it the current plot.
    ///
    /// Accepted options: `title`, `x_log`, `y_log`, `x_title`, `y_title`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownOption`], [`Error::Capacity`],
    /// [`Error::OutOfBounds`], [`Error::Overlap`] or [`Error::Configuration`]
    /// (margins leave no room in the span). The figure is unchanged on error.
    pub fn define_plot(&mut self, request: CellRequest, options: Options) -> Result<PlotId> {
        options.validate(OptionGroup::Plot)?;

        let index = if self.implicit_plot && request.span().map_or(true, |s| s == CellSpan::cell(0, 0))
        {
            self.implicit_plot = false;
            self.current = Some(0);
            0
        } else {
            let span = self.placement.resolve(request)?;
            self.grid.span_rect(span)?;
            self.implicit_plot = false;
            self.claim(span)
        };

        self.apply_plot_options(index, &options)?;
        debug!("{}: plot {index} at {}", self.name, self.plots[index].span);
        Ok(PlotId(index))
    }

    fn claim(&mut self, span: CellSpan) -> usize {
        self.placement.claim(span);
        let index = self.styles.add_plot();
        self.plots.push(PlotState::new(span));
        self.current = Some(index);
        index
    }

    fn apply_plot_options(&mut self, index: usize, options: &Options) -> Result<()> {
        let level = Level::Plot(index);
        for (key, value) in options.iter() {
            let (selector, axis_key) = match key {
                "title" => {
                    self.plots[index].title = Some(value.clone());
                    continue;
                }
                "x_log" => (AxisSelector::X, "is_log"),
                "y_log" => (AxisSelector::Y, "is_log"),
                "x_title" => (AxisSelector::X, "title"),
                "y_title" => (AxisSelector::Y, "title"),
                other => {
                    return Err(Error::UnknownOption {
                        group: OptionGroup::Plot.name(),
                        key: other.to_string(),
                    })
                }
            };
            let entry = Options::new().with(axis_key, value.clone());
            self.styles.set_axes(level, selector, &entry)?;
        }
        Ok(())
    }

    /// Make an existing plot the current plot.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPlot`].
    pub fn change_plot(&mut self, plot: PlotId) -> Result<()> {
        self.plot(plot.0)?;
        self.current = Some(plot.0);
        Ok(())
    }

    /// Record style options for later resolution.
    ///
    /// Keys are checked against the whitelist of the target's group right
    /// away; values are interpreted by [`Figure::finalize`].
    ///
    /// # Errors
    ///
    /// [`Error::UnknownOption`] (nothing is recorded), [`Error::NoCurrentPlot`]
    /// or [`Error::UnknownPlot`].
    pub fn configure(&mut self, target: ConfigTarget, options: Options) -> Result<()> {
        options.validate(target.group())?;
        let level = self.level(target.scope())?;
        match target {
            ConfigTarget::Axes(_, selector) => self.styles.set_axes(level, selector, &options),
            ConfigTarget::Legend(_) => self.styles.set_legend(level, &options),
        }
    }

    /// Shorthand for [`ConfigTarget::Axes`].
    ///
    /// # Errors
    ///
    /// As [`Figure::configure`].
    pub fn axes(&mut self, scope: Scope, selector: AxisSelector, options: Options) -> Result<()> {
        self.configure(ConfigTarget::Axes(scope, selector), options)
    }

    /// Shorthand for [`ConfigTarget::Legend`].
    ///
    /// # Errors
    ///
    /// As [`Figure::configure`].
    pub fn legend(&mut self, scope: Scope, options: Options) -> Result<()> {
        self.configure(ConfigTarget::Legend(scope), options)
    }

    fn level(&self, scope: Scope) -> Result<Level> {
        match scope {
            Scope::Figure => Ok(Level::Figure),
            Scope::CurrentPlot => self.current.map(Level::Plot).ok_or(Error::NoCurrentPlot),
            Scope::Plot(id) => {
                self.plot(id.0)?;
                Ok(Level::Plot(id.0))
            }
        }
    }

    fn plot(&self, index: usize) -> Result<&PlotState> {
        self.plots.get(index).ok_or(Error::UnknownPlot {
            index,
            count: self.plots.len(),
        })
    }

    fn current_index(&self) -> Result<usize> {
        self.current.ok_or(Error::NoCurrentPlot)
    }

    /// Attach a copy of `series` to the current plot.
    ///
    /// # Errors
    ///
    /// [`Error::NoCurrentPlot`].
    pub fn add_series(
        &mut self,
        series: &DataSeries,
        style: Option<SeriesStyle>,
        label: Option<&str>,
    ) -> Result<()> {
        let index = self.current_index()?;
        self.add_series_to(PlotId(index), series, style, label)
    }

    /// Attach a copy of `series` to a given plot.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPlot`].
    pub fn add_series_to(
        &mut self,
        plot: PlotId,
        series: &DataSeries,
        style: Option<SeriesStyle>,
        label: Option<&str>,
    ) -> Result<()> {
        self.plot(plot.0)?;
        self.plots[plot.0].series.push(AttachedSeries {
            series: series.clone(),
            style,
            label: label.map(str::to_string),
        });
        Ok(())
    }

    /// Replace the series of the current plot, styled by the default cycle.
    /// Labels are matched by position; extra series get no legend entry.
    ///
    /// # Errors
    ///
    /// [`Error::NoCurrentPlot`].
    pub fn set_series(&mut self, series: &[DataSeries], labels: &[&str]) -> Result<()> {
        let index = self.current_index()?;
        if !labels.is_empty() && labels.len() != series.len() {
            warn!(
                "{} labels given for {} series, unmatched entries are dropped",
                labels.len(),
                series.len()
            );
        }
        let styles = crate::style::series_style::generate_styles(series.len());
        self.plots[index].series = series
            .iter()
            .zip(styles)
            .enumerate()
            .map(|(i, (s, style))| AttachedSeries {
                series: s.clone(),
                style: Some(style),
                label: labels.get(i).map(|l| (*l).to_string()),
            })
            .collect();
        Ok(())
    }

    /// Share the x axis of `plot` with an earlier plot: same limits, no tick
    /// labels or title on `plot`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPlot`], or [`Error::Configuration`] unless `with` was
    /// defined before `plot`.
    pub fn share_x(&mut self, plot: PlotId, with: PlotId) -> Result<()> {
        self.check_share(plot, with)?;
        self.plots[plot.0].share_x = Some(with.0);
        Ok(())
    }

    /// Share the y axis of `plot` with an earlier plot. Shared y limits are
    /// used as is, even when they cut data.
    ///
    /// # Errors
    ///
    /// As [`Figure::share_x`].
    pub fn share_y(&mut self, plot: PlotId, with: PlotId) -> Result<()> {
        self.check_share(plot, with)?;
        self.plots[plot.0].share_y = Some(with.0);
        Ok(())
    }

    fn check_share(&self, plot: PlotId, with: PlotId) -> Result<()> {
        self.plot(plot.0)?;
        self.plot(with.0)?;
        if with.0 >= plot.0 {
            return Err(Error::config(format!(
                "{plot} can only share an axis with a plot defined before it, not {with}"
            )));
        }
        Ok(())
    }

    /// Add text to the current plot at frame-relative `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`Error::NoCurrentPlot`], or [`Error::InvalidOptionValue`] for a
    /// negative or non-finite size.
    pub fn add_text(&mut self, text: &str, x: f64, y: f64, size: f64) -> Result<()> {
        let index = self.current_index()?;
        if !size.is_finite() || size < 0.0 || !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidOptionValue {
                key: "text".to_string(),
                expected: "finite coordinates and a non-negative size",
            });
        }
        self.plots[index].texts.push(TextSpec::new(text, x, y, size));
        Ok(())
    }

    /// Add a reference line to the current plot.
    ///
    /// # Errors
    ///
    /// [`Error::NoCurrentPlot`].
    pub fn add_line(&mut self, line: LineSpec) -> Result<()> {
        let index = self.current_index()?;
        self.plots[index].lines.push(line);
        Ok(())
    }

    /// Resolve everything into an immutable description for a backend.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOptionValue`] for option values of the wrong type, or
    /// [`Error::Configuration`] if a plot's limits cannot form a scale.
    pub fn finalize(self) -> Result<FinalizedFigure> {
        finalize::finalize(self)
    }

    pub(crate) fn parts(&self) -> (&GridGeometry, &[PlotState], &OverrideTable) {
        (&self.grid, &self.plots, &self.styles)
    }
}

impl batuta_common::display::WithDimensions for Figure {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.size = (width.max(1), height.max(1));
    }
}
