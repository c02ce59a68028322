//! Style inheritance as an explicit override table.
//!
//! Every `configure` call records its options at one (scope, axis) slot.
//! Nothing is interpreted until [`OverrideTable::resolve_axis`] or
//! [`OverrideTable::resolve_legend`] runs at finalize time, so figure level
//! changes made after a plot was defined still reach that plot.
//!
//! Precedence, lowest first:
//!
//! 1. built-in defaults
//! 2. figure, all axes
//! 3. figure, one axis
//! 4. plot, all axes
//! 5. plot, one axis

use crate::error::{Error, Result};
use crate::layout::PlotId;
use crate::legend::LegendPosition;
use crate::style::options::{OptionGroup, OptionValue, Options};

/// Default axis title and label size (fraction of figure height).
pub const DEFAULT_TEXT_SIZE: f64 = 0.02;
/// Default tick length (fraction of the frame).
pub const DEFAULT_TICK_SIZE: f64 = 0.01;
/// Default legend text size.
pub const DEFAULT_LEGEND_TEXT_SIZE: f64 = 0.015;

/// One of the two axes of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

/// Axes affected by an axis configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisSelector {
    /// Both axes.
    #[default]
    All,
    /// Only the x axis.
    X,
    /// Only the y axis.
    Y,
}

/// Where a configuration applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Figure-wide default for every plot.
    #[default]
    Figure,
    /// The most recently defined (or selected) plot.
    CurrentPlot,
    /// A specific plot.
    Plot(PlotId),
}

/// Attribute group plus scope of a `configure` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigTarget {
    /// Axis attributes.
    Axes(Scope, AxisSelector),
    /// Legend attributes.
    Legend(Scope),
}

impl ConfigTarget {
    /// Option group whose whitelist applies.
    #[must_use]
    pub fn group(&self) -> OptionGroup {
        match self {
            ConfigTarget::Axes(..) => OptionGroup::Axis,
            ConfigTarget::Legend(_) => OptionGroup::Legend,
        }
    }

    /// Scope of the call.
    #[must_use]
    pub fn scope(&self) -> Scope {
        match *self {
            ConfigTarget::Axes(scope, _) | ConfigTarget::Legend(scope) => scope,
        }
    }
}

/// Scope after `CurrentPlot` was looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Figure defaults.
    Figure,
    /// Plot with the given index.
    Plot(usize),
}

/// Fully resolved axis attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    /// Logarithmic scale.
    pub is_log: bool,
    /// Axis title, empty for none.
    pub title: String,
    /// Title text size.
    pub title_size: f64,
    /// Title offset, backend default when `None`.
    pub title_offset: Option<f64>,
    /// Tick label text size.
    pub label_size: f64,
    /// Tick label offset, backend default when `None`.
    pub label_offset: Option<f64>,
    /// Tick length.
    pub tick_size: f64,
    /// User limits, `None` ends are found from the data.
    pub limits: (Option<f64>, Option<f64>),
    /// Include error bars in the automatic range.
    pub account_for_errors: bool,
}

impl Default for AxisSpec {
    fn default() -> Self {
        Self {
            is_log: false,
            title: String::new(),
            title_size: DEFAULT_TEXT_SIZE,
            title_offset: None,
            label_size: DEFAULT_TEXT_SIZE,
            label_offset: None,
            tick_size: DEFAULT_TICK_SIZE,
            limits: (None, None),
            account_for_errors: true,
        }
    }
}

impl AxisSpec {
    /// Apply one attribute.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownOption`] or [`Error::InvalidOptionValue`].
    pub fn apply(&mut self, key: &str, value: &OptionValue) -> Result<()> {
        match key {
            "is_log" => self.is_log = value.as_bool(key)?,
            "title" => self.title = value.as_text(key)?.to_string(),
            "title_size" => self.title_size = value.as_size(key)?,
            "title_offset" => self.title_offset = Some(value.as_f64(key)?),
            "label_size" => self.label_size = value.as_size(key)?,
            "label_offset" => self.label_offset = Some(value.as_f64(key)?),
            "tick_size" => self.tick_size = value.as_size(key)?,
            "limits" => self.limits = value.as_range(key)?,
            "account_for_errors" => self.account_for_errors = value.as_bool(key)?,
            _ => {
                return Err(Error::UnknownOption {
                    group: OptionGroup::Axis.name(),
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    fn apply_all(&mut self, options: &Options) -> Result<()> {
        options.iter().try_for_each(|(k, v)| self.apply(k, v))
    }
}

/// Fully resolved legend attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendSpec {
    /// Requested position.
    pub position: LegendPosition,
    /// Number of entry columns.
    pub n_columns: usize,
    /// Optional legend header.
    pub title: Option<String>,
    /// Entry text size.
    pub text_size: f64,
}

impl Default for LegendSpec {
    fn default() -> Self {
        Self {
            position: LegendPosition::default(),
            n_columns: 1,
            title: None,
            text_size: DEFAULT_LEGEND_TEXT_SIZE,
        }
    }
}

impl LegendSpec {
    /// Apply one attribute.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownOption`] or [`Error::InvalidOptionValue`].
    pub fn apply(&mut self, key: &str, value: &OptionValue) -> Result<()> {
        match key {
            "position" => self.position = LegendPosition::from_option(key, value)?,
            "n_columns" => self.n_columns = value.as_count(key)?,
            "title" => {
                let title = value.as_text(key)?;
                self.title = (!title.is_empty()).then(|| title.to_string());
            }
            "text_size" => self.text_size = value.as_size(key)?,
            _ => {
                return Err(Error::UnknownOption {
                    group: OptionGroup::Legend.name(),
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    fn apply_all(&mut self, options: &Options) -> Result<()> {
        options.iter().try_for_each(|(k, v)| self.apply(k, v))
    }
}

/// Axis options recorded at one scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisLayer {
    all: Options,
    x: Options,
    y: Options,
}

impl AxisLayer {
    fn slot_mut(&mut self, selector: AxisSelector) -> &mut Options {
        match selector {
            AxisSelector::All => &mut self.all,
            AxisSelector::X => &mut self.x,
            AxisSelector::Y => &mut self.y,
        }
    }

    fn axis(&self, axis: Axis) -> &Options {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}

/// Everything recorded at one scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleLayer {
    axes: AxisLayer,
    legend: Options,
}

/// Override table for a whole figure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable {
    figure: StyleLayer,
    plots: Vec<StyleLayer>,
}

impl OverrideTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new plot, returning its index.
    pub fn add_plot(&mut self) -> usize {
        self.plots.push(StyleLayer::default());
        self.plots.len() - 1
    }

    /// Number of registered plots.
    #[must_use]
    pub fn n_plots(&self) -> usize {
        self.plots.len()
    }

    fn layer_mut(&mut self, level: Level) -> Result<&mut StyleLayer> {
        let count = self.plots.len();
        match level {
            Level::Figure => Ok(&mut self.figure),
            Level::Plot(index) => self
                .plots
                .get_mut(index)
                .ok_or(Error::UnknownPlot { index, count }),
        }
    }

    fn layer(&self, index: usize) -> Result<&StyleLayer> {
        self.plots.get(index).ok_or(Error::UnknownPlot {
            index,
            count: self.plots.len(),
        })
    }

    /// Record axis options. Keys must already be validated.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPlot`] for a plot level outside the table.
    pub fn set_axes(&mut self, level: Level, selector: AxisSelector, options: &Options) -> Result<()> {
        self.layer_mut(level)?.axes.slot_mut(selector).merge(options);
        Ok(())
    }

    /// Record legend options. Keys must already be validated.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPlot`] for a plot level outside the table.
    pub fn set_legend(&mut self, level: Level, options: &Options) -> Result<()> {
        self.layer_mut(level)?.legend.merge(options);
        Ok(())
    }

    /// Resolve one axis of one plot.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPlot`] or [`Error::InvalidOptionValue`] from any layer.
    pub fn resolve_axis(&self, plot: usize, axis: Axis) -> Result<AxisSpec> {
        let layer = self.layer(plot)?;
        let mut spec = AxisSpec::default();
        spec.apply_all(&self.figure.axes.all)?;
        spec.apply_all(self.figure.axes.axis(axis))?;
        spec.apply_all(&layer.axes.all)?;
        spec.apply_all(layer.axes.axis(axis))?;
        Ok(spec)
    }

    /// Resolve the legend of one plot.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPlot`] or [`Error::InvalidOptionValue`] from any layer.
    pub fn resolve_legend(&self, plot: usize) -> Result<LegendSpec> {
        let layer = self.layer(plot)?;
        let mut spec = LegendSpec::default();
        spec.apply_all(&self.figure.legend)?;
        spec.apply_all(&layer.legend)?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legend::Corner;

    fn title(text: &str) -> Options {
        Options::new().with("title", text)
    }

    #[test]
    fn test_defaults() {
        let mut table = OverrideTable::new();
        let p = table.add_plot();
        let x = table.resolve_axis(p, Axis::X).unwrap();
        assert_eq!(x, AxisSpec::default());
        assert_eq!(x.label_size, 0.02);
        assert_eq!(x.tick_size, 0.01);
        let legend = table.resolve_legend(p).unwrap();
        assert_eq!(legend.position, LegendPosition::Anchor(Corner::TopRight));
        assert_eq!(legend.n_columns, 1);
        assert_eq!(legend.text_size, 0.015);
    }

    #[test]
    fn test_precedence_chain() {
        let mut table = OverrideTable::new();
        let p = table.add_plot();
        table.set_axes(Level::Figure, AxisSelector::All, &title("fig all")).unwrap();
        assert_eq!(table.resolve_axis(p, Axis::X).unwrap().title, "fig all");

        table.set_axes(Level::Figure, AxisSelector::X, &title("fig x")).unwrap();
        assert_eq!(table.resolve_axis(p, Axis::X).unwrap().title, "fig x");
        assert_eq!(table.resolve_axis(p, Axis::Y).unwrap().title, "fig all");

        table.set_axes(Level::Plot(p), AxisSelector::All, &title("plot all")).unwrap();
        assert_eq!(table.resolve_axis(p, Axis::X).unwrap().title, "plot all");

        table.set_axes(Level::Plot(p), AxisSelector::X, &title("plot x")).unwrap();
        assert_eq!(table.resolve_axis(p, Axis::X).unwrap().title, "plot x");
        assert_eq!(table.resolve_axis(p, Axis::Y).unwrap().title, "plot all");
    }

    #[test]
    fn test_untouched_attributes_inherit() {
        let mut table = OverrideTable::new();
        let p = table.add_plot();
        table
            .set_axes(Level::Figure, AxisSelector::All, &Options::new().with("tick_size", 0.03))
            .unwrap();
        table.set_axes(Level::Plot(p), AxisSelector::Y, &title("counts")).unwrap();
        let y = table.resolve_axis(p, Axis::Y).unwrap();
        assert_eq!(y.title, "counts");
        assert_eq!(y.tick_size, 0.03);
    }

    #[test]
    fn test_invalid_value_surfaces_at_resolve() {
        let mut table = OverrideTable::new();
        let p = table.add_plot();
        table
            .set_axes(Level::Figure, AxisSelector::X, &Options::new().with("is_log", "yes"))
            .unwrap();
        assert!(table.resolve_axis(p, Axis::Y).is_ok());
        assert!(matches!(
            table.resolve_axis(p, Axis::X),
            Err(Error::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn test_legend_options() {
        let mut table = OverrideTable::new();
        let p = table.add_plot();
        table
            .set_legend(Level::Figure, &Options::new().with("position", "bottom left"))
            .unwrap();
        table
            .set_legend(Level::Plot(p), &Options::new().with("n_columns", 2).with("title", "MC"))
            .unwrap();
        let legend = table.resolve_legend(p).unwrap();
        assert_eq!(legend.position, LegendPosition::Anchor(Corner::BottomLeft));
        assert_eq!(legend.n_columns, 2);
        assert_eq!(legend.title.as_deref(), Some("MC"));
    }

    #[test]
    fn test_unknown_plot_level() {
        let mut table = OverrideTable::new();
        assert!(matches!(
            table.set_legend(Level::Plot(3), &Options::new()),
            Err(Error::UnknownPlot { index: 3, count: 0 })
        ));
    }
}
