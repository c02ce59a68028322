//! YAML figure descriptions.
//!
//! A configuration file describes the grid and the figure-level axis and
//! legend defaults:
//!
//! ```yaml
//! size: [600, 400]
//! n_cols: 2
//! n_rows: 1
//! width_ratios: [2, 1]
//! column_margin: [0.08, 0.02]
//! axes:
//!   title_size: 0.03
//! legend:
//!   position: top left
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::figure::Figure;
use crate::layout::grid::DEFAULT_SIZE;
use crate::layout::{GridSpec, MarginSpec};
use crate::style::options::{OptionGroup, Options};
use crate::style::resolve::{AxisSelector, Scope};

/// Figure configuration as read from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FigureConfig {
    /// Figure name; generated when absent.
    #[serde(default)]
    pub name: Option<String>,

    /// Pixel size (width, height).
    #[serde(default = "default_size")]
    pub size: (u32, u32),

    /// Number of grid columns.
    #[serde(default = "default_count")]
    pub n_cols: usize,

    /// Number of grid rows.
    #[serde(default = "default_count")]
    pub n_rows: usize,

    /// Relative column widths.
    #[serde(default)]
    pub width_ratios: Option<Vec<f64>>,

    /// Relative row heights.
    #[serde(default)]
    pub height_ratios: Option<Vec<f64>>,

    /// Left/right column margins.
    #[serde(default)]
    pub column_margin: MarginSpec,

    /// Bottom/top row margins.
    #[serde(default)]
    pub row_margin: MarginSpec,

    /// Figure-level options for both axes.
    #[serde(default)]
    pub axes: Options,

    /// Figure-level options for the x axis.
    #[serde(default)]
    pub x_axis: Options,

    /// Figure-level options for the y axis.
    #[serde(default)]
    pub y_axis: Options,

    /// Figure-level legend options.
    #[serde(default)]
    pub legend: Options,
}

fn default_size() -> (u32, u32) {
    DEFAULT_SIZE
}
fn default_count() -> usize {
    1
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            name: None,
            size: default_size(),
            n_cols: default_count(),
            n_rows: default_count(),
            width_ratios: None,
            height_ratios: None,
            column_margin: MarginSpec::default(),
            row_margin: MarginSpec::default(),
            axes: Options::new(),
            x_axis: Options::new(),
            y_axis: Options::new(),
            legend: Options::new(),
        }
    }
}

impl FigureConfig {
    /// Loads a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::ConfigParse`] if it is not a valid description.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parses a configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] with the line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse(format!("line {line}: {e}"))
        })
    }

    /// The grid part of the configuration.
    #[must_use]
    pub fn grid_spec(&self) -> GridSpec {
        GridSpec {
            n_cols: self.n_cols,
            n_rows: self.n_rows,
            width_ratios: self.width_ratios.clone(),
            height_ratios: self.height_ratios.clone(),
            column_margin: self.column_margin.clone(),
            row_margin: self.row_margin.clone(),
            size: self.size,
        }
    }

    /// Build the described figure.
    ///
    /// # Errors
    ///
    /// Grid errors as [`Figure::new`], and [`Error::UnknownOption`] for keys
    /// outside the axis or legend whitelists.
    pub fn into_figure(self) -> Result<Figure> {
        for options in [&self.axes, &self.x_axis, &self.y_axis] {
            options.validate(OptionGroup::Axis)?;
        }
        self.legend.validate(OptionGroup::Legend)?;

        let spec = self.grid_spec();
        let mut figure = match &self.name {
            Some(name) => Figure::with_name(name.clone(), spec)?,
            None => Figure::new(spec)?,
        };
        for (selector, options) in [
            (AxisSelector::All, self.axes),
            (AxisSelector::X, self.x_axis),
            (AxisSelector::Y, self.y_axis),
        ] {
            if !options.is_empty() {
                figure.axes(Scope::Figure, selector, options)?;
            }
        }
        if !self.legend.is_empty() {
            figure.legend(Scope::Figure, self.legend)?;
        }
        Ok(figure)
    }
}
