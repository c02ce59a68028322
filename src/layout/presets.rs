//! Ready-made layouts.

use crate::error::{Error, Result};
use crate::figure::Figure;
use crate::style::options::Options;

use super::{CellRequest, GridSpec, PlotId};

/// Default pixel size of a shared grid.
pub const SHARED_GRID_SIZE: (u32, u32) = (600, 600);

/// Outer margins of a grid as figure fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuterMargins {
    /// Left of the first column.
    pub left: f64,
    /// Below the bottom row.
    pub bottom: f64,
    /// Right of the last column.
    pub right: f64,
    /// Above the top row.
    pub top: f64,
}

impl OuterMargins {
    /// Same margin on all four sides.
    #[must_use]
    pub const fn uniform(margin: f64) -> Self {
        Self::new(margin, margin, margin, margin)
    }

    /// Margins in `left, bottom, right, top` order.
    #[must_use]
    pub const fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }
}

impl Default for OuterMargins {
    fn default() -> Self {
        Self::new(0.1, 0.1, 0.05, 0.05)
    }
}

/// Ratios and per-cell margins for `n` equally sized frames between outer
/// margins `low` and `high`.
fn compensated(n: usize, low: f64, high: f64) -> (Vec<f64>, Vec<(f64, f64)>) {
    let frame = (1.0 - low - high) / n as f64;
    let mut ratios = vec![frame; n];
    let mut margins = vec![(0.0, 0.0); n];
    ratios[0] += low;
    margins[0].0 = low;
    ratios[n - 1] += high;
    margins[n - 1].1 = high;
    (ratios, margins)
}

/// An `n_cols` x `n_rows` figure with every cell defined and axes shared.
///
/// Only the outer columns and rows carry margins, so the frames touch and
/// all have the same size. Plots are defined in scan order (the plot of
/// cell `(col, row)` is at `row * n_cols + col` in the returned list); each
/// one shares its x axis with the bottom plot of its column and its y axis
/// with the leftmost plot of its row.
///
/// # Errors
///
/// [`Error::Configuration`] for an empty grid or margins leaving no room.
pub fn shared_grid(
    n_cols: usize,
    n_rows: usize,
    margins: OuterMargins,
    size: (u32, u32),
) -> Result<(Figure, Vec<PlotId>)> {
    if n_cols == 0 || n_rows == 0 {
        return Err(Error::config("a shared grid needs at least one column and one row"));
    }
    let OuterMargins {
        left,
        bottom,
        right,
        top,
    } = margins;
    if left + right >= 1.0 || bottom + top >= 1.0 {
        return Err(Error::config(format!(
            "outer margins ({left}, {bottom}, {right}, {top}) leave no room for plots"
        )));
    }

    let (width_ratios, column_margin) = compensated(n_cols, left, right);
    let (height_ratios, row_margin) = compensated(n_rows, bottom, top);
    let spec = GridSpec::new(n_cols, n_rows)
        .width_ratios(&width_ratios)
        .height_ratios(&height_ratios)
        .column_margin(column_margin)
        .row_margin(row_margin)
        .size(size.0, size.1);

    let mut figure = Figure::new(spec)?;
    let mut plots = Vec::with_capacity(n_cols * n_rows);
    for row in 0..n_rows {
        for col in 0..n_cols {
            let plot = figure.define_plot(CellRequest::Cell(col, row), Options::new())?;
            if row > 0 {
                figure.share_x(plot, plots[col])?;
            }
            if col > 0 {
                figure.share_y(plot, plots[row * n_cols])?;
            }
            plots.push(plot);
        }
    }
    Ok((figure, plots))
}
