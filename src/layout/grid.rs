//! Grid geometry: from column/row ratios and margins to normalized rectangles.
//!
//! The figure area `[0,1] x [0,1]` is partitioned into `n_cols` segments
//! horizontally and `n_rows` segments vertically, proportional to the width
//! and height ratios. Row 0 is the bottom row. Margins are fractions of the
//! whole figure and shrink a cell (or a span of cells) inward; only the
//! exterior edges of a span carry margins.

use serde::{Deserialize, Serialize};

use super::placement::CellSpan;
use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Margin used on every side when none is given.
pub const DEFAULT_MARGIN: f64 = 0.05;

/// Default figure size in pixels (width, height).
pub const DEFAULT_SIZE: (u32, u32) = (300, 300);

/// Margin specification for columns (left, right) or rows (bottom, top).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarginSpec {
    /// Same margin on both sides of every column/row.
    Uniform(f64),
    /// Same `(low, high)` pair for every column/row.
    Pair(f64, f64),
    /// One `(low, high)` pair per column/row.
    PerCell(Vec<(f64, f64)>),
}

impl Default for MarginSpec {
    fn default() -> Self {
        MarginSpec::Uniform(DEFAULT_MARGIN)
    }
}

impl From<f64> for MarginSpec {
    fn from(m: f64) -> Self {
        MarginSpec::Uniform(m)
    }
}

impl From<(f64, f64)> for MarginSpec {
    fn from((low, high): (f64, f64)) -> Self {
        MarginSpec::Pair(low, high)
    }
}

impl From<Vec<(f64, f64)>> for MarginSpec {
    fn from(pairs: Vec<(f64, f64)>) -> Self {
        MarginSpec::PerCell(pairs)
    }
}

impl MarginSpec {
    /// Expand into one validated `(low, high)` pair per column/row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the number of pairs does not
    /// match `n`, a margin is negative or not finite, or a pair sums to 1
    /// or more.
    pub fn expand(&self, n: usize, what: &str) -> Result<Vec<(f64, f64)>> {
        let pairs = match self {
            MarginSpec::Uniform(m) => vec![(*m, *m); n],
            MarginSpec::Pair(low, high) => vec![(*low, *high); n],
            MarginSpec::PerCell(pairs) => {
                if pairs.len() != n {
                    return Err(Error::config(format!(
                        "need as many margin pairs ({}) as {what}s ({n})",
                        pairs.len()
                    )));
                }
                pairs.clone()
            }
        };

        for (i, &(low, high)) in pairs.iter().enumerate() {
            if !low.is_finite() || !high.is_finite() || low < 0.0 || high < 0.0 {
                return Err(Error::config(format!(
                    "{what} {i}: margins must be finite and non-negative, got ({low}, {high})"
                )));
            }
            if low + high >= 1.0 {
                return Err(Error::config(format!(
                    "{what} {i}: margins ({low}, {high}) leave no room for the plot"
                )));
            }
        }
        Ok(pairs)
    }
}

/// User-facing grid specification, validated by [`GridGeometry::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    /// Number of columns.
    pub n_cols: usize,
    /// Number of rows.
    pub n_rows: usize,
    /// Relative column widths (uniform when `None`).
    pub width_ratios: Option<Vec<f64>>,
    /// Relative row heights (uniform when `None`).
    pub height_ratios: Option<Vec<f64>>,
    /// Left/right margins per column.
    pub column_margin: MarginSpec,
    /// Bottom/top margins per row.
    pub row_margin: MarginSpec,
    /// Figure size in pixels (width, height).
    pub size: (u32, u32),
}

impl GridSpec {
    /// Create a grid spec with uniform ratios and default margins.
    #[must_use]
    pub fn new(n_cols: usize, n_rows: usize) -> Self {
        Self {
            n_cols,
            n_rows,
            width_ratios: None,
            height_ratios: None,
            column_margin: MarginSpec::default(),
            row_margin: MarginSpec::default(),
            size: DEFAULT_SIZE,
        }
    }

    /// Set relative column widths.
    #[must_use]
    pub fn width_ratios(mut self, ratios: &[f64]) -> Self {
        self.width_ratios = Some(ratios.to_vec());
        self
    }

    /// Set relative row heights.
    #[must_use]
    pub fn height_ratios(mut self, ratios: &[f64]) -> Self {
        self.height_ratios = Some(ratios.to_vec());
        self
    }

    /// Set column margins.
    #[must_use]
    pub fn column_margin(mut self, margin: impl Into<MarginSpec>) -> Self {
        self.column_margin = margin.into();
        self
    }

    /// Set row margins.
    #[must_use]
    pub fn row_margin(mut self, margin: impl Into<MarginSpec>) -> Self {
        self.row_margin = margin.into();
        self
    }

    /// Set the figure size in pixels.
    #[must_use]
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}

/// Validated grid with precomputed segment boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    n_cols: usize,
    n_rows: usize,
    /// `n_cols + 1` boundaries from 0 to 1.
    col_bounds: Vec<f64>,
    /// `n_rows + 1` boundaries from 0 to 1.
    row_bounds: Vec<f64>,
    col_margins: Vec<(f64, f64)>,
    row_margins: Vec<(f64, f64)>,
}

impl GridGeometry {
    /// Validate a spec and compute the segment boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an empty grid, ratio sequences of
    /// the wrong length or with non-positive entries, and malformed margins.
    pub fn new(spec: &GridSpec) -> Result<Self> {
        if spec.n_cols == 0 || spec.n_rows == 0 {
            return Err(Error::config(format!(
                "grid needs at least one column and one row, got {}x{}",
                spec.n_cols, spec.n_rows
            )));
        }

        let col_bounds = boundaries(spec.width_ratios.as_deref(), spec.n_cols, "column")?;
        let row_bounds = boundaries(spec.height_ratios.as_deref(), spec.n_rows, "row")?;
        let col_margins = spec.column_margin.expand(spec.n_cols, "column")?;
        let row_margins = spec.row_margin.expand(spec.n_rows, "row")?;

        Ok(Self {
            n_cols: spec.n_cols,
            n_rows: spec.n_rows,
            col_bounds,
            row_bounds,
            col_margins,
            row_margins,
        })
    }

    /// Number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Total number of cells.
    #[must_use]
    pub fn n_cells(&self) -> usize {
        self.n_cols * self.n_rows
    }

    /// Post-margin rectangle of a single cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] for a cell outside the grid.
    pub fn cell_rect(&self, col: usize, row: usize) -> Result<Rect> {
        self.span_rect(CellSpan::cell(col, row))
    }

    /// Post-margin rectangle of a span: the outer rectangle shrunk by the
    /// left margin of its first column, the right margin of its last column,
    /// the bottom margin of its first row and the top margin of its last row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] for spans outside the grid and
    /// [`Error::Configuration`] when the margins consume the whole span.
    pub fn span_rect(&self, span: CellSpan) -> Result<Rect> {
        let outer = self.span_outer_rect(span)?;
        let (left, right) = self.span_column_margins(span)?;
        let (bottom, top) = self.span_row_margins(span)?;
        let rect = outer.inset(left, bottom, right, top);
        if !rect.is_proper() {
            return Err(Error::config(format!(
                "margins ({left}, {right}) x ({bottom}, {top}) leave no room in span {span}"
            )));
        }
        Ok(rect)
    }

    /// Pre-margin rectangle of a span.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] for spans outside the grid.
    pub fn span_outer_rect(&self, span: CellSpan) -> Result<Rect> {
        self.check(span)?;
        Ok(Rect::new(
            self.col_bounds[span.col_start],
            self.row_bounds[span.row_start],
            self.col_bounds[span.col_end + 1],
            self.row_bounds[span.row_end + 1],
        ))
    }

    /// Exterior (left, right) margins of a span.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] for spans outside the grid.
    pub fn span_column_margins(&self, span: CellSpan) -> Result<(f64, f64)> {
        self.check(span)?;
        Ok((self.col_margins[span.col_start].0, self.col_margins[span.col_end].1))
    }

    /// Exterior (bottom, top) margins of a span.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] for spans outside the grid.
    pub fn span_row_margins(&self, span: CellSpan) -> Result<(f64, f64)> {
        self.check(span)?;
        Ok((self.row_margins[span.row_start].0, self.row_margins[span.row_end].1))
    }

    /// Verify a span is a proper rectangle inside the grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] otherwise.
    pub fn check(&self, span: CellSpan) -> Result<()> {
        span.check_within(self.n_cols, self.n_rows)
    }
}

/// Cumulative, normalized segment boundaries for one axis of the grid.
fn boundaries(ratios: Option<&[f64]>, n: usize, what: &str) -> Result<Vec<f64>> {
    let uniform;
    let ratios = match ratios {
        Some(r) => {
            if r.len() != n {
                return Err(Error::config(format!(
                    "expecting number of {what} ratios ({}) to be the same as number of {what}s ({n})",
                    r.len()
                )));
            }
            if let Some(bad) = r.iter().find(|v| !v.is_finite() || **v <= 0.0) {
                return Err(Error::config(format!(
                    "{what} ratios must be positive and finite, got {bad}"
                )));
            }
            r
        }
        None => {
            uniform = vec![1.0; n];
            &uniform[..]
        }
    };

    let sum: f64 = ratios.iter().sum();
    let mut bounds = Vec::with_capacity(n + 1);
    let mut acc = 0.0;
    bounds.push(0.0);
    for r in &ratios[..n - 1] {
        acc += r / sum;
        bounds.push(acc);
    }
    // pin the outer edge so the cells tile the unit interval exactly
    bounds.push(1.0);
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_rect(r: Rect, expected: [f64; 4]) {
        assert_abs_diff_eq!(r.x0, expected[0], epsilon = 1e-12);
        assert_abs_diff_eq!(r.y0, expected[1], epsilon = 1e-12);
        assert_abs_diff_eq!(r.x1, expected[2], epsilon = 1e-12);
        assert_abs_diff_eq!(r.y1, expected[3], epsilon = 1e-12);
    }

    #[test]
    fn test_single_cell_default_margins() {
        let grid = GridGeometry::new(&GridSpec::new(1, 1)).unwrap();
        assert_rect(grid.cell_rect(0, 0).unwrap(), [0.05, 0.05, 0.95, 0.95]);
        assert_rect(grid.span_outer_rect(CellSpan::cell(0, 0)).unwrap(), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_ratios_partition_width() {
        let spec = GridSpec::new(2, 1).width_ratios(&[3.0, 1.0]).column_margin(0.0).row_margin(0.0);
        let grid = GridGeometry::new(&spec).unwrap();
        assert_rect(grid.cell_rect(0, 0).unwrap(), [0.0, 0.0, 0.75, 1.0]);
        assert_rect(grid.cell_rect(1, 0).unwrap(), [0.75, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_row_zero_is_bottom() {
        let spec = GridSpec::new(1, 2).height_ratios(&[1.0, 2.0]).row_margin(0.0).column_margin(0.0);
        let grid = GridGeometry::new(&spec).unwrap();
        let bottom = grid.cell_rect(0, 0).unwrap();
        let top = grid.cell_rect(0, 1).unwrap();
        assert_abs_diff_eq!(bottom.y1, 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(top.y0, 1.0 / 3.0, epsilon = 1e-12);
        assert!(top.y1 > bottom.y1);
    }

    #[test]
    fn test_span_uses_exterior_margins_only() {
        let spec = GridSpec::new(3, 1)
            .column_margin(vec![(0.1, 0.01), (0.02, 0.03), (0.04, 0.05)])
            .row_margin((0.1, 0.0));
        let grid = GridGeometry::new(&spec).unwrap();
        let whole = CellSpan::new(0, 0, 2, 0);
        let span = grid.span_rect(whole).unwrap();
        assert_rect(span, [0.1, 0.1, 0.95, 1.0]);
        assert_eq!(grid.span_column_margins(whole).unwrap(), (0.1, 0.05));
        assert_eq!(grid.span_row_margins(whole).unwrap(), (0.1, 0.0));
    }

    #[test]
    fn test_width_ratio_length_mismatch() {
        let spec = GridSpec::new(3, 1).width_ratios(&[1.0, 2.0]);
        assert!(matches!(GridGeometry::new(&spec), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_non_positive_ratio_rejected() {
        let spec = GridSpec::new(2, 1).width_ratios(&[1.0, 0.0]);
        assert!(matches!(GridGeometry::new(&spec), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_margin_pairs_length_mismatch() {
        let spec = GridSpec::new(2, 2).row_margin(vec![(0.1, 0.1)]);
        assert!(matches!(GridGeometry::new(&spec), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_margins_summing_to_one_rejected() {
        let spec = GridSpec::new(1, 1).column_margin((0.5, 0.5));
        assert!(matches!(GridGeometry::new(&spec), Err(Error::Configuration(_))));
        let spec = GridSpec::new(1, 1).row_margin(-0.1);
        assert!(matches!(GridGeometry::new(&spec), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_margins_wider_than_cell_rejected_at_rect_time() {
        let grid = GridGeometry::new(&GridSpec::new(4, 1).column_margin(0.2)).unwrap();
        assert!(matches!(grid.cell_rect(0, 0), Err(Error::Configuration(_))));
        // spanning suppresses the interior margins and leaves room again
        assert!(grid.span_rect(CellSpan::new(0, 0, 3, 0)).is_ok());
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(GridGeometry::new(&GridSpec::new(0, 2)).is_err());
    }

    #[test]
    fn test_out_of_bounds_cell() {
        let grid = GridGeometry::new(&GridSpec::new(2, 2)).unwrap();
        assert!(matches!(grid.cell_rect(2, 0), Err(Error::OutOfBounds { .. })));
        assert!(matches!(
            grid.span_rect(CellSpan::new(1, 1, 0, 1)),
            Err(Error::OutOfBounds { .. })
        ));
        let beyond = CellSpan::new(0, 0, 5, 5);
        assert!(matches!(grid.span_column_margins(beyond), Err(Error::OutOfBounds { .. })));
        assert!(matches!(grid.span_row_margins(beyond), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_margin_spec_yaml_shapes() {
        let uniform: MarginSpec = serde_yaml_ng::from_str("0.1").unwrap();
        assert_eq!(uniform, MarginSpec::Uniform(0.1));
        let pair: MarginSpec = serde_yaml_ng::from_str("[0.1, 0.2]").unwrap();
        assert_eq!(pair, MarginSpec::Pair(0.1, 0.2));
        let per: MarginSpec = serde_yaml_ng::from_str("[[0.1, 0.0], [0.0, 0.2]]").unwrap();
        assert_eq!(per, MarginSpec::PerCell(vec![(0.1, 0.0), (0.0, 0.2)]));
    }
}
