//! Plot placement: cell occupancy and region claims.

use std::fmt;

use crate::error::{Error, Result};

/// Inclusive rectangular range of grid cells assigned to one plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSpan {
    /// First column.
    pub col_start: usize,
    /// First row (row 0 is the bottom row).
    pub row_start: usize,
    /// Last column (inclusive).
    pub col_end: usize,
    /// Last row (inclusive).
    pub row_end: usize,
}

impl CellSpan {
    /// Create a span from its corner cells.
    #[must_use]
    pub const fn new(col_start: usize, row_start: usize, col_end: usize, row_end: usize) -> Self {
        Self {
            col_start,
            row_start,
            col_end,
            row_end,
        }
    }

    /// Span covering a single cell.
    #[must_use]
    pub const fn cell(col: usize, row: usize) -> Self {
        Self::new(col, row, col, row)
    }

    /// True if the span covers exactly one cell.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.col_start == self.col_end && self.row_start == self.row_end
    }

    /// Verify the span is a proper rectangle inside an `n_cols` x `n_rows` grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] otherwise.
    pub fn check_within(&self, n_cols: usize, n_rows: usize) -> Result<()> {
        let inside = self.col_start <= self.col_end
            && self.row_start <= self.row_end
            && self.col_end < n_cols
            && self.row_end < n_rows;
        if inside {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                col_start: self.col_start,
                row_start: self.row_start,
                col_end: self.col_end,
                row_end: self.row_end,
                n_cols,
                n_rows,
            })
        }
    }

    /// Iterate the covered cells in scan order (row by row, bottom first).
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.row_start..=self.row_end)
            .flat_map(move |row| (self.col_start..=self.col_end).map(move |col| (col, row)))
    }
}

impl fmt::Display for CellSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.col_start, self.row_start, self.col_end, self.row_end
        )
    }
}

/// How a new plot region is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellRequest {
    /// Lowest free cell in scan order.
    #[default]
    Next,
    /// A single cell `(col, row)`.
    Cell(usize, usize),
    /// A rectangle `(col_start, row_start, col_end, row_end)`.
    Span(usize, usize, usize, usize),
}

impl CellRequest {
    /// The explicit span asked for, `None` for [`CellRequest::Next`].
    #[must_use]
    pub fn span(&self) -> Option<CellSpan> {
        match *self {
            CellRequest::Next => None,
            CellRequest::Cell(col, row) => Some(CellSpan::cell(col, row)),
            CellRequest::Span(c0, r0, c1, r1) => Some(CellSpan::new(c0, r0, c1, r1)),
        }
    }
}

/// Occupancy of a grid: which plot owns which cell.
#[derive(Debug, Clone)]
pub struct PlotPlacement {
    n_cols: usize,
    n_rows: usize,
    /// Owner plot index per cell, indexed `row * n_cols + col`.
    owners: Vec<Option<usize>>,
    spans: Vec<CellSpan>,
}

impl PlotPlacement {
    /// Empty placement for a grid of the given dimensions.
    #[must_use]
    pub fn new(n_cols: usize, n_rows: usize) -> Self {
        Self {
            n_cols,
            n_rows,
            owners: vec![None; n_cols * n_rows],
            spans: Vec::new(),
        }
    }

    /// Claimed regions in definition order.
    #[must_use]
    pub fn spans(&self) -> &[CellSpan] {
        &self.spans
    }

    /// Number of claimed regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True if nothing was claimed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Plot owning a cell, if any.
    #[must_use]
    pub fn owner(&self, col: usize, row: usize) -> Option<usize> {
        if col >= self.n_cols || row >= self.n_rows {
            return None;
        }
        self.owners[row * self.n_cols + col]
    }

    /// Number of cells not claimed by any region.
    #[must_use]
    pub fn free_cells(&self) -> usize {
        self.owners.iter().filter(|o| o.is_none()).count()
    }

    /// Lowest free cell in scan order.
    #[must_use]
    pub fn next_free(&self) -> Option<(usize, usize)> {
        self.owners
            .iter()
            .position(Option::is_none)
            .map(|index| (index % self.n_cols, index / self.n_cols))
    }

    /// Claim a region and return its span. The new region's index is
    /// `self.len() - 1` afterwards.
    ///
    /// # Errors
    ///
    /// - [`Error::Capacity`] when `Next` finds no free cell
    /// - [`Error::OutOfBounds`] for reversed or out-of-grid spans
    /// - [`Error::Overlap`] naming the first colliding cell in scan order
    ///
    /// A failed claim leaves the placement unchanged.
    pub fn define_region(&mut self, request: CellRequest) -> Result<CellSpan> {
        let span = self.resolve(request)?;
        self.claim(span);
        Ok(span)
    }

    /// Check a request without claiming anything.
    ///
    /// # Errors
    ///
    /// As [`PlotPlacement::define_region`].
    pub fn resolve(&self, request: CellRequest) -> Result<CellSpan> {
        let span = match request.span() {
            Some(span) => span,
            None => {
                let (col, row) = self.next_free().ok_or(Error::Capacity {
                    n_cells: self.owners.len(),
                })?;
                CellSpan::cell(col, row)
            }
        };

        span.check_within(self.n_cols, self.n_rows)?;
        if let Some(((col, row), owner)) = span
            .cells()
            .find_map(|(c, r)| self.owner(c, r).map(|o| ((c, r), o)))
        {
            return Err(Error::Overlap { col, row, owner });
        }
        Ok(span)
    }

    /// Record a span returned by [`PlotPlacement::resolve`].
    pub(crate) fn claim(&mut self, span: CellSpan) {
        let index = self.spans.len();
        for (col, row) in span.cells() {
            self.owners[row * self.n_cols + col] = Some(index);
        }
        self.spans.push(span);
    }
}
