//! Grid layout: geometry of cells and spans, and plot placement.

pub mod grid;
pub mod placement;
pub mod presets;

pub use grid::{GridGeometry, GridSpec, MarginSpec};
pub use placement::{CellRequest, CellSpan, PlotPlacement};
pub use presets::{shared_grid, OuterMargins};

/// Handle of a plot within its figure (definition order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlotId(pub(crate) usize);

impl PlotId {
    /// Position of the plot in definition order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for PlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "plot {}", self.0)
    }
}
