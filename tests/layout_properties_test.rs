//! Layout invariants: grid tiling, scan order, overlap and capacity rules,
//! legend anchoring and deferred style resolution.
//!
//! Run: cargo test --test layout_properties_test

#![allow(clippy::unwrap_used)]

use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use trueno_figure::error::Error;
use trueno_figure::figure::Figure;
use trueno_figure::geometry::Rect;
use trueno_figure::layout::{CellRequest, CellSpan, GridGeometry, GridSpec, MarginSpec, PlotPlacement};
use trueno_figure::legend::{Corner, LegendPlacer, LegendPosition};
use trueno_figure::series::DataSeries;
use trueno_figure::style::{AxisSelector, Options, Scope};

const EPS: f64 = 1e-9;

fn grid_strategy() -> impl Strategy<Value = GridSpec> {
    (1usize..=4, 1usize..=4).prop_flat_map(|(n_cols, n_rows)| {
        (
            prop::collection::vec(1u8..=4, n_cols),
            prop::collection::vec(1u8..=4, n_rows),
            prop::collection::vec((0.0..0.03f64, 0.0..0.03f64), n_cols),
            prop::collection::vec((0.0..0.03f64, 0.0..0.03f64), n_rows),
        )
            .prop_map(move |(widths, heights, col_margins, row_margins)| {
                let widths: Vec<f64> = widths.into_iter().map(f64::from).collect();
                let heights: Vec<f64> = heights.into_iter().map(f64::from).collect();
                GridSpec::new(n_cols, n_rows)
                    .width_ratios(&widths)
                    .height_ratios(&heights)
                    .column_margin(MarginSpec::PerCell(col_margins))
                    .row_margin(MarginSpec::PerCell(row_margins))
            })
    })
}

fn all_cells(grid: &GridGeometry) -> Vec<(usize, usize)> {
    (0..grid.n_rows())
        .flat_map(|row| (0..grid.n_cols()).map(move |col| (col, row)))
        .collect()
}

// ============================================================================
// Grid tiling
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Outer cell rectangles partition the unit square.
    #[test]
    fn prop_outer_cells_tile_unit_square(spec in grid_strategy()) {
        let grid = GridGeometry::new(&spec).unwrap();
        let outer: Vec<Rect> = all_cells(&grid)
            .into_iter()
            .map(|(c, r)| grid.span_outer_rect(CellSpan::cell(c, r)).unwrap())
            .collect();

        let total: f64 = outer.iter().map(Rect::area).sum();
        prop_assert!((total - 1.0).abs() < EPS, "outer area {total}");
        for (i, a) in outer.iter().enumerate() {
            prop_assert!(a.x0 >= -EPS && a.y0 >= -EPS && a.x1 <= 1.0 + EPS && a.y1 <= 1.0 + EPS);
            for b in &outer[i + 1..] {
                prop_assert!(a.overlap_area(b) < EPS);
            }
        }
    }

    /// Frames are the outer cells minus their margins and never overlap.
    #[test]
    fn prop_frames_are_disjoint_and_inset(spec in grid_strategy()) {
        let grid = GridGeometry::new(&spec).unwrap();
        let col_margins = spec.column_margin.expand(spec.n_cols, "column").unwrap();
        let row_margins = spec.row_margin.expand(spec.n_rows, "row").unwrap();

        let mut frames = Vec::new();
        for (col, row) in all_cells(&grid) {
            let outer = grid.span_outer_rect(CellSpan::cell(col, row)).unwrap();
            let frame = grid.cell_rect(col, row).unwrap();
            prop_assert!((frame.x0 - (outer.x0 + col_margins[col].0)).abs() < EPS);
            prop_assert!((frame.x1 - (outer.x1 - col_margins[col].1)).abs() < EPS);
            prop_assert!((frame.y0 - (outer.y0 + row_margins[row].0)).abs() < EPS);
            prop_assert!((frame.y1 - (outer.y1 - row_margins[row].1)).abs() < EPS);
            frames.push(frame);
        }
        for (i, a) in frames.iter().enumerate() {
            for b in &frames[i + 1..] {
                prop_assert!(a.overlap_area(b) < EPS);
            }
        }
    }

    /// A span suppresses the margins between its cells.
    #[test]
    fn prop_span_uses_exterior_margins(spec in grid_strategy()) {
        let grid = GridGeometry::new(&spec).unwrap();
        let (last_col, last_row) = (spec.n_cols - 1, spec.n_rows - 1);
        let span = grid.span_rect(CellSpan::new(0, 0, last_col, last_row)).unwrap();
        let low = grid.cell_rect(0, 0).unwrap();
        let high = grid.cell_rect(last_col, last_row).unwrap();
        prop_assert!((span.x0 - low.x0).abs() < EPS);
        prop_assert!((span.y0 - low.y0).abs() < EPS);
        prop_assert!((span.x1 - high.x1).abs() < EPS);
        prop_assert!((span.y1 - high.y1).abs() < EPS);
    }

    /// Implicit definition claims every cell once, in scan order.
    #[test]
    fn prop_next_follows_scan_order(n_cols in 1usize..6, n_rows in 1usize..6) {
        let mut placement = PlotPlacement::new(n_cols, n_rows);
        for index in 0..n_cols * n_rows {
            let span = placement.define_region(CellRequest::Next).unwrap();
            prop_assert_eq!(span, CellSpan::cell(index % n_cols, index / n_cols));
        }
        prop_assert_eq!(placement.free_cells(), 0);
        let is_capacity = matches!(
            placement.define_region(CellRequest::Next),
            Err(Error::Capacity { .. })
        );
        prop_assert!(is_capacity);
    }
}

// ============================================================================
// Placement rules
// ============================================================================

#[test]
fn test_single_cell_default_margins() {
    let fig = Figure::new(GridSpec::new(1, 1)).unwrap();
    assert_eq!(fig.n_plots(), 1);
    let rect = fig.grid().cell_rect(0, 0).unwrap();
    assert_abs_diff_eq!(rect.x0, 0.05, epsilon = EPS);
    assert_abs_diff_eq!(rect.y0, 0.05, epsilon = EPS);
    assert_abs_diff_eq!(rect.x1, 0.95, epsilon = EPS);
    assert_abs_diff_eq!(rect.y1, 0.95, epsilon = EPS);
}

#[test]
fn test_span_then_inner_cell_overlaps() {
    let mut fig = Figure::new(GridSpec::new(4, 4)).unwrap();
    fig.define_plot(CellRequest::Span(1, 1, 3, 3), Options::new())
        .unwrap();
    let err = fig
        .define_plot(CellRequest::Cell(2, 2), Options::new())
        .unwrap_err();
    assert!(matches!(err, Error::Overlap { col: 2, row: 2, owner: 0 }));
    assert_eq!(fig.n_plots(), 1);
}

#[test]
fn test_ratio_length_mismatch() {
    let err = Figure::new(GridSpec::new(3, 1).width_ratios(&[1.0, 2.0])).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn test_reversed_span_out_of_bounds() {
    let mut placement = PlotPlacement::new(3, 3);
    let err = placement
        .define_region(CellRequest::Span(2, 0, 1, 0))
        .unwrap_err();
    assert!(matches!(err, Error::OutOfBounds { .. }));
    assert!(placement.is_empty());
}

// ============================================================================
// Legend anchoring
// ============================================================================

#[test]
fn test_legend_leaves_top_right_quadrant() {
    let data = [Rect::new(0.5, 0.5, 1.0, 1.0)];
    let placement = LegendPlacer::new().place_detailed(&data, &LegendPosition::default(), (0.3, 0.1));
    assert_eq!(placement.corner, Some(Corner::TopLeft));
    assert!(placement.clear);
    assert!(placement.rect.overlap_area(&data[0]) < EPS);
}

#[test]
fn test_explicit_legend_box_kept() {
    let explicit = Rect::new(0.6, 0.6, 0.9, 0.9);
    let data = [Rect::new(0.5, 0.5, 1.0, 1.0)];
    let rect = LegendPlacer::new().place(&data, &LegendPosition::Explicit(explicit), (0.3, 0.1));
    assert_eq!(rect, explicit);
}

// ============================================================================
// Deferred style resolution
// ============================================================================

#[test]
fn test_figure_title_applies_to_existing_plot() {
    let mut fig = Figure::new(GridSpec::new(2, 1)).unwrap();
    let left = fig.define_plot(CellRequest::Next, Options::new()).unwrap();
    let right = fig.define_plot(CellRequest::Next, Options::new()).unwrap();
    let g = DataSeries::graph("g", &[0.0, 1.0], &[1.0, 2.0]).unwrap();
    fig.add_series_to(left, &g, None, None).unwrap();
    fig.add_series_to(right, &g, None, None).unwrap();

    fig.axes(Scope::Figure, AxisSelector::X, Options::new().with("title", "time"))
        .unwrap();
    fig.axes(Scope::Plot(right), AxisSelector::X, Options::new().with("title", "lag"))
        .unwrap();

    let done = fig.finalize().unwrap();
    assert_eq!(done.plot(left).unwrap().x_axis.spec.title, "time");
    assert_eq!(done.plot(right).unwrap().x_axis.spec.title, "lag");
    assert_eq!(done.plot(left).unwrap().y_axis.spec.title, "");
}

#[test]
fn test_unknown_key_changes_nothing() {
    let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
    let err = fig
        .axes(
            Scope::Figure,
            AxisSelector::All,
            Options::new().with("title", "kept?").with("colour", "red"),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnknownOption { group: "axis", .. }));
    let done = fig.finalize().unwrap();
    assert_eq!(done.plots[0].x_axis.spec.title, "");
}
