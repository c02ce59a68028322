//! # Trueno-Figure
//!
//! Declarative layout engine for multi-panel scientific figures.
//!
//! Built on the [trueno](https://crates.io/crates/trueno) core library, trueno-figure
//! turns a grid description (ratios, margins, cell spans) into normalized plot
//! frames, resolves axis and legend attributes through a layered override table,
//! computes axis limits from the attached data and places legends where they do
//! not hide it. A finalized figure is handed to a backend that writes PNG or SVG.
//!
//! ## Features
//!
//! - **Pure Rust**: No JavaScript, HTML, or browser dependencies
//! - **Grid Layout**: Width/height ratios, per-column and per-row margins, spanning plots
//! - **Style Inheritance**: Built-in defaults, figure level, plot level, per axis
//! - **Legend Placement**: Corner anchors with data-overlap fallback
//! - **Multiple Outputs**: PNG (raster) and SVG (vector)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trueno_figure::prelude::*;
//!
//! let mut figure = Figure::new(GridSpec::new(2, 1).size(600, 300))?;
//! figure.define_plot(CellRequest::Next, Options::new().with("title", "left"))?;
//! figure.add_series(&DataSeries::function("sin", f64::sin, (0.0, 6.3))?, None, Some("sin"))?;
//! figure.define_plot(CellRequest::Next, Options::new().with("y_log", true))?;
//! figure.add_series(&DataSeries::function("exp", f64::exp, (0.0, 5.0))?, None, None)?;
//! figure.axes(Scope::Figure, AxisSelector::X, Options::new().with("title", "t"))?;
//!
//! figure.finalize()?.save("panels.svg")?;
//! ```
//!
//! ## Coordinates
//!
//! Layout works in normalized figure coordinates, `[0, 1]^2` with the origin
//! at the bottom left. Cell `(0, 0)` is the bottom-left cell.

#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color type and series palette.
pub mod color;

/// Geometric primitives (points, normalized rectangles).
pub mod geometry;

/// Data to frame mappings for linear and logarithmic axes.
pub mod scale;

// ============================================================================
// Layout Modules
// ============================================================================

/// Grid geometry, plot placement and layout presets.
pub mod layout;

/// Option bags, style inheritance and series styles.
pub mod style;

/// Data series attached to plots.
pub mod series;

/// Automatic axis limits.
pub mod limits;

/// Legend sizing and placement.
pub mod legend;

/// Figures and their finalized form.
pub mod figure;

/// YAML figure descriptions.
pub mod config;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// Rasterization primitives.
pub mod render;

/// Output encoders (PNG, SVG).
pub mod output;

/// Render backends and the object registry.
pub mod backend;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for trueno-figure operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust,ignore
/// use trueno_figure::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{Artifact, RasterBackend, RenderBackend, SvgBackend};
    pub use crate::color::Rgba;
    pub use crate::config::FigureConfig;
    pub use crate::error::{Error, Result};
    pub use crate::figure::{Figure, FinalizedFigure, LineSpec};
    pub use crate::geometry::{Point, Rect};
    pub use crate::layout::{shared_grid, CellRequest, GridSpec, MarginSpec, OuterMargins, PlotId};
    pub use crate::legend::{Corner, LegendPosition};
    pub use crate::series::DataSeries;
    pub use crate::style::{
        AxisSelector, ConfigTarget, FillStyle, LineStyle, MarkerShape, Options, Scope, SeriesStyle,
        StyleGenerator,
    };
    pub use batuta_common::display::WithDimensions;
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
