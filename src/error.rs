//! Error types for trueno-figure operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, finalizing or saving a figure.
///
/// Layout and option errors are raised by the call that violates the
/// invariant; a rejected call leaves the figure unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed grid parameters (ratios, margins, dimensions).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Requested region lies (partly) outside the grid or is not a proper span.
    #[error(
        "Region ({col_start},{row_start})-({col_end},{row_end}) outside {n_cols}x{n_rows} grid"
    )]
    OutOfBounds {
        /// First column of the request.
        col_start: usize,
        /// First row of the request.
        row_start: usize,
        /// Last column of the request.
        col_end: usize,
        /// Last row of the request.
        row_end: usize,
        /// Number of grid columns.
        n_cols: usize,
        /// Number of grid rows.
        n_rows: usize,
    },

    /// Requested region collides with a previously claimed region.
    #[error("Cell ({col},{row}) is already taken by plot {owner}")]
    Overlap {
        /// Column of the first colliding cell.
        col: usize,
        /// Row of the first colliding cell.
        row: usize,
        /// Index of the plot owning that cell.
        owner: usize,
    },

    /// Implicit placement found no free cell.
    #[error("No free cells left for automatic plot definition ({n_cells} cells taken)")]
    Capacity {
        /// Total number of cells in the grid.
        n_cells: usize,
    },

    /// Style attribute not in the whitelist of its group.
    #[error("Unknown {group} option: {key}")]
    UnknownOption {
        /// Attribute group ("axis", "legend", "plot").
        group: &'static str,
        /// Offending key.
        key: String,
    },

    /// Style attribute with a value of the wrong type or range.
    #[error("Invalid value for option {key}: expected {expected}")]
    InvalidOptionValue {
        /// Attribute key.
        key: String,
        /// Human readable description of what was expected.
        expected: &'static str,
    },

    /// Plot index that does not exist in the figure.
    #[error("Plot {index} requested but only {count} plots are defined")]
    UnknownPlot {
        /// Requested index.
        index: usize,
        /// Number of defined plots.
        count: usize,
    },

    /// Plot-scoped call without any plot defined yet.
    #[error("No current plot, nothing was defined yet")]
    NoCurrentPlot,

    /// Data length mismatch between paired arrays.
    #[error("Data length mismatch: expected {expected} elements, got {actual}")]
    DataLengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// Invalid pixel dimensions for a figure or framebuffer.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Output path with an extension no backend handles.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    /// Rendering error.
    #[error("Rendering error: {0}")]
    Rendering(String),

    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),
}

impl Error {
    /// Shorthand for [`Error::Configuration`].
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}
