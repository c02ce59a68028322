//! Rasterization of drawing primitives into a [`Framebuffer`](crate::framebuffer::Framebuffer).
//!
//! # Algorithms
//!
//! - **Wu's anti-aliased line** for series, axes and reference lines
//! - **Bresenham's line** for marker outlines
//! - **Midpoint circle** for filled and open circle markers
//!
//! # References
//!
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."

mod primitives;

pub use primitives::{
    draw_circle, draw_circle_outline, draw_line, draw_line_aa, draw_marker, draw_polyline,
    draw_rect_outline, draw_thick_line,
};
