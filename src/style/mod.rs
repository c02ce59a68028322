//! Style attributes: option bags, inheritance resolution and series styles.

pub mod options;
pub mod resolve;
pub mod series_style;

pub use options::{OptionGroup, OptionValue, Options};
pub use resolve::{Axis, AxisSelector, AxisSpec, ConfigTarget, LegendSpec, Scope};
pub use series_style::{
    generate_styles, marker_scale, FillStyle, LineStyle, MarkerShape, SeriesStyle, StyleGenerator,
};
