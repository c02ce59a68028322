//! Legend placement.
//!
//! Legends are placed in frame coordinates (`[0,1]^2` of the plot frame).
//! An explicit box always wins. Otherwise a box of the legend's size is
//! anchored at a corner and tried against the bounding boxes of the plotted
//! series; the first corner that stays clear of all of them is used.

use log::warn;

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::style::options::OptionValue;

/// Distance of an anchored legend from the frame edges.
pub const DEFAULT_INSET: f64 = 0.03;
/// Overlap with a single series box tolerated, as a fraction of legend area.
pub const DEFAULT_TOLERANCE: f64 = 0.02;
/// Width of an anchored legend.
pub const LEGEND_WIDTH: f64 = 0.4;
/// Height of one legend row.
pub const LEGEND_ROW_HEIGHT: f64 = 0.05;
/// Upper bound for the legend height.
pub const LEGEND_MAX_HEIGHT: f64 = 0.9;

/// Frame corner a legend can be anchored at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    /// Upper right.
    TopRight,
    /// Upper left.
    TopLeft,
    /// Lower right.
    BottomRight,
    /// Lower left.
    BottomLeft,
}

impl Corner {
    /// Default fallback order.
    pub const PRIORITY: [Corner; 4] = [
        Corner::TopRight,
        Corner::TopLeft,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Parse names like `"top right"`, `"upper-left"` or `"bottom_right"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: Vec<String> = name
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        let words: Vec<&str> = normalized.iter().map(String::as_str).collect();
        match words.as_slice() {
            ["top" | "upper", "right"] => Some(Corner::TopRight),
            ["top" | "upper", "left"] => Some(Corner::TopLeft),
            ["bottom" | "lower", "right"] => Some(Corner::BottomRight),
            ["bottom" | "lower", "left"] => Some(Corner::BottomLeft),
            _ => None,
        }
    }

    /// True for the two upper corners.
    #[must_use]
    pub fn is_top(self) -> bool {
        matches!(self, Corner::TopRight | Corner::TopLeft)
    }

    /// True for the two right corners.
    #[must_use]
    pub fn is_right(self) -> bool {
        matches!(self, Corner::TopRight | Corner::BottomRight)
    }
}

/// Requested legend position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegendPosition {
    /// Let the placer choose, starting at the top right corner.
    Auto,
    /// Start at the given corner.
    Anchor(Corner),
    /// Use this frame-relative box as is.
    Explicit(Rect),
}

impl Default for LegendPosition {
    fn default() -> Self {
        LegendPosition::Anchor(Corner::TopRight)
    }
}

impl LegendPosition {
    /// Interpret an option value: a corner name, `"auto"`/`"best"`, or a box.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOptionValue`] for anything else.
    pub fn from_option(key: &str, value: &OptionValue) -> Result<Self> {
        match value {
            OptionValue::Box(_) => Ok(LegendPosition::Explicit(value.as_rect(key)?)),
            OptionValue::Text(name) => {
                let lowered = name.trim().to_ascii_lowercase();
                if lowered == "auto" || lowered == "best" {
                    return Ok(LegendPosition::Auto);
                }
                Corner::from_name(&lowered)
                    .map(LegendPosition::Anchor)
                    .ok_or_else(|| Error::InvalidOptionValue {
                        key: key.to_string(),
                        expected: "a corner name like \"top right\", \"auto\" or a box",
                    })
            }
            _ => Err(Error::InvalidOptionValue {
                key: key.to_string(),
                expected: "a corner name or a box [x0, y0, x1, y1]",
            }),
        }
    }

    /// Corner the placer starts with, `None` for an explicit box.
    #[must_use]
    pub fn requested_corner(&self) -> Option<Corner> {
        match self {
            LegendPosition::Auto => Some(Corner::TopRight),
            LegendPosition::Anchor(corner) => Some(*corner),
            LegendPosition::Explicit(_) => None,
        }
    }
}

/// Frame-relative `(width, height)` of a legend with the given entries.
#[must_use]
pub fn legend_size(n_entries: usize, n_columns: usize, titled: bool) -> (f64, f64) {
    let n_columns = n_columns.max(1);
    let rows = n_entries.div_ceil(n_columns) + usize::from(titled);
    let height = (rows as f64 * LEGEND_ROW_HEIGHT).min(LEGEND_MAX_HEIGHT);
    (LEGEND_WIDTH, height)
}

/// Outcome of a placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendPlacement {
    /// Chosen frame-relative box.
    pub rect: Rect,
    /// Corner it is anchored at, `None` for explicit boxes.
    pub corner: Option<Corner>,
    /// False when every candidate overlapped and the requested corner was kept.
    pub clear: bool,
}

/// Placement policy: corner priority, inset and overlap tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendPlacer {
    priority: Vec<Corner>,
    inset: f64,
    tolerance: f64,
}

impl Default for LegendPlacer {
    fn default() -> Self {
        Self {
            priority: Corner::PRIORITY.to_vec(),
            inset: DEFAULT_INSET,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl LegendPlacer {
    /// Placer with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback order (the requested corner is always tried first).
    #[must_use]
    pub fn priority(mut self, priority: &[Corner]) -> Self {
        self.priority = priority.to_vec();
        self
    }

    /// Set the distance from the frame edges.
    #[must_use]
    pub fn inset(mut self, inset: f64) -> Self {
        self.inset = inset.max(0.0);
        self
    }

    /// Set the tolerated overlap fraction.
    #[must_use]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    /// Box of the given size anchored at a corner.
    #[must_use]
    pub fn anchored(&self, corner: Corner, (width, height): (f64, f64)) -> Rect {
        let (x0, x1) = if corner.is_right() {
            (1.0 - self.inset - width, 1.0 - self.inset)
        } else {
            (self.inset, self.inset + width)
        };
        let (y0, y1) = if corner.is_top() {
            (1.0 - self.inset - height, 1.0 - self.inset)
        } else {
            (self.inset, self.inset + height)
        };
        Rect::new(x0, y0, x1, y1)
    }

    /// True if the candidate overlaps any single series box by more than the
    /// tolerated fraction of its own area.
    #[must_use]
    pub fn collides(&self, candidate: &Rect, series_boxes: &[Rect]) -> bool {
        let limit = self.tolerance * candidate.area();
        series_boxes
            .iter()
            .any(|b| candidate.overlap_area(b) > limit)
    }

    /// Place a legend and return its frame-relative box.
    #[must_use]
    pub fn place(&self, series_boxes: &[Rect], requested: &LegendPosition, size: (f64, f64)) -> Rect {
        self.place_detailed(series_boxes, requested, size).rect
    }

    /// Place a legend and report which corner was used.
    #[must_use]
    pub fn place_detailed(
        &self,
        series_boxes: &[Rect],
        requested: &LegendPosition,
        size: (f64, f64),
    ) -> LegendPlacement {
        let Some(first) = requested.requested_corner() else {
            let rect = match requested {
                LegendPosition::Explicit(rect) => *rect,
                _ => self.anchored(Corner::TopRight, size),
            };
            return LegendPlacement {
                rect,
                corner: None,
                clear: true,
            };
        };

        let candidates = std::iter::once(first)
            .chain(self.priority.iter().copied().filter(|c| *c != first));
        for corner in candidates {
            let rect = self.anchored(corner, size);
            if !self.collides(&rect, series_boxes) {
                return LegendPlacement {
                    rect,
                    corner: Some(corner),
                    clear: true,
                };
            }
        }

        warn!("legend overlaps data at every corner, keeping {first:?}");
        LegendPlacement {
            rect: self.anchored(first, size),
            corner: Some(first),
            clear: false,
        }
    }
}
