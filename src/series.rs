//! Data series attached to plots.
//!
//! A series owns its data. Attaching one to a plot clones it, so the caller
//! can keep mutating or dropping its own copy. Functions are immutable
//! closures and are shared behind an [`Arc`].

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::geometry::Point;

/// Number of samples used to evaluate a function series.
pub const FUNCTION_SAMPLES: usize = 100;

/// Real function of one variable.
pub type SeriesFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Data of a series.
#[derive(Clone)]
pub enum SeriesData {
    /// One-dimensional histogram.
    Histogram {
        /// `n + 1` strictly increasing bin edges.
        edges: Vec<f64>,
        /// `n` bin contents.
        contents: Vec<f64>,
        /// `n` symmetric bin errors.
        errors: Vec<f64>,
    },
    /// Points `(x[i], y[i])`.
    Graph {
        /// X coordinates.
        x: Vec<f64>,
        /// Y coordinates.
        y: Vec<f64>,
    },
    /// Function evaluated over a range.
    Function {
        /// The function.
        f: SeriesFn,
        /// Definition range `(low, high)`.
        range: (f64, f64),
    },
}

impl fmt::Debug for SeriesData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesData::Histogram {
                edges,
                contents,
                errors,
            } => f
                .debug_struct("Histogram")
                .field("edges", edges)
                .field("contents", contents)
                .field("errors", errors)
                .finish(),
            SeriesData::Graph { x, y } => f.debug_struct("Graph").field("x", x).field("y", y).finish(),
            SeriesData::Function { range, .. } => {
                f.debug_struct("Function").field("range", range).finish_non_exhaustive()
            }
        }
    }
}

/// Inputs for the data range search of one series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundsQuery {
    /// User x limits.
    pub x_limits: (Option<f64>, Option<f64>),
    /// User y limits.
    pub y_limits: (Option<f64>, Option<f64>),
    /// Logarithmic x axis.
    pub x_log: bool,
    /// Logarithmic y axis.
    pub y_log: bool,
    /// Include histogram errors in the y range.
    pub account_for_errors: bool,
}

impl BoundsQuery {
    /// Query without user limits.
    #[must_use]
    pub fn unconstrained(&self) -> Self {
        Self {
            x_limits: (None, None),
            y_limits: (None, None),
            ..*self
        }
    }
}

/// Data range `[x_low, x_up] x [y_low, y_up]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lower x.
    pub x_low: f64,
    /// Upper x.
    pub x_up: f64,
    /// Lower y.
    pub y_low: f64,
    /// Upper y.
    pub y_up: f64,
}

impl Bounds {
    /// Smallest range containing both.
    #[must_use]
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            x_low: self.x_low.min(other.x_low),
            x_up: self.x_up.max(other.x_up),
            y_low: self.y_low.min(other.y_low),
            y_up: self.y_up.max(other.y_up),
        }
    }
}

/// A named data series.
#[derive(Debug, Clone)]
pub struct DataSeries {
    name: String,
    data: SeriesData,
    x_title: Option<String>,
    y_title: Option<String>,
}

impl DataSeries {
    /// One-dimensional histogram with zero errors.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyData`] without bins
    /// - [`Error::DataLengthMismatch`] unless `edges.len() == contents.len() + 1`
    /// - [`Error::Configuration`] for non-finite or non-increasing edges
    pub fn histogram(name: impl Into<String>, edges: &[f64], contents: &[f64]) -> Result<Self> {
        if contents.is_empty() {
            return Err(Error::EmptyData);
        }
        if edges.len() != contents.len() + 1 {
            return Err(Error::DataLengthMismatch {
                expected: contents.len() + 1,
                actual: edges.len(),
            });
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::config("histogram bin edges must be finite and strictly increasing"));
        }
        Ok(Self::from_data(
            name,
            SeriesData::Histogram {
                edges: edges.to_vec(),
                contents: contents.to_vec(),
                errors: vec![0.0; contents.len()],
            },
        ))
    }

    /// Histogram with one equal-width bin per content over `[low, high]`.
    ///
    /// # Errors
    ///
    /// As [`DataSeries::histogram`], plus [`Error::Configuration`] for an
    /// empty range.
    pub fn uniform_histogram(
        name: impl Into<String>,
        low: f64,
        high: f64,
        contents: &[f64],
    ) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(Error::config(format!("empty histogram range [{low}, {high}]")));
        }
        let n = contents.len();
        let edges: Vec<f64> = (0..=n)
            .map(|i| low + (high - low) * i as f64 / n.max(1) as f64)
            .collect();
        Self::histogram(name, &edges, contents)
    }

    /// Graph of points.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyData`] or [`Error::DataLengthMismatch`].
    pub fn graph(name: impl Into<String>, x: &[f64], y: &[f64]) -> Result<Self> {
        if x.is_empty() {
            return Err(Error::EmptyData);
        }
        if x.len() != y.len() {
            return Err(Error::DataLengthMismatch {
                expected: x.len(),
                actual: y.len(),
            });
        }
        Ok(Self::from_data(
            name,
            SeriesData::Graph {
                x: x.to_vec(),
                y: y.to_vec(),
            },
        ))
    }

    /// Function evaluated on `range`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for a non-finite or empty range.
    pub fn function<F>(name: impl Into<String>, f: F, range: (f64, f64)) -> Result<Self>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let (low, high) = range;
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(Error::config(format!("invalid function range [{low}, {high}]")));
        }
        Ok(Self::from_data(
            name,
            SeriesData::Function {
                f: Arc::new(f),
                range,
            },
        ))
    }

    fn from_data(name: impl Into<String>, data: SeriesData) -> Self {
        Self {
            name: name.into(),
            data,
            x_title: None,
            y_title: None,
        }
    }

    /// Replace histogram errors.
    ///
    /// # Errors
    ///
    /// [`Error::DataLengthMismatch`] for a wrong number of errors,
    /// [`Error::Configuration`] for negative errors or non-histograms.
    pub fn with_errors(mut self, new_errors: &[f64]) -> Result<Self> {
        match &mut self.data {
            SeriesData::Histogram {
                contents, errors, ..
            } => {
                if new_errors.len() != contents.len() {
                    return Err(Error::DataLengthMismatch {
                        expected: contents.len(),
                        actual: new_errors.len(),
                    });
                }
                if new_errors.iter().any(|e| *e < 0.0 || !e.is_finite()) {
                    return Err(Error::config("histogram errors must be finite and non-negative"));
                }
                errors.copy_from_slice(new_errors);
                Ok(self)
            }
            _ => Err(Error::config(format!("series {} is not a histogram", self.name))),
        }
    }

    /// Attach axis titles carried by the data.
    #[must_use]
    pub fn with_axis_titles(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_title = Some(x.into()).filter(|s| !s.is_empty());
        self.y_title = Some(y.into()).filter(|s| !s.is_empty());
        self
    }

    /// Series name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Series data.
    #[must_use]
    pub fn data(&self) -> &SeriesData {
        &self.data
    }

    /// X axis title carried by the data.
    #[must_use]
    pub fn x_title(&self) -> Option<&str> {
        self.x_title.as_deref()
    }

    /// Y axis title carried by the data.
    #[must_use]
    pub fn y_title(&self) -> Option<&str> {
        self.y_title.as_deref()
    }

    /// Evaluate a function series at [`FUNCTION_SAMPLES`] evenly spaced
    /// points of `[low, high]`; non-finite values are dropped. Other kinds
    /// return their points (histograms: bin centers).
    #[must_use]
    pub fn sample(&self, low: f64, high: f64) -> Vec<Point> {
        match &self.data {
            SeriesData::Function { f, .. } => sample_fn(f.as_ref(), low, high),
            SeriesData::Graph { x, y } => {
                x.iter().zip(y).map(|(&x, &y)| Point::new(x, y)).collect()
            }
            SeriesData::Histogram {
                edges, contents, ..
            } => edges
                .windows(2)
                .zip(contents)
                .map(|(w, &c)| Point::new(0.5 * (w[0] + w[1]), c))
                .collect(),
        }
    }

    /// The x interval over which the series is drawn inside the axis
    /// window `[low, high]`: the intersection with the definition range for
    /// functions, the window itself otherwise. `None` when a function lies
    /// entirely outside the window.
    #[must_use]
    pub fn visible_x_range(&self, low: f64, high: f64) -> Option<(f64, f64)> {
        match &self.data {
            SeriesData::Function { range, .. } => clip_range(*range, Some(low), Some(high)),
            _ => Some((low, high)),
        }
    }

    /// Data range relevant for axis limits, `None` if nothing is in range.
    #[must_use]
    pub fn bounds(&self, query: &BoundsQuery) -> Option<Bounds> {
        let bounds = match &self.data {
            SeriesData::Histogram {
                edges,
                contents,
                errors,
            } => histogram_bounds(edges, contents, errors, query),
            SeriesData::Graph { x, y } => graph_bounds(x, y, query),
            SeriesData::Function { f, range } => function_bounds(f.as_ref(), *range, query),
        }?;
        let (y_low, y_up) = query.y_limits;
        Some(Bounds {
            y_low: y_low.unwrap_or(bounds.y_low),
            y_up: y_up.unwrap_or(bounds.y_up),
            ..bounds
        })
    }
}

/// Part of `range` inside the optional `[low, high]` window.
fn clip_range(range: (f64, f64), low: Option<f64>, high: Option<f64>) -> Option<(f64, f64)> {
    let from = low.map_or(range.0, |v| v.max(range.0));
    let to = high.map_or(range.1, |v| v.min(range.1));
    (from < to).then_some((from, to))
}

fn sample_fn(f: &(dyn Fn(f64) -> f64 + Send + Sync), low: f64, high: f64) -> Vec<Point> {
    let step = (high - low) / (FUNCTION_SAMPLES - 1) as f64;
    (0..FUNCTION_SAMPLES)
        .map(|i| {
            let x = low + step * i as f64;
            Point::new(x, f(x))
        })
        .filter(|p| p.y.is_finite())
        .collect()
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn histogram_bounds(
    edges: &[f64],
    contents: &[f64],
    errors: &[f64],
    query: &BoundsQuery,
) -> Option<Bounds> {
    let n = contents.len();
    let (user_low, user_up) = query.x_limits;

    // first and last bin used for the y range
    let mut start = 0;
    let x_low = match user_low {
        Some(v) => {
            start = edges[1..].iter().position(|&hi| hi > v).unwrap_or(n);
            v
        }
        None => {
            let mut x_low = edges[0];
            for (i, &c) in contents.iter().enumerate() {
                if c != 0.0 {
                    x_low = edges[i];
                    if !query.x_log || x_low > 0.0 {
                        start = i;
                        break;
                    }
                }
            }
            x_low
        }
    };

    let mut end = n.saturating_sub(1);
    let x_up = match user_up {
        Some(v) => {
            end = edges[..n].iter().rposition(|&lo| lo < v).unwrap_or(0);
            v
        }
        None => match contents.iter().rposition(|&c| c != 0.0) {
            Some(i) => {
                end = i;
                edges[i + 1]
            }
            None => edges[n],
        },
    };

    if start > end {
        return None;
    }

    let lows = (start..=end).map(|i| {
        if query.account_for_errors {
            contents[i] - errors[i]
        } else {
            contents[i]
        }
    });
    let highs = (start..=end).map(|i| {
        if query.account_for_errors {
            contents[i] + errors[i]
        } else {
            contents[i]
        }
    });
    let keep = |v: &f64| !query.y_log || *v > 0.0;
    let y_low = lows.filter(keep).fold(f64::INFINITY, f64::min);
    let y_up = highs.filter(keep).fold(f64::NEG_INFINITY, f64::max);
    if !y_low.is_finite() || !y_up.is_finite() {
        return Some(Bounds {
            x_low,
            x_up,
            y_low: crate::limits::MIN_LOG_SCALE,
            y_up: crate::limits::MIN_LOG_SCALE,
        });
    }
    Some(Bounds {
        x_low,
        x_up,
        y_low,
        y_up,
    })
}

fn graph_bounds(x: &[f64], y: &[f64], query: &BoundsQuery) -> Option<Bounds> {
    let (user_low, user_up) = query.x_limits;
    let inside: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .map(|(&x, &y)| (x, y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .filter(|(x, _)| user_low.map_or(true, |lo| *x >= lo) && user_up.map_or(true, |hi| *x <= hi))
        .collect();

    let xs = inside.iter().map(|p| p.0).filter(|x| !query.x_log || *x > 0.0);
    let (x_min, x_max) = min_max(xs).or_else(|| min_max(inside.iter().map(|p| p.0)))?;
    let ys = inside.iter().map(|p| p.1).filter(|y| !query.y_log || *y > 0.0);
    let (y_low, y_up) = min_max(ys).or_else(|| min_max(inside.iter().map(|p| p.1)))?;
    Some(Bounds {
        x_low: user_low.unwrap_or(x_min),
        x_up: user_up.unwrap_or(x_max),
        y_low,
        y_up,
    })
}

fn function_bounds(
    f: &(dyn Fn(f64) -> f64 + Send + Sync),
    range: (f64, f64),
    query: &BoundsQuery,
) -> Option<Bounds> {
    let (x_low, x_up) = clip_range(range, query.x_limits.0, query.x_limits.1)?;
    let samples = sample_fn(f, x_low, x_up);
    let ys = samples.iter().map(|p| p.y).filter(|y| !query.y_log || *y > 0.0);
    let (y_low, y_up) = min_max(ys)?;
    Some(Bounds {
        x_low,
        x_up,
        y_low,
        y_up,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn query() -> BoundsQuery {
        BoundsQuery {
            account_for_errors: true,
            ..BoundsQuery::default()
        }
    }

    #[test]
    fn test_histogram_validation() {
        assert!(matches!(
            DataSeries::histogram("h", &[0.0, 1.0], &[]),
            Err(Error::EmptyData)
        ));
        assert!(matches!(
            DataSeries::histogram("h", &[0.0, 1.0], &[1.0, 2.0]),
            Err(Error::DataLengthMismatch { expected: 3, actual: 2 })
        ));
        assert!(DataSeries::histogram("h", &[0.0, 2.0, 1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_histogram_skips_empty_outer_bins() {
        let h = DataSeries::histogram("h", &[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 2.0, 5.0, 0.0]).unwrap();
        let b = h.bounds(&query()).unwrap();
        assert_abs_diff_eq!(b.x_low, 1.0);
        assert_abs_diff_eq!(b.x_up, 3.0);
        assert_abs_diff_eq!(b.y_low, 2.0);
        assert_abs_diff_eq!(b.y_up, 5.0);
    }

    #[test]
    fn test_histogram_errors_widen_range() {
        let h = DataSeries::histogram("h", &[0.0, 1.0, 2.0], &[2.0, 4.0])
            .unwrap()
            .with_errors(&[1.0, 0.5])
            .unwrap();
        let b = h.bounds(&query()).unwrap();
        assert_abs_diff_eq!(b.y_low, 1.0);
        assert_abs_diff_eq!(b.y_up, 4.5);

        let no_err = BoundsQuery {
            account_for_errors: false,
            ..query()
        };
        let b = h.bounds(&no_err).unwrap();
        assert_abs_diff_eq!(b.y_low, 2.0);
    }

    #[test]
    fn test_histogram_log_x_skips_non_positive_edges() {
        let h = DataSeries::histogram("h", &[-1.0, 0.0, 1.0, 2.0], &[1.0, 1.0, 3.0]).unwrap();
        let q = BoundsQuery {
            x_log: true,
            ..query()
        };
        let b = h.bounds(&q).unwrap();
        assert_abs_diff_eq!(b.x_low, 1.0);
        assert_abs_diff_eq!(b.y_low, 3.0);
    }

    #[test]
    fn test_with_errors_on_graph_fails() {
        let g = DataSeries::graph("g", &[1.0], &[1.0]).unwrap();
        assert!(g.with_errors(&[0.1]).is_err());
    }

    #[test]
    fn test_graph_restricted_to_user_x_range() {
        let g = DataSeries::graph("g", &[0.0, 1.0, 2.0, 3.0], &[10.0, 1.0, 2.0, 30.0]).unwrap();
        let q = BoundsQuery {
            x_limits: (Some(0.5), Some(2.5)),
            ..query()
        };
        let b = g.bounds(&q).unwrap();
        assert_abs_diff_eq!(b.x_low, 0.5);
        assert_abs_diff_eq!(b.x_up, 2.5);
        assert_abs_diff_eq!(b.y_low, 1.0);
        assert_abs_diff_eq!(b.y_up, 2.0);

        let outside = BoundsQuery {
            x_limits: (Some(10.0), None),
            ..query()
        };
        assert!(g.bounds(&outside).is_none());
    }

    #[test]
    fn test_graph_length_mismatch() {
        assert!(matches!(
            DataSeries::graph("g", &[1.0, 2.0], &[1.0]),
            Err(Error::DataLengthMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_function_sampling() {
        let f = DataSeries::function("sq", |x| x * x, (-1.0, 2.0)).unwrap();
        let b = f.bounds(&query()).unwrap();
        assert_abs_diff_eq!(b.x_low, -1.0);
        assert_abs_diff_eq!(b.y_up, 4.0, epsilon = 1e-12);
        assert!(b.y_low >= 0.0 && b.y_low < 1e-3);
        assert_eq!(f.sample(0.0, 1.0).len(), FUNCTION_SAMPLES);
        assert!(DataSeries::function("bad", |x| x, (1.0, 1.0)).is_err());
    }

    #[test]
    fn test_function_bounds_stay_in_range() {
        let f = DataSeries::function("lin", |x| x, (4.0, 5.0)).unwrap();
        let q = BoundsQuery {
            x_limits: (Some(0.0), Some(10.0)),
            ..query()
        };
        let b = f.bounds(&q).unwrap();
        assert_abs_diff_eq!(b.x_low, 4.0);
        assert_abs_diff_eq!(b.x_up, 5.0);
        assert_abs_diff_eq!(b.y_low, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.y_up, 5.0, epsilon = 1e-12);

        let outside = BoundsQuery {
            x_limits: (Some(6.0), Some(10.0)),
            ..query()
        };
        assert!(f.bounds(&outside).is_none());
    }

    #[test]
    fn test_visible_x_range() {
        let f = DataSeries::function("lin", |x| x, (4.0, 5.0)).unwrap();
        assert_eq!(f.visible_x_range(0.0, 10.0), Some((4.0, 5.0)));
        assert_eq!(f.visible_x_range(4.5, 10.0), Some((4.5, 5.0)));
        assert_eq!(f.visible_x_range(6.0, 10.0), None);
        let g = DataSeries::graph("g", &[0.0, 1.0], &[0.0, 1.0]).unwrap();
        assert_eq!(g.visible_x_range(-1.0, 3.0), Some((-1.0, 3.0)));
    }

    #[test]
    fn test_user_y_limits_kept() {
        let g = DataSeries::graph("g", &[0.0, 1.0], &[0.0, 1.0]).unwrap();
        let q = BoundsQuery {
            y_limits: (Some(-5.0), None),
            ..query()
        };
        let b = g.bounds(&q).unwrap();
        assert_abs_diff_eq!(b.y_low, -5.0);
        assert_abs_diff_eq!(b.y_up, 1.0);
    }

    #[test]
    fn test_clone_is_independent() {
        let h = DataSeries::histogram("h", &[0.0, 1.0], &[1.0]).unwrap();
        let copy = h.clone();
        let h = h.with_errors(&[0.5]).unwrap();
        assert!(matches!(copy.data(), SeriesData::Histogram { errors, .. } if errors[0] == 0.0));
        assert!(matches!(h.data(), SeriesData::Histogram { errors, .. } if errors[0] == 0.5));
    }
}
