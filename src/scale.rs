//! Axis scales: mapping data values into frame coordinates.
//!
//! A plot frame spans `[0, 1]` on both axes. Scales map the resolved axis
//! limits onto that interval, linearly or logarithmically, and provide
//! tick positions for the backends.

use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty or not finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::config("scale domain must be finite"));
        }
        if (domain.0 - domain.1).abs() < f64::EPSILON * domain.0.abs().max(1.0) {
            return Err(Error::config("scale domain min and max cannot be equal"));
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }

    /// Invert the scale (range to domain).
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        let t = (value - self.range_min) / (self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }
}

impl Scale<f64, f64> for LinearScale {
    fn scale(&self, value: f64) -> f64 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }
}

/// Base-10 logarithmic scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LogScale {
    /// Create a new logarithmic scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain contains non-positive values or is empty.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if domain.0 <= 0.0 || domain.1 <= 0.0 {
            return Err(Error::config("log scale domain must be positive"));
        }
        if !domain.0.is_finite() || !domain.1.is_finite() || domain.0 == domain.1 {
            return Err(Error::config("log scale domain must be a finite, non-empty interval"));
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }

    /// Invert the scale (range to domain).
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        let (lo, hi) = (self.domain_min.log10(), self.domain_max.log10());
        let t = (value - self.range_min) / (self.range_max - self.range_min);
        10f64.powf(lo + t * (hi - lo))
    }
}

impl Scale<f64, f64> for LogScale {
    fn scale(&self, value: f64) -> f64 {
        let log_min = self.domain_min.log10();
        let log_max = self.domain_max.log10();
        let log_val = value.max(f64::MIN_POSITIVE).log10();

        let t = (log_val - log_min) / (log_max - log_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }
}

/// Scale of one plot axis onto the frame interval `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisScale {
    /// Linear axis.
    Linear(LinearScale),
    /// Logarithmic axis.
    Log(LogScale),
}

impl AxisScale {
    /// Frame scale for resolved limits.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or (on log axes) non-positive limits.
    pub fn new(limits: (f64, f64), is_log: bool) -> Result<Self> {
        if is_log {
            LogScale::new(limits, (0.0, 1.0)).map(AxisScale::Log)
        } else {
            LinearScale::new(limits, (0.0, 1.0)).map(AxisScale::Linear)
        }
    }

    /// Map a data value into frame coordinates.
    #[must_use]
    pub fn to_frame(&self, value: f64) -> f64 {
        match self {
            AxisScale::Linear(s) => s.scale(value),
            AxisScale::Log(s) => s.scale(value),
        }
    }

    /// Map a frame coordinate back to data.
    #[must_use]
    pub fn to_data(&self, frame: f64) -> f64 {
        match self {
            AxisScale::Linear(s) => s.invert(frame),
            AxisScale::Log(s) => s.invert(frame),
        }
    }

    /// Data limits of the axis.
    #[must_use]
    pub fn limits(&self) -> (f64, f64) {
        match self {
            AxisScale::Linear(s) => s.domain(),
            AxisScale::Log(s) => s.domain(),
        }
    }

    /// Tick positions inside the limits: round steps on linear axes, decades
    /// on log axes.
    #[must_use]
    pub fn ticks(&self, target: usize) -> Vec<f64> {
        let (a, b) = self.limits();
        let (lo, hi) = (a.min(b), a.max(b));
        match self {
            AxisScale::Linear(_) => linear_ticks(lo, hi, target),
            AxisScale::Log(_) => {
                let first = lo.log10().ceil() as i32;
                let last = hi.log10().floor() as i32;
                (first..=last).map(|e| 10f64.powi(e)).collect()
            }
        }
    }
}

/// Round tick positions: steps of 1, 2 or 5 times a power of ten.
fn linear_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let raw = (hi - lo) / target.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return Vec::new();
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}
