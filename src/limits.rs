//! Automatic axis limits.
//!
//! User limits are kept as given (swapped if reversed). Missing limits come
//! from the union of the series bounds; the y range is padded by 10% of its
//! span on each automatic side, in log space on log axes. Log axes never go
//! below [`MIN_LOG_SCALE`].

use log::{info, warn};

use crate::series::{Bounds, BoundsQuery, DataSeries};
use crate::style::resolve::AxisSpec;

/// Smallest lower limit on a log axis.
pub const MIN_LOG_SCALE: f64 = 1e-11;

/// Fraction of the y span added on each automatic side.
pub const Y_PADDING: f64 = 0.1;

/// Space to keep free of data for a legend, as a fraction of the frame height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reserve {
    /// Keep the top fraction free.
    Top(f64),
    /// Keep the bottom fraction free.
    Bottom(f64),
}

/// Resolved `(low, high)` limits of both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimits {
    /// X limits.
    pub x: (f64, f64),
    /// Y limits.
    pub y: (f64, f64),
}

/// Inputs of a limit search.
#[derive(Debug, Clone, Copy)]
pub struct LimitRequest<'a> {
    /// Resolved x axis.
    pub x: &'a AxisSpec,
    /// Resolved y axis.
    pub y: &'a AxisSpec,
    /// Use the user y limits as is (shared y axes).
    pub y_forced: bool,
    /// Legend space to keep free.
    pub reserve: Option<Reserve>,
}

fn ordered(limits: (Option<f64>, Option<f64>), axis: &str) -> (Option<f64>, Option<f64>) {
    match limits {
        (Some(low), Some(up)) if up < low => {
            warn!("minimum ({low}) is larger than maximum ({up}) on {axis} axis, swapping");
            (Some(up), Some(low))
        }
        other => other,
    }
}

fn to_space(v: f64, log: bool) -> f64 {
    if log {
        v.log10()
    } else {
        v
    }
}

fn from_space(v: f64, log: bool) -> f64 {
    if log {
        10f64.powf(v)
    } else {
        v
    }
}

/// Find the limits of a plot showing `series`.
#[must_use]
pub fn find_limits(series: &[&DataSeries], request: &LimitRequest<'_>) -> AxisLimits {
    let (x_spec, y_spec) = (request.x, request.y);
    let (user_x_low, user_x_up) = ordered(x_spec.limits, "x");
    let (user_y_low, user_y_up) = ordered(y_spec.limits, "y");
    let (x_log, y_log) = (x_spec.is_log, y_spec.is_log);

    let query = BoundsQuery {
        x_limits: (user_x_low, user_x_up),
        y_limits: (user_y_low, user_y_up),
        x_log,
        y_log,
        account_for_errors: y_spec.account_for_errors,
    };
    let free_query = query.unconstrained();

    let mut with_user: Option<Bounds> = None;
    let mut without_user: Option<Bounds> = None;
    for s in series {
        let Some(b) = s.bounds(&query) else {
            continue;
        };
        with_user = Some(with_user.map_or(b, |acc| acc.union(b)));
        if let Some(free) = s.bounds(&free_query) {
            without_user = Some(without_user.map_or(free, |acc| acc.union(free)));
        }
    }

    let Some(found) = with_user else {
        return empty_limits(x_spec, y_spec, (user_x_low, user_x_up), (user_y_low, user_y_up));
    };
    let free = without_user.unwrap_or(found);

    let x_low = user_x_low.unwrap_or(found.x_low);
    let x_up = user_x_up.unwrap_or(found.x_up);
    let (mut y_low, mut y_up) = (found.y_low, found.y_up);
    let (mut free_y_low, free_y_up) = (free.y_low, free.y_up);

    if user_y_up.is_some() && y_up < free_y_up && !request.y_forced {
        warn!("upper y limit {y_up} cuts the data, raising it to {free_y_up}");
        y_up = free_y_up;
    }
    if user_y_low.is_some() && y_low > free_y_low && !request.y_forced {
        warn!("lower y limit {y_low} cuts the data, lowering it to {free_y_low}");
        y_low = free_y_low;
    }

    if y_log {
        if y_low <= 0.0 {
            y_low = MIN_LOG_SCALE;
        }
        if free_y_low <= 0.0 {
            free_y_low = MIN_LOG_SCALE;
        }
        if y_up <= y_low {
            y_up = y_low * 10.0;
        }
    }

    let reserve_top = matches!(request.reserve, Some(Reserve::Top(_)));
    let reserve_bottom = matches!(request.reserve, Some(Reserve::Bottom(_)));

    let (lo_s, hi_s) = (to_space(y_low, y_log), to_space(y_up, y_log));
    let mut diff = hi_s - lo_s;
    if diff <= 0.0 {
        // flat data: pad around the single value
        diff = if lo_s.abs() > 0.0 { lo_s.abs() } else { 1.0 };
    }
    if user_y_low.is_none() && !reserve_bottom {
        y_low = from_space(lo_s - Y_PADDING * diff, y_log);
    }
    if user_y_up.is_none() && !reserve_top {
        y_up = from_space(hi_s + Y_PADDING * diff, y_log);
    }

    if request.y_forced {
        if let (Some(low), Some(up)) = (user_y_low, user_y_up) {
            y_low = low;
            y_up = up;
        }
    }

    let mut x = (x_low, x_up);
    if x_log && x.0 <= 0.0 {
        warn!(
            "x minimum {} is not compatible with a log axis, using {MIN_LOG_SCALE}",
            x.0
        );
        x.0 = MIN_LOG_SCALE;
    }
    if y_log && y_low <= 0.0 {
        warn!("y minimum {y_low} is not compatible with a log axis, using {MIN_LOG_SCALE}");
        y_low = MIN_LOG_SCALE;
    }

    if !request.y_forced {
        match request.reserve {
            Some(Reserve::Top(fraction)) if fraction > 0.0 && fraction < 1.0 => {
                let (lo, hi) = (to_space(y_low, y_log), to_space(y_up, y_log));
                let diff = (hi - lo).max(f64::MIN_POSITIVE);
                let room = hi - to_space(free_y_up, y_log);
                if room / diff < fraction {
                    info!("extending y axis upwards to fit the legend");
                    y_up = from_space(lo + diff / (1.0 - fraction) + Y_PADDING * diff, y_log);
                }
            }
            Some(Reserve::Bottom(fraction)) if fraction > 0.0 && fraction < 1.0 => {
                let (lo, hi) = (to_space(y_low, y_log), to_space(y_up, y_log));
                let diff = (hi - lo).max(f64::MIN_POSITIVE);
                let room = to_space(free_y_low, y_log) - lo;
                if room / diff < fraction {
                    info!("extending y axis downwards to fit the legend");
                    y_low = from_space(hi - diff / (1.0 - fraction) - Y_PADDING * diff, y_log);
                }
            }
            _ => {}
        }
    }

    if x.0 >= x.1 {
        x = widen(x, x_log);
    }
    let y = if y_low >= y_up { widen((y_low, y_up), y_log) } else { (y_low, y_up) };
    AxisLimits { x, y }
}

/// Limits of a plot without any data in range.
fn empty_limits(
    x: &AxisSpec,
    y: &AxisSpec,
    user_x: (Option<f64>, Option<f64>),
    user_y: (Option<f64>, Option<f64>),
) -> AxisLimits {
    let default = |log: bool| if log { (1.0, 10.0) } else { (0.0, 1.0) };
    let pick = |user: (Option<f64>, Option<f64>), log: bool| {
        let (d_low, d_up) = default(log);
        let range = (user.0.unwrap_or(d_low), user.1.unwrap_or(d_up));
        let range = if log && range.0 <= 0.0 { (MIN_LOG_SCALE, range.1) } else { range };
        if range.0 < range.1 {
            range
        } else {
            widen(range, log)
        }
    };
    AxisLimits {
        x: pick(user_x, x.is_log),
        y: pick(user_y, y.is_log),
    }
}

/// Turn a degenerate range into a proper one around its lower end.
fn widen((low, _): (f64, f64), log: bool) -> (f64, f64) {
    if log {
        let low = if low > 0.0 { low } else { MIN_LOG_SCALE };
        (low / 10.0, low * 10.0)
    } else {
        let half = if low.abs() > 0.0 { 0.5 * low.abs() } else { 0.5 };
        (low - half, low + half)
    }
}
