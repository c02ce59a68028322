//! Geometric primitives for figure layout.
//!
//! All layout happens in normalized coordinates: `(0, 0)` is the lower left
//! corner of the figure (or of a plot frame), `(1, 1)` the upper right, y
//! grows upward. Backends flip to pixel space at the very end.

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Origin point (0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation between two points.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// An axis-aligned rectangle given by its lower left `(x0, y0)` and upper
/// right `(x1, y1)` corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x0: f64,
    /// Bottom edge.
    pub y0: f64,
    /// Right edge.
    pub x1: f64,
    /// Top edge.
    pub y1: f64,
}

impl Rect {
    /// The unit square.
    pub const UNIT: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Create a new rectangle from its corners.
    #[must_use]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create from a `[x0, y0, x1, y1]` array.
    #[must_use]
    pub const fn from_array(a: [f64; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }

    /// Convert to a `[x0, y0, x1, y1]` array.
    #[must_use]
    pub const fn to_array(self) -> [f64; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }

    /// Width (may be negative for an inverted rectangle).
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height (may be negative for an inverted rectangle).
    #[must_use]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Area, zero for degenerate or inverted rectangles.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// True if both extents are strictly positive.
    #[must_use]
    pub fn is_proper(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Check if a point is inside the rectangle (edges included).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x0 && point.x <= self.x1 && point.y >= self.y0 && point.y <= self.y1
    }

    /// Get the center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Intersection with another rectangle, `None` if they only touch or are apart.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        );
        r.is_proper().then_some(r)
    }

    /// Area shared with another rectangle.
    #[must_use]
    pub fn overlap_area(&self, other: &Rect) -> f64 {
        self.intersection(other).map_or(0.0, |r| r.area())
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Shrink inward by the given amounts on each side.
    #[must_use]
    pub fn inset(&self, left: f64, bottom: f64, right: f64, top: f64) -> Rect {
        Rect::new(self.x0 + left, self.y0 + bottom, self.x1 - right, self.y1 - top)
    }

    /// Map a point given relative to this rectangle (0..1 on both axes) into
    /// the coordinate system this rectangle lives in.
    #[must_use]
    pub fn map_point(&self, p: Point) -> Point {
        Point::new(self.x0 + p.x * self.width(), self.y0 + p.y * self.height())
    }

    /// Map a rectangle given relative to this one into absolute coordinates.
    #[must_use]
    pub fn map_rect(&self, r: &Rect) -> Rect {
        let lo = self.map_point(Point::new(r.x0, r.y0));
        let hi = self.map_point(Point::new(r.x1, r.y1));
        Rect::new(lo.x, lo.y, hi.x, hi.y)
    }

    /// Express an absolute rectangle relative to this one (inverse of [`Rect::map_rect`]).
    #[must_use]
    pub fn relative(&self, r: &Rect) -> Rect {
        let w = self.width();
        let h = self.height();
        if w.abs() < f64::EPSILON || h.abs() < f64::EPSILON {
            return Rect::UNIT;
        }
        Rect::new(
            (r.x0 - self.x0) / w,
            (r.y0 - self.y0) / h,
            (r.x1 - self.x0) / w,
            (r.y1 - self.y0) / h,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_point_lerp() {
        let mid = Point::new(0.0, 0.0).lerp(Point::new(10.0, 10.0), 0.5);
        assert_abs_diff_eq!(mid.x, 5.0);
        assert_abs_diff_eq!(mid.y, 5.0);
    }

    #[test]
    fn test_rect_area_inverted_is_zero() {
        assert_abs_diff_eq!(Rect::new(0.0, 0.0, 0.5, 0.2).area(), 0.1);
        assert_abs_diff_eq!(Rect::new(0.5, 0.0, 0.0, 0.2).area(), 0.0);
    }

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 0.5, 1.0);
        let b = Rect::new(0.5, 0.0, 1.0, 1.0);
        assert!(a.intersection(&b).is_none());
        assert_abs_diff_eq!(a.overlap_area(&b), 0.0);
    }

    #[test]
    fn test_overlap_area() {
        let a = Rect::new(0.0, 0.0, 0.6, 0.6);
        let b = Rect::new(0.4, 0.4, 1.0, 1.0);
        assert_abs_diff_eq!(a.overlap_area(&b), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_map_and_relative_are_inverse() {
        let outer = Rect::new(0.2, 0.1, 0.6, 0.9);
        let inner = Rect::new(0.5, 0.7, 0.89, 0.89);
        let back = outer.relative(&outer.map_rect(&inner));
        assert_abs_diff_eq!(back.x0, inner.x0, epsilon = 1e-12);
        assert_abs_diff_eq!(back.y1, inner.y1, epsilon = 1e-12);
    }

    #[test]
    fn test_contains_edges() {
        let r = Rect::UNIT;
        assert!(r.contains(Point::new(1.0, 0.0)));
        assert!(!r.contains(Point::new(1.1, 0.5)));
    }
}
