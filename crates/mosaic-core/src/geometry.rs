#![forbid(unsafe_code)]

//! Geometric primitives for anchored overlays.
//!
//! Coordinates are CSS pixels relative to the viewport's top-left corner, so
//! they are `f64` and may be negative or fractional.
//!
//! # Invariants
//!
//! - `Rect::right() >= Rect::left()` whenever width is non-negative.
//! - [`clamp_to_viewport`] never places an origin above or left of the inset
//!   edge, even when the box is larger than the viewport.

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle, as reported by the host's layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Whether the point lies inside (edges inclusive on the top-left).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Clamp a box with origin `origin` and extent `size` into `viewport`, keeping
/// `inset` pixels of clearance on every side.
///
/// When the box does not fit, it sticks to the top/left inset edge.
#[must_use]
pub fn clamp_to_viewport(origin: Point, size: Size, viewport: Size, inset: f64) -> Point {
    let max_x = viewport.width - size.width - inset;
    let max_y = viewport.height - size.height - inset;
    Point {
        x: origin.x.min(max_x).max(inset),
        y: origin.y.min(max_y).max(inset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center_x(), 25.0);
        assert_eq!(r.center_y(), 40.0);
    }

    #[test]
    fn rect_contains() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(9.5, 9.5)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
        assert!(!r.contains(Point::new(-1.0, 5.0)));
    }

    #[test]
    fn clamp_inside_is_identity() {
        let p = clamp_to_viewport(
            Point::new(100.0, 100.0),
            Size::new(50.0, 20.0),
            Size::new(800.0, 600.0),
            8.0,
        );
        assert_eq!(p, Point::new(100.0, 100.0));
    }

    #[test]
    fn clamp_pulls_back_from_far_edges() {
        let p = clamp_to_viewport(
            Point::new(790.0, 590.0),
            Size::new(50.0, 20.0),
            Size::new(800.0, 600.0),
            8.0,
        );
        assert_eq!(p, Point::new(742.0, 572.0));
    }

    #[test]
    fn clamp_respects_near_inset() {
        let p = clamp_to_viewport(
            Point::new(-30.0, 2.0),
            Size::new(50.0, 20.0),
            Size::new(800.0, 600.0),
            8.0,
        );
        assert_eq!(p, Point::new(8.0, 8.0));
    }

    #[test]
    fn oversized_box_sticks_to_top_left_inset() {
        let p = clamp_to_viewport(
            Point::new(40.0, 40.0),
            Size::new(900.0, 700.0),
            Size::new(800.0, 600.0),
            8.0,
        );
        assert_eq!(p, Point::new(8.0, 8.0));
    }
}
