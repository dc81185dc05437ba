//! Geometric primitives for board coordinates.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in board space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned bounding box
//! - [`Transform`] - A rotation followed by a translation
//!
//! # Coordinate System
//!
//! Board files use millimetres with the Y axis pointing down:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Angles are in degrees. A positive angle turns counter-clockwise as seen
//! on screen, which is clockwise in the mathematical sense because of the
//! flipped Y axis.

use std::f64::consts::PI;

/// Board files store coordinates as whole nanometres.
const NANOMETRES_PER_MM: f64 = 1_000_000.0;

/// A 2D point in board coordinate space (millimetres).
///
/// # Examples
///
/// ```
/// # use kipanel_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 7.5);
/// assert_eq!(mid.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotates the point around the origin by `degrees`.
    ///
    /// Uses the board convention: positive angles turn counter-clockwise on
    /// screen (Y down).
    ///
    /// # Examples
    ///
    /// ```
    /// # use kipanel_core::geometry::Point;
    /// let p = Point::new(1.0, 0.0).rotate(90.0);
    /// assert!(p.x().abs() < 1e-12);
    /// assert!((p.y() + 1.0).abs() < 1e-12);
    /// ```
    pub fn rotate(self, degrees: f64) -> Self {
        if degrees == 0.0 {
            return self;
        }
        let radians = -degrees * PI / 180.0;
        let (sin, cos) = radians.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Rounds both coordinates to the nearest nanometre, the internal unit
    /// of board files.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kipanel_core::geometry::Point;
    /// let p = Point::new(0.1 + 0.2, 140.000_000_4).snapped();
    /// assert_eq!(p, Point::new(0.3, 140.0));
    /// ```
    pub fn snapped(self) -> Self {
        let snap = |value: f64| (value * NANOMETRES_PER_MM).round() / NANOMETRES_PER_MM;
        Self {
            x: snap(self.x),
            y: snap(self.y),
        }
    }

    /// Returns `true` if both coordinates are within `tolerance` of `other`
    pub fn approx_eq(self, other: Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

/// Width and height of a board or panel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f64 {
        self.width
    }

    pub fn height(self) -> f64 {
        self.height
    }

    /// Returns `true` if either dimension is below the given minimum.
    pub fn is_smaller_than(self, min: Size) -> bool {
        self.width < min.width || self.height < min.height
    }
}

/// An axis-aligned bounding box.
///
/// # Examples
///
/// ```
/// # use kipanel_core::geometry::{Bounds, Point};
/// let bounds = Bounds::from_points([Point::new(0.0, 0.0), Point::new(40.0, 30.0)]).unwrap();
/// assert_eq!(bounds.width(), 40.0);
/// assert_eq!(bounds.height(), 30.0);
///
/// let moved = bounds.translate(Point::new(42.0, 0.0));
/// assert_eq!(moved.min_x(), 42.0);
/// assert!(!bounds.contains(&moved));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    /// Creates bounds from two opposite corners in any order.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Creates bounds from a top-left corner and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Smallest bounds holding every point, or `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Bounds::new(first, first), Bounds::expand))
    }

    pub fn min_x(self) -> f64 {
        self.min_x
    }

    pub fn min_y(self) -> f64 {
        self.min_y
    }

    pub fn max_x(self) -> f64 {
        self.max_x
    }

    pub fn max_y(self) -> f64 {
        self.max_y
    }

    pub fn width(self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn max_point(self) -> Point {
        Point::new(self.max_x, self.max_y)
    }

    /// Grows the bounds to include `point`
    pub fn expand(self, point: Point) -> Self {
        Self {
            min_x: self.min_x.min(point.x),
            min_y: self.min_y.min(point.y),
            max_x: self.max_x.max(point.x),
            max_y: self.max_y.max(point.y),
        }
    }

    /// Smallest bounds containing both `self` and `other`
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by `offset`
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Returns `true` if `other` lies entirely inside these bounds (edges included).
    pub fn contains(&self, other: &Bounds) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Returns `true` if `point` lies inside the bounds (edges included).
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Like [`Bounds::contains`] with a tolerance for rounding.
    pub fn contains_approx(&self, other: &Bounds, tolerance: f64) -> bool {
        other.min_x >= self.min_x - tolerance
            && other.min_y >= self.min_y - tolerance
            && other.max_x <= self.max_x + tolerance
            && other.max_y <= self.max_y + tolerance
    }

    /// Returns `true` if `point` lies on the border within `tolerance`.
    pub fn touches_edge(&self, point: Point, tolerance: f64) -> bool {
        let near = |a: f64, b: f64| (a - b).abs() <= tolerance;
        near(point.x, self.min_x)
            || near(point.x, self.max_x)
            || near(point.y, self.min_y)
            || near(point.y, self.max_y)
    }
}

/// A rotation about the origin followed by a translation.
///
/// Grid replication only ever uses pure translations; the rotation part is
/// used to map footprint-local geometry into board coordinates.
///
/// # Examples
///
/// ```
/// # use kipanel_core::geometry::{Point, Transform};
/// let shift = Transform::translation(42.0, 32.0);
/// assert_eq!(shift.apply(Point::new(1.0, 2.0)), Point::new(43.0, 34.0));
/// assert_eq!(shift.apply_angle(90.0), 90.0);
/// assert!(Transform::translation(0.0, 0.0).is_identity());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    offset: Point,
    rotation: f64,
}

impl Transform {
    /// The transform that leaves every point unchanged
    pub fn identity() -> Self {
        Self::default()
    }

    /// A pure translation by `(dx, dy)`
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            offset: Point::new(dx, dy),
            rotation: 0.0,
        }
    }

    /// A placement: rotate by `degrees`, then move to `origin`.
    ///
    /// This is how a footprint at `(at x y angle)` maps its local
    /// coordinates to the board.
    pub fn placement(origin: Point, degrees: f64) -> Self {
        Self {
            offset: origin,
            rotation: degrees,
        }
    }

    pub fn offset(self) -> Point {
        self.offset
    }

    pub fn rotation(self) -> f64 {
        self.rotation
    }

    pub fn is_identity(self) -> bool {
        self.offset.is_zero() && self.rotation == 0.0
    }

    /// Maps a point through the transform
    pub fn apply(self, point: Point) -> Point {
        point.rotate(self.rotation).add_point(self.offset)
    }

    /// Maps an orientation angle (degrees) through the transform
    pub fn apply_angle(self, degrees: f64) -> f64 {
        if self.rotation == 0.0 {
            return degrees;
        }
        (degrees + self.rotation).rem_euclid(360.0)
    }
}

/// Centre of the circle through three points, or `None` if they are collinear.
pub fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-10 {
        return None;
    }

    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    Some(Point::new(ux, uy))
}

/// Conservative bounds of the arc from `start` through `mid` to `end`.
///
/// Includes the three points and every axis extreme of the circle that the
/// arc sweeps over. Degenerate (collinear) arcs fall back to the three points.
pub fn arc_bounds(start: Point, mid: Point, end: Point) -> Bounds {
    let corners = Bounds::new(start, end).expand(mid);
    let Some(center) = circumcenter(start, mid, end) else {
        return corners;
    };

    let radius = center.distance(start);
    let angle_of = |p: Point| (p.y - center.y).atan2(p.x - center.x);
    let tau = 2.0 * PI;
    let start_angle = angle_of(start);
    let offset = |angle: f64| (angle - start_angle).rem_euclid(tau);
    let mid_offset = offset(angle_of(mid));
    let end_offset = offset(angle_of(end));
    let increasing = mid_offset <= end_offset;

    [0.0, PI / 2.0, PI, 3.0 * PI / 2.0]
        .into_iter()
        .filter(|&angle| {
            let d = offset(angle);
            if increasing {
                d <= end_offset
            } else {
                d == 0.0 || d >= end_offset
            }
        })
        .map(|angle| {
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .fold(corners, Bounds::expand)
}

/// Bounds of a full circle
pub fn circle_bounds(center: Point, radius: f64) -> Bounds {
    let radius = radius.abs();
    Bounds::new(
        Point::new(center.x - radius, center.y - radius),
        Point::new(center.x + radius, center.y + radius),
    )
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (point_strategy(), 0.1f64..500.0, 0.1f64..500.0)
            .prop_map(|(p, w, h)| Bounds::new_from_top_left(p, Size::new(w, h)))
    }

    fn angle_strategy() -> impl Strategy<Value = f64> {
        -720.0f64..720.0
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Translating by zero must not change a point.
    fn check_zero_translation_is_identity(p: Point) -> Result<(), TestCaseError> {
        let moved = Transform::translation(0.0, 0.0).apply(p);
        prop_assert_eq!(moved, p);
        Ok(())
    }

    /// Translating bounds is the same as translating their corners.
    fn check_translate_matches_points(bounds: Bounds, offset: Point) -> Result<(), TestCaseError> {
        let shift = Transform::translation(offset.x(), offset.y());
        let expected = Bounds::new(shift.apply(bounds.min_point()), shift.apply(bounds.max_point()));
        let actual = bounds.translate(offset);

        prop_assert!(approx_eq!(f64, actual.min_x(), expected.min_x()));
        prop_assert!(approx_eq!(f64, actual.min_y(), expected.min_y()));
        prop_assert!(approx_eq!(f64, actual.max_x(), expected.max_x()));
        prop_assert!(approx_eq!(f64, actual.max_y(), expected.max_y()));
        Ok(())
    }

    /// Merged bounds contain both inputs.
    fn check_merge_contains_both(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let merged = b1.merge(&b2);
        prop_assert!(merged.contains(&b1));
        prop_assert!(merged.contains(&b2));
        Ok(())
    }

    /// Rotation preserves the distance to the origin.
    fn check_rotation_preserves_length(p: Point, degrees: f64) -> Result<(), TestCaseError> {
        let origin = Point::default();
        let rotated = p.rotate(degrees);
        prop_assert!(approx_eq!(
            f64,
            rotated.distance(origin),
            p.distance(origin),
            epsilon = 1e-6
        ));
        Ok(())
    }

    /// Arc bounds always hold the three defining points and stay within the circle's box.
    fn check_arc_bounds_are_conservative(
        center: Point,
        radius: f64,
        a: f64,
        b: f64,
        c: f64,
    ) -> Result<(), TestCaseError> {
        let on_circle = |deg: f64| {
            let rad = deg.to_radians();
            Point::new(
                center.x() + radius * rad.cos(),
                center.y() + radius * rad.sin(),
            )
        };
        let (start, mid, end) = (on_circle(a), on_circle(a + b), on_circle(a + b + c));
        let bounds = arc_bounds(start, mid, end);
        let tol = 1e-6;

        for p in [start, mid, end] {
            prop_assert!(bounds.contains_approx(&Bounds::new(p, p), tol));
        }
        prop_assert!(circle_bounds(center, radius).contains_approx(&bounds, tol));
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn zero_translation_is_identity(p in point_strategy()) {
            check_zero_translation_is_identity(p)?;
        }

        #[test]
        fn translate_matches_points(bounds in bounds_strategy(), offset in point_strategy()) {
            check_translate_matches_points(bounds, offset)?;
        }

        #[test]
        fn merge_contains_both(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_merge_contains_both(b1, b2)?;
        }

        #[test]
        fn rotation_preserves_length(p in point_strategy(), degrees in angle_strategy()) {
            check_rotation_preserves_length(p, degrees)?;
        }

        #[test]
        fn arc_bounds_are_conservative(
            center in point_strategy(),
            radius in 1.0f64..100.0,
            a in 0.0f64..360.0,
            b in 10.0f64..170.0,
            c in 10.0f64..170.0,
        ) {
            check_arc_bounds_are_conservative(center, radius, a, b, c)?;
        }
    }
}
