//! Basic geometric types shared by layout, routing, and rendering.

use std::ops::{Add, Sub};

/// A point in diagram coordinates. Node positions are centers, not corners.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    /// Calculates the midpoint between this point and another point.
    pub fn midpoint(self, other: Point) -> Self {
        self.lerp(other, 0.5)
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Point, t: f32) -> Self {
        Self {
            x: (other.x - self.x).mul_add(t, self.x),
            y: (other.y - self.y).mul_add(t, self.y),
        }
    }

    /// Euclidean distance from the origin.
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f32 {
        (other - self).hypot()
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Returns a new point with absolute values of both coordinates.
    pub fn abs(self) -> Self {
        Self {
            x: self.x.abs(),
            y: self.y.abs(),
        }
    }

    /// Swaps the x and y coordinates.
    ///
    /// Placement algorithms compute in a top-to-bottom frame; the direction
    /// transform uses this to map results into left-to-right frames.
    pub fn transpose(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }

    /// Converts a center point and size into a bounds rectangle.
    pub fn to_bounds(self, size: Size) -> Bounds {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;

        Bounds {
            min_x: self.x - half_width,
            min_y: self.y - half_height,
            max_x: self.x + half_width,
            max_y: self.y + half_height,
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new size with the component-wise maximum of both sizes.
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Returns a new size grown by the given insets on each side.
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal_sum(),
            height: self.height + insets.vertical_sum(),
        }
    }

    /// Multiplies both dimensions by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// The larger of width and height.
    pub fn extent(self) -> f32 {
        self.width.max(self.height)
    }

    /// Swaps width and height. See [`Point::transpose`].
    pub fn transpose(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub fn is_positive(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// An axis-aligned rectangle described by its extreme coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        }
    }
}

impl Bounds {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// The top-left corner.
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// The center of the rectangle.
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// The smallest bounds containing both rectangles.
    pub fn merge(self, other: Bounds) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Extends the bounds to contain the given point.
    pub fn include(self, point: Point) -> Self {
        Self {
            min_x: self.min_x.min(point.x()),
            min_y: self.min_y.min(point.y()),
            max_x: self.max_x.max(point.x()),
            max_y: self.max_y.max(point.y()),
        }
    }

    /// Whether the point lies inside the bounds (inclusive edges).
    pub fn contains(self, point: Point) -> bool {
        point.x() >= self.min_x
            && point.x() <= self.max_x
            && point.y() >= self.min_y
            && point.y() <= self.max_y
    }

    /// Whether `other` lies entirely inside these bounds (inclusive edges).
    pub fn contains_bounds(self, other: Bounds) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Moves the bounds by the specified offset.
    pub fn translate(self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x(),
            min_y: self.min_y + offset.y(),
            max_x: self.max_x + offset.x(),
            max_y: self.max_y + offset.y(),
        }
    }

    /// Grows the bounds outward by the given insets.
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left(),
            min_y: self.min_y - insets.top(),
            max_x: self.max_x + insets.right(),
            max_y: self.max_y + insets.bottom(),
        }
    }
}

/// Spacing around an element with potentially different values per side.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Uniform insets with the same value on all sides.
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn top(self) -> f32 {
        self.top
    }

    pub fn right(self) -> f32 {
        self.right
    }

    pub fn bottom(self) -> f32 {
        self.bottom
    }

    pub fn left(self) -> f32 {
        self.left
    }

    pub fn with_top(self, top: f32) -> Self {
        Self { top, ..self }
    }

    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point]) -> f32 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_to(pair[1]))
        .sum()
}

/// The point at fraction `t` of a polyline's arc length.
///
/// `t` is clamped to `[0, 1]`. Degenerate polylines (fewer than two points
/// or zero total length) return the first point.
pub fn point_along(points: &[Point], t: f32) -> Point {
    let Some(&first) = points.first() else {
        return Point::default();
    };
    let total = polyline_length(points);
    if points.len() < 2 || total <= 0.0 {
        return first;
    }

    let mut remaining = total * t.clamp(0.0, 1.0);
    for pair in points.windows(2) {
        let segment = pair[0].distance_to(pair[1]);
        if remaining <= segment && segment > 0.0 {
            return pair[0].lerp(pair[1], remaining / segment);
        }
        remaining -= segment;
    }

    points[points.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let p1 = Point::new(1.0, 2.0);
        let p2 = Point::new(3.0, 4.0);
        assert_eq!(p1 + p2, Point::new(4.0, 6.0));
        assert_eq!(p2 - p1, Point::new(2.0, 2.0));
        assert_eq!(p1.scale(2.0), Point::new(2.0, 4.0));
    }

    #[test]
    fn point_midpoint_and_lerp() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(4.0, 6.0);
        assert_eq!(p1.midpoint(p2), Point::new(2.0, 3.0));
        assert_eq!(p1.lerp(p2, 0.0), p1);
        assert_eq!(p1.lerp(p2, 1.0), p2);
        assert_eq!(p1.lerp(p2, 0.25), Point::new(1.0, 1.5));
    }

    #[test]
    fn point_distance() {
        assert_eq!(Point::new(3.0, 4.0).hypot(), 5.0);
        assert_eq!(
            Point::new(1.0, 1.0).distance_to(Point::new(4.0, 5.0)),
            5.0
        );
    }

    #[test]
    fn point_transpose() {
        assert_eq!(Point::new(2.0, 5.0).transpose(), Point::new(5.0, 2.0));
    }

    #[test]
    fn center_point_to_bounds() {
        let bounds = Point::new(10.0, 20.0).to_bounds(Size::new(6.0, 8.0));
        assert_eq!(bounds.min_x(), 7.0);
        assert_eq!(bounds.min_y(), 16.0);
        assert_eq!(bounds.max_x(), 13.0);
        assert_eq!(bounds.max_y(), 24.0);
    }

    #[test]
    fn size_max_and_padding() {
        let size = Size::new(10.0, 20.0).max(Size::new(15.0, 18.0));
        assert_eq!(size, Size::new(15.0, 20.0));

        let padded = size.add_padding(Insets::uniform(5.0));
        assert_eq!(padded, Size::new(25.0, 30.0));
    }

    #[test]
    fn size_positivity() {
        assert!(Size::new(1.0, 1.0).is_positive());
        assert!(!Size::new(0.0, 1.0).is_positive());
        assert!(!Size::new(5.0, -1.0).is_positive());
    }

    #[test]
    fn bounds_merge_and_include() {
        let a = Bounds::new(1.0, 2.0, 5.0, 6.0);
        let b = Bounds::new(3.0, 0.0, 8.0, 4.0);
        let merged = a.merge(b);
        assert_eq!(merged, Bounds::new(1.0, 0.0, 8.0, 6.0));

        let extended = a.include(Point::new(-2.0, 10.0));
        assert_eq!(extended, Bounds::new(-2.0, 2.0, 5.0, 10.0));
    }

    #[test]
    fn bounds_containment() {
        let outer = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains(Point::new(5.0, 5.0)));
        assert!(outer.contains(Point::new(0.0, 10.0)));
        assert!(!outer.contains(Point::new(10.1, 5.0)));
        assert!(outer.contains_bounds(Bounds::new(1.0, 1.0, 9.0, 9.0)));
        assert!(!outer.contains_bounds(Bounds::new(1.0, 1.0, 11.0, 9.0)));
    }

    #[test]
    fn bounds_translate_and_pad() {
        let bounds = Bounds::new(1.0, 2.0, 5.0, 6.0);
        let moved = bounds.translate(Point::new(3.0, -1.0));
        assert_eq!(moved, Bounds::new(4.0, 1.0, 8.0, 5.0));

        let padded = bounds.add_padding(Insets::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(padded, Bounds::new(-3.0, 1.0, 7.0, 9.0));
    }

    #[test]
    fn polyline_length_sums_segments() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 4.0),
        ];
        assert_eq!(polyline_length(&points), 7.0);
    }

    #[test]
    fn point_along_walks_arc_length() {
        use float_cmp::assert_approx_eq;

        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        let quarter = point_along(&points, 0.25);
        assert_approx_eq!(f32, quarter.x(), 5.0);
        assert_approx_eq!(f32, quarter.y(), 0.0);

        let three_quarters = point_along(&points, 0.75);
        assert_approx_eq!(f32, three_quarters.x(), 10.0);
        assert_approx_eq!(f32, three_quarters.y(), 5.0);

        assert_eq!(point_along(&points, 0.0), Point::new(0.0, 0.0));
        assert_eq!(point_along(&points, 0.5), Point::new(10.0, 0.0));
        assert_eq!(point_along(&points, 1.0), Point::new(10.0, 10.0));
    }

    #[test]
    fn point_along_degenerate_inputs() {
        assert_eq!(point_along(&[], 0.5), Point::default());
        let single = [Point::new(2.0, 3.0)];
        assert_eq!(point_along(&single, 0.5), single[0]);
        let coincident = [Point::new(2.0, 3.0), Point::new(2.0, 3.0)];
        assert_eq!(point_along(&coincident, 0.5), coincident[0]);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    proptest! {
        #[test]
        fn lerp_stays_within_segment_bounds(
            a in point_strategy(),
            b in point_strategy(),
            t in 0.0f32..1.0,
        ) {
            let p = a.lerp(b, t);
            let min_x = a.x().min(b.x()) - 0.01;
            let max_x = a.x().max(b.x()) + 0.01;
            let min_y = a.y().min(b.y()) - 0.01;
            let max_y = a.y().max(b.y()) + 0.01;
            prop_assert!(p.x() >= min_x && p.x() <= max_x);
            prop_assert!(p.y() >= min_y && p.y() <= max_y);
        }

        #[test]
        fn merged_bounds_contain_both(
            a in point_strategy(),
            b in point_strategy(),
            c in point_strategy(),
            d in point_strategy(),
        ) {
            let b1 = Bounds::default().include(a).include(b);
            let b2 = Bounds::default().include(c).include(d);
            let merged = b1.merge(b2);
            prop_assert!(merged.contains_bounds(b1));
            prop_assert!(merged.contains_bounds(b2));
        }

        #[test]
        fn point_along_is_finite(
            a in point_strategy(),
            b in point_strategy(),
            c in point_strategy(),
            t in 0.0f32..1.0,
        ) {
            let p = point_along(&[a, b, c], t);
            prop_assert!(p.x().is_finite());
            prop_assert!(p.y().is_finite());
        }
    }
}
