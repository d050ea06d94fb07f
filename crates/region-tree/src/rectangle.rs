//! Axis-aligned rectangles in a projection plane.

use nalgebra::Point2;

use crate::{Axis, Bounds};

/// An axis-aligned rectangle `[hmin, hmax] x [vmin, vmax]` in the plane left
/// over after projecting one coordinate axis away.
///
/// The horizontal coordinate is the lower of the two remaining axis indices
/// (see [`Axis::projected`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    min: Point2<f64>,
    max: Point2<f64>,
}

impl Rectangle {
    /// Creates a rectangle from its horizontal and vertical extents.
    pub fn new(hmin: f64, hmax: f64, vmin: f64, vmax: f64) -> Self {
        Self {
            min: Point2::new(hmin, vmin),
            max: Point2::new(hmax, vmax),
        }
    }

    /// Projects a 3D box along `axis`.
    pub fn from_bounds(bounds: &Bounds, axis: Axis) -> Self {
        let (h, v) = axis.projected();
        let (lo, hi) = (bounds.min(), bounds.max());
        Self::new(lo[h], hi[h], lo[v], hi[v])
    }

    /// Tight rectangle around 2D points, or `None` for an empty set.
    pub fn enclosing(points: &[Point2<f64>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut rect = Self {
            min: *first,
            max: *first,
        };
        for p in rest {
            rect.min = rect.min.inf(p);
            rect.max = rect.max.sup(p);
        }
        Some(rect)
    }

    /// Lower-left corner.
    #[inline]
    pub fn min(&self) -> Point2<f64> {
        self.min
    }

    /// Upper-right corner.
    #[inline]
    pub fn max(&self) -> Point2<f64> {
        self.max
    }

    /// The four corners in counter-clockwise order starting at `min`.
    pub fn vertices(&self) -> [Point2<f64>; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    /// Returns true if the rectangles overlap (closed, touching counts).
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Returns true if `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &Self) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn projection_drops_the_axis() {
        let b = Bounds::new(Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0));
        assert_eq!(Rectangle::from_bounds(&b, Axis::X), Rectangle::new(2.0, 5.0, 3.0, 6.0));
        assert_eq!(Rectangle::from_bounds(&b, Axis::Y), Rectangle::new(1.0, 4.0, 3.0, 6.0));
        assert_eq!(Rectangle::from_bounds(&b, Axis::Z), Rectangle::new(1.0, 4.0, 2.0, 5.0));
    }

    #[test]
    fn vertices_are_counter_clockwise() {
        let v = Rectangle::new(0.0, 2.0, 0.0, 1.0).vertices();
        let signed_area: f64 = (0..4)
            .map(|i| {
                let (a, b) = (v[i], v[(i + 1) % 4]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        assert!(signed_area > 0.0);
    }

    #[test]
    fn enclosing_rectangle() {
        let pts = [Point2::new(1.0, 5.0), Point2::new(-1.0, 2.0), Point2::new(0.5, 7.0)];
        let r = Rectangle::enclosing(&pts).unwrap();
        assert_eq!(r, Rectangle::new(-1.0, 1.0, 2.0, 7.0));
        assert!(Rectangle::enclosing(&[]).is_none());
    }

    #[test]
    fn overlap_and_containment() {
        let a = Rectangle::new(0.0, 4.0, 0.0, 4.0);
        let b = Rectangle::new(1.0, 2.0, 1.0, 2.0);
        let c = Rectangle::new(5.0, 6.0, 0.0, 1.0);
        assert!(a.contains(&b));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(!b.contains(&a));
    }
}
