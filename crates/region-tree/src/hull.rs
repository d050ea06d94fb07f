//! Convex hulls of a 3D point set projected along the coordinate axes.
//!
//! [`ProjectedHull`] keeps one 2D hull per axis. The hulls are derived state:
//! each is built on first use after the point set changes and then reused
//! until the next change.

use std::cmp::Ordering;
use std::sync::OnceLock;

use nalgebra::{Point2, Point3};
use tracing::trace;

use crate::{Axis, Rectangle};

/// Twice the signed area of the triangle `(o, a, b)`; positive for a left turn.
#[inline]
fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// One cached hull and its bounding rectangle.
#[derive(Debug, Clone)]
struct CachedHull {
    polygon: Vec<Point2<f64>>,
    bounds: Option<Rectangle>,
}

/// A 3D point set together with its convex hull in each axis projection.
///
/// Hull polygons are strictly convex and counter-clockwise: no three
/// consecutive vertices are collinear. A set with one distinct projected point
/// has a one-vertex hull; a collinear set has a two-vertex hull (a segment).
#[derive(Debug, Clone, Default)]
pub struct ProjectedHull {
    points: Vec<Point3<f64>>,
    stamp: u64,
    hulls: [OnceLock<CachedHull>; 3],
}

impl ProjectedHull {
    /// Creates an empty point set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a point set from existing points.
    pub fn from_points(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// The points whose projections are hulled.
    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Modification stamp of the point set; bumped by every mutation.
    #[inline]
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// Adds a point.
    pub fn push(&mut self, point: Point3<f64>) {
        self.points.push(point);
        self.invalidate();
    }

    /// Replaces the whole point set.
    pub fn set_points(&mut self, points: Vec<Point3<f64>>) {
        self.points = points;
        self.invalidate();
    }

    /// Removes all points.
    pub fn clear(&mut self) {
        self.points.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.stamp += 1;
        for hull in &mut self.hulls {
            hull.take();
        }
    }

    /// Returns true if the hull for `axis` is built. Every mutation of the
    /// point set drops all three hulls.
    pub fn is_hull_current(&self, axis: Axis) -> bool {
        self.hulls[axis.index()].get().is_some()
    }

    fn cached(&self, axis: Axis) -> &CachedHull {
        self.hulls[axis.index()].get_or_init(|| {
            let polygon = convex_hull_2d(&self.points, axis);
            trace!(
                ?axis,
                points = self.points.len(),
                vertices = polygon.len(),
                "rebuilt projected hull"
            );
            CachedHull {
                bounds: Rectangle::enclosing(&polygon),
                polygon,
            }
        })
    }

    /// Counter-clockwise hull of the points projected along `axis`.
    ///
    /// Coordinates are the two remaining axes in index order, so projecting
    /// along Y yields `(x, z)` pairs.
    pub fn hull(&self, axis: Axis) -> &[Point2<f64>] {
        &self.cached(axis).polygon
    }

    /// Bounding rectangle of the projected hull, `None` for an empty set.
    pub fn hull_bounds(&self, axis: Axis) -> Option<Rectangle> {
        self.cached(axis).bounds
    }

    /// Returns true if `rectangle` overlaps the hull projected along `axis`.
    ///
    /// Boundary contact counts as overlap.
    pub fn rectangle_intersects(&self, axis: Axis, rectangle: &Rectangle) -> bool {
        let hull = self.cached(axis);
        let Some(hull_bounds) = hull.bounds else {
            return false;
        };

        if !rectangle.intersects(&hull_bounds) {
            return false;
        }
        if rectangle.contains(&hull_bounds) {
            return true;
        }

        let corners = rectangle.vertices();
        !has_separating_edge(&hull.polygon, &corners)
            && !has_separating_edge(&corners, &hull.polygon)
    }
}

/// Returns true if some edge of the counter-clockwise `polygon` has every
/// point of `other` strictly on its outer (right) side.
///
/// A two-vertex polygon walks its segment in both directions, so either side
/// of the segment can separate.
fn has_separating_edge(polygon: &[Point2<f64>], other: &[Point2<f64>]) -> bool {
    let n = polygon.len();
    if n < 2 {
        return false;
    }
    (0..n).any(|i| {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        other.iter().all(|p| cross(a, b, p) < 0.0)
    })
}

/// Monotone-chain convex hull of the points projected along `axis`.
///
/// Points are sorted by the first remaining coordinate, ties broken by the
/// second. Lower and upper chains keep only strict left turns, so collinear
/// points are dropped.
fn convex_hull_2d(points: &[Point3<f64>], axis: Axis) -> Vec<Point2<f64>> {
    let (h, v) = axis.projected();
    // Adding +0.0 turns -0.0 into 0.0, which `total_cmp` would order apart.
    let mut projected: Vec<Point2<f64>> = points
        .iter()
        .map(|p| Point2::new(p[h] + 0.0, p[v] + 0.0))
        .collect();
    projected.sort_by(|a, b| match a.x.total_cmp(&b.x) {
        Ordering::Equal => a.y.total_cmp(&b.y),
        other => other,
    });
    projected.dedup();

    if projected.len() < 3 {
        return projected;
    }

    let mut lower: Vec<Point2<f64>> = Vec::with_capacity(projected.len());
    for p in &projected {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point2<f64>> = Vec::with_capacity(projected.len());
    for p in projected.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    // The last point of each chain is the first point of the other.
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_strictly_convex_ccw(polygon: &[Point2<f64>]) {
        let n = polygon.len();
        assert!(n >= 3, "expected a proper polygon, got {n} vertices");
        for i in 0..n {
            let prev = polygon[(i + n - 1) % n];
            let cur = polygon[i];
            let next = polygon[(i + 1) % n];
            let e1 = cur - prev;
            let e2 = next - cur;
            let z = e1.x * e2.y - e1.y * e2.x;
            assert!(z > 0.0, "turn at vertex {i} is not strictly left: {z}");
        }
    }

    fn cube_points() -> Vec<Point3<f64>> {
        let mut pts = Vec::new();
        for x in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                for z in [0.0, 1.0] {
                    pts.push(Point3::new(x, y, z));
                }
            }
        }
        pts
    }

    #[test]
    fn cube_projects_to_squares() {
        let hull = ProjectedHull::from_points(cube_points());
        for axis in Axis::ALL {
            let polygon = hull.hull(axis);
            assert_eq!(polygon.len(), 4, "axis {axis:?}");
            assert_strictly_convex_ccw(polygon);
        }
    }

    #[test]
    fn collinear_and_interior_points_are_pruned() {
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        ];
        let hull = ProjectedHull::from_points(pts);
        let polygon = hull.hull(Axis::Z);
        assert_eq!(
            polygon,
            &[
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 2.0),
                Point2::new(0.0, 2.0),
            ]
        );
        assert_strictly_convex_ccw(polygon);
    }

    #[test]
    fn scattered_points_give_convex_ccw_hull() {
        // Deterministic pseudo-random cloud.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 10_000) as f64 / 100.0
        };
        let pts: Vec<_> = (0..200).map(|_| Point3::new(next(), next(), next())).collect();
        let hull = ProjectedHull::from_points(pts);
        for axis in Axis::ALL {
            assert_strictly_convex_ccw(hull.hull(axis));
        }
    }

    #[test]
    fn degenerate_sets() {
        let single = ProjectedHull::from_points(vec![Point3::new(1.0, 2.0, 3.0); 3]);
        assert_eq!(single.hull(Axis::X), &[Point2::new(2.0, 3.0)]);

        let line = ProjectedHull::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ]);
        assert_eq!(line.hull(Axis::Z), &[Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)]);

        let empty = ProjectedHull::new();
        assert!(empty.hull(Axis::Y).is_empty());
        assert!(!empty.rectangle_intersects(Axis::Y, &Rectangle::new(-1.0, 1.0, -1.0, 1.0)));
    }

    #[test]
    fn hull_is_rebuilt_only_after_mutation() {
        let mut hull = ProjectedHull::from_points(cube_points());
        assert!(!hull.is_hull_current(Axis::Z));
        let stamp = hull.stamp();
        assert_eq!(hull.hull(Axis::Z).len(), 4);
        assert!(hull.is_hull_current(Axis::Z));
        assert!(!hull.is_hull_current(Axis::X));

        hull.push(Point3::new(3.0, 0.5, 0.5));
        assert!(hull.stamp() > stamp);
        assert!(!hull.is_hull_current(Axis::Z));
        assert_eq!(hull.hull(Axis::Z).len(), 5);
    }

    #[test]
    fn signed_zeros_share_a_vertical_line() {
        let hull = ProjectedHull::from_points(vec![
            Point3::new(-0.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]);
        assert_eq!(
            hull.hull(Axis::Z),
            &[Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(0.0, 2.0)]
        );
        assert!(hull.rectangle_intersects(Axis::Z, &Rectangle::new(0.05, 0.1, 0.0, 0.1)));
    }

    #[test]
    fn rectangle_against_triangle() {
        let hull = ProjectedHull::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ]);
        // Overlaps the triangle's bounding box but lies beyond the hypotenuse.
        let beyond = Rectangle::new(3.0, 4.0, 3.0, 4.0);
        assert!(!hull.rectangle_intersects(Axis::Z, &beyond));
        // Straddles the hypotenuse.
        let across = Rectangle::new(1.5, 2.5, 1.5, 2.5);
        assert!(hull.rectangle_intersects(Axis::Z, &across));
        // Inside the triangle.
        let inside = Rectangle::new(0.5, 1.0, 0.5, 1.0);
        assert!(hull.rectangle_intersects(Axis::Z, &inside));
        // Encloses the whole hull.
        let around = Rectangle::new(-1.0, 5.0, -1.0, 5.0);
        assert!(hull.rectangle_intersects(Axis::Z, &around));
        // Disjoint from the bounding box.
        let far = Rectangle::new(10.0, 11.0, 0.0, 1.0);
        assert!(!hull.rectangle_intersects(Axis::Z, &far));
    }

    #[test]
    fn rectangle_against_segment() {
        let hull = ProjectedHull::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
        ]);
        assert!(hull.rectangle_intersects(Axis::Z, &Rectangle::new(1.0, 3.0, 1.5, 2.5)));
        assert!(!hull.rectangle_intersects(Axis::Z, &Rectangle::new(0.0, 1.0, 3.0, 4.0)));
        assert!(!hull.rectangle_intersects(Axis::Z, &Rectangle::new(3.0, 4.0, 0.0, 1.0)));
    }
}
