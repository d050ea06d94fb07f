//! Planar polygons, as found on the faces of 2D and 3D cells.

use nalgebra::{Point3, Vector3};

use crate::{Bounds, Plane3D, REGION_EPSILON, RegionError, RegionResult};

/// Returns the normal `(b - a) x (c - a)` unless the three points are
/// collinear within [`REGION_EPSILON`].
///
/// The test is relative: the sine of the angle at `a` must exceed the
/// tolerance, so it does not depend on the size of the cell.
pub(crate) fn triangle_normal(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Option<Vector3<f64>> {
    let ab = b - a;
    let ac = c - a;
    let normal = ab.cross(&ac);
    let scale = ab.norm() * ac.norm();
    (normal.norm() > REGION_EPSILON * scale && scale > 0.0).then_some(normal)
}

/// A planar polygon in 3D space, defined by an ordered list of vertices.
///
/// Vertices are expected to be coplanar and convex, in counter-clockwise
/// order when viewed from the side the normal points to. Duplicate and
/// collinear leading vertices are tolerated: the normal comes from the first
/// non-collinear triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point3<f64>>,
}

impl Polygon {
    /// Creates a polygon from a list of vertices.
    pub fn new(vertices: Vec<Point3<f64>>) -> Self {
        Self { vertices }
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the polygon has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Normal from the first two vertices and the first later vertex that is
    /// not collinear with them.
    ///
    /// Returns `None` if every vertex lies on one line.
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let [a, b, rest @ ..] = self.vertices.as_slice() else {
            return None;
        };
        rest.iter().find_map(|c| triangle_normal(a, b, c))
    }

    /// Returns the plane the polygon lies on, oriented by [`Polygon::normal`].
    ///
    /// # Errors
    /// [`RegionError::DegenerateNormal`] if the vertices are collinear.
    pub fn plane(&self) -> RegionResult<Plane3D> {
        let normal = self.normal().ok_or(RegionError::DegenerateNormal)?;
        Plane3D::from_point_and_normal(self.vertices[0], normal)
    }

    /// Tight bounds of the vertices.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.vertices)
    }
}

impl From<Vec<Point3<f64>>> for Polygon {
    fn from(vertices: Vec<Point3<f64>>) -> Self {
        Self::new(vertices)
    }
}

impl From<&[Point3<f64>]> for Polygon {
    fn from(vertices: &[Point3<f64>]) -> Self {
        Self::new(vertices.to_vec())
    }
}
