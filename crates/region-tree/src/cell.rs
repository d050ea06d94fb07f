//! The cell interface consumed by region intersection tests.
//!
//! Region trees only need a cell's topology class, its points and, for solid
//! cells, its faces. [`Cell`] captures that; [`PolyCell`] is a plain
//! implementation covering the usual linear cell types.

use std::borrow::Cow;

use nalgebra::Point3;

use crate::Bounds;

/// How the points of a surface cell are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceLayout {
    /// One convex planar polygon (triangle, quad, polygon).
    Polygon,
    /// A strip of triangles; triangle `i` is points `i, i+1, i+2`.
    TriangleStrip,
}

/// Topological class of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Isolated points (vertex, poly-vertex).
    PointSet,
    /// A chain of segments through consecutive points (line, poly-line).
    Curve,
    /// A planar surface.
    Surface(SurfaceLayout),
    /// A convex solid bounded by planar faces.
    Solid,
}

impl CellKind {
    /// Topological dimension, 0 to 3.
    #[inline]
    pub fn dimension(self) -> u8 {
        match self {
            Self::PointSet => 0,
            Self::Curve => 1,
            Self::Surface(_) => 2,
            Self::Solid => 3,
        }
    }
}

/// The minimal cell capability needed by intersection tests.
pub trait Cell {
    /// Topological class of the cell.
    fn kind(&self) -> CellKind;

    /// The cell's points.
    fn points(&self) -> &[Point3<f64>];

    /// Number of faces; zero for cells below dimension 3.
    fn face_count(&self) -> usize {
        0
    }

    /// Vertex loop of face `index`, or `None` past [`Cell::face_count`].
    fn face(&self, index: usize) -> Option<Cow<'_, [Point3<f64>]>> {
        let _ = index;
        None
    }

    /// Axis-aligned bounds of the cell, `None` for a cell without points.
    fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points())
    }
}

/// A cell stored as points plus, for solids, faces indexing into them.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyCell {
    kind: CellKind,
    points: Vec<Point3<f64>>,
    faces: Vec<Vec<usize>>,
}

impl PolyCell {
    /// A single vertex.
    pub fn vertex(point: Point3<f64>) -> Self {
        Self::poly_vertex(vec![point])
    }

    /// A set of unconnected points.
    pub fn poly_vertex(points: Vec<Point3<f64>>) -> Self {
        Self {
            kind: CellKind::PointSet,
            points,
            faces: Vec::new(),
        }
    }

    /// A line segment.
    pub fn line(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self::poly_line(vec![a, b])
    }

    /// A chain of segments.
    pub fn poly_line(points: Vec<Point3<f64>>) -> Self {
        Self {
            kind: CellKind::Curve,
            points,
            faces: Vec::new(),
        }
    }

    /// A triangle.
    pub fn triangle(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self::polygon(vec![a, b, c])
    }

    /// A convex planar polygon.
    pub fn polygon(points: Vec<Point3<f64>>) -> Self {
        Self {
            kind: CellKind::Surface(SurfaceLayout::Polygon),
            points,
            faces: Vec::new(),
        }
    }

    /// A triangle strip.
    pub fn triangle_strip(points: Vec<Point3<f64>>) -> Self {
        Self {
            kind: CellKind::Surface(SurfaceLayout::TriangleStrip),
            points,
            faces: Vec::new(),
        }
    }

    /// A convex polyhedron given by its points and face vertex loops.
    pub fn polyhedron(points: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Self {
        Self {
            kind: CellKind::Solid,
            points,
            faces,
        }
    }

    /// A tetrahedron.
    pub fn tetra(points: [Point3<f64>; 4]) -> Self {
        Self::polyhedron(
            points.to_vec(),
            vec![vec![0, 1, 3], vec![1, 2, 3], vec![2, 0, 3], vec![0, 2, 1]],
        )
    }

    /// A hexahedron: bottom quad `0..4` and top quad `4..8`, with point `i + 4`
    /// above point `i`.
    pub fn hexahedron(points: [Point3<f64>; 8]) -> Self {
        Self::polyhedron(
            points.to_vec(),
            vec![
                vec![0, 4, 7, 3],
                vec![1, 2, 6, 5],
                vec![0, 1, 5, 4],
                vec![3, 7, 6, 2],
                vec![0, 3, 2, 1],
                vec![4, 5, 6, 7],
            ],
        )
    }

    /// The axis-aligned box as a hexahedron.
    pub fn from_bounds(bounds: &Bounds) -> Self {
        let (lo, hi) = (bounds.min(), bounds.max());
        Self::hexahedron([
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
        ])
    }
}

impl Cell for PolyCell {
    fn kind(&self) -> CellKind {
        self.kind
    }

    fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face(&self, index: usize) -> Option<Cow<'_, [Point3<f64>]>> {
        let face = self.faces.get(index)?;
        // Out-of-range point ids drop out of the loop rather than panic.
        let loop_points = face.iter().filter_map(|&i| self.points.get(i).copied()).collect();
        Some(Cow::Owned(loop_points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions() {
        assert_eq!(CellKind::PointSet.dimension(), 0);
        assert_eq!(CellKind::Curve.dimension(), 1);
        assert_eq!(CellKind::Surface(SurfaceLayout::TriangleStrip).dimension(), 2);
        assert_eq!(CellKind::Solid.dimension(), 3);
    }

    #[test]
    fn hexahedron_faces() {
        let b = Bounds::from_extents([0.0, 1.0, 0.0, 2.0, 0.0, 3.0]);
        let hex = PolyCell::from_bounds(&b);
        assert_eq!(hex.kind(), CellKind::Solid);
        assert_eq!(hex.face_count(), 6);
        assert_eq!(hex.bounds(), Some(b));
        let bottom = hex.face(4).unwrap();
        assert!(bottom.iter().all(|p| p.z == 0.0));
        assert!(hex.face(6).is_none());
    }

    #[test]
    fn lower_dimensional_cells_have_no_faces() {
        let line = PolyCell::line(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(line.face_count(), 0);
        assert!(line.face(0).is_none());
        assert!(PolyCell::poly_vertex(Vec::new()).bounds().is_none());
    }
}
