//! Convex regions bounded by planes, and their intersection with boxes.
//!
//! The box test follows the classic Graphics Gems approach:
//!
//! 1. compare bounding boxes (reject disjoint, accept enclosed),
//! 2. classify the box against every plane using the two box corners that
//!    are extreme along the plane normal,
//! 3. when some plane is straddled, fall back to separating-axis tests in
//!    the three axis projections, using the region's [`ProjectedHull`].
//!
//! Together the steps test every separating axis of a convex polyhedron and
//! a box, so the answer is exact up to [`REGION_EPSILON`].

use std::sync::OnceLock;

use nalgebra::{Matrix3, Point3, Vector3};
use tracing::{debug, trace, warn};

use crate::polygon::triangle_normal;
use crate::{
    Axis, BoxClassification, Bounds, Cell, Plane3D, PlaneSide, Polygon, ProjectedHull,
    REGION_EPSILON, Rectangle, RegionError, RegionResult,
};

/// Vertices of a convex region and everything derived from them.
#[derive(Debug, Clone)]
struct RegionGeometry {
    vertices: Vec<Point3<f64>>,
    bounds: Option<Bounds>,
    hull: ProjectedHull,
}

/// A bounded convex polyhedron: the intersection of the inner half-spaces of
/// a set of planes with outward normals.
///
/// The region's vertices are computed from the planes on first use and cached
/// until a plane changes.
///
/// ```
/// use region_tree::{Bounds, ConvexRegion};
///
/// let cube = Bounds::from_extents([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
/// let region = ConvexRegion::from_bounds(&cube);
///
/// assert!(region.intersects_box(&Bounds::from_extents([0.5, 2.0, 0.5, 2.0, 0.5, 2.0])));
/// assert!(!region.intersects_box(&Bounds::from_extents([3.0, 4.0, 3.0, 4.0, 3.0, 4.0])));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConvexRegion {
    planes: Vec<Plane3D>,
    geometry: OnceLock<RegionGeometry>,
}

impl ConvexRegion {
    /// Creates a region from its bounding planes (outward normals).
    pub fn new(planes: Vec<Plane3D>) -> Self {
        Self {
            planes,
            ..Self::default()
        }
    }

    /// The six planes of an axis-aligned box.
    pub fn from_bounds(bounds: &Bounds) -> Self {
        let (lo, hi) = (bounds.min(), bounds.max());
        let planes = Axis::ALL
            .into_iter()
            .flat_map(|axis| {
                let mut n = Vector3::zeros();
                n[axis.index()] = 1.0;
                [(lo, -n), (hi, n)]
            })
            .filter_map(|(origin, normal)| Plane3D::from_point_and_normal(origin, normal).ok())
            .collect();
        Self::new(planes)
    }

    /// Builds the region bounded by the face planes of a convex solid cell.
    ///
    /// Each face's normal comes from its first three non-collinear vertices.
    /// Normals are then turned outward: a point inside the cell is estimated
    /// as the average of one vertex per face, and a face is flipped when that
    /// point and a point just outside the face fall on the same side of it.
    /// A face passing through the estimate is oriented against the mean of
    /// all the cell's points instead.
    ///
    /// # Errors
    /// [`RegionError::NoFaces`] for a cell without faces,
    /// [`RegionError::DegenerateFace`] for a face whose vertices are collinear.
    pub fn from_cell<C: Cell + ?Sized>(cell: &C) -> RegionResult<Self> {
        let face_count = cell.face_count();
        if face_count == 0 {
            return Err(RegionError::NoFaces);
        }

        let mut planes = Vec::with_capacity(face_count);
        let mut inside = Vector3::zeros();
        for face in 0..face_count {
            let points = cell.face(face).ok_or(RegionError::DegenerateFace { face })?;
            let [p0, p1, rest @ ..] = &*points else {
                return Err(RegionError::DegenerateFace { face });
            };
            let normal = rest
                .iter()
                .find_map(|p2| triangle_normal(p0, p1, p2))
                .ok_or(RegionError::DegenerateFace { face })?;
            planes.push(Plane3D::from_point_and_normal(*p0, normal)?);
            inside += p0.coords;
        }
        let inside = Point3::from(inside / face_count as f64);
        let points = cell.points();
        let fallback = (!points.is_empty()).then(|| {
            Point3::from(points.iter().map(|p| p.coords).sum::<Vector3<f64>>() / points.len() as f64)
        });

        let planes = planes
            .into_iter()
            .map(|plane| {
                // The face-vertex average can land on a face; the mean of all
                // cell points is a second guess for that face.
                let probe = match fallback {
                    Some(center) if plane.signed_distance(&inside).abs() <= REGION_EPSILON => {
                        center
                    }
                    _ => inside,
                };
                let just_outside = plane.origin() + plane.normal();
                if plane.signed_distance(&probe) * plane.signed_distance(&just_outside) > 0.0 {
                    plane.flipped()
                } else {
                    plane
                }
            })
            .collect();
        Ok(Self::new(planes))
    }

    /// The bounding planes.
    #[inline]
    pub fn planes(&self) -> &[Plane3D] {
        &self.planes
    }

    /// Number of bounding planes.
    #[inline]
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    /// Adds a bounding plane, invalidating the cached vertices.
    pub fn add_plane(&mut self, plane: Plane3D) {
        self.planes.push(plane);
        self.invalidate();
    }

    /// Replaces plane `index`, invalidating the cached vertices.
    ///
    /// # Errors
    /// [`RegionError::PlaneIndexOutOfRange`] if there is no such plane.
    pub fn set_plane(&mut self, index: usize, plane: Plane3D) -> RegionResult<()> {
        let count = self.planes.len();
        let slot = self
            .planes
            .get_mut(index)
            .ok_or(RegionError::PlaneIndexOutOfRange { index, count })?;
        *slot = plane;
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.geometry.take();
    }

    /// Returns true if the cached vertices are built. Every plane change
    /// drops the cache.
    pub fn is_geometry_current(&self) -> bool {
        self.geometry.get().is_some()
    }

    fn geometry(&self) -> &RegionGeometry {
        self.geometry.get_or_init(|| {
            let vertices = compute_vertices(&self.planes);
            debug!(
                planes = self.planes.len(),
                vertices = vertices.len(),
                "computed convex region vertices"
            );
            RegionGeometry {
                bounds: Bounds::from_points(&vertices),
                hull: ProjectedHull::from_points(vertices.clone()),
                vertices,
            }
        })
    }

    /// Feasible intersection points of the planes, deduplicated.
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.geometry().vertices
    }

    /// Bounds of [`ConvexRegion::vertices`], `None` for an empty region.
    pub fn vertex_bounds(&self) -> Option<Bounds> {
        self.geometry().bounds
    }

    /// Returns true if `point` is inside or on every plane.
    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.classify_point(point) != PlaneSide::Outside)
    }

    /// Tests the region against an axis-aligned box.
    ///
    /// # Errors
    /// [`RegionError::TooFewPlanes`] below four planes and
    /// [`RegionError::DegenerateRegion`] when the planes enclose no volume.
    pub fn try_intersects_box(&self, bounds: &Bounds) -> RegionResult<bool> {
        if self.planes.len() < 4 {
            return Err(RegionError::TooFewPlanes(self.planes.len()));
        }
        let geometry = self.geometry();
        let region_bounds = match geometry.bounds {
            Some(b) if spans_volume(&geometry.vertices) => b,
            _ => {
                return Err(RegionError::DegenerateRegion {
                    vertices: geometry.vertices.len(),
                });
            }
        };

        if !bounds.intersects(&region_bounds) {
            return Ok(false);
        }
        if bounds.contains_box(&region_bounds) {
            return Ok(true);
        }

        let mut all_inside = true;
        for plane in &self.planes {
            match plane.classify_box(bounds) {
                BoxClassification::Outside => return Ok(false),
                BoxClassification::Inside => {}
                BoxClassification::Straddling => all_inside = false,
            }
        }
        if all_inside {
            return Ok(true);
        }

        Ok(projections_overlap(&geometry.hull, bounds))
    }

    /// Tests the region against an axis-aligned box.
    ///
    /// A degenerate region is logged and reported as not intersecting.
    pub fn intersects_box(&self, bounds: &Bounds) -> bool {
        self.try_intersects_box(bounds).unwrap_or_else(|err| {
            warn!(%err, "convex region test treated as no intersection");
            false
        })
    }

    /// Tests a convex planar polygon against an axis-aligned box.
    ///
    /// The box must straddle the polygon's plane, and the polygon and the box
    /// must overlap in all three axis projections.
    ///
    /// # Errors
    /// [`RegionError::DegenerateNormal`] if the polygon's vertices are collinear.
    pub fn polygon_intersects_box(polygon: &Polygon, bounds: &Bounds) -> RegionResult<bool> {
        let Some(polygon_bounds) = polygon.bounds() else {
            return Ok(false);
        };
        if !bounds.intersects(&polygon_bounds) {
            return Ok(false);
        }
        let plane = polygon.plane()?;
        if plane.classify_box(bounds) != BoxClassification::Straddling {
            return Ok(false);
        }
        let hull = ProjectedHull::from_points(polygon.vertices().to_vec());
        Ok(projections_overlap(&hull, bounds))
    }
}

/// Returns true if the hull overlaps the box in every axis projection.
fn projections_overlap(hull: &ProjectedHull, bounds: &Bounds) -> bool {
    Axis::ALL
        .into_iter()
        .all(|axis| hull.rectangle_intersects(axis, &Rectangle::from_bounds(bounds, axis)))
}

/// Intersects every plane triple and keeps the points inside all planes.
fn compute_vertices(planes: &[Plane3D]) -> Vec<Point3<f64>> {
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let n = planes.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let (a, b, c) = (&planes[i], &planes[j], &planes[k]);
                let m = Matrix3::from_rows(&[
                    a.normal().transpose(),
                    b.normal().transpose(),
                    c.normal().transpose(),
                ]);
                if m.determinant().abs() < REGION_EPSILON {
                    trace!(i, j, k, "skipping singular plane triple");
                    continue;
                }
                let rhs = Vector3::new(a.offset(), b.offset(), c.offset());
                let Some(x) = m.lu().solve(&rhs).map(Point3::from) else {
                    continue;
                };
                if planes.iter().any(|p| p.signed_distance(&x) > REGION_EPSILON) {
                    continue;
                }
                if vertices.iter().any(|v| nalgebra::distance(v, &x) < REGION_EPSILON) {
                    continue;
                }
                vertices.push(x);
            }
        }
    }
    vertices
}

/// Returns true if the points are not all coplanar within tolerance.
fn spans_volume(points: &[Point3<f64>]) -> bool {
    let Some((a, rest)) = points.split_first() else {
        return false;
    };
    let Some(b) = rest.iter().find(|p| nalgebra::distance(*p, a) > REGION_EPSILON) else {
        return false;
    };
    let Some(normal) = rest.iter().find_map(|c| triangle_normal(a, b, c)) else {
        return false;
    };
    let normal = normal.normalize();
    rest.iter()
        .any(|d| normal.dot(&(d - a)).abs() > REGION_EPSILON)
}
