//! Oriented planes bounding convex regions.

use nalgebra::{Point3, Vector3};

use crate::{Bounds, RegionError, RegionResult};

/// Tolerance shared by plane-side classification, singular-system detection
/// and vertex deduplication.
///
/// All three checks must use the same value, otherwise a vertex accepted by
/// one test can be rejected by another.
pub const REGION_EPSILON: f64 = 1e-5;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is outside the half-space (positive side of the outward normal).
    Outside,
    /// Point is inside the half-space (negative side).
    Inside,
    /// Point lies on the plane within tolerance.
    OnPlane,
}

/// Classification of an axis-aligned box relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxClassification {
    /// Every corner is strictly outside.
    Outside,
    /// Every corner is strictly inside.
    Inside,
    /// Corners lie on both sides, or touch the plane.
    Straddling,
}

/// A plane in 3D space bounding a half-space.
///
/// Stored as an origin point and an outward unit normal. The implicit
/// equation is `a*x + b*y + c*z + d = 0` with `(a, b, c)` the normal; points
/// with a positive value are outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    origin: Point3<f64>,
    normal: Vector3<f64>,
    offset: f64,
}

impl Plane3D {
    /// Creates a plane from a point on the plane and an outward normal.
    /// The normal is normalized.
    ///
    /// # Errors
    /// [`RegionError::DegenerateNormal`] if the normal has (near) zero length.
    pub fn from_point_and_normal(origin: Point3<f64>, normal: Vector3<f64>) -> RegionResult<Self> {
        let norm = normal.norm();
        if !(norm > f64::EPSILON) {
            return Err(RegionError::DegenerateNormal);
        }
        let unit_normal = normal / norm;
        Ok(Self {
            origin,
            normal: unit_normal,
            offset: unit_normal.dot(&origin.coords),
        })
    }

    /// Creates a plane from three points, normal `(b - a) x (c - a)`.
    ///
    /// # Errors
    /// [`RegionError::DegenerateNormal`] if the points are collinear.
    pub fn from_three_points(
        a: Point3<f64>,
        b: Point3<f64>,
        c: Point3<f64>,
    ) -> RegionResult<Self> {
        Self::from_point_and_normal(a, (b - a).cross(&(c - a)))
    }

    /// A point on the plane.
    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Outward unit normal.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Signed distance from the coordinate origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Coefficients `(a, b, c, d)` of the plane equation.
    #[inline]
    pub fn equation(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, -self.offset]
    }

    /// Signed distance from `point`; positive outside.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Classifies a point with [`REGION_EPSILON`].
    pub fn classify_point(&self, point: &Point3<f64>) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > REGION_EPSILON {
            PlaneSide::Outside
        } else if dist < -REGION_EPSILON {
            PlaneSide::Inside
        } else {
            PlaneSide::OnPlane
        }
    }

    /// The box corners with the smallest and largest projection on the normal.
    pub fn extreme_corners(&self, bounds: &Bounds) -> (Point3<f64>, Point3<f64>) {
        let (lo, hi) = (bounds.min(), bounds.max());
        let mut near = lo;
        let mut far = hi;
        for i in 0..3 {
            if self.normal[i] < 0.0 {
                near[i] = hi[i];
                far[i] = lo[i];
            }
        }
        (near, far)
    }

    /// Classifies a box by its two extreme corners along the normal.
    ///
    /// Exact comparisons: a box touching the plane straddles it.
    pub fn classify_box(&self, bounds: &Bounds) -> BoxClassification {
        let (near, far) = self.extreme_corners(bounds);
        if self.signed_distance(&near) > 0.0 {
            BoxClassification::Outside
        } else if self.signed_distance(&far) < 0.0 {
            BoxClassification::Inside
        } else {
            BoxClassification::Straddling
        }
    }

    /// Returns the plane with the normal reversed.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
            offset: -self.offset,
        }
    }
}
