//! Axis-aligned bounds shared by tree nodes, cells and convex regions.

use std::fmt;

use nalgebra::Point3;

use crate::{RegionError, RegionResult};

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Returns the coordinate index of the axis (0, 1 or 2).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Returns the axis for a coordinate index, or `None` past 2.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The two remaining coordinate indices once this axis is projected away,
    /// in increasing order.
    #[inline]
    pub fn projected(self) -> (usize, usize) {
        match self {
            Self::X => (1, 2),
            Self::Y => (0, 2),
            Self::Z => (0, 1),
        }
    }
}

/// An axis-aligned box `[xmin,xmax] x [ymin,ymax] x [zmin,zmax]`.
///
/// Extents are stored exactly as given, so a value written with
/// [`Bounds::from_extents`] reads back bit-for-bit from [`Bounds::extents`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: Point3<f64>,
    max: Point3<f64>,
}

impl Bounds {
    /// Creates bounds from its minimum and maximum corners.
    ///
    /// No validation is done; see [`Bounds::validate`].
    #[inline]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Creates bounds from `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    #[inline]
    pub fn from_extents(e: [f64; 6]) -> Self {
        Self {
            min: Point3::new(e[0], e[2], e[4]),
            max: Point3::new(e[1], e[3], e[5]),
        }
    }

    /// Returns `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    #[inline]
    pub fn extents(&self) -> [f64; 6] {
        [
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z,
        ]
    }

    /// Tight bounds of a point set, or `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self::new(first, first);
        for p in iter {
            bounds.expand_to(p);
        }
        Some(bounds)
    }

    /// Grows the bounds to include `p`.
    pub fn expand_to(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Checks `min <= max` on every axis.
    pub fn validate(&self) -> RegionResult<()> {
        for axis in Axis::ALL {
            let (min, max) = (self.min_on(axis), self.max_on(axis));
            // Written so that NaN extents fail too.
            if !(min <= max) {
                return Err(RegionError::InvalidBounds { axis, min, max });
            }
        }
        Ok(())
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> Point3<f64> {
        self.min
    }

    /// Maximum corner.
    #[inline]
    pub fn max(&self) -> Point3<f64> {
        self.max
    }

    /// Lower extent along `axis`.
    #[inline]
    pub fn min_on(&self, axis: Axis) -> f64 {
        self.min[axis.index()]
    }

    /// Upper extent along `axis`.
    #[inline]
    pub fn max_on(&self, axis: Axis) -> f64 {
        self.max[axis.index()]
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Volume of the box.
    pub fn volume(&self) -> f64 {
        let d = self.max - self.min;
        d.x * d.y * d.z
    }

    /// Returns true if `other` lies entirely inside this box (closed intervals).
    pub fn contains_box(&self, other: &Self) -> bool {
        (0..3).all(|i| other.min[i] >= self.min[i] && other.max[i] <= self.max[i])
    }

    /// Returns true if the boxes overlap (closed intervals, touching counts).
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && self.max[i] >= other.min[i])
    }

    /// Returns true if `p` lies in the closed box.
    pub fn contains_point(&self, p: &Point3<f64>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    /// Shrinks the box to lie inside `outer`. Axes where the two do not
    /// overlap collapse onto the nearest face of `outer`.
    pub fn clamped_into(&self, outer: &Self) -> Self {
        let mut clamped = *self;
        for i in 0..3 {
            let lo = self.min[i].max(outer.min[i]).min(outer.max[i]);
            clamped.min[i] = lo;
            clamped.max[i] = self.max[i].min(outer.max[i]).max(lo);
        }
        clamped
    }

    /// Returns true if the segment `a`-`b` touches the closed box.
    pub fn intersects_segment(&self, a: &Point3<f64>, b: &Point3<f64>) -> bool {
        let d = b - a;
        let (mut enter, mut exit) = (0.0f64, 1.0f64);
        for i in 0..3 {
            if d[i] == 0.0 {
                if a[i] < self.min[i] || a[i] > self.max[i] {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / d[i];
            let mut near = (self.min[i] - a[i]) * inv;
            let mut far = (self.max[i] - a[i]) * inv;
            if near > far {
                std::mem::swap(&mut near, &mut far);
            }
            enter = enter.max(near);
            exit = exit.min(far);
            if enter > exit {
                return false;
            }
        }
        true
    }

    /// The eight corners; bit `i` of the corner index selects the max side on axis `i`.
    pub fn corners(&self) -> [Point3<f64>; 8] {
        std::array::from_fn(|c| {
            Point3::new(
                if c & 1 == 0 { self.min.x } else { self.max.x },
                if c & 2 == 0 { self.min.y } else { self.max.y },
                if c & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Bounds of one octant after bisecting at the center.
    ///
    /// Bit `i` of `octant` selects the low (0) or high (1) half on axis `i`.
    pub fn octant(&self, octant: usize) -> Self {
        let mid = self.center();
        let mut min = self.min;
        let mut max = self.max;
        for i in 0..3 {
            if octant & (1 << i) == 0 {
                max[i] = mid[i];
            } else {
                min[i] = mid[i];
            }
        }
        Self { min, max }
    }

    /// Splits the box with the plane `axis = position` into (low, high) halves.
    ///
    /// `position` is clamped into the box.
    pub fn split(&self, axis: Axis, position: f64) -> (Self, Self) {
        let i = axis.index();
        let at = position.max(self.min[i]).min(self.max[i]);
        let mut low = *self;
        let mut high = *self;
        low.max[i] = at;
        high.min[i] = at;
        (low, high)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}] x [{}, {}]",
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z
        )
    }
}

impl From<[f64; 6]> for Bounds {
    fn from(e: [f64; 6]) -> Self {
        Self::from_extents(e)
    }
}

impl From<Bounds> for [f64; 6] {
    fn from(b: Bounds) -> Self {
        b.extents()
    }
}
