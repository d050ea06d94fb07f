//! Partition policies for region trees.
//!
//! A policy fixes how many children an internal node has and whether a
//! region's lower bound belongs to it. The two trees in use disagree on the
//! latter:
//!
//! - [`Binary`] (k-d style splits) treats every interval as closed,
//!   `min <= v <= max`.
//! - [`Octant`] (octree splits) treats intervals as half-open,
//!   `min < v <= max`.
//!
//! The difference decides which of two adjacent regions owns a point lying
//! exactly on their shared face, so it is kept per tree type instead of being
//! normalized.

/// Branching factor and boundary convention of a region tree.
pub trait Partition {
    /// Number of children of every internal node.
    const BRANCHING: usize;

    /// Short name used in log output.
    const NAME: &'static str;

    /// Returns true if `value` lies within `[min, max]` under this policy's
    /// boundary convention.
    fn contains_coordinate(min: f64, max: f64, value: f64) -> bool;
}

/// Binary split along one axis; closed intervals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Binary;

impl Partition for Binary {
    const BRANCHING: usize = 2;
    const NAME: &'static str = "binary";

    #[inline]
    fn contains_coordinate(min: f64, max: f64, value: f64) -> bool {
        min <= value && value <= max
    }
}

/// Octant split at the midpoint of all three axes; lower bound exclusive,
/// upper bound inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Octant;

impl Partition for Octant {
    const BRANCHING: usize = 8;
    const NAME: &'static str = "octant";

    #[inline]
    fn contains_coordinate(min: f64, max: f64, value: f64) -> bool {
        min < value && value <= max
    }
}
