//! Error types for region and tree operations.

use crate::{Axis, Bounds, NodeId};

/// Errors reported by region trees and convex regions.
///
/// Geometric queries that hit one of these conditions still answer with a
/// conservative value (`false` for intersection tests, `None` for distances);
/// the `try_*` variants surface the error itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum RegionError {
    /// A convex region needs at least four planes to enclose a volume.
    #[error("convex region has {0} planes, at least 4 are required")]
    TooFewPlanes(usize),

    /// The planes of a convex region do not enclose a positive volume.
    #[error("convex region is degenerate: {vertices} feasible vertices")]
    DegenerateRegion {
        /// Number of feasible vertices found.
        vertices: usize,
    },

    /// A plane normal has (near) zero length.
    #[error("plane normal has zero length")]
    DegenerateNormal,

    /// A cell face has no three non-collinear vertices.
    #[error("face {face} of the cell has no three non-collinear vertices")]
    DegenerateFace {
        /// Index of the offending face.
        face: usize,
    },

    /// A plane index past the end of a convex region's plane list.
    #[error("plane index {index} out of range for a region with {count} planes")]
    PlaneIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of planes in the region.
        count: usize,
    },

    /// A cell handed to a solid conversion has no faces.
    #[error("cell has no faces")]
    NoFaces,

    /// Bounds with `min > max` on some axis (or NaN extents).
    #[error("invalid bounds on {axis:?}: min {min} > max {max}")]
    InvalidBounds {
        /// Axis whose interval is inverted.
        axis: Axis,
        /// Lower extent.
        min: f64,
        /// Upper extent.
        max: f64,
    },

    /// Data bounds that are not inside the region bounds.
    #[error("data bounds {data} are not inside region bounds {bounds}")]
    DataOutsideBounds {
        /// Rejected data bounds.
        data: Bounds,
        /// Bounds of the region.
        bounds: Bounds,
    },

    /// A split plane outside the node's interval on the split axis.
    #[error("split at {position} on {axis:?} is outside [{min}, {max}]")]
    SplitOutOfRange {
        /// Split axis.
        axis: Axis,
        /// Requested split position.
        position: f64,
        /// Lower bound of the node on `axis`.
        min: f64,
        /// Upper bound of the node on `axis`.
        max: f64,
    },

    /// The node is a leaf, so it has no split.
    #[error("node {0:?} is a leaf and has no split")]
    NotSplit(NodeId),

    /// A child index past the branching factor, or on a leaf.
    #[error("child index {index} out of range for node {node:?} with {count} children")]
    ChildIndexOutOfRange {
        /// Node that was queried.
        node: NodeId,
        /// Requested index.
        index: usize,
        /// Number of children the node has.
        count: usize,
    },

    /// A child set whose size does not match the branching factor.
    #[error("expected {expected} child nodes, got {got}")]
    ChildCount {
        /// Branching factor of the tree.
        expected: usize,
        /// Number of nodes supplied.
        got: usize,
    },

    /// The id does not name a live node of this tree.
    #[error("no node with id {0:?}")]
    UnknownNode(NodeId),
}

/// Result type for region operations.
pub type RegionResult<T> = Result<T, RegionError>;
