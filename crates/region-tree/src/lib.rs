//! Axis-aligned region trees and exact convex-region intersection tests.
//!
//! This crate decomposes 3D space into a hierarchy of axis-aligned boxes,
//! split either by one plane per node ([`KdTree`]) or into octants
//! ([`Octree`]), and answers geometric questions about the regions:
//!
//! - Does a point, box, sphere or cell touch a region?
//! - How far is a point from a region's boundary?
//! - Which leaves does a convex polyhedron, such as a view frustum, reach?
//!
//! The convex polyhedron test lives in [`ConvexRegion`], which falls back to
//! 2D separating-axis tests over a [`ProjectedHull`] when plane
//! classification alone cannot decide.
//!
//! # Region trees
//!
//! ```
//! use region_tree::{Axis, Bounds, KdTree, Point3};
//!
//! let mut tree = KdTree::new(Bounds::from_extents([0.0, 10.0, 0.0, 10.0, 0.0, 10.0]))?;
//! tree.split_node(tree.root_id(), Axis::X, 4.0)?;
//! tree.assign_region_ids();
//!
//! let root = tree.root();
//! let d = root.distance_squared_to_boundary(&Point3::new(5.0, 5.0, 5.0), false, false).unwrap();
//! assert_eq!(d.distance_squared, 25.0);
//!
//! let leaf = tree.find_leaf(&Point3::new(7.0, 1.0, 1.0)).unwrap();
//! assert_eq!(tree.node(leaf)?.leaf_id(), Some(1));
//! # Ok::<(), region_tree::RegionError>(())
//! ```
//!
//! # Convex regions
//!
//! ```
//! use region_tree::{Bounds, ConvexRegion, PolyCell, Point3};
//!
//! let tetra = PolyCell::tetra([
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ]);
//! let region = ConvexRegion::from_cell(&tetra)?;
//!
//! assert!(region.intersects_box(&Bounds::from_extents([0.1, 0.2, 0.1, 0.2, 0.1, 0.2])));
//! assert!(!region.intersects_box(&Bounds::from_extents([0.6, 1.0, 0.6, 1.0, 0.0, 1.0])));
//! # Ok::<(), region_tree::RegionError>(())
//! ```
//!
//! # Tolerance
//!
//! Plane-side classification, singular plane triples and vertex
//! deduplication all use [`REGION_EPSILON`].

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod bounds;
mod cell;
mod convex;
mod error;
mod hull;
mod plane;
mod polygon;
mod rectangle;
pub mod region;

pub use bounds::{Axis, Bounds};
pub use cell::{Cell, CellKind, PolyCell, SurfaceLayout};
pub use convex::ConvexRegion;
pub use error::{RegionError, RegionResult};
pub use hull::ProjectedHull;
pub use plane::{BoxClassification, Plane3D, PlaneSide, REGION_EPSILON};
pub use polygon::Polygon;
pub use rectangle::Rectangle;
pub use region::{
    Binary, BoundaryDistance, KdTree, NodeId, NodeRef, Octant, Octree, Partition, RegionNode,
    RegionTree,
};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
