//! Hierarchical axis-aligned region trees.
//!
//! A region tree recursively partitions a box into child boxes, either by a
//! single plane (k-d style) or at the center along all three axes (octree
//! style). Leaves are numbered depth-first so that every node knows the range
//! of leaf ids below it. The tree answers:
//!
//! - Point containment and leaf lookup
//! - Distance from a point to a region boundary, optionally to inner faces only
//! - Box, sphere, convex region and cell intersection
//!
//! # Example
//!
//! ```
//! use region_tree::{Bounds, ConvexRegion, Octree, PolyCell};
//! use region_tree::region::CollectingVisitor;
//! use nalgebra::Point3;
//!
//! let mut tree = Octree::new(Bounds::from_extents([0.0, 8.0, 0.0, 8.0, 0.0, 8.0]))?;
//! tree.create_child_nodes(tree.root_id())?;
//! tree.assign_region_ids();
//!
//! // Leaves seen by a small frustum.
//! let frustum = ConvexRegion::from_bounds(&Bounds::from_extents([1.0, 5.0, 1.0, 2.0, 1.0, 2.0]));
//! let mut visitor = CollectingVisitor::new();
//! tree.traverse_intersecting(&frustum, false, &mut visitor);
//! assert_eq!(visitor.nodes().len(), 2);
//!
//! // Cell intersection against a leaf.
//! let leaf = tree.find_leaf(&Point3::new(1.0, 1.0, 1.0)).unwrap();
//! let line = PolyCell::line(Point3::new(-1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0));
//! assert!(tree.node(leaf)?.intersects_cell(&line, false, None, None));
//! # Ok::<(), region_tree::RegionError>(())
//! ```
//!
//! # Architecture
//!
//! - [`RegionTree`]: arena of nodes, construction and traversal
//! - [`RegionNode`]: bounds, data bounds and leaf ids of one region
//! - [`NodeRef`]: a node plus its tree, carrying the geometric queries
//! - [`Partition`]: branching factor and boundary convention ([`Binary`], [`Octant`])
//! - [`RegionVisitor`]: visitor trait for custom traversal behavior

mod node;
mod partition;
mod query;
mod tree;
mod visitor;

pub use node::{NodeId, RegionNode};
pub use partition::{Binary, Octant, Partition};
pub use query::{BoundaryDistance, NodeRef};
pub use tree::{KdTree, Octree, RegionTree};
pub use visitor::{CollectingVisitor, FnVisitor, RegionVisitor};
