//! Region tree node storage.

use std::ops::RangeInclusive;

use crate::{Axis, Bounds, RegionError, RegionResult};

/// Handle of a node in a [`RegionTree`](super::RegionTree) arena.
///
/// Ids of deleted nodes may be handed out again by later insertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One axis-aligned region of a region tree.
///
/// A node is either a leaf, carrying a leaf id and the points of its region,
/// or an internal node whose children partition its bounds. The tree links
/// (`parent`, `children`) are maintained by the tree and are read-only here.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionNode {
    /// Spatial extent of the region.
    bounds: Bounds,

    /// Tight bounds of the data inside the region; within `bounds`.
    data_bounds: Bounds,

    /// Number of points in the region.
    point_count: usize,

    /// Leaf id, present only on leaves that have been numbered.
    leaf_id: Option<usize>,

    /// Range of leaf ids under this node.
    id_range: Option<(usize, usize)>,

    /// Split axis of a binary internal node.
    split_axis: Option<Axis>,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl RegionNode {
    /// Creates a detached leaf node whose data bounds equal its bounds.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            data_bounds: bounds,
            point_count: 0,
            leaf_id: None,
            id_range: None,
            split_axis: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Sets the data bounds. Unchecked: the caller keeps them inside the
    /// region bounds.
    pub fn with_data_bounds(mut self, data_bounds: Bounds) -> Self {
        self.data_bounds = data_bounds;
        self
    }

    /// Sets the point count.
    pub fn with_point_count(mut self, point_count: usize) -> Self {
        self.point_count = point_count;
        self
    }

    /// Spatial extent of the region.
    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Sets the spatial extent; the value reads back exactly. The data bounds
    /// are left as they are.
    ///
    /// # Errors
    /// [`RegionError::InvalidBounds`](crate::RegionError::InvalidBounds) if
    /// `min > max` on some axis.
    pub fn set_bounds(&mut self, bounds: Bounds) -> RegionResult<()> {
        bounds.validate()?;
        self.bounds = bounds;
        Ok(())
    }

    /// Tight bounds of the contained data.
    #[inline]
    pub fn data_bounds(&self) -> &Bounds {
        &self.data_bounds
    }

    /// Sets the data bounds; the value reads back exactly.
    ///
    /// # Errors
    /// [`RegionError::InvalidBounds`](crate::RegionError::InvalidBounds) if
    /// `min > max` on some axis,
    /// [`RegionError::DataOutsideBounds`](crate::RegionError::DataOutsideBounds)
    /// if they are not inside the region bounds.
    pub fn set_data_bounds(&mut self, data_bounds: Bounds) -> RegionResult<()> {
        data_bounds.validate()?;
        if !self.bounds.contains_box(&data_bounds) {
            return Err(RegionError::DataOutsideBounds {
                data: data_bounds,
                bounds: self.bounds,
            });
        }
        self.data_bounds = data_bounds;
        Ok(())
    }

    /// Bounds used by a query: the data bounds or the full region.
    #[inline]
    pub fn query_bounds(&self, use_data_bounds: bool) -> &Bounds {
        if use_data_bounds {
            &self.data_bounds
        } else {
            &self.bounds
        }
    }

    /// Number of points in the region.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Sets the number of points in the region.
    #[inline]
    pub fn set_point_count(&mut self, point_count: usize) {
        self.point_count = point_count;
    }

    /// Leaf id, `None` for internal nodes and unnumbered leaves.
    #[inline]
    pub fn leaf_id(&self) -> Option<usize> {
        self.leaf_id
    }

    /// Leaf ids of the leaves under this node, inclusive.
    pub fn id_range(&self) -> Option<RangeInclusive<usize>> {
        self.id_range.map(|(min, max)| min..=max)
    }

    /// Smallest leaf id under this node.
    #[inline]
    pub fn min_id(&self) -> Option<usize> {
        self.id_range.map(|(min, _)| min)
    }

    /// Largest leaf id under this node.
    #[inline]
    pub fn max_id(&self) -> Option<usize> {
        self.id_range.map(|(_, max)| max)
    }

    /// Sets the leaf id range covered by this node.
    ///
    /// The bounds are swapped if given in reverse.
    pub fn set_id_range(&mut self, min_id: usize, max_id: usize) {
        self.id_range = Some((min_id.min(max_id), min_id.max(max_id)));
    }

    pub(crate) fn set_leaf_id(&mut self, leaf_id: Option<usize>) {
        self.leaf_id = leaf_id;
    }

    /// Split axis of a binary internal node; `None` on leaves and octants.
    #[inline]
    pub fn split_axis(&self) -> Option<Axis> {
        self.split_axis
    }

    pub(crate) fn set_split_axis(&mut self, axis: Option<Axis>) {
        self.split_axis = axis;
    }

    /// The parent node, `None` at the root.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in partition order.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
