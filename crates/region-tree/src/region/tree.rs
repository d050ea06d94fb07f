//! Region tree container, construction and traversal.

use std::fmt;
use std::marker::PhantomData;

use nalgebra::Point3;
use tracing::debug;

use crate::{Axis, Bounds, ConvexRegion, RegionError, RegionResult};

use super::node::{NodeId, RegionNode};
use super::partition::{Binary, Octant, Partition};
use super::query::{NodeRef, misuse};
use super::visitor::RegionVisitor;

/// A hierarchical decomposition of space into axis-aligned regions.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Every node owns
/// its child list; the parent link is a plain id used to walk back to the
/// root. The partition policy `P` fixes the branching factor and the
/// boundary convention of [`NodeRef::contains_point`].
///
/// # Construction
///
/// ```
/// use region_tree::{Axis, Bounds, KdTree};
///
/// let mut tree = KdTree::new(Bounds::from_extents([0.0, 10.0, 0.0, 10.0, 0.0, 10.0]))?;
/// let [left, _right] = tree.split_node(tree.root_id(), Axis::X, 4.0)?;
/// tree.split_node(left, Axis::Y, 5.0)?;
/// tree.assign_region_ids();
///
/// assert_eq!(tree.leaf_count(), 3);
/// assert_eq!(tree.split_position(tree.root_id())?, 4.0);
/// # Ok::<(), region_tree::RegionError>(())
/// ```
///
/// Queries go through [`RegionTree::node`] / [`RegionTree::get`], which hand
/// out a [`NodeRef`].
pub struct RegionTree<P: Partition> {
    nodes: Vec<Option<RegionNode>>,
    free: Vec<usize>,
    root: NodeId,
    policy: PhantomData<P>,
}

/// Region tree with binary splits and closed region bounds.
pub type KdTree = RegionTree<Binary>;

/// Region tree with octant splits and lower-exclusive region bounds.
pub type Octree = RegionTree<Octant>;

impl<P: Partition> RegionTree<P> {
    /// Creates a tree whose root covers `bounds`.
    ///
    /// # Errors
    /// [`RegionError::InvalidBounds`] if `min > max` on some axis.
    pub fn new(bounds: Bounds) -> RegionResult<Self> {
        bounds.validate()?;
        Ok(Self::with_root(RegionNode::new(bounds)))
    }

    /// Creates a tree from a prepared root node.
    pub fn with_root(mut root: RegionNode) -> Self {
        root.parent = None;
        root.children.clear();
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
            root: NodeId(0),
            policy: PhantomData,
        }
    }

    /// Id of the root node.
    #[inline]
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// The root node.
    pub fn root(&self) -> NodeRef<'_, P> {
        // The root slot is never freed.
        match self.get(self.root) {
            Some(root) => root,
            None => unreachable!("region tree lost its root"),
        }
    }

    /// Returns the node, or `None` if `id` is not a live node.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, P>> {
        let node = self.nodes.get(id.0)?.as_ref()?;
        Some(NodeRef::new(self, id, node))
    }

    /// Returns the node.
    ///
    /// # Errors
    /// [`RegionError::UnknownNode`] if `id` is not a live node.
    pub fn node(&self, id: NodeId) -> RegionResult<NodeRef<'_, P>> {
        self.get(id).ok_or_else(|| misuse(RegionError::UnknownNode(id)))
    }

    /// Mutable access to a node's region data.
    ///
    /// # Errors
    /// [`RegionError::UnknownNode`] if `id` is not a live node.
    pub fn node_mut(&mut self, id: NodeId) -> RegionResult<&mut RegionNode> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| misuse(RegionError::UnknownNode(id)))
    }

    pub(crate) fn raw(&self, id: NodeId) -> Option<&RegionNode> {
        self.nodes.get(id.0)?.as_ref()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().flatten().filter(|n| n.is_leaf()).count()
    }

    /// Number of levels; 1 for a tree that is only a root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((id, level)) = stack.pop() {
            depth = depth.max(level);
            if let Some(node) = self.raw(id) {
                stack.extend(node.children.iter().map(|&c| (c, level + 1)));
            }
        }
        depth
    }

    /// Returns child `index` of node `id`.
    ///
    /// # Errors
    /// [`RegionError::ChildIndexOutOfRange`] past the last child (any index
    /// on a leaf), [`RegionError::UnknownNode`] for a dead id.
    pub fn child(&self, id: NodeId, index: usize) -> RegionResult<NodeId> {
        self.node(id)?.child(index).map(NodeRef::id)
    }

    /// Position of the plane splitting a binary node: the lower bound of its
    /// second child along the split axis.
    ///
    /// # Errors
    /// [`RegionError::NotSplit`] on leaves and on nodes without a split axis.
    pub fn split_position(&self, id: NodeId) -> RegionResult<f64> {
        self.node(id)?.split_position()
    }

    fn insert(&mut self, node: RegionNode) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Replaces the children of `id` with `children`, in partition order.
    ///
    /// Existing children and their subtrees are deleted first. The new nodes'
    /// own child lists are ignored; they enter the tree as leaves. The parent
    /// loses its leaf id.
    ///
    /// # Errors
    /// [`RegionError::ChildCount`] unless exactly `P::BRANCHING` nodes are
    /// given, [`RegionError::UnknownNode`] for a dead id. On error the tree is
    /// unchanged.
    pub fn add_child_nodes(
        &mut self,
        id: NodeId,
        children: Vec<RegionNode>,
    ) -> RegionResult<Vec<NodeId>> {
        if children.len() != P::BRANCHING {
            return Err(misuse(RegionError::ChildCount {
                expected: P::BRANCHING,
                got: children.len(),
            }));
        }
        if self.raw(id).is_none() {
            return Err(misuse(RegionError::UnknownNode(id)));
        }
        self.delete_child_nodes(id)?;

        let ids: Vec<NodeId> = children
            .into_iter()
            .map(|mut child| {
                child.parent = Some(id);
                child.children.clear();
                self.insert(child)
            })
            .collect();

        let parent = self.node_mut(id)?;
        parent.children.clone_from(&ids);
        parent.set_leaf_id(None);
        debug!(policy = P::NAME, parent = id.0, children = ids.len(), "added child nodes");
        Ok(ids)
    }

    /// Deletes the children of `id` and all their descendants; `id` becomes
    /// a leaf.
    ///
    /// # Errors
    /// [`RegionError::UnknownNode`] for a dead id.
    pub fn delete_child_nodes(&mut self, id: NodeId) -> RegionResult<()> {
        let node = self.node_mut(id)?;
        let mut stack = std::mem::take(&mut node.children);
        node.set_split_axis(None);

        let mut removed = 0;
        while let Some(child) = stack.pop() {
            if let Some(mut node) = self.nodes.get_mut(child.0).and_then(Option::take) {
                node.parent = None;
                stack.append(&mut node.children);
                self.free.push(child.0);
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(policy = P::NAME, parent = id.0, removed, "deleted child nodes");
        }
        Ok(())
    }

    /// Numbers the leaves depth-first from 0 and records on every node the
    /// range of leaf ids below it. Returns the number of leaves.
    pub fn assign_region_ids(&mut self) -> usize {
        let mut next = 0;
        self.assign_ids_below(self.root, &mut next);
        debug!(policy = P::NAME, leaves = next, "assigned region ids");
        next
    }

    fn assign_ids_below(&mut self, id: NodeId, next: &mut usize) {
        let Some(children) = self.raw(id).map(|n| n.children.clone()) else {
            return;
        };
        let first = *next;
        if children.is_empty() {
            *next += 1;
        } else {
            for child in children {
                self.assign_ids_below(child, next);
            }
        }
        if let Ok(node) = self.node_mut(id) {
            let last = next.saturating_sub(1).max(first);
            node.set_id_range(first, last);
            node.set_leaf_id(node.is_leaf().then_some(first));
        }
    }

    /// Id of the node with leaf id `leaf_id`.
    pub fn leaf_by_id(&self, leaf_id: usize) -> Option<NodeId> {
        let mut id = self.root;
        loop {
            let node = self.raw(id)?;
            if node.is_leaf() {
                return (node.leaf_id() == Some(leaf_id)).then_some(id);
            }
            id = node.children.iter().copied().find(|&c| {
                self.raw(c)
                    .and_then(RegionNode::id_range)
                    .is_some_and(|r| r.contains(&leaf_id))
            })?;
        }
    }

    /// The leaf whose region contains `point`, under the tree's boundary
    /// convention. `None` if the root does not contain the point.
    pub fn find_leaf(&self, point: &Point3<f64>) -> Option<NodeId> {
        let mut current = self.root();
        if !current.contains_point(point, false) {
            return None;
        }
        while !current.is_leaf() {
            current = current.children().find(|c| c.contains_point(point, false))?;
        }
        Some(current.id())
    }

    /// Visits every node depth-first, parents before children.
    pub fn traverse_depth_first<V: RegionVisitor<P>>(&self, visitor: &mut V) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                visitor.visit(node);
                stack.extend(node.node().children.iter().rev());
            }
        }
    }

    /// Visits every leaf whose region intersects `region`, pruning subtrees
    /// whose region does not.
    pub fn traverse_intersecting<V: RegionVisitor<P>>(
        &self,
        region: &ConvexRegion,
        use_data_bounds: bool,
        visitor: &mut V,
    ) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            if !node.intersects_region(region, use_data_bounds) {
                continue;
            }
            if node.is_leaf() {
                visitor.visit(node);
            } else {
                stack.extend(node.node().children.iter().rev());
            }
        }
    }
}

impl RegionTree<Binary> {
    /// Splits `id` with the plane `axis = position` into a low and a high
    /// child, replacing any existing children. The data bounds are cut at the
    /// same plane and each half is kept inside its child's bounds.
    ///
    /// # Errors
    /// [`RegionError::UnknownNode`] for a dead id,
    /// [`RegionError::SplitOutOfRange`] if `position` is not within the
    /// node's bounds on `axis`.
    pub fn split_node(&mut self, id: NodeId, axis: Axis, position: f64) -> RegionResult<[NodeId; 2]> {
        let node = self.node(id)?.node();
        let (min, max) = (node.bounds().min_on(axis), node.bounds().max_on(axis));
        if !(min <= position && position <= max) {
            return Err(misuse(RegionError::SplitOutOfRange { axis, position, min, max }));
        }
        let (low, high) = node.bounds().split(axis, position);
        let (low_data, high_data) = node.data_bounds().split(axis, position);

        let ids = self.add_child_nodes(
            id,
            vec![
                RegionNode::new(low).with_data_bounds(low_data.clamped_into(&low)),
                RegionNode::new(high).with_data_bounds(high_data.clamped_into(&high)),
            ],
        )?;
        self.node_mut(id)?.set_split_axis(Some(axis));
        Ok([ids[0], ids[1]])
    }
}

impl RegionTree<Octant> {
    /// Bisects `id` at its center along all three axes.
    ///
    /// Child `i` covers the low half on axis `k` when bit `k` of `i` is
    /// clear and the high half when it is set.
    ///
    /// # Errors
    /// [`RegionError::UnknownNode`] for a dead id.
    pub fn create_child_nodes(&mut self, id: NodeId) -> RegionResult<[NodeId; 8]> {
        let bounds = *self.node(id)?.bounds();
        let children = (0..8).map(|i| RegionNode::new(bounds.octant(i))).collect();
        let ids = self.add_child_nodes(id, children)?;
        Ok(std::array::from_fn(|i| ids[i]))
    }

    /// Index of the child octant of `id` that contains `point`, by comparing
    /// against the node's center. With `check_containment`, `None` is returned
    /// for points outside the node.
    ///
    /// # Errors
    /// [`RegionError::UnknownNode`] for a dead id.
    pub fn sub_octant_index(
        &self,
        id: NodeId,
        point: &Point3<f64>,
        check_containment: bool,
    ) -> RegionResult<Option<usize>> {
        let node = self.node(id)?;
        if check_containment && !node.contains_point(point, false) {
            return Ok(None);
        }
        let center = node.bounds().center();
        Ok(Some((0..3).fold(0, |index, axis| {
            if point[axis] > center[axis] {
                index | (1 << axis)
            } else {
                index
            }
        })))
    }
}

impl<P: Partition> fmt::Debug for RegionTree<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionTree")
            .field("policy", &P::NAME)
            .field("root", &self.root)
            .field("nodes", &self.node_count())
            .finish()
    }
}

impl<P: Partition> Clone for RegionTree<P> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            free: self.free.clone(),
            root: self.root,
            policy: PhantomData,
        }
    }
}

/// Indented outline of the tree, one node per line.
impl<P: Partition> fmt::Display for RegionTree<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, level)) = stack.pop() {
            let Some(node) = self.raw(id) else {
                continue;
            };
            write!(f, "{:indent$}{} {}", "", id.0, node.bounds(), indent = level * 2)?;
            if let Some(leaf) = node.leaf_id() {
                write!(f, " leaf {leaf}")?;
            }
            if let Some(axis) = node.split_axis() {
                write!(f, " split {axis:?}")?;
            }
            writeln!(f, " points {}", node.point_count())?;
            stack.extend(node.children.iter().rev().map(|&c| (c, level + 1)));
        }
        Ok(())
    }
}
