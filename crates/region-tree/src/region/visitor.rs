//! Visitor pattern for region tree traversal.
//!
//! Visitors receive nodes from [`RegionTree::traverse_depth_first`] and
//! [`RegionTree::traverse_intersecting`] without coupling the traversal to a
//! particular use.
//!
//! [`RegionTree::traverse_depth_first`]: super::RegionTree::traverse_depth_first
//! [`RegionTree::traverse_intersecting`]: super::RegionTree::traverse_intersecting

use super::node::NodeId;
use super::partition::Partition;
use super::query::NodeRef;

/// Visitor for processing nodes during region tree traversal.
///
/// Common uses include:
/// - Collecting the leaves inside a view frustum
/// - Summing point counts over a region
/// - Dumping the tree layout
pub trait RegionVisitor<P: Partition> {
    /// Called once for each visited node.
    fn visit(&mut self, node: NodeRef<'_, P>);
}

/// A simple visitor that collects the ids of visited nodes, in visit order.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    collected: Vec<NodeId>,
}

impl CollectingVisitor {
    /// Creates a new empty collecting visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected node ids.
    pub fn into_nodes(self) -> Vec<NodeId> {
        self.collected
    }

    /// Returns a reference to the collected node ids.
    pub fn nodes(&self) -> &[NodeId] {
        &self.collected
    }
}

impl<P: Partition> RegionVisitor<P> for CollectingVisitor {
    fn visit(&mut self, node: NodeRef<'_, P>) {
        self.collected.push(node.id());
    }
}

/// A visitor that calls a closure for each node.
pub struct FnVisitor<F> {
    func: F,
}

impl<F> FnVisitor<F> {
    /// Creates a new visitor from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<P, F> RegionVisitor<P> for FnVisitor<F>
where
    P: Partition,
    F: FnMut(NodeRef<'_, P>),
{
    fn visit(&mut self, node: NodeRef<'_, P>) {
        (self.func)(node);
    }
}
