//! Geometric queries on region tree nodes.

use std::fmt;
use std::ops::Deref;

use nalgebra::Point3;
use tracing::warn;

use crate::{
    Axis, Bounds, Cell, CellKind, ConvexRegion, Polygon, RegionError, RegionResult, SurfaceLayout,
};

use super::node::{NodeId, RegionNode};
use super::partition::Partition;
use super::tree::RegionTree;

/// Squared distance from a point to a region boundary, and where it is
/// reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryDistance {
    /// Squared Euclidean distance.
    pub distance_squared: f64,
    /// Closest point on the boundary.
    pub closest: Point3<f64>,
}

/// Position of a coordinate relative to an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Below,
    Within,
    Above,
}

impl Side {
    fn of(value: f64, min: f64, max: f64) -> Self {
        if value < min {
            Self::Below
        } else if value > max {
            Self::Above
        } else {
            Self::Within
        }
    }
}

pub(super) fn misuse(err: RegionError) -> RegionError {
    warn!(%err, "invalid region tree query");
    err
}

/// A node of a [`RegionTree`] together with the tree it lives in.
///
/// Dereferences to the node's [`RegionNode`] data; the methods defined here
/// need the tree, either to navigate or because the answer depends on the
/// tree's [`Partition`] policy.
pub struct NodeRef<'a, P: Partition> {
    tree: &'a RegionTree<P>,
    id: NodeId,
    node: &'a RegionNode,
}

impl<P: Partition> Clone for NodeRef<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Partition> Copy for NodeRef<'_, P> {}

impl<P: Partition> fmt::Debug for NodeRef<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("node", self.node)
            .finish()
    }
}

impl<P: Partition> Deref for NodeRef<'_, P> {
    type Target = RegionNode;

    fn deref(&self) -> &RegionNode {
        self.node
    }
}

impl<'a, P: Partition> NodeRef<'a, P> {
    pub(crate) fn new(tree: &'a RegionTree<P>, id: NodeId, node: &'a RegionNode) -> Self {
        Self { tree, id, node }
    }

    /// Id of this node.
    #[inline]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// The node data, with the tree's lifetime.
    #[inline]
    pub fn node(self) -> &'a RegionNode {
        self.node
    }

    /// The tree this node belongs to.
    #[inline]
    pub fn tree(self) -> &'a RegionTree<P> {
        self.tree
    }

    /// The parent node, `None` at the root.
    pub fn parent(self) -> Option<Self> {
        self.tree.get(self.node.parent?)
    }

    /// Child nodes in partition order; empty for a leaf.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'a, P>> {
        let tree = self.tree;
        self.node.children.iter().filter_map(move |&id| tree.get(id))
    }

    /// Child `index`.
    ///
    /// # Errors
    /// [`RegionError::ChildIndexOutOfRange`] past the last child.
    pub fn child(self, index: usize) -> RegionResult<Self> {
        self.node
            .children
            .get(index)
            .and_then(|&id| self.tree.get(id))
            .ok_or_else(|| {
                misuse(RegionError::ChildIndexOutOfRange {
                    node: self.id,
                    index,
                    count: self.node.children.len(),
                })
            })
    }

    /// The root of the tree, found through the parent links.
    pub fn root(self) -> Self {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Number of edges between this node and the root.
    pub fn level(self) -> usize {
        std::iter::successors(self.parent(), |n| n.parent()).count()
    }

    /// Position of the splitting plane of a binary node: the lower bound of
    /// the second child along the split axis.
    ///
    /// # Errors
    /// [`RegionError::NotSplit`] on leaves and on nodes split without an axis.
    pub fn split_position(self) -> RegionResult<f64> {
        let axis = match self.node.split_axis() {
            Some(axis) if !self.node.is_leaf() => axis,
            _ => return Err(misuse(RegionError::NotSplit(self.id))),
        };
        Ok(self.child(1)?.bounds().min_on(axis))
    }

    /// Returns true if `point` is inside the region under the tree's
    /// boundary convention.
    pub fn contains_point(&self, point: &Point3<f64>, use_data_bounds: bool) -> bool {
        let b = self.node.query_bounds(use_data_bounds);
        Axis::ALL
            .into_iter()
            .all(|axis| P::contains_coordinate(b.min_on(axis), b.max_on(axis), point[axis.index()]))
    }

    /// Returns true if `bounds` lies entirely inside the region.
    pub fn contains_box(&self, bounds: &Bounds, use_data_bounds: bool) -> bool {
        self.node.query_bounds(use_data_bounds).contains_box(bounds)
    }

    /// Returns true if `bounds` overlaps the region (touching counts).
    pub fn intersects_box(&self, bounds: &Bounds, use_data_bounds: bool) -> bool {
        self.node.query_bounds(use_data_bounds).intersects(bounds)
    }

    /// Squared distance from `point` to the region boundary, with the closest
    /// boundary point.
    ///
    /// For a point outside the region the closest point is the nearest point
    /// of the box: on a face, an edge or a corner depending on how many of
    /// the point's coordinates fall inside the region's intervals.
    ///
    /// For a point inside, it is the nearest face, ties going to the first
    /// of x-min, x-max, y-min, y-max, z-min, z-max. With `inner_only`, faces
    /// lying on the boundary of the root region are skipped; `None` is
    /// returned when every face is skipped.
    pub fn distance_squared_to_boundary(
        &self,
        point: &Point3<f64>,
        inner_only: bool,
        use_data_bounds: bool,
    ) -> Option<BoundaryDistance> {
        let bounds = self.node.query_bounds(use_data_bounds);
        let sides = Axis::ALL.map(|a| Side::of(point[a.index()], bounds.min_on(a), bounds.max_on(a)));
        if sides.iter().all(|&s| s == Side::Within) {
            return self.distance_to_nearest_face(point, bounds, inner_only, use_data_bounds);
        }

        let mut closest = *point;
        for (axis, side) in Axis::ALL.into_iter().zip(sides) {
            match side {
                Side::Below => closest[axis.index()] = bounds.min_on(axis),
                Side::Above => closest[axis.index()] = bounds.max_on(axis),
                Side::Within => {}
            }
        }
        Some(BoundaryDistance {
            distance_squared: nalgebra::distance_squared(point, &closest),
            closest,
        })
    }

    fn distance_to_nearest_face(
        &self,
        point: &Point3<f64>,
        bounds: &Bounds,
        inner_only: bool,
        use_data_bounds: bool,
    ) -> Option<BoundaryDistance> {
        let outer = inner_only.then(|| *self.root().node.query_bounds(use_data_bounds));

        let mut best: Option<(f64, Axis, f64)> = None;
        for axis in Axis::ALL {
            let faces = [
                (bounds.min_on(axis), outer.map(|o| o.min_on(axis))),
                (bounds.max_on(axis), outer.map(|o| o.max_on(axis))),
            ];
            for (face, outer_face) in faces {
                if outer_face == Some(face) {
                    continue;
                }
                let d = (point[axis.index()] - face).abs();
                if best.is_none_or(|(nearest, ..)| d < nearest) {
                    best = Some((d, axis, face));
                }
            }
        }

        let (d, axis, face) = best?;
        let mut closest = *point;
        closest[axis.index()] = face;
        Some(BoundaryDistance {
            distance_squared: d * d,
            closest,
        })
    }

    /// [`NodeRef::distance_squared_to_boundary`] to faces shared with
    /// neighbouring regions, using the full region bounds.
    pub fn distance_squared_to_inner_boundary(&self, point: &Point3<f64>) -> Option<BoundaryDistance> {
        self.distance_squared_to_boundary(point, true, false)
    }

    /// Returns true if the sphere around `center` with squared radius
    /// `radius_squared` reaches into the region.
    pub fn intersects_sphere2(&self, center: &Point3<f64>, radius_squared: f64, use_data_bounds: bool) -> bool {
        self.contains_point(center, use_data_bounds)
            || self
                .distance_squared_to_boundary(center, false, use_data_bounds)
                .is_some_and(|d| d.distance_squared < radius_squared)
    }

    /// Returns true if the region overlaps a convex region, such as a view
    /// frustum.
    pub fn intersects_region(&self, region: &ConvexRegion, use_data_bounds: bool) -> bool {
        region.intersects_box(self.node.query_bounds(use_data_bounds))
    }

    /// Returns true if `cell` overlaps the region.
    ///
    /// `cell_region` is the leaf id of the region the cell is known to be
    /// assigned to and `cell_bounds` its precomputed bounds; both only save
    /// work. Degenerate solids and polygons are logged and count as not
    /// intersecting.
    pub fn intersects_cell<C: Cell + ?Sized>(
        &self,
        cell: &C,
        use_data_bounds: bool,
        cell_region: Option<usize>,
        cell_bounds: Option<&Bounds>,
    ) -> bool {
        if let (Some(id), Some(range)) = (cell_region, self.node.id_range()) {
            if range.contains(&id) {
                return true;
            }
        }

        let Some(cell_bounds) = cell_bounds.copied().or_else(|| cell.bounds()) else {
            return false;
        };
        if !self.intersects_box(&cell_bounds, use_data_bounds) {
            return false;
        }
        if self.contains_box(&cell_bounds, use_data_bounds) {
            return true;
        }

        let points = cell.points();
        if points.iter().any(|p| self.contains_point(p, use_data_bounds)) {
            return true;
        }

        let bounds = self.node.query_bounds(use_data_bounds);
        match cell.kind() {
            CellKind::PointSet => false,
            CellKind::Curve => points.windows(2).any(|s| bounds.intersects_segment(&s[0], &s[1])),
            CellKind::Surface(SurfaceLayout::Polygon) => {
                polygon_intersects(&Polygon::from(points), bounds)
            }
            CellKind::Surface(SurfaceLayout::TriangleStrip) => points
                .windows(3)
                .any(|t| polygon_intersects(&Polygon::from(t), bounds)),
            CellKind::Solid => match ConvexRegion::from_cell(cell) {
                Ok(region) => region.intersects_box(bounds),
                Err(err) => {
                    warn!(%err, "solid cell treated as not intersecting");
                    false
                }
            },
        }
    }
}

fn polygon_intersects(polygon: &Polygon, bounds: &Bounds) -> bool {
    ConvexRegion::polygon_intersects_box(polygon, bounds).unwrap_or_else(|err| {
        warn!(%err, "polygon treated as not intersecting");
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KdTree, Octree, PolyCell};
    use approx::assert_relative_eq;

    fn ten() -> Bounds {
        Bounds::from_extents([0.0, 10.0, 0.0, 10.0, 0.0, 10.0])
    }

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    fn single() -> KdTree {
        let mut tree = KdTree::new(ten()).unwrap();
        tree.assign_region_ids();
        tree
    }

    #[test]
    fn boxes_inside_are_contained_and_intersect() {
        let tree = single();
        let root = tree.root();
        for e in [
            [0.0, 10.0, 0.0, 10.0, 0.0, 10.0],
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            [0.0, 0.0, 5.0, 5.0, 10.0, 10.0],
        ] {
            let b = Bounds::from_extents(e);
            assert!(root.contains_box(&b, false), "{b}");
            assert!(root.intersects_box(&b, false), "{b}");
        }
    }

    #[test]
    fn boxes_apart_on_one_axis_do_not_intersect() {
        let tree = single();
        let root = tree.root();
        for e in [
            [10.5, 12.0, 0.0, 10.0, 0.0, 10.0],
            [2.0, 3.0, -5.0, -0.1, 2.0, 3.0],
            [-1.0, 11.0, -1.0, 11.0, 11.0, 12.0],
        ] {
            assert!(!root.intersects_box(&Bounds::from_extents(e), false));
        }
    }

    #[test]
    fn center_is_five_from_every_face() {
        let tree = single();
        let d = tree.root().distance_squared_to_boundary(&p(5.0, 5.0, 5.0), false, false).unwrap();
        assert_eq!(d.distance_squared, 25.0);
        // Ties go to x-min.
        assert_eq!(d.closest, p(0.0, 5.0, 5.0));
    }

    #[test]
    fn inside_point_projects_to_nearest_face() {
        let tree = single();
        let d = tree.root().distance_squared_to_boundary(&p(5.0, 9.0, 3.0), false, false).unwrap();
        assert_relative_eq!(d.distance_squared, 1.0);
        assert_eq!(d.closest, p(5.0, 10.0, 3.0));
    }

    #[test]
    fn outside_points_reach_face_edge_and_corner() {
        let tree = single();
        let root = tree.root();

        let face = root.distance_squared_to_boundary(&p(5.0, 5.0, 13.0), false, false).unwrap();
        assert_eq!(face.closest, p(5.0, 5.0, 10.0));
        assert_relative_eq!(face.distance_squared, 9.0);

        let edge = root.distance_squared_to_boundary(&p(-3.0, 5.0, 14.0), false, false).unwrap();
        assert_eq!(edge.closest, p(0.0, 5.0, 10.0));
        assert_relative_eq!(edge.distance_squared, 25.0);

        let corner = root.distance_squared_to_boundary(&p(-1.0, 12.0, -2.0), false, false).unwrap();
        assert_eq!(corner.closest, p(0.0, 10.0, 0.0));
        assert_relative_eq!(corner.distance_squared, 9.0);
    }

    #[test]
    fn inner_boundary_skips_outer_faces() {
        let mut tree = KdTree::new(ten()).unwrap();
        let [left, _] = tree.split_node(tree.root_id(), Axis::X, 4.0).unwrap();

        // The root has no inner faces.
        assert_eq!(tree.root().distance_squared_to_inner_boundary(&p(5.0, 5.0, 5.0)), None);

        // The x = 4 split is the only inner face of the left half.
        let left = tree.node(left).unwrap();
        let d = left.distance_squared_to_inner_boundary(&p(1.0, 0.5, 9.5)).unwrap();
        assert_relative_eq!(d.distance_squared, 9.0);
        assert_eq!(d.closest, p(4.0, 0.5, 9.5));

        // Outer faces still count without the flag.
        let d = left.distance_squared_to_boundary(&p(1.0, 0.5, 9.5), false, false).unwrap();
        assert_relative_eq!(d.distance_squared, 0.25);
    }

    #[test]
    fn inner_boundary_with_data_bounds_uses_root_data_faces() {
        let mut tree = KdTree::new(ten()).unwrap();
        let root = tree.root_id();
        let data = Bounds::from_extents([1.0, 9.0, 1.0, 9.0, 1.0, 9.0]);
        tree.node_mut(root).unwrap().set_data_bounds(data).unwrap();
        let [left, _] = tree.split_node(root, Axis::X, 4.0).unwrap();
        let left_data = Bounds::from_extents([1.0, 4.0, 2.0, 9.0, 1.0, 9.0]);
        tree.node_mut(left).unwrap().set_data_bounds(left_data).unwrap();

        // y = 2 differs from the root's data face at y = 1, so it is inner.
        let left = tree.node(left).unwrap();
        let d = left.distance_squared_to_boundary(&p(2.0, 2.5, 5.0), true, true).unwrap();
        assert_relative_eq!(d.distance_squared, 0.25);
        assert_eq!(d.closest, p(2.0, 2.0, 5.0));

        // On full bounds only the split face is inner.
        let d = left.distance_squared_to_boundary(&p(2.0, 2.5, 5.0), true, false).unwrap();
        assert_relative_eq!(d.distance_squared, 4.0);
        assert_eq!(d.closest, p(4.0, 2.5, 5.0));
    }

    #[test]
    fn octant_inner_faces_are_the_upper_ones() {
        let mut tree = Octree::new(ten()).unwrap();
        let children = tree.create_child_nodes(tree.root_id()).unwrap();
        let low = tree.node(children[0]).unwrap();
        let d = low.distance_squared_to_inner_boundary(&p(4.0, 1.0, 2.0)).unwrap();
        assert_relative_eq!(d.distance_squared, 1.0);
        assert_eq!(d.closest, p(5.0, 1.0, 2.0));

        let high = tree.node(children[7]).unwrap();
        let d = high.distance_squared_to_inner_boundary(&p(6.0, 9.0, 8.0)).unwrap();
        assert_relative_eq!(d.distance_squared, 1.0);
        assert_eq!(d.closest, p(5.0, 9.0, 8.0));
    }

    #[test]
    fn point_on_a_shared_face_is_at_distance_zero() {
        let mut tree = KdTree::new(ten()).unwrap();
        let [left, right] = tree.split_node(tree.root_id(), Axis::X, 4.0).unwrap();
        let on_face = p(4.0, 5.0, 5.0);
        for id in [left, right] {
            let d = tree.node(id).unwrap().distance_squared_to_inner_boundary(&on_face).unwrap();
            assert_eq!(d.distance_squared, 0.0);
            assert_eq!(d.closest, on_face);
        }
    }

    #[test]
    fn data_bounds_queries() {
        let data = Bounds::from_extents([2.0, 3.0, 2.0, 3.0, 2.0, 3.0]);
        let mut tree = KdTree::new(ten()).unwrap();
        tree.node_mut(tree.root_id()).unwrap().set_data_bounds(data).unwrap();
        let root = tree.root();
        assert!(root.contains_point(&p(1.0, 1.0, 1.0), false));
        assert!(!root.contains_point(&p(1.0, 1.0, 1.0), true));
        let d = root.distance_squared_to_boundary(&p(1.0, 2.5, 2.5), false, true).unwrap();
        assert_relative_eq!(d.distance_squared, 1.0);
    }

    #[test]
    fn boundary_convention_follows_the_tree_type() {
        let kd = KdTree::new(ten()).unwrap();
        let oct = Octree::new(ten()).unwrap();
        let corner = p(0.0, 0.0, 0.0);
        assert!(kd.root().contains_point(&corner, false));
        assert!(!oct.root().contains_point(&corner, false));
        assert!(oct.root().contains_point(&p(10.0, 10.0, 10.0), false));
    }

    #[test]
    fn sphere_reach() {
        let tree = single();
        let root = tree.root();
        assert!(root.intersects_sphere2(&p(5.0, 5.0, 5.0), 0.0, false));
        assert!(root.intersects_sphere2(&p(12.0, 5.0, 5.0), 4.5, false));
        assert!(!root.intersects_sphere2(&p(12.0, 5.0, 5.0), 4.0, false));
    }

    #[test]
    fn navigation() {
        let mut tree = KdTree::new(ten()).unwrap();
        let [left, right] = tree.split_node(tree.root_id(), Axis::Z, 6.0).unwrap();
        let [_, deep] = tree.split_node(left, Axis::X, 1.0).unwrap();
        let deep = tree.node(deep).unwrap();
        assert_eq!(deep.level(), 2);
        assert_eq!(deep.root().id(), tree.root_id());
        assert_eq!(deep.parent().map(NodeRef::id), Some(left));
        assert_eq!(tree.root().level(), 0);
        assert_eq!(tree.root().child(1).map(NodeRef::id).ok(), Some(right));
        assert_eq!(tree.root().split_position(), Ok(6.0));
        assert_eq!(tree.node(left).unwrap().split_position(), Ok(1.0));
        assert_eq!(deep.split_position(), Err(RegionError::NotSplit(deep.id())));
        assert!(deep.child(0).is_err());
    }

    #[test]
    fn cell_region_id_short_circuits() {
        let tree = single();
        let far = PolyCell::vertex(p(50.0, 50.0, 50.0));
        assert!(!tree.root().intersects_cell(&far, false, None, None));
        assert!(tree.root().intersects_cell(&far, false, Some(0), None));
        assert!(!tree.root().intersects_cell(&far, false, Some(3), None));
    }

    #[test]
    fn point_sets_need_a_contained_point() {
        let tree = single();
        let root = tree.root();
        let across = PolyCell::poly_vertex(vec![p(-1.0, 5.0, 5.0), p(11.0, 5.0, 5.0)]);
        assert!(!root.intersects_cell(&across, false, None, None));
        let one_in = PolyCell::poly_vertex(vec![p(-1.0, 5.0, 5.0), p(3.0, 5.0, 5.0)]);
        assert!(root.intersects_cell(&one_in, false, None, None));
    }

    #[test]
    fn octant_lower_face_vertices_fall_through_to_the_shape_test() {
        let mut tree = Octree::new(ten()).unwrap();
        let children = tree.create_child_nodes(tree.root_id()).unwrap();
        let high = tree.node(children[7]).unwrap();

        // (5, 7, 7) lies on the excluded lower x face of [5, 10]^3.
        let corner = p(5.0, 7.0, 7.0);
        assert!(!high.contains_point(&corner, false));
        let points = PolyCell::poly_vertex(vec![corner, p(20.0, 20.0, 20.0)]);
        assert!(!high.intersects_cell(&points, false, None, None));

        // A curve touching that face is still decided by the closed segment test.
        let touching = PolyCell::line(corner, p(4.0, 7.0, 7.0));
        assert!(high.intersects_cell(&touching, false, None, None));

        // A closed kd region accepts the same point set.
        let mut kd = KdTree::new(Bounds::from_extents([5.0, 10.0, 5.0, 10.0, 5.0, 10.0])).unwrap();
        kd.assign_region_ids();
        assert!(kd.root().intersects_cell(&points, false, None, None));
    }

    #[test]
    fn curves_use_segment_tests() {
        let tree = single();
        let root = tree.root();
        let through = PolyCell::line(p(-1.0, 5.0, 5.0), p(11.0, 5.0, 5.0));
        assert!(root.intersects_cell(&through, false, None, None));
        let beside = PolyCell::poly_line(vec![p(-2.0, 1.0, 5.0), p(1.0, -2.0, 5.0)]);
        assert!(!root.intersects_cell(&beside, false, None, None));
    }

    #[test]
    fn surfaces_use_polygon_tests() {
        let tree = single();
        let root = tree.root();
        let covering = PolyCell::triangle(p(-1.0, -1.0, 5.0), p(20.0, -1.0, 5.0), p(-1.0, 20.0, 5.0));
        assert!(root.intersects_cell(&covering, false, None, None));
        let beside = PolyCell::triangle(p(-5.0, 4.0, 5.0), p(4.0, -5.0, 5.0), p(-5.0, -5.0, 5.0));
        assert!(!root.intersects_cell(&beside, false, None, None));

        // The second triangle of the strip crosses the box.
        let strip = PolyCell::triangle_strip(vec![
            p(-5.0, 4.0, 5.0),
            p(4.0, -5.0, 5.0),
            p(-5.0, -5.0, 5.0),
            p(20.0, 20.0, 5.0),
        ]);
        assert!(root.intersects_cell(&strip, false, None, None));
    }

    #[test]
    fn solids_use_convex_regions() {
        let tree = single();
        let root = tree.root();
        let around = PolyCell::from_bounds(&Bounds::from_extents([-1.0, 11.0, -1.0, 11.0, -1.0, 11.0]));
        assert!(root.intersects_cell(&around, false, None, None));

        // Below the plane x + y + z = -0.5, its bounds overlapping the box.
        let corner = PolyCell::tetra([
            p(1.5, -1.0, -1.0),
            p(-1.0, 1.5, -1.0),
            p(-1.0, -1.0, 1.5),
            p(-1.0, -1.0, -1.0),
        ]);
        assert!(!root.intersects_cell(&corner, false, None, None));

        let flat = PolyCell::polyhedron(
            vec![p(-1.0, 5.0, 5.0), p(11.0, 5.0, 5.0), p(12.0, 5.0, 5.0)],
            vec![vec![0, 1, 2]],
        );
        assert!(!root.intersects_cell(&flat, false, None, None));
    }

    #[test]
    fn precomputed_bounds_are_used() {
        let tree = single();
        let through = PolyCell::line(p(-1.0, 5.0, 5.0), p(11.0, 5.0, 5.0));
        let wrong = Bounds::from_extents([20.0, 21.0, 20.0, 21.0, 20.0, 21.0]);
        assert!(!tree.root().intersects_cell(&through, false, None, Some(&wrong)));
    }
}
