//! Arena-backed scene graph with parent/child links and world transforms.

use glam::{Mat4, Quat, Vec3};
use tracing::trace;

use crate::node::{Node, NodeId, NodeKind};

/// Scene graph owning every node in an arena.
///
/// Nodes are created once and never removed; the only mutation after
/// construction is incremental rotation of local transforms. All lookups are
/// by [`NodeId`] and panic on ids from a different graph that happen to be
/// out of range.
pub struct SceneGraph {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SceneGraph {
    /// Create a graph containing only an empty root group.
    pub fn new() -> Self {
        let root = NodeId(0);
        Self {
            nodes: vec![Node::new(NodeKind::Group, None)],
            root,
        }
    }

    /// The root group node. Everything else is a descendant of this node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the graph, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Create a node of the given kind as a child of `parent` and return its
    /// id. Children keep their attachment order.
    pub fn spawn(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, Some(parent)));
        self.nodes[parent.0].children.push(id);
        trace!(node = id.0, parent = parent.0, "spawned scene node");
        id
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Set a node's local translation.
    pub fn set_translation(&mut self, id: NodeId, translation: Vec3) {
        self.nodes[id.0].translation = translation;
    }

    /// Rotate a node by `radians` about its local Y axis, relative to its
    /// current orientation.
    ///
    /// The product is renormalized every time: each multiplication loses a
    /// few ulps of unit length, and the drift compounds over the millions of
    /// increments a long run accumulates.
    pub fn rotate_y(&mut self, id: NodeId, radians: f32) {
        let node = &mut self.nodes[id.0];
        node.rotation = (node.rotation * Quat::from_rotation_y(radians)).normalize();
    }

    /// Rotate a node by `radians` about its local X axis, relative to its
    /// current orientation.
    pub fn rotate_x(&mut self, id: NodeId, radians: f32) {
        let node = &mut self.nodes[id.0];
        node.rotation = (node.rotation * Quat::from_rotation_x(radians)).normalize();
    }

    /// True if `ancestor` appears on the parent chain of `id` (a node is not
    /// its own ancestor).
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.nodes[id.0].parent;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.nodes[p.0].parent;
        }
        false
    }

    /// World transform of a node: the product of local transforms from the
    /// root down to the node.
    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let node = &self.nodes[id.0];
        match node.parent {
            Some(parent) => self.world_transform(parent) * node.local_transform(),
            None => node.local_transform(),
        }
    }

    /// Visit every node depth-first from the root, with its world transform.
    ///
    /// Each node's transform is computed once from its parent's, so a full
    /// walk is linear in the node count.
    pub fn visit(&self, mut f: impl FnMut(NodeId, &Node, Mat4)) {
        self.visit_from(self.root, Mat4::IDENTITY, &mut f);
    }

    fn visit_from(&self, id: NodeId, parent_world: Mat4, f: &mut impl FnMut(NodeId, &Node, Mat4)) {
        let node = &self.nodes[id.0];
        let world = parent_world * node.local_transform();
        f(id, node, world);
        // Children are walked by index to avoid borrowing issues with the
        // caller's closure; the child list never changes during a visit.
        for i in 0..node.children.len() {
            let child = self.nodes[id.0].children[i];
            self.visit_from(child, world, f);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TextureRef;
    use std::f32::consts::FRAC_PI_2;

    fn sphere(radius: f32) -> NodeKind {
        NodeKind::Sphere {
            radius,
            texture: TextureRef::new("test.jpg"),
        }
    }

    #[test]
    fn test_new_graph_has_only_root() {
        let graph = SceneGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 1);
        assert!(graph.node(graph.root()).parent().is_none());
    }

    #[test]
    fn test_spawn_links_parent_and_child() {
        let mut graph = SceneGraph::new();
        let pivot = graph.spawn(graph.root(), NodeKind::Group);
        let body = graph.spawn(pivot, sphere(1.0));

        assert_eq!(graph.node(body).parent(), Some(pivot));
        assert_eq!(graph.node(pivot).children(), &[body]);
        assert!(graph.is_descendant_of(body, pivot));
        assert!(graph.is_descendant_of(body, graph.root()));
        assert!(!graph.is_descendant_of(pivot, body));
    }

    #[test]
    fn test_children_preserve_attachment_order() {
        let mut graph = SceneGraph::new();
        let ids: Vec<NodeId> = (0..5)
            .map(|_| graph.spawn(graph.root(), NodeKind::Group))
            .collect();
        assert_eq!(graph.node(graph.root()).children(), ids.as_slice());
    }

    #[test]
    fn test_rotate_y_accumulates_relative_deltas() {
        let mut graph = SceneGraph::new();
        let node = graph.spawn(graph.root(), NodeKind::Group);
        for _ in 0..10 {
            graph.rotate_y(node, 0.1);
        }
        let expected = Quat::from_rotation_y(1.0);
        let angle = graph.node(node).rotation().angle_between(expected);
        assert!(angle < 1e-5, "accumulated rotation off by {angle} rad");
    }

    #[test]
    fn test_rotation_stays_unit_length_over_long_runs() {
        // Without renormalization the norm decays measurably within a few
        // hundred increments and acos-based comparisons blow up.
        let mut graph = SceneGraph::new();
        let node = graph.spawn(graph.root(), NodeKind::Group);
        graph.rotate_x(node, 0.5);
        for _ in 0..100_000 {
            graph.rotate_y(node, 0.009);
        }
        let norm = graph.node(node).rotation().length();
        assert!((norm - 1.0).abs() < 1e-6, "norm drifted to {norm}");
    }

    #[test]
    fn test_rotate_y_after_tilt_spins_about_local_axis() {
        // Tilt about X, then spin about the node's local Y, matching how a
        // ringed planet is oriented.
        let mut graph = SceneGraph::new();
        let node = graph.spawn(graph.root(), NodeKind::Group);
        graph.rotate_x(node, FRAC_PI_2);
        graph.rotate_y(node, 1.0);

        let expected = Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_y(1.0);
        let angle = graph.node(node).rotation().angle_between(expected);
        assert!(angle < 1e-5);
    }

    #[test]
    fn test_pivot_rotation_sweeps_child_in_circle() {
        let mut graph = SceneGraph::new();
        let pivot = graph.spawn(graph.root(), NodeKind::Group);
        let body = graph.spawn(pivot, sphere(1.0));
        graph.set_translation(body, Vec3::new(10.0, 0.0, 0.0));

        graph.rotate_y(pivot, FRAC_PI_2);
        let world = graph.world_transform(body);
        let position = world.transform_point3(Vec3::ZERO);

        // Rotating +90 degrees about Y maps +X onto -Z.
        assert!((position - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-4);
        // Distance from the origin stays the orbit radius.
        assert!((position.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_offset_child_stays_at_origin_under_pivot_rotation() {
        let mut graph = SceneGraph::new();
        let pivot = graph.spawn(graph.root(), NodeKind::Group);
        let body = graph.spawn(pivot, sphere(1.0));

        for _ in 0..7 {
            graph.rotate_y(pivot, 0.3);
        }
        let position = graph.world_transform(body).transform_point3(Vec3::ZERO);
        assert!(position.length() < 1e-5, "degenerate orbit moved the body");
    }

    #[test]
    fn test_visit_reaches_every_node_once_with_world_transforms() {
        let mut graph = SceneGraph::new();
        let pivot = graph.spawn(graph.root(), NodeKind::Group);
        let body = graph.spawn(pivot, sphere(1.0));
        graph.set_translation(body, Vec3::new(5.0, 0.0, 0.0));
        let other = graph.spawn(graph.root(), NodeKind::Group);

        let mut seen = Vec::new();
        graph.visit(|id, _, world| seen.push((id, world)));

        assert_eq!(seen.len(), 4);
        let body_world = seen.iter().find(|(id, _)| *id == body).unwrap().1;
        assert_eq!(
            body_world.transform_point3(Vec3::ZERO),
            Vec3::new(5.0, 0.0, 0.0)
        );
        assert!(seen.iter().any(|(id, _)| *id == other));
    }

    #[test]
    fn test_graphs_are_independent() {
        let mut a = SceneGraph::new();
        let mut b = SceneGraph::new();
        let node_a = a.spawn(a.root(), NodeKind::Group);
        let node_b = b.spawn(b.root(), NodeKind::Group);

        a.rotate_y(node_a, 1.0);
        assert_eq!(b.node(node_b).rotation(), Quat::IDENTITY);
    }
}
