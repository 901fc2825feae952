//! Node types stored in the scene graph.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

/// Handle to a node inside one [`SceneGraph`](crate::SceneGraph).
///
/// Ids are only meaningful for the graph that issued them; using an id from
/// another graph is a logic error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Opaque handle to a 2D image resource, resolved by the renderer.
///
/// The scene graph never inspects the referenced image; a name that resolves
/// to nothing simply leaves the material in its default state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureRef(Arc<str>);

impl TextureRef {
    /// Create a handle from an asset name such as `"earth.jpg"`.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The asset name this handle refers to.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// What a node renders as, if anything.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Transform-only grouping node with no geometry. Used as an orbit pivot.
    Group,
    /// Textured sphere of the given radius.
    Sphere { radius: f32, texture: TextureRef },
    /// Flat textured ring spanning `[inner_radius, outer_radius]`, rendered
    /// double-sided.
    Annulus {
        inner_radius: f32,
        outer_radius: f32,
        texture: TextureRef,
    },
    /// Point light with distance falloff. Position comes from the node's
    /// world transform.
    PointLight {
        intensity: f32,
        range: f32,
        decay: f32,
    },
}

/// A single scene node: a kind plus a local transform and graph links.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) translation: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            parent,
            children: Vec::new(),
        }
    }

    /// The node's kind.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Local translation relative to the parent.
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Local rotation relative to the parent.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in attachment order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local transform matrix (rotation then translation).
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}
