use glam::{Mat3, Vec3};

use crate::scene::NodeHandle;
use crate::scene::transform::Transform;

/// Bone payload: rest length vector and the cached world-space tail.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bone {
    /// Head-to-tail vector in the bone's local space.
    pub length: Vec3,
    /// World-space tail, refreshed by [`NodeTree::rebuild`](crate::scene::hierarchy::NodeTree::rebuild).
    pub tail: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Bone(Bone),
    Empty,
    Light,
}

/// Rest, local and world transforms of a node.
///
/// The world transform is `parent_world * rest * local`, where the rest
/// offset is scaled by the parent's accumulated scale first. Children of a
/// bone attach at the bone's tail rather than at its origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    /// Offset from the parent in the rest posture.
    pub rest: Transform,
    /// Animated offset applied on top of `rest`.
    pub local: Transform,
    /// Cached world transform.
    pub global: Transform,
    pub local_scale: f32,
    /// Product of `local_scale` along the ancestor chain.
    pub global_scale: f32,
}

impl NodeTransform {
    #[must_use]
    pub fn from_rest(rest: Transform) -> Self {
        Self {
            rest,
            local: Transform::IDENTITY,
            global: rest,
            local_scale: 1.0,
            global_scale: 1.0,
        }
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::from_rest(Transform::IDENTITY)
    }
}

/// A skeleton node.
///
/// Nodes live in a [`NodeTree`](crate::scene::hierarchy::NodeTree) arena and
/// reference each other through [`NodeHandle`]s.
#[derive(Debug, Clone)]
pub struct Node {
    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Identity ===
    pub(crate) name: Option<String>,
    pub kind: NodeKind,

    // === Spatial Data ===
    pub transform: NodeTransform,
}

impl Node {
    #[must_use]
    pub fn new(name: Option<String>, kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            name,
            kind,
            transform: NodeTransform::default(),
        }
    }

    /// Creates a named bone with the given head-to-tail vector.
    #[must_use]
    pub fn bone(name: impl Into<String>, length: Vec3) -> Self {
        Self::new(Some(name.into()), NodeKind::Bone(Bone { length, tail: length }))
    }

    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(Some(name.into()), NodeKind::Empty)
    }

    #[must_use]
    pub fn light(name: impl Into<String>) -> Self {
        Self::new(Some(name.into()), NodeKind::Light)
    }

    /// Sets the rest transform, also seeding the cached world transform.
    #[must_use]
    pub fn with_rest(mut self, rest: Transform) -> Self {
        self.transform = NodeTransform::from_rest(rest);
        self
    }

    /// Returns the node name, or `""` for unnamed nodes.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    #[inline]
    #[must_use]
    pub fn name_opt(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    #[must_use]
    pub fn is_bone(&self) -> bool {
        matches!(self.kind, NodeKind::Bone(_))
    }

    #[inline]
    #[must_use]
    pub fn bone_data(&self) -> Option<&Bone> {
        match &self.kind {
            NodeKind::Bone(bone) => Some(bone),
            _ => None,
        }
    }

    /// World-space head: the origin of the world transform.
    #[inline]
    #[must_use]
    pub fn head(&self) -> Vec3 {
        self.transform.global.position
    }

    /// World-space tail for bones.
    #[inline]
    #[must_use]
    pub fn tail(&self) -> Option<Vec3> {
        self.bone_data().map(|bone| bone.tail)
    }

    /// World-space basis vectors (x, y, z) of the node.
    #[must_use]
    pub fn axes(&self) -> Mat3 {
        Mat3::from_quat(self.transform.global.rotation)
    }

    /// Point children attach to: the tail for bones, the origin otherwise.
    #[inline]
    #[must_use]
    pub(crate) fn anchor(&self) -> Transform {
        match self.kind {
            NodeKind::Bone(bone) => Transform::new(bone.tail, self.transform.global.rotation),
            _ => self.transform.global,
        }
    }
}
