use glam::{Affine3A, Mat4, Quat, Vec3};

use crate::scene::NodeHandle;
use crate::scene::hierarchy::NodeTree;

/// A named vertex group of a model, driven by one bone.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightGroup {
    pub name: String,
    /// Name of the bone that deforms the group.
    pub bone: String,
    /// The bone in the model's rest tree, if it exists.
    pub node: Option<NodeHandle>,
}

/// Deformation of one weight group in the current pose.
///
/// The skinning transform maps a rest-space vertex to posed space:
/// translate by `-head_rest`, rotate by `rotation`, translate by `head_pose`.
/// `scale_pose` is applied by the consumer around the posed head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseGroup {
    /// Index into the model's weight groups.
    pub weight_group: usize,
    /// Bone in the model's rest tree.
    pub rest_node: Option<NodeHandle>,
    /// Bone in the pose tree.
    pub pose_node: Option<NodeHandle>,
    /// Whether both bones resolved.
    pub enabled: bool,
    /// Rotation from the rest posture to the current posture.
    pub rotation: Quat,
    /// Head of the bone in the rest posture.
    pub head_rest: Vec3,
    /// Head of the bone in the current posture.
    pub head_pose: Vec3,
    pub scale_pose: f32,
}

impl PoseGroup {
    /// Resolves a weight group against the rest and pose trees.
    #[must_use]
    pub fn bind(index: usize, group: &WeightGroup, rest: &NodeTree, pose: &NodeTree) -> Self {
        let rest_node = group.node.filter(|&h| rest.contains(h));
        let pose_node = pose.find_node(&group.bone);
        let head_rest = rest_node
            .and_then(|h| rest.get(h))
            .map_or(Vec3::ZERO, |n| n.transform.global.position);

        Self {
            weight_group: index,
            rest_node,
            pose_node,
            enabled: rest_node.is_some() && pose_node.is_some(),
            rotation: Quat::IDENTITY,
            head_rest,
            head_pose: Vec3::ZERO,
            scale_pose: 1.0,
        }
    }

    /// Recomputes the group deformation from the current world transforms.
    pub fn refresh(&mut self, rest: &NodeTree, pose: &NodeTree) {
        let rest_node = self.rest_node.and_then(|h| rest.get(h));
        let pose_node = self.pose_node.and_then(|h| pose.get(h));

        match (self.enabled, rest_node, pose_node) {
            (true, Some(rest_node), Some(pose_node)) => {
                let rest_global = &rest_node.transform.global;
                let pose_global = &pose_node.transform.global;
                self.rotation = pose_global.rotation * rest_global.rotation.conjugate();
                self.head_pose = pose_global.position;
                self.scale_pose = pose_node.transform.global_scale;
            }
            _ => {
                self.rotation = Quat::IDENTITY;
                self.head_pose = Vec3::ZERO;
                self.scale_pose = 1.0;
            }
        }
    }

    /// Rigid skinning transform `T(head_pose) * R(rotation) * T(-head_rest)`.
    #[must_use]
    pub fn skinning_transform(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation, self.head_pose)
            * Affine3A::from_translation(-self.head_rest)
    }

    #[inline]
    #[must_use]
    pub fn skinning_matrix(&self) -> Mat4 {
        Mat4::from(self.skinning_transform())
    }
}
