use rustc_hash::FxHashMap;

use crate::animation::clip::Animation;
use crate::scene::NodeHandle;
use crate::scene::hierarchy::NodeTree;
use crate::scene::skeleton::WeightGroup;

/// Immutable skeleton data shared by poses: the rest node tree, the
/// animation library and the weight groups.
///
/// Poses hold a model through an `Arc` and never mutate it.
#[derive(Debug, Clone, Default)]
pub struct Model {
    nodes: NodeTree,
    animations: Vec<Animation>,
    animation_index: FxHashMap<String, usize>,
    weight_groups: Vec<WeightGroup>,
}

impl Model {
    /// Creates a model from a rest tree, computing its world transforms.
    #[must_use]
    pub fn new(mut nodes: NodeTree) -> Self {
        nodes.rebuild_all();
        Self {
            nodes,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &NodeTree {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeHandle> {
        self.nodes.find_node(name)
    }

    /// Adds an animation. A later animation with the same name replaces
    /// the earlier one.
    pub fn add_animation(&mut self, animation: Animation) {
        if let Some(&index) = self.animation_index.get(animation.name()) {
            log::warn!("Replacing animation '{}'", animation.name());
            self.animations[index] = animation;
        } else {
            self.animation_index
                .insert(animation.name().to_string(), self.animations.len());
            self.animations.push(animation);
        }
    }

    #[must_use]
    pub fn find_animation(&self, name: &str) -> Option<&Animation> {
        self.animation_index
            .get(name)
            .and_then(|&i| self.animations.get(i))
    }

    #[inline]
    #[must_use]
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Adds a weight group driven by the bone named `bone`.
    pub fn add_weight_group(&mut self, name: impl Into<String>, bone: impl Into<String>) {
        let bone = bone.into();
        let node = self.nodes.find_node(&bone);
        self.weight_groups.push(WeightGroup {
            name: name.into(),
            bone,
            node,
        });
    }

    #[inline]
    #[must_use]
    pub fn weight_groups(&self) -> &[WeightGroup] {
        &self.weight_groups
    }
}
