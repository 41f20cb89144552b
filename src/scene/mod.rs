//! Skeleton scene data
//!
//! - Transform: rigid position + rotation
//! - Node: bone / empty / light node with rest, local and world transforms
//! - NodeTree: slotmap arena with pre-order traversal and world propagation
//! - Model: rest tree, animation library and weight groups shared by poses
//! - WeightGroup / PoseGroup: per-bone skinning data

pub mod hierarchy;
pub mod model;
pub mod node;
pub mod skeleton;
pub mod transform;

pub use hierarchy::{NodeIter, NodeTree};
pub use model::Model;
pub use node::{Bone, Node, NodeKind, NodeTransform};
pub use skeleton::{PoseGroup, WeightGroup};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
