//! Node Hierarchy
//!
//! [`NodeTree`] owns the nodes of one skeleton in a slotmap arena and keeps
//! the root list in insertion order. Parents are visited before their
//! children by every traversal in this module, which is what world-transform
//! propagation relies on.
//!
//! # Handles
//!
//! Cloning a tree preserves every [`NodeHandle`], so a pose that clones the
//! rest tree of its model can address the matching rest node with the same
//! handle.
//!
//! # Traversal
//!
//! [`NodeIter`] is a depth-first, pre-order walk driven by an explicit stack
//! of `(node, next child index)` frames. The stack lives inline for shallow
//! skeletons and spills to the heap for deeper ones, so arbitrary depth is
//! supported without recursion.

use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::errors::{PoseError, Result};
use crate::scene::NodeHandle;
use crate::scene::node::{Node, NodeKind};
use crate::scene::transform::Transform;

/// Inline frame capacity of the traversal stack.
const WALK_INLINE_DEPTH: usize = 16;

type WalkStack = SmallVec<[(NodeHandle, usize); WALK_INLINE_DEPTH]>;

#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: SlotMap<NodeHandle, Node>,
    roots: Vec<NodeHandle>,
}

impl NodeTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Inserts a node at the end of the root list.
    pub fn add_root(&mut self, mut node: Node) -> NodeHandle {
        node.parent = None;
        node.children.clear();
        let handle = self.nodes.insert(node);
        self.roots.push(handle);
        handle
    }

    /// Inserts a node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeHandle, mut node: Node) -> Result<NodeHandle> {
        if !self.nodes.contains_key(parent) {
            return Err(PoseError::InvalidNode);
        }
        node.parent = Some(parent);
        node.children.clear();
        let handle = self.nodes.insert(node);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(handle);
        }
        Ok(handle)
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order walk over every node, root by root.
    #[must_use]
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter::new(self, self.roots.iter().copied().collect())
    }

    /// Pre-order walk over `root` and its descendants.
    #[must_use]
    pub fn descendants(&self, root: NodeHandle) -> NodeIter<'_> {
        let roots = if self.contains(root) {
            SmallVec::from_elem(root, 1)
        } else {
            SmallVec::new()
        };
        NodeIter::new(self, roots)
    }

    /// Handles of every node in pre-order.
    #[must_use]
    pub fn traversal_order(&self) -> Vec<NodeHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Finds the first node named `name` in pre-order.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeHandle> {
        self.iter()
            .find(|(_, node)| node.name_opt() == Some(name))
            .map(|(handle, _)| handle)
    }

    /// Finds the first node named `name` within the subtree of `root`.
    #[must_use]
    pub fn find_in(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.descendants(root)
            .find(|(_, node)| node.name_opt() == Some(name))
            .map(|(handle, _)| handle)
    }

    #[must_use]
    pub fn child_count(&self, handle: NodeHandle) -> usize {
        self.nodes.get(handle).map_or(0, Node::child_count)
    }

    /// Number of descendants of `handle`, excluding the node itself.
    #[must_use]
    pub fn child_total(&self, handle: NodeHandle) -> usize {
        self.descendants(handle).count().saturating_sub(1)
    }

    // ========================================================================
    // Transform Propagation
    // ========================================================================

    /// Sets the animated offset of a node without propagating it.
    pub fn set_local_transform(&mut self, handle: NodeHandle, scale: f32, transform: Transform) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.local_scale = scale;
            node.transform.local = transform;
        }
    }

    /// Recomputes the world transform of `handle` from its parent, and of
    /// its whole subtree when `recursive` is set.
    ///
    /// The parent's world transform must already be current.
    pub fn rebuild(&mut self, handle: NodeHandle, recursive: bool) {
        if recursive {
            let order: SmallVec<[NodeHandle; 32]> =
                self.descendants(handle).map(|(h, _)| h).collect();
            for h in order {
                self.rebuild_node(h);
            }
        } else {
            self.rebuild_node(handle);
        }
    }

    /// Recomputes the world transforms of every node.
    pub fn rebuild_all(&mut self) {
        for handle in self.traversal_order() {
            self.rebuild_node(handle);
        }
    }

    /// Copies the world transforms of `rest` into the nodes sharing its handles.
    pub fn reset_globals_from(&mut self, rest: &NodeTree) {
        for (handle, node) in &mut self.nodes {
            if let Some(rest_node) = rest.nodes.get(handle) {
                node.transform.global = rest_node.transform.global;
            }
        }
    }

    fn rebuild_node(&mut self, handle: NodeHandle) {
        let Some(node) = self.nodes.get(handle) else {
            return;
        };
        let parent = node
            .parent
            .and_then(|p| self.nodes.get(p))
            .map(|p| (p.anchor(), p.transform.global_scale));

        let Some(node) = self.nodes.get_mut(handle) else {
            return;
        };
        let t = &mut node.transform;
        match parent {
            Some((anchor, parent_scale)) => {
                t.global_scale = parent_scale * t.local_scale;
                let mut rest = t.rest;
                rest.position *= parent_scale;
                t.global = anchor.multiply(&rest).multiply(&t.local);
            }
            None => {
                t.global_scale = t.local_scale;
                t.global = t.rest.multiply(&t.local);
            }
        }

        let global = node.transform.global;
        let scale = node.transform.global_scale;
        if let NodeKind::Bone(bone) = &mut node.kind {
            bone.tail = global.transform_point(bone.length * scale);
        }
    }
}

/// Depth-first pre-order iterator over a [`NodeTree`].
pub struct NodeIter<'a> {
    tree: &'a NodeTree,
    roots: SmallVec<[NodeHandle; 4]>,
    next_root: usize,
    stack: WalkStack,
}

impl<'a> NodeIter<'a> {
    fn new(tree: &'a NodeTree, roots: SmallVec<[NodeHandle; 4]>) -> Self {
        Self {
            tree,
            roots,
            next_root: 0,
            stack: WalkStack::new(),
        }
    }
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = (NodeHandle, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some((handle, next_child)) = self.stack.last_mut() else {
                let root = *self.roots.get(self.next_root)?;
                self.next_root += 1;
                let Some(node) = self.tree.nodes.get(root) else {
                    continue;
                };
                self.stack.push((root, 0));
                return Some((root, node));
            };

            let child = self
                .tree
                .nodes
                .get(*handle)
                .and_then(|node| node.children.get(*next_child))
                .copied();
            match child {
                Some(child) => {
                    *next_child += 1;
                    if let Some(node) = self.tree.nodes.get(child) {
                        self.stack.push((child, 0));
                        return Some((child, node));
                    }
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
