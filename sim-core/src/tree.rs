use crate::types::NodeId;
use glam::Vec2;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub pos: Vec2,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub is_tip: bool,
    /// Roots are fixed and never removed.
    pub fixed: bool,
    pub thickness: f32,
}

/// Append-only arena holding a forest of growth trees.
///
/// A child's id is always larger than its parent's, so walking the arena
/// backwards visits every child before its parent.
#[derive(Debug, Default)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new_root(pos: Vec2, thickness: f32) -> Self {
        Self {
            pos,
            parent: None,
            children: Vec::with_capacity(4),
            is_tip: true,
            fixed: true,
            thickness,
        }
    }

    pub fn new_child(pos: Vec2, thickness: f32, parent: NodeId) -> Self {
        Self {
            pos,
            parent: Some(parent),
            children: Vec::with_capacity(4),
            is_tip: true,
            fixed: false,
            thickness,
        }
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_root(&mut self, pos: Vec2, thickness: f32) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::new_root(pos, thickness));
        id
    }

    /// Appends a tip under `parent`, demoting the parent from tip status.
    pub fn add_child(&mut self, parent: NodeId, pos: Vec2, thickness: f32) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::new_child(pos, thickness, parent));
        let p = &mut self.nodes[parent];
        p.children.push(id);
        p.is_tip = false;
        id
    }

    /// Returns `true` if `parent` already has a child within `eps` of `pos`.
    pub fn has_child_near(&self, parent: NodeId, pos: Vec2, eps: f32) -> bool {
        let eps2 = eps * eps;
        self.nodes[parent]
            .children
            .iter()
            .any(|&c| self.nodes[c].pos.distance_squared(pos) <= eps2)
    }

    /// Walks parent links from `id` (exclusive) up to its root (inclusive).
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id].parent, move |&p| self.nodes[p].parent)
    }

    pub fn tips(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.is_tip.then_some(i))
    }
}
