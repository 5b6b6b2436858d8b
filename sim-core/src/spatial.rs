//! R*-tree over node positions for radius and nearest-node queries.

use crate::{tree::Tree, types::NodeId};
use glam::Vec2;
use rstar::{AABB, PointDistance, RTree, RTreeObject};

/// Position-only entry so the index never clones full nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeLocation {
    pub id: NodeId,
    pub position: [f32; 2],
}

impl RTreeObject for NodeLocation {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for NodeLocation {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

#[derive(Debug)]
pub struct NodeIndex {
    tree: RTree<NodeLocation>,
}

impl Default for NodeIndex {
    fn default() -> Self {
        Self { tree: RTree::new() }
    }
}

impl NodeIndex {
    /// Bulk-loads every node of `tree` (O(n log n)).
    pub fn build(tree: &Tree) -> Self {
        let locations = tree
            .nodes
            .iter()
            .enumerate()
            .map(|(id, n)| NodeLocation {
                id,
                position: n.pos.to_array(),
            })
            .collect();
        Self {
            tree: RTree::bulk_load(locations),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn insert(&mut self, id: NodeId, pos: Vec2) {
        self.tree.insert(NodeLocation {
            id,
            position: pos.to_array(),
        });
    }

    /// Calls `f(id, squared_distance)` for every node within `radius` of `center`.
    pub fn for_each_within(&self, center: Vec2, radius: f32, mut f: impl FnMut(NodeId, f32)) {
        let p = center.to_array();
        for loc in self.tree.locate_within_distance(p, radius * radius) {
            f(loc.id, loc.distance_2(&p));
        }
    }

    /// Nodes within `radius`, sorted by id so results are deterministic.
    pub fn within(&self, center: Vec2, radius: f32) -> Vec<(NodeId, f32)> {
        let mut out = Vec::new();
        self.for_each_within(center, radius, |id, d2| out.push((id, d2)));
        out.sort_unstable_by_key(|&(id, _)| id);
        out
    }

    /// Closest node within `radius`, ties going to the lowest id.
    pub fn nearest_within(&self, center: Vec2, radius: f32) -> Option<(NodeId, f32)> {
        let mut best: Option<(NodeId, f32)> = None;
        self.for_each_within(center, radius, |id, d2| {
            let better = match best {
                None => true,
                Some((bid, bd2)) => d2 < bd2 || (d2 == bd2 && id < bid),
            };
            if better {
                best = Some((id, d2));
            }
        });
        best
    }

    pub fn any_within(&self, center: Vec2, radius: f32) -> bool {
        self.tree
            .locate_within_distance(center.to_array(), radius * radius)
            .next()
            .is_some()
    }
}
