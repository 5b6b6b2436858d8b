use crate::types::NodeId;
use glam::Vec2;

#[derive(Debug, Clone)]
pub struct Attractor {
    pub pos: Vec2,
    /// Cleared once any node comes within kill distance; never set again.
    pub alive: bool,
    /// Nodes this attractor pulled during the last attraction phase.
    pub influenced_by: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct AttractorSet {
    pub points: Vec<Attractor>,
}

impl AttractorSet {
    pub fn from_positions(positions: Vec<Vec2>) -> Self {
        let points = positions
            .into_iter()
            .map(|pos| Attractor {
                pos,
                alive: true,
                influenced_by: Vec::new(),
            })
            .collect();

        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drops every killed attractor and returns how many were removed.
    pub fn remove_dead(&mut self) -> usize {
        let before = self.points.len();
        self.points.retain(|a| a.alive);
        before - self.points.len()
    }
}
