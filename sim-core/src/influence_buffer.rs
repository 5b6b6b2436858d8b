use crate::types::NodeId;
use glam::Vec2;

/// Per-step scratch buffer of attraction pulled onto each node.
///
/// For each `NodeId` it stores the sum of unit vectors towards the
/// attractors that recruited the node, and how many there were. It is
/// cleared at the start of every attraction phase and again after growth,
/// so nothing carries over between steps.
#[derive(Debug, Default)]
pub struct InfluenceBuffer {
    dir: Vec<Vec2>,
    count: Vec<u32>,
}

impl InfluenceBuffer {
    pub fn with_len(len: usize) -> Self {
        Self {
            dir: vec![Vec2::ZERO; len],
            count: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.count.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count.is_empty()
    }

    /// Resizes to `len` entries and zeroes all of them.
    pub fn reset(&mut self, len: usize) {
        self.dir.clear();
        self.dir.resize(len, Vec2::ZERO);
        self.count.clear();
        self.count.resize(len, 0);
    }

    pub fn clear(&mut self) {
        self.dir.fill(Vec2::ZERO);
        self.count.fill(0);
    }

    /// Adds one pull for `id`.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn add(&mut self, id: NodeId, dir: Vec2) {
        self.dir[id] += dir;
        self.count[id] += 1;
    }

    #[inline]
    pub fn count(&self, id: NodeId) -> u32 {
        self.count[id]
    }

    #[inline]
    pub fn avg_dir(&self, id: NodeId) -> Vec2 {
        let c = self.count[id];
        if c == 0 {
            Vec2::ZERO
        } else {
            self.dir[id] / (c as f32)
        }
    }

    /// Unit growth direction for `id`, or `None` when the node was not
    /// pulled or the pulls cancel out exactly.
    pub fn growth_dir(&self, id: NodeId) -> Option<Vec2> {
        if self.count[id] == 0 {
            return None;
        }
        self.avg_dir(id).try_normalize()
    }

    pub fn influenced_indices(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.count
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| (c > 0).then_some(i))
    }
}
