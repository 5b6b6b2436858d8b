//! The four phases of a growth step.
//!
//! [`crate::network::GrowthNetwork::step`] runs them in this order:
//! 1. [`attraction_phase`] — each live attractor pulls on nearby nodes,
//!    accumulating unit directions in an [`InfluenceBuffer`].
//! 2. [`growth_phase`] — every pulled node proposes one child along its
//!    averaged direction; proposals leaving the bounds or crossing an
//!    obstacle are dropped.
//! 3. [`kill_phase`] — attractors within kill distance of any node die and
//!    are removed.
//! 4. [`canalization_phase`] — thickness is recomputed from the tips down
//!    to the roots.

use crate::{
    attractor::AttractorSet,
    config::{Settings, VenationType},
    influence_buffer::InfluenceBuffer,
    polygon::Polygon,
    spatial::NodeIndex,
    tree::Tree,
    types::NodeId,
};
use glam::Vec2;

/// Fraction of the segment length under which two children of the same
/// node count as duplicates.
const DUPLICATE_CHILD_FRACTION: f32 = 0.1;

/// Accumulates attraction from live attractors onto nearby nodes.
///
/// `index` must hold exactly the nodes of `tree`. The buffer is resized and
/// cleared to `tree.nodes.len()` first.
///
/// - [`VenationType::Closed`]: only the nearest node within attraction
///   distance is pulled, ties going to the earliest node.
/// - [`VenationType::Open`]: every node within attraction distance is pulled.
///
/// Each pull adds the unit vector from node to attractor (zero if they
/// coincide) and records the node in `Attractor::influenced_by`.
pub fn attraction_phase(
    tree: &Tree,
    index: &NodeIndex,
    attractors: &mut AttractorSet,
    settings: &Settings,
    acc: &mut InfluenceBuffer,
) {
    let radius = settings.attraction_distance;
    acc.reset(tree.nodes.len());

    for a in attractors.points.iter_mut() {
        a.influenced_by.clear();
        if !a.alive {
            continue;
        }

        match settings.venation_type {
            VenationType::Closed => {
                if let Some((id, _)) = index.nearest_within(a.pos, radius) {
                    acc.add(id, (a.pos - tree.nodes[id].pos).normalize_or_zero());
                    a.influenced_by.push(id);
                }
            }
            VenationType::Open => {
                for (id, _) in index.within(a.pos, radius) {
                    acc.add(id, (a.pos - tree.nodes[id].pos).normalize_or_zero());
                    a.influenced_by.push(id);
                }
            }
        }
    }
}

/// Grows one child per pulled node and clears the buffer afterwards.
///
/// A proposal at `pos + dir * segment_length` is rejected when the pulls
/// cancel out, when it lies outside every bounds polygon (so empty bounds
/// reject everything), when the new segment touches an obstacle edge, or
/// when the node already has a child at almost the same spot.
///
/// Returns the ids of the new nodes in creation order.
pub fn growth_phase(
    tree: &mut Tree,
    acc: &mut InfluenceBuffer,
    settings: &Settings,
    bounds: &[Polygon],
    obstacles: &[Polygon],
) -> Vec<NodeId> {
    let eps = settings.segment_length * DUPLICATE_CHILD_FRACTION;
    let mut to_add = Vec::with_capacity(16);

    for id in acc.influenced_indices() {
        let Some(dir) = acc.growth_dir(id) else {
            continue;
        };

        let from = tree.nodes[id].pos;
        let to = from + dir * settings.segment_length;

        if !growth_allowed(from, to, bounds, obstacles) || tree.has_child_near(id, to, eps) {
            continue;
        }
        to_add.push((id, to));
    }

    let new_ids = to_add
        .into_iter()
        .map(|(parent, pos)| tree.add_child(parent, pos, settings.tip_thickness))
        .collect();

    acc.clear();
    new_ids
}

/// `true` if `to` is inside some bounds polygon and `from -> to` crosses no obstacle.
pub fn growth_allowed(from: Vec2, to: Vec2, bounds: &[Polygon], obstacles: &[Polygon]) -> bool {
    bounds.iter().any(|b| b.contains(to))
        && !obstacles.iter().any(|o| o.intersects_segment(from, to))
}

/// Kills attractors within kill distance of any node, then removes them.
///
/// `index` must already contain the nodes grown this step. Returns the
/// number of attractors removed.
pub fn kill_phase(index: &NodeIndex, attractors: &mut AttractorSet, settings: &Settings) -> usize {
    for a in attractors.points.iter_mut().filter(|a| a.alive) {
        if index.any_within(a.pos, settings.kill_distance) {
            a.alive = false;
        }
    }
    attractors.remove_dead()
}

/// Recomputes thickness for every node.
///
/// With canalization on, each node gets a target: tips use
/// `tip_thickness`, internal nodes `sqrt(sum of squared child targets)`
/// capped at `max_thickness`. Thickness then moves towards the target by
/// `thickness_blend`. With canalization off, tips use `tip_thickness` and
/// every other node `branch_thickness`.
pub fn canalization_phase(tree: &mut Tree, settings: &Settings) {
    if !settings.enable_canalization {
        for node in &mut tree.nodes {
            node.thickness = if node.is_tip {
                settings.tip_thickness
            } else {
                settings.branch_thickness
            };
        }
        return;
    }

    let max = settings.max_thickness;
    let mut flux = vec![0.0_f32; tree.nodes.len()];

    // Children always have larger ids than their parent.
    for id in (0..tree.nodes.len()).rev() {
        let node = &mut tree.nodes[id];
        let target = if node.is_tip {
            settings.tip_thickness
        } else {
            flux[id].sqrt().min(max)
        };

        let blended = node.thickness + (target - node.thickness) * settings.thickness_blend;
        node.thickness = blended.clamp(f32::MIN_POSITIVE, max);

        if let Some(parent) = node.parent {
            flux[parent] += target * target;
        }
    }
}
