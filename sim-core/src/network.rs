//! The growth network: node forest, attractors, bounds and obstacles.

use crate::{
    attractor::{Attractor, AttractorSet},
    config::{DisplayFlags, RenderMode, Settings},
    error::NetworkError,
    influence_buffer::InfluenceBuffer,
    pattern::{self, AttractorPattern},
    phases,
    polygon::{PathRole, Polygon},
    spatial::NodeIndex,
    tree::{Tree, TreeNode},
    types::NodeId,
};
use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

/// Outcome of a single [`GrowthNetwork::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Nodes grown this step, in creation order.
    pub new_nodes: Vec<NodeId>,
    /// Attractors removed by the kill phase.
    pub killed: usize,
    /// Attractors still active afterwards.
    pub remaining: usize,
}

impl StepReport {
    /// `true` when the step neither grew nor killed anything.
    pub fn is_idle(&self) -> bool {
        self.new_nodes.is_empty() && self.killed == 0
    }
}

/// Owns the whole simulation state and advances it one step at a time.
///
/// Single writer: `step` and `reset` take `&mut self`, and readers borrow
/// the collections between calls.
#[derive(Debug)]
pub struct GrowthNetwork {
    settings: Settings,
    display: DisplayFlags,
    tree: Tree,
    attractors: AttractorSet,
    bounds: Vec<Polygon>,
    obstacles: Vec<Polygon>,
    acc: InfluenceBuffer,
}

fn expect_role(polygons: &[Polygon], expected: PathRole) -> Result<(), NetworkError> {
    match polygons.iter().find(|p| p.role() != expected) {
        Some(p) => Err(NetworkError::RoleMismatch {
            expected,
            found: p.role(),
        }),
        None => Ok(()),
    }
}

impl GrowthNetwork {
    /// Creates an empty network, refusing invalid settings.
    pub fn new(settings: Settings) -> Result<Self, NetworkError> {
        settings.validate()?;
        Ok(Self {
            settings,
            display: DisplayFlags::default(),
            tree: Tree::new(),
            attractors: AttractorSet::default(),
            bounds: Vec::new(),
            obstacles: Vec::new(),
            acc: InfluenceBuffer::default(),
        })
    }

    /// Clears nodes, attractors, bounds and obstacles. Settings and display
    /// flags survive.
    pub fn reset(&mut self) {
        info!(
            nodes = self.tree.len(),
            attractors = self.attractors.len(),
            "resetting growth network"
        );
        self.tree = Tree::new();
        self.attractors = AttractorSet::default();
        self.bounds.clear();
        self.obstacles.clear();
        self.acc = InfluenceBuffer::default();
    }

    /// Drops the node forest only.
    pub fn clear_nodes(&mut self) {
        self.tree = Tree::new();
        self.acc = InfluenceBuffer::default();
    }

    pub fn set_bounds(&mut self, bounds: Vec<Polygon>) -> Result<(), NetworkError> {
        expect_role(&bounds, PathRole::Bounds)?;
        self.bounds = bounds;
        Ok(())
    }

    pub fn set_obstacles(&mut self, obstacles: Vec<Polygon>) -> Result<(), NetworkError> {
        expect_role(&obstacles, PathRole::Obstacle)?;
        self.obstacles = obstacles;
        Ok(())
    }

    /// Replaces the attractor set. Placement is not re-validated here;
    /// use [`GrowthNetwork::populate_attractors`] for filtered placement.
    pub fn set_attractors(&mut self, positions: Vec<Vec2>) {
        self.attractors = AttractorSet::from_positions(positions);
    }

    /// Generates attractors against the current bounds and obstacles.
    /// Returns how many were placed.
    pub fn populate_attractors(
        &mut self,
        pattern: AttractorPattern,
        rng: &mut impl Rng,
    ) -> Result<usize, NetworkError> {
        let positions = pattern::generate(pattern, &self.bounds, &self.obstacles, rng)?;
        let placed = positions.len();
        self.set_attractors(positions);
        info!(placed, ?pattern, "attractors populated");
        Ok(placed)
    }

    /// Adds a fixed root node.
    pub fn add_root(&mut self, pos: Vec2) -> Result<NodeId, NetworkError> {
        if !pos.is_finite() {
            return Err(NetworkError::NonFiniteRoot);
        }
        Ok(self.tree.add_root(pos, self.settings.tip_thickness))
    }

    /// Advances the simulation by one step: attraction, growth, kill and
    /// canalization. Never fails; with no bounds it simply grows nothing.
    pub fn step(&mut self) -> StepReport {
        if self.bounds.is_empty() {
            debug!("stepping without bounds; growth is disabled");
        }

        let mut index = NodeIndex::build(&self.tree);
        phases::attraction_phase(
            &self.tree,
            &index,
            &mut self.attractors,
            &self.settings,
            &mut self.acc,
        );

        let new_nodes = phases::growth_phase(
            &mut self.tree,
            &mut self.acc,
            &self.settings,
            &self.bounds,
            &self.obstacles,
        );
        for &id in &new_nodes {
            index.insert(id, self.tree.nodes[id].pos);
        }

        let killed = phases::kill_phase(&index, &mut self.attractors, &self.settings);
        phases::canalization_phase(&mut self.tree, &self.settings);

        let report = StepReport {
            new_nodes,
            killed,
            remaining: self.attractors.len(),
        };
        debug!(
            grown = report.new_nodes.len(),
            killed = report.killed,
            remaining = report.remaining,
            nodes = self.tree.len(),
            "growth step"
        );
        report
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.tree.nodes
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors.points
    }

    pub fn bounds(&self) -> &[Polygon] {
        &self.bounds
    }

    pub fn obstacles(&self) -> &[Polygon] {
        &self.obstacles
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings after validating them.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), NetworkError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn display(&self) -> &DisplayFlags {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayFlags {
        &mut self.display
    }

    pub fn is_paused(&self) -> bool {
        self.settings.is_paused
    }

    pub fn toggle_pause(&mut self) {
        self.settings.is_paused = !self.settings.is_paused;
    }

    pub fn toggle_canalization(&mut self) {
        self.settings.enable_canalization = !self.settings.enable_canalization;
    }

    pub fn toggle_opacity_blending(&mut self) {
        self.settings.enable_opacity_blending = !self.settings.enable_opacity_blending;
    }

    pub fn toggle_attractors(&mut self) {
        self.display.show_attractors = !self.display.show_attractors;
    }

    pub fn toggle_nodes(&mut self) {
        self.display.show_nodes = !self.display.show_nodes;
    }

    pub fn toggle_tips(&mut self) {
        self.display.show_tips = !self.display.show_tips;
    }

    pub fn toggle_attraction_zones(&mut self) {
        self.display.show_attraction_zones = !self.display.show_attraction_zones;
    }

    pub fn toggle_kill_zones(&mut self) {
        self.display.show_kill_zones = !self.display.show_kill_zones;
    }

    pub fn toggle_influence_lines(&mut self) {
        self.display.show_influence_lines = !self.display.show_influence_lines;
    }

    pub fn toggle_bounds(&mut self) {
        self.display.show_bounds = !self.display.show_bounds;
    }

    pub fn toggle_obstacles(&mut self) {
        self.display.show_obstacles = !self.display.show_obstacles;
    }

    pub fn toggle_render_mode(&mut self) {
        self.display.render_mode = match self.display.render_mode {
            RenderMode::Lines => RenderMode::Dots,
            RenderMode::Dots => RenderMode::Lines,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VenationType;
    use rand::{SeedableRng, rngs::StdRng};

    fn bounds() -> Vec<Polygon> {
        vec![Polygon::rect(Vec2::splat(-50.0), Vec2::splat(50.0), PathRole::Bounds).unwrap()]
    }

    /// One root at the origin and one attractor at (10, 0).
    fn scenario() -> GrowthNetwork {
        let mut network = GrowthNetwork::new(Settings::default()).unwrap();
        network.set_bounds(bounds()).unwrap();
        network.set_attractors(vec![Vec2::new(10.0, 0.0)]);
        network.add_root(Vec2::ZERO).unwrap();
        network
    }

    fn assert_forest_is_acyclic(network: &GrowthNetwork) {
        let n = network.nodes().len();
        for id in 0..n {
            let hops = network.tree().ancestors(id).take(n + 1).count();
            assert!(hops < n.max(1), "node {id} does not reach a root");
            let last = network.tree().ancestors(id).last().unwrap_or(id);
            assert!(network.nodes()[last].parent.is_none());
            assert!(network.nodes()[last].fixed);
        }
    }

    #[test]
    fn new_rejects_invalid_settings() {
        let settings = Settings {
            kill_distance: 40.0,
            ..Settings::default()
        };
        assert!(matches!(
            GrowthNetwork::new(settings),
            Err(NetworkError::KillExceedsAttraction { .. })
        ));
    }

    #[test]
    fn set_settings_keeps_old_settings_on_error() {
        let mut network = GrowthNetwork::new(Settings::default()).unwrap();
        let bad = Settings {
            segment_length: -1.0,
            ..Settings::default()
        };
        assert!(network.set_settings(bad).is_err());
        assert_eq!(network.settings(), &Settings::default());
    }

    #[test]
    fn polygons_with_the_wrong_role_are_rejected() {
        let mut network = GrowthNetwork::new(Settings::default()).unwrap();
        assert_eq!(
            network.set_obstacles(bounds()),
            Err(NetworkError::RoleMismatch {
                expected: PathRole::Obstacle,
                found: PathRole::Bounds
            })
        );
        assert!(network.obstacles().is_empty());
    }

    #[test]
    fn add_root_rejects_non_finite_positions() {
        let mut network = GrowthNetwork::new(Settings::default()).unwrap();
        assert_eq!(
            network.add_root(Vec2::new(f32::INFINITY, 0.0)),
            Err(NetworkError::NonFiniteRoot)
        );
    }

    #[test]
    fn first_step_grows_towards_the_attractor() {
        let mut network = scenario();

        let report = network.step();

        assert_eq!(report.new_nodes, vec![1]);
        assert_eq!(network.nodes()[1].pos, Vec2::new(1.0, 0.0));
        assert_eq!(network.nodes()[1].parent, Some(0));
        assert_eq!(report.killed, 0);
        assert_eq!(network.attractors().len(), 1);
        assert!(network.attractors()[0].alive);
    }

    #[test]
    fn attractor_is_removed_once_a_node_is_within_kill_distance() {
        let mut network = scenario();

        let mut steps = 0;
        while !network.attractors().is_empty() && steps < 10 {
            network.step();
            steps += 1;
        }

        assert!(network.attractors().is_empty());
        // Nodes at x = 1, 2, 3, 4; the one at 4 is exactly 6 away.
        assert_eq!(steps, 4);
        assert_eq!(network.nodes().len(), 5);
        assert!(network.nodes().iter().all(|n| n.pos.y == 0.0));
    }

    #[test]
    fn network_stabilizes_once_attractors_are_gone() {
        let mut network = scenario();
        for _ in 0..10 {
            network.step();
        }
        let nodes = network.nodes().len();

        let report = network.step();

        assert!(report.is_idle());
        assert_eq!(network.nodes().len(), nodes);
    }

    #[test]
    fn unreachable_attractors_stay_active() {
        let mut network = scenario();
        network.set_attractors(vec![Vec2::new(45.0, 45.0)]);

        let report = network.step();

        assert!(report.is_idle());
        assert_eq!(network.attractors().len(), 1);
        assert!(network.attractors()[0].alive);
    }

    #[test]
    fn reset_then_repopulate_round_trips_without_steps() {
        let mut network = scenario();
        network.step();

        network.reset();
        assert!(network.nodes().is_empty());
        assert!(network.attractors().is_empty());
        assert!(network.bounds().is_empty());
        assert!(network.obstacles().is_empty());

        let roots = [Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0)];
        let attractors = vec![Vec2::new(0.0, 20.0), Vec2::new(3.0, -8.0)];
        network.set_bounds(bounds()).unwrap();
        network.set_attractors(attractors.clone());
        for r in roots {
            network.add_root(r).unwrap();
        }

        let node_positions: Vec<Vec2> = network.nodes().iter().map(|n| n.pos).collect();
        let attractor_positions: Vec<Vec2> = network.attractors().iter().map(|a| a.pos).collect();
        assert_eq!(node_positions, roots.to_vec());
        assert!(network.nodes().iter().all(|n| n.parent.is_none() && n.fixed));
        assert_eq!(attractor_positions, attractors);
    }

    #[test]
    fn growth_without_bounds_is_a_no_op() {
        let mut network = GrowthNetwork::new(Settings::default()).unwrap();
        network.set_attractors(vec![Vec2::new(10.0, 0.0)]);
        network.add_root(Vec2::ZERO).unwrap();

        let report = network.step();

        assert!(report.new_nodes.is_empty());
        assert_eq!(network.nodes().len(), 1);
        assert_eq!(network.attractors().len(), 1);
    }

    #[test]
    fn attractor_at_a_node_is_consumed_without_growth() {
        let mut network = scenario();
        network.set_attractors(vec![Vec2::ZERO]);

        let report = network.step();

        assert!(report.new_nodes.is_empty());
        assert_eq!(report.killed, 1);
        assert!(network.attractors().is_empty());
    }

    /// The engine does not re-check attractor placement: an attractor
    /// planted inside an obstacle (bypassing the pattern generator) still
    /// pulls on nodes, but every segment towards it crosses the obstacle
    /// edge and is rejected, so it is never reached.
    #[test]
    fn attractor_inside_an_obstacle_is_never_reached() {
        let mut network = scenario();
        network
            .set_obstacles(vec![
                Polygon::rect(Vec2::new(3.0, -3.0), Vec2::new(15.0, 3.0), PathRole::Obstacle)
                    .unwrap(),
            ])
            .unwrap();

        for _ in 0..30 {
            network.step();
        }

        assert_eq!(network.attractors().len(), 1);
        assert!(network.attractors()[0].alive);
        // Growth stalls at (2, 0): the next segment would touch the edge at x = 3.
        assert!(network.nodes().iter().all(|n| n.pos.x < 3.0));
        for (id, node) in network.nodes().iter().enumerate().skip(1) {
            let parent = network.nodes()[node.parent.unwrap()].pos;
            assert!(
                !network.obstacles()[0].intersects_segment(parent, node.pos),
                "segment into node {id} crosses the obstacle"
            );
        }
    }

    #[test]
    fn tips_are_demoted_when_they_branch() {
        let mut network = scenario();
        network.step();
        network.step();

        let nodes = network.nodes();
        assert!(!nodes[0].is_tip);
        assert!(!nodes[1].is_tip);
        assert!(nodes[2].is_tip);
        assert_eq!(network.tree().tips().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn open_venation_does_not_stack_duplicate_children() {
        let settings = Settings {
            venation_type: VenationType::Open,
            ..Settings::default()
        };
        let mut network = GrowthNetwork::new(settings).unwrap();
        network.set_bounds(bounds()).unwrap();
        network.set_attractors(vec![Vec2::new(10.0, 0.0)]);
        network.add_root(Vec2::ZERO).unwrap();

        network.step();
        network.step();

        // The root keeps being pulled but its child already sits at (1, 0).
        assert_eq!(network.nodes()[0].children, vec![1]);
        assert_eq!(network.nodes().len(), 3);
    }

    fn run_random_field(venation_type: VenationType) {
        let mut rng = StdRng::seed_from_u64(42);
        let settings = Settings {
            venation_type,
            segment_length: 2.0,
            attraction_distance: 25.0,
            kill_distance: 4.0,
            max_thickness: 2.5,
            thickness_blend: 0.5,
            ..Settings::default()
        };
        let mut network = GrowthNetwork::new(settings).unwrap();
        network
            .set_bounds(vec![
                Polygon::rect(Vec2::ZERO, Vec2::new(200.0, 200.0), PathRole::Bounds).unwrap(),
            ])
            .unwrap();
        network
            .set_obstacles(vec![
                Polygon::rect(Vec2::new(60.0, 60.0), Vec2::new(140.0, 90.0), PathRole::Obstacle)
                    .unwrap(),
                Polygon::new(
                    vec![
                        Vec2::new(30.0, 130.0),
                        Vec2::new(70.0, 170.0),
                        Vec2::new(20.0, 180.0),
                    ],
                    PathRole::Obstacle,
                )
                .unwrap(),
            ])
            .unwrap();
        let placed = network
            .populate_attractors(AttractorPattern::Random { count: 400 }, &mut rng)
            .unwrap();
        assert_eq!(placed, 400);
        network.add_root(Vec2::new(100.0, 5.0)).unwrap();
        network.add_root(Vec2::new(20.0, 20.0)).unwrap();

        for _ in 0..150 {
            let before = network.attractors().len();
            let nodes_before = network.nodes().len();
            let report = network.step();

            assert!(network.attractors().len() <= before);
            assert_eq!(network.nodes().len(), nodes_before + report.new_nodes.len());

            let kill2 = network.settings().kill_distance.powi(2);
            for a in network.attractors() {
                assert!(a.alive);
                assert!(
                    network
                        .nodes()
                        .iter()
                        .all(|n| n.pos.distance_squared(a.pos) > kill2),
                    "live attractor within kill distance"
                );
            }
        }

        assert!(network.nodes().len() > 2, "the forest should have grown");
        assert_forest_is_acyclic(&network);
        for (id, node) in network.nodes().iter().enumerate() {
            assert!(node.thickness > 0.0 && node.thickness <= 2.5);
            if let Some(p) = node.parent {
                assert!(p < id);
                let parent = network.nodes()[p].pos;
                assert!(network.bounds().iter().any(|b| b.contains(node.pos)));
                assert!(
                    network
                        .obstacles()
                        .iter()
                        .all(|o| !o.intersects_segment(parent, node.pos))
                );
            }
        }
    }

    #[test]
    fn random_field_keeps_every_invariant_closed() {
        run_random_field(VenationType::Closed);
    }

    #[test]
    fn random_field_keeps_every_invariant_open() {
        run_random_field(VenationType::Open);
    }

    #[test]
    fn toggles_flip_display_state_only() {
        let mut network = scenario();
        let settings = *network.settings();

        network.toggle_bounds();
        network.toggle_obstacles();
        network.toggle_attractors();
        network.toggle_render_mode();

        let display = network.display();
        assert!(!display.show_bounds);
        assert!(!display.show_obstacles);
        assert!(display.show_attractors);
        assert_eq!(display.render_mode, RenderMode::Lines);
        assert_eq!(network.settings(), &settings);

        assert!(network.is_paused());
        network.toggle_pause();
        assert!(!network.is_paused());
    }
}
