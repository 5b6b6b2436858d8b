//! Default scene: a canvas-sized bounds rectangle, a grid of building
//! obstacles, grid attractors and three roots along the bottom edge.
//!
//! Coordinates are canvas pixels with y pointing down.

use rand::Rng;
use tracing::info;
use venation_core::{
    AttractorPattern, GrowthNetwork, NetworkError, PathRole, Polygon, Vec2,
};

pub const CANVAS_SIZE: Vec2 = Vec2::new(1920.0, 1080.0);

pub const ROOTS: [Vec2; 3] = [
    Vec2::new(290.0, 980.0),
    Vec2::new(662.0, 987.0),
    Vec2::new(1600.0, 1010.0),
];

/// Root added once the simulation has run for a while.
pub const LATE_ROOT: Vec2 = Vec2::new(1147.0, 230.0);

/// Steps after a reset before [`LATE_ROOT`] is planted.
pub const LATE_ROOT_DELAY_STEPS: usize = 180;

pub const ATTRACTOR_PATTERN: AttractorPattern = AttractorPattern::Grid {
    rows: 180,
    columns: 150,
    jitter: 10.0,
};

const OBSTACLE_ROWS: usize = 4;
const OBSTACLE_COLUMNS: usize = 6;
const PADDING: Vec2 = Vec2::new(100.0, 50.0);
const MARGIN: Vec2 = Vec2::new(90.0, 50.0);

/// Per-box adjustments `(index, offset, size delta)`.
const OBSTACLE_CORRECTIONS: [(usize, Vec2, Vec2); 1] =
    [(0, Vec2::new(-10.0, -20.0), Vec2::new(-40.0, -10.0))];

pub fn bounds() -> Result<Vec<Polygon>, NetworkError> {
    Ok(vec![Polygon::rect(Vec2::ZERO, CANVAS_SIZE, PathRole::Bounds)?])
}

/// Grid of rectangular "buildings" laid out with padding and margins.
pub fn obstacles() -> Result<Vec<Polygon>, NetworkError> {
    let cols = OBSTACLE_COLUMNS as f32;
    let rows = OBSTACLE_ROWS as f32;
    let box_size = Vec2::new(
        (CANVAS_SIZE.x - PADDING.x * 2.0 - MARGIN.x * 2.0 * cols) / cols,
        (CANVAS_SIZE.y - PADDING.y * 2.0 - MARGIN.y * 2.0 * rows) / rows,
    );

    let mut out = Vec::with_capacity(OBSTACLE_ROWS * OBSTACLE_COLUMNS);
    for row in 0..OBSTACLE_ROWS {
        for column in 0..OBSTACLE_COLUMNS {
            let index = row * OBSTACLE_COLUMNS + column;
            let (offset, delta) = OBSTACLE_CORRECTIONS
                .iter()
                .find(|(i, _, _)| *i == index)
                .map_or((Vec2::ZERO, Vec2::ZERO), |&(_, o, d)| (o, d));

            let cell = Vec2::new(column as f32, row as f32);
            let top_left = PADDING + (box_size + MARGIN * 2.0) * cell + offset;
            let bottom_right = top_left + box_size + delta;
            out.push(Polygon::rect(top_left, bottom_right, PathRole::Obstacle)?);
        }
    }
    Ok(out)
}

/// Resets `network` and fills it with the default scene.
pub fn populate(network: &mut GrowthNetwork, rng: &mut impl Rng) -> Result<(), NetworkError> {
    network.reset();
    network.set_bounds(bounds()?)?;
    network.set_obstacles(obstacles()?)?;
    network.populate_attractors(ATTRACTOR_PATTERN, rng)?;
    for root in ROOTS {
        network.add_root(root)?;
    }
    info!(
        obstacles = network.obstacles().len(),
        attractors = network.attractors().len(),
        roots = ROOTS.len(),
        "scene populated"
    );
    Ok(())
}
