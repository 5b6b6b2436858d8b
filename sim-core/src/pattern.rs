//! Attractor placement over the bounds, minus the obstacles.

use crate::{error::NetworkError, polygon::Polygon};
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Golden angle in radians, used by [`AttractorPattern::Phyllotaxis`].
const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Random placement gives up after this many tries per requested point.
const MAX_ATTEMPTS_PER_POINT: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttractorPattern {
    /// Evenly spaced cells over the bounds' bounding box, each point
    /// shifted by up to `jitter` on both axes.
    Grid {
        rows: usize,
        columns: usize,
        jitter: f32,
    },
    /// `count` uniformly random points.
    Random { count: usize },
    /// Golden-angle spiral of `count` points around `center`.
    Phyllotaxis {
        count: usize,
        spacing: f32,
        center: Vec2,
    },
}

/// `true` if `p` is inside at least one bounds polygon and no obstacle.
pub fn placeable(p: Vec2, bounds: &[Polygon], obstacles: &[Polygon]) -> bool {
    bounds.iter().any(|b| b.contains(p)) && !obstacles.iter().any(|o| o.contains(p))
}

fn bounding_box(bounds: &[Polygon]) -> Option<(Vec2, Vec2)> {
    bounds
        .iter()
        .map(Polygon::bounding_box)
        .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
}

/// Places attractors so that none lies inside an obstacle and all lie
/// inside at least one bounds polygon.
///
/// With no bounds nothing can be placed and an empty set is returned.
pub fn generate(
    pattern: AttractorPattern,
    bounds: &[Polygon],
    obstacles: &[Polygon],
    rng: &mut impl Rng,
) -> Result<Vec<Vec2>, NetworkError> {
    let Some((min, max)) = bounding_box(bounds) else {
        warn!("no bounds to place attractors in");
        return Ok(Vec::new());
    };
    let size = max - min;

    let positions: Vec<Vec2> = match pattern {
        AttractorPattern::Grid {
            rows,
            columns,
            jitter,
        } => {
            if rows == 0 || columns == 0 {
                return Err(NetworkError::InvalidPattern(format!(
                    "grid needs at least one row and column, got {rows}x{columns}"
                )));
            }
            if !(jitter.is_finite() && jitter >= 0.0) {
                return Err(NetworkError::InvalidPattern(format!(
                    "grid jitter must be non-negative, got {jitter}"
                )));
            }

            let cell = Vec2::new(size.x / columns as f32, size.y / rows as f32);
            let mut out = Vec::with_capacity(rows * columns);
            for row in 0..rows {
                for column in 0..columns {
                    let mut p = min + cell * Vec2::new(column as f32 + 0.5, row as f32 + 0.5);
                    if jitter > 0.0 {
                        p += Vec2::new(
                            rng.random_range(-jitter..=jitter),
                            rng.random_range(-jitter..=jitter),
                        );
                    }
                    if placeable(p, bounds, obstacles) {
                        out.push(p);
                    }
                }
            }
            out
        }

        AttractorPattern::Random { count } => {
            if count == 0 {
                return Err(NetworkError::InvalidPattern(
                    "random pattern needs a positive count".into(),
                ));
            }

            let mut out = Vec::with_capacity(count);
            let mut attempts = 0;
            while out.len() < count && attempts < count * MAX_ATTEMPTS_PER_POINT {
                attempts += 1;
                let p = Vec2::new(
                    rng.random_range(min.x..=max.x),
                    rng.random_range(min.y..=max.y),
                );
                if placeable(p, bounds, obstacles) {
                    out.push(p);
                }
            }
            out
        }

        AttractorPattern::Phyllotaxis {
            count,
            spacing,
            center,
        } => {
            if count == 0 || !(spacing.is_finite() && spacing > 0.0) {
                return Err(NetworkError::InvalidPattern(format!(
                    "phyllotaxis needs a positive count and spacing, got {count} / {spacing}"
                )));
            }

            (0..count)
                .map(|i| {
                    let r = spacing * (i as f32).sqrt();
                    let theta = i as f32 * GOLDEN_ANGLE;
                    center + Vec2::from_angle(theta) * r
                })
                .filter(|&p| placeable(p, bounds, obstacles))
                .collect()
        }
    };

    if positions.is_empty() {
        warn!(?pattern, "attractor pattern placed no points");
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::PathRole;
    use rand::{SeedableRng, rngs::StdRng};

    fn bounds() -> Vec<Polygon> {
        vec![Polygon::rect(Vec2::ZERO, Vec2::new(100.0, 100.0), PathRole::Bounds).unwrap()]
    }

    fn obstacle() -> Vec<Polygon> {
        vec![Polygon::rect(Vec2::new(0.0, 0.0), Vec2::new(50.0, 100.0), PathRole::Obstacle).unwrap()]
    }

    #[test]
    fn grid_without_jitter_fills_every_cell() {
        let mut rng = StdRng::seed_from_u64(1);
        let pattern = AttractorPattern::Grid {
            rows: 4,
            columns: 5,
            jitter: 0.0,
        };

        let points = generate(pattern, &bounds(), &[], &mut rng).unwrap();

        assert_eq!(points.len(), 20);
        assert_eq!(points[0], Vec2::new(10.0, 12.5));
    }

    #[test]
    fn grid_skips_points_inside_obstacles() {
        let mut rng = StdRng::seed_from_u64(1);
        let pattern = AttractorPattern::Grid {
            rows: 10,
            columns: 10,
            jitter: 2.0,
        };

        let points = generate(pattern, &bounds(), &obstacle(), &mut rng).unwrap();

        assert_eq!(points.len(), 50);
        assert!(points.iter().all(|p| placeable(*p, &bounds(), &obstacle())));
    }

    #[test]
    fn random_points_respect_bounds_and_obstacles() {
        let mut rng = StdRng::seed_from_u64(7);

        let points =
            generate(AttractorPattern::Random { count: 200 }, &bounds(), &obstacle(), &mut rng)
                .unwrap();

        assert_eq!(points.len(), 200);
        assert!(points.iter().all(|p| p.x > 50.0 && p.x <= 100.0));
    }

    #[test]
    fn phyllotaxis_is_clipped_to_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let pattern = AttractorPattern::Phyllotaxis {
            count: 500,
            spacing: 4.0,
            center: Vec2::new(50.0, 50.0),
        };

        let points = generate(pattern, &bounds(), &[], &mut rng).unwrap();

        assert!(!points.is_empty());
        assert!(points.len() < 500);
        assert!(points.iter().all(|p| bounds()[0].contains(*p)));
    }

    #[test]
    fn empty_bounds_place_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        let points = generate(AttractorPattern::Random { count: 10 }, &[], &[], &mut rng).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let grid = AttractorPattern::Grid {
            rows: 0,
            columns: 3,
            jitter: 0.0,
        };
        assert!(matches!(
            generate(grid, &bounds(), &[], &mut rng),
            Err(NetworkError::InvalidPattern(_))
        ));
        assert!(generate(AttractorPattern::Random { count: 0 }, &bounds(), &[], &mut rng).is_err());
    }
}
