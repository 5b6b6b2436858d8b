//! Closed polygons used as growth bounds and obstacles.

use crate::error::NetworkError;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What a polygon does to growth.
///
/// - `Bounds` - new nodes must land inside at least one of these.
/// - `Obstacle` - growth segments may not cross any of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathRole {
    Bounds,
    Obstacle,
}

/// An implicitly closed vertex loop with a role tag.
///
/// Immutable once built; the last vertex connects back to the first.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    role: PathRole,
    min: Vec2,
    max: Vec2,
}

impl Polygon {
    /// Builds a polygon, rejecting loops with fewer than 3 vertices or
    /// non-finite coordinates.
    pub fn new(vertices: Vec<Vec2>, role: PathRole) -> Result<Self, NetworkError> {
        if vertices.len() < 3 {
            return Err(NetworkError::DegeneratePolygon {
                vertices: vertices.len(),
            });
        }
        if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(NetworkError::NonFiniteVertex { index });
        }

        let (min, max) = vertices
            .iter()
            .fold((Vec2::MAX, Vec2::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        Ok(Self {
            vertices,
            role,
            min,
            max,
        })
    }

    /// Axis-aligned rectangle from two opposite corners.
    pub fn rect(a: Vec2, b: Vec2, role: PathRole) -> Result<Self, NetworkError> {
        let lo = a.min(b);
        let hi = a.max(b);
        Self::new(
            vec![lo, Vec2::new(hi.x, lo.y), hi, Vec2::new(lo.x, hi.y)],
            role,
        )
    }

    pub fn role(&self) -> PathRole {
        self.role
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Bounding box as `(min, max)`.
    pub fn bounding_box(&self) -> (Vec2, Vec2) {
        (self.min, self.max)
    }

    /// Edges of the closed loop, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Even-odd (ray casting) point containment.
    ///
    /// A horizontal ray is cast towards +x; every edge it crosses flips
    /// the inside state. Points exactly on an edge may land either way.
    pub fn contains(&self, point: Vec2) -> bool {
        if point.x < self.min.x
            || point.x > self.max.x
            || point.y < self.min.y
            || point.y > self.max.y
        {
            return false;
        }

        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Returns `true` if segment `a -> b` touches or crosses any edge.
    pub fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        let seg_min = a.min(b);
        let seg_max = a.max(b);
        if seg_max.x < self.min.x
            || seg_min.x > self.max.x
            || seg_max.y < self.min.y
            || seg_min.y > self.max.y
        {
            return false;
        }

        self.edges()
            .any(|(p, q)| segments_intersect(a, b, p, q))
    }
}

/// Closed segment intersection test, collinear overlap included.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
        (a - o).perp_dot(b - o)
    }

    let a_min = a1.min(a2);
    let a_max = a1.max(a2);
    let b_min = b1.min(b2);
    let b_max = b1.max(b2);

    if a_max.x < b_min.x || b_max.x < a_min.x || a_max.y < b_min.y || b_max.y < a_min.y {
        return false;
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(role: PathRole) -> Polygon {
        Polygon::rect(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0), role).unwrap()
    }

    #[test]
    fn new_rejects_fewer_than_three_vertices() {
        let err = Polygon::new(
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
            PathRole::Bounds,
        )
        .unwrap_err();
        assert_eq!(err, NetworkError::DegeneratePolygon { vertices: 2 });
    }

    #[test]
    fn new_rejects_non_finite_vertices() {
        let err = Polygon::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(f32::NAN, 0.0),
                Vec2::new(1.0, 1.0),
            ],
            PathRole::Obstacle,
        )
        .unwrap_err();
        assert_eq!(err, NetworkError::NonFiniteVertex { index: 1 });
    }

    #[test]
    fn contains_inside_and_outside_points() {
        let sq = square(PathRole::Bounds);
        assert!(sq.contains(Vec2::new(5.0, 5.0)));
        assert!(sq.contains(Vec2::new(0.5, 9.5)));
        assert!(!sq.contains(Vec2::new(-1.0, 5.0)));
        assert!(!sq.contains(Vec2::new(5.0, 11.0)));
    }

    #[test]
    fn contains_handles_concave_loops() {
        // A "U" shape opening upwards.
        let u = Polygon::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(9.0, 0.0),
                Vec2::new(9.0, 9.0),
                Vec2::new(6.0, 9.0),
                Vec2::new(6.0, 3.0),
                Vec2::new(3.0, 3.0),
                Vec2::new(3.0, 9.0),
                Vec2::new(0.0, 9.0),
            ],
            PathRole::Bounds,
        )
        .unwrap();

        assert!(u.contains(Vec2::new(1.5, 6.0)));
        assert!(u.contains(Vec2::new(7.5, 6.0)));
        assert!(u.contains(Vec2::new(4.5, 1.5)));
        assert!(!u.contains(Vec2::new(4.5, 6.0)), "notch is outside");
    }

    #[test]
    fn intersects_segment_crossing_an_edge() {
        let sq = square(PathRole::Obstacle);
        assert!(sq.intersects_segment(Vec2::new(-2.0, 5.0), Vec2::new(2.0, 5.0)));
        // Segment fully through the polygon.
        assert!(sq.intersects_segment(Vec2::new(-2.0, 5.0), Vec2::new(12.0, 5.0)));
    }

    #[test]
    fn intersects_segment_ignores_disjoint_and_interior_segments() {
        let sq = square(PathRole::Obstacle);
        assert!(!sq.intersects_segment(Vec2::new(-5.0, -5.0), Vec2::new(-1.0, -1.0)));
        // Entirely inside: no edge is crossed.
        assert!(!sq.intersects_segment(Vec2::new(2.0, 2.0), Vec2::new(3.0, 3.0)));
    }

    #[test]
    fn segments_intersect_touching_endpoint_counts() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
        ));
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
        ));
    }
}
