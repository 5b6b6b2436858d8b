//! Error type shared by every fallible operation of the growth engine.

use crate::polygon::PathRole;

/// Validation failures reported before any step executes.
///
/// The engine never fails a tick: everything here is raised while
/// building polygons, applying settings or seeding the network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("polygon needs at least 3 vertices, got {vertices}")]
    DegeneratePolygon { vertices: usize },

    #[error("polygon vertex {index} is not finite")]
    NonFiniteVertex { index: usize },

    #[error("expected a {expected:?} polygon, got {found:?}")]
    RoleMismatch { expected: PathRole, found: PathRole },

    #[error("setting `{name}` must be positive and finite, got {value}")]
    InvalidSetting { name: &'static str, value: f32 },

    #[error("kill distance {kill} exceeds attraction distance {attraction}")]
    KillExceedsAttraction { kill: f32, attraction: f32 },

    #[error("tip thickness {tip} exceeds max thickness {max}")]
    TipExceedsMax { tip: f32, max: f32 },

    #[error("root position is not finite")]
    NonFiniteRoot,

    #[error("invalid attractor pattern: {0}")]
    InvalidPattern(String),
}
