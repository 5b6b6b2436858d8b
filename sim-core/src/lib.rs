//! Space-colonization growth of branching venation networks in 2-D.
//!
//! Main components:
//! - [`network`] — [`GrowthNetwork`], the owner of all state and the `step` driver.
//! - [`phases`] — attraction, growth, kill and canalization phases.
//! - [`polygon`] — bounds and obstacle polygons with containment and
//!   segment-intersection queries.
//! - [`tree`] — the append-only node arena (a forest of trees).
//! - [`attractor`] — attractor points and sets.
//! - [`pattern`] — attractor placement (grid, random, phyllotaxis).
//! - [`spatial`] — R*-tree node index for radius queries.
//! - [`influence_buffer`] — per-step scratch of accumulated pulls.
//! - [`config`] — simulation settings and display flags.
//! - [`error`] — validation errors.
//! - [`types`] — shared type aliases and IDs.

pub mod attractor;
pub mod config;
pub mod error;
pub mod influence_buffer;
pub mod network;
pub mod pattern;
pub mod phases;
pub mod polygon;
pub mod spatial;
pub mod tree;
pub mod types;

pub use config::{DisplayFlags, RenderMode, Settings, VenationType};
pub use error::NetworkError;
pub use glam::Vec2;
pub use network::{GrowthNetwork, StepReport};
pub use pattern::AttractorPattern;
pub use polygon::{PathRole, Polygon};
