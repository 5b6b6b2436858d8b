use crate::error::NetworkError;
use serde::{Deserialize, Serialize};

/// How many nodes a single attractor may pull per step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VenationType {
    /// Every node within attraction distance is pulled.
    Open,
    /// Only the nearest node within attraction distance is pulled.
    #[default]
    Closed,
}

/// How the host draws branch segments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    Lines,
    #[default]
    Dots,
}

/// Simulation parameters, immutable during a run unless explicitly replaced.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub venation_type: VenationType,
    /// Length of each new branch segment.
    pub segment_length: f32,
    /// Radius around an attractor within which nodes are recruited.
    pub attraction_distance: f32,
    /// Radius around an attractor within which it counts as reached.
    pub kill_distance: f32,
    /// Host-loop gate; the engine never reads it.
    pub is_paused: bool,
    pub enable_canalization: bool,
    pub enable_opacity_blending: bool,
    pub max_thickness: f32,
    /// Uniform internal thickness when canalization is off.
    pub branch_thickness: f32,
    /// Thickness of tip nodes, and the base unit of canalization.
    pub tip_thickness: f32,
    /// Fraction of the gap to the canalization target closed per step, in (0, 1].
    pub thickness_blend: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            venation_type: VenationType::Closed,
            segment_length: 1.0,
            attraction_distance: 30.0,
            kill_distance: 6.0,
            is_paused: true,
            enable_canalization: true,
            enable_opacity_blending: true,
            max_thickness: 3.0,
            branch_thickness: 1.0,
            tip_thickness: 1.0,
            thickness_blend: 1.0,
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), NetworkError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NetworkError::InvalidSetting { name, value })
    }
}

impl Settings {
    /// Checks every numeric parameter and the distance ordering.
    pub fn validate(&self) -> Result<(), NetworkError> {
        positive("segment_length", self.segment_length)?;
        positive("attraction_distance", self.attraction_distance)?;
        positive("kill_distance", self.kill_distance)?;
        positive("max_thickness", self.max_thickness)?;
        positive("branch_thickness", self.branch_thickness)?;
        positive("tip_thickness", self.tip_thickness)?;
        positive("thickness_blend", self.thickness_blend)?;

        if self.thickness_blend > 1.0 {
            return Err(NetworkError::InvalidSetting {
                name: "thickness_blend",
                value: self.thickness_blend,
            });
        }
        if self.kill_distance > self.attraction_distance {
            return Err(NetworkError::KillExceedsAttraction {
                kill: self.kill_distance,
                attraction: self.attraction_distance,
            });
        }
        if self.tip_thickness > self.max_thickness {
            return Err(NetworkError::TipExceedsMax {
                tip: self.tip_thickness,
                max: self.max_thickness,
            });
        }
        Ok(())
    }
}

/// Visibility switches for the host renderer. Never read by the algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayFlags {
    pub show_attractors: bool,
    pub show_nodes: bool,
    pub show_tips: bool,
    pub show_attraction_zones: bool,
    pub show_kill_zones: bool,
    pub show_influence_lines: bool,
    pub show_bounds: bool,
    pub show_obstacles: bool,
    pub render_mode: RenderMode,
    pub bounds_border_thickness: f32,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            show_attractors: false,
            show_nodes: true,
            show_tips: true,
            show_attraction_zones: false,
            show_kill_zones: false,
            show_influence_lines: false,
            show_bounds: true,
            show_obstacles: true,
            render_mode: RenderMode::Dots,
            bounds_border_thickness: 3.0,
        }
    }
}
