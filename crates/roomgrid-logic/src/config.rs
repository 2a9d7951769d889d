//! Placement configuration and its validation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::thickness;

/// Tunables for placement generation that are not part of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// World size given to floor content along the up axis.
    pub floor_thickness: f32,
    /// World size given to wall content along the wall normal.
    pub wall_thickness: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            floor_thickness: thickness::FLOOR,
            wall_thickness: thickness::WALL,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Floor thickness is zero, negative or not finite.
    InvalidFloorThickness(f32),
    /// Wall thickness is zero, negative or not finite.
    InvalidWallThickness(f32),
    /// A tile size axis is zero, negative or not finite.
    InvalidTileSize(Vec3),
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

/// Validate a placement configuration, returning all errors found.
pub fn validate_config(config: &PlacementConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    if !positive(config.floor_thickness) {
        errors.push(ConfigError::InvalidFloorThickness(config.floor_thickness));
    }
    if !positive(config.wall_thickness) {
        errors.push(ConfigError::InvalidWallThickness(config.wall_thickness));
    }
    errors
}

/// Every tile size axis must be a positive finite number.
pub fn validate_tile_size(tile_size: Vec3) -> Vec<ConfigError> {
    if tile_size.to_array().iter().all(|&v| positive(v)) {
        Vec::new()
    } else {
        vec![ConfigError::InvalidTileSize(tile_size)]
    }
}
