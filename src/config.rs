//! Steering coefficients and grid settings.
//!
//! Defaults match the values the canvas demo ships with. Every field may be
//! changed between ticks; the simulation copies the whole struct at the start
//! of each tick, so a change never lands halfway through an update pass.

use serde::{Deserialize, Serialize};

use crate::error::FlockError;

/// Which agents are handed to the flocking rules as neighbor candidates.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NeighborQuery {
    /// Only the agent's cached bucket. Under-counts neighbors near cell
    /// edges whenever `visual_range > cell_size`.
    #[default]
    SingleCell = 0,
    /// The cached bucket plus its eight in-range neighbors.
    Moore = 1,
    /// Every agent; O(n^2), no grid involved.
    Exhaustive = 2,
}

impl NeighborQuery {
    /// Decode the `u8` code used across the JS boundary.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(NeighborQuery::SingleCell),
            1 => Some(NeighborQuery::Moore),
            2 => Some(NeighborQuery::Exhaustive),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlockConfig {
    /// Cohesion weight
    pub centering_factor: f32,
    /// Separation weight
    pub avoid_others_factor: f32,
    /// Alignment weight
    pub match_velocity_factor: f32,
    pub avoid_predator_factor: f32,
    /// Velocity added per tick while inside the bounds margin
    pub avoid_walls_factor: f32,
    /// Maximum Manhattan speed
    pub speed_limit: f32,
    pub avoid_distance: f32,
    pub visual_range: f32,
    pub bounds_margin: f32,
    pub rebuild_interval_ticks: u32,
    /// Fixed once the grid is built; see `Simulation::set_cell_size`.
    pub cell_size: f32,
    pub neighbor_query: NeighborQuery,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            centering_factor: 0.005,
            avoid_others_factor: 0.03,
            match_velocity_factor: 0.09,
            avoid_predator_factor: 0.05,
            avoid_walls_factor: 0.8,
            speed_limit: 7.0,
            avoid_distance: 14.0,
            visual_range: 130.0,
            bounds_margin: 10.0,
            rebuild_interval_ticks: 30,
            cell_size: 50.0,
            neighbor_query: NeighborQuery::SingleCell,
        }
    }
}

impl FlockConfig {
    pub fn validate(&self) -> Result<(), FlockError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(FlockError::InvalidCellSize(self.cell_size));
        }

        let coefficients = [
            ("centeringFactor", self.centering_factor),
            ("avoidOthersFactor", self.avoid_others_factor),
            ("matchVelocityFactor", self.match_velocity_factor),
            ("avoidPredatorFactor", self.avoid_predator_factor),
            ("avoidWallsFactor", self.avoid_walls_factor),
            ("speedLimit", self.speed_limit),
            ("avoidDistance", self.avoid_distance),
            ("visualRange", self.visual_range),
            ("boundsMargin", self.bounds_margin),
        ];
        for (name, value) in coefficients {
            if !value.is_finite() {
                return Err(FlockError::NonFiniteCoefficient { name, value });
            }
        }

        Ok(())
    }
}
