//! Error types for simulation setup.
//!
//! The tick itself never fails; everything here is raised while building
//! the store or the grid, so a bad configuration is rejected up front.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlockError {
    /// Cell size must be a positive, finite number of world units.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),

    #[error("viewport must have a positive finite extent, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    /// A steering coefficient was NaN or infinite.
    #[error("coefficient `{name}` must be finite, got {value}")]
    NonFiniteCoefficient { name: &'static str, value: f32 },

    #[error("population of {0} agents exceeds the u32 index range")]
    PopulationTooLarge(usize),

    /// `width * height` buckets would not fit a u32 cell id.
    #[error("grid of {width}x{height} cells is too large")]
    GridTooLarge { width: u64, height: u64 },
}
