//! WASM Spatial-Hash Boids Module
//!
//! Flocking simulation for thousands of agents per frame. Neighbors are
//! approximated with a uniform grid over the viewport instead of an O(n²)
//! scan, and the grid is only re-bucketed every few ticks.
//!
//! # Architecture
//!
//! Agent state lives in a Structure of Arrays (SoA) layout:
//! - All X positions are contiguous in memory
//! - All Y positions are contiguous in memory
//! - etc.
//!
//! so the host can draw straight out of `Float32Array` views of WASM memory
//! without copying.
//!
//! Each tick updates agents in index order, in place: cohesion, separation
//! and alignment against the agent's grid cell, predator avoidance, wall
//! steering, a Manhattan speed clamp, then a position step rounded to whole
//! pixels.
//!
//! # Usage from JavaScript
//!
//! ```javascript
//! import init, { FlockEngine } from './boids_spatial_hash.js';
//!
//! const { memory } = await init();
//! const engine = new FlockEngine(5000, canvas.width, canvas.height, 1234);
//!
//! const posX = new Float32Array(memory.buffer, engine.positions_x_ptr(), engine.agent_count);
//! const posY = new Float32Array(memory.buffer, engine.positions_y_ptr(), engine.agent_count);
//!
//! document.onmousemove = (e) => engine.set_predator(e.clientX, e.clientY);
//!
//! function frame() {
//!     requestAnimationFrame(frame);
//!     engine.tick();
//!     for (let i = 0; i < engine.agent_count; i++) {
//!         ctx.rect(posX[i], posY[i], 4, 4);
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod flocking;
pub mod geometry;
pub mod grid;
pub mod integrate;
pub mod predator;
pub mod sim;
pub mod soa;

pub use config::{FlockConfig, NeighborQuery};
pub use error::FlockError;
pub use flocking::{FlockingEvaluator, Steering};
pub use geometry::{Vec2, Viewport};
pub use grid::{RebuildStats, SpatialGrid};
pub use predator::Predator;
pub use sim::Simulation;
pub use soa::BoidStore;

use wasm_bindgen::prelude::*;

// Use `wee_alloc` as the global allocator for smaller WASM size
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Main flocking engine
///
/// Owns the simulation and exposes the interface JS drives once per frame.
#[wasm_bindgen]
pub struct FlockEngine {
    sim: Simulation,
}

#[wasm_bindgen]
impl FlockEngine {
    /// Create an engine with the default coefficients
    #[wasm_bindgen(constructor)]
    pub fn new(
        agent_count: usize,
        viewport_width: f32,
        viewport_height: f32,
        seed: u32,
    ) -> Result<FlockEngine, JsError> {
        let sim = Simulation::initialize(
            agent_count,
            viewport_width,
            viewport_height,
            FlockConfig::default(),
            seed as u64,
        )?;
        Ok(Self { sim })
    }

    /// Create an engine from a plain config object; missing keys take defaults
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        agent_count: usize,
        viewport_width: f32,
        viewport_height: f32,
        seed: u32,
        config: JsValue,
    ) -> Result<FlockEngine, JsError> {
        let config: FlockConfig = serde_wasm_bindgen::from_value(config)?;
        let sim = Simulation::initialize(
            agent_count,
            viewport_width,
            viewport_height,
            config,
            seed as u64,
        )?;
        Ok(Self { sim })
    }

    /// Get the number of agents
    #[wasm_bindgen(getter)]
    pub fn agent_count(&self) -> usize {
        self.sim.agent_count()
    }

    /// Get the number of completed ticks
    #[wasm_bindgen(getter)]
    pub fn tick_count(&self) -> f64 {
        self.sim.tick_count() as f64
    }

    #[wasm_bindgen(getter)]
    pub fn grid_width(&self) -> u32 {
        self.sim.grid().width()
    }

    #[wasm_bindgen(getter)]
    pub fn grid_height(&self) -> u32 {
        self.sim.grid().height()
    }

    // ==================== Buffer Pointers ====================
    // These return raw pointers that JS converts to Float32Array views

    /// Get pointer to positions X array
    #[wasm_bindgen]
    pub fn positions_x_ptr(&self) -> *const f32 {
        self.sim.store().positions_x_ptr()
    }

    /// Get pointer to positions Y array
    #[wasm_bindgen]
    pub fn positions_y_ptr(&self) -> *const f32 {
        self.sim.store().positions_y_ptr()
    }

    /// Get pointer to velocities X array
    #[wasm_bindgen]
    pub fn velocities_x_ptr(&self) -> *const f32 {
        self.sim.store().velocities_x_ptr()
    }

    /// Get pointer to velocities Y array
    #[wasm_bindgen]
    pub fn velocities_y_ptr(&self) -> *const f32 {
        self.sim.store().velocities_y_ptr()
    }

    // ==================== Predator ====================

    /// Place the predator for the next tick (typically the mouse position)
    #[wasm_bindgen]
    pub fn set_predator(&mut self, x: f32, y: f32) {
        self.sim.set_predator(Vec2::new(x, y));
    }

    #[wasm_bindgen]
    pub fn clear_predator(&mut self) {
        self.sim.clear_predator();
    }

    // ==================== Parameters ====================

    /// Replace every coefficient from a plain config object
    #[wasm_bindgen]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let config: FlockConfig = serde_wasm_bindgen::from_value(config)?;
        self.sim.set_config(config)?;
        Ok(())
    }

    /// Current coefficients as a plain object
    #[wasm_bindgen]
    pub fn config(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(self.sim.config())?)
    }

    /// Set cohesion weight
    #[wasm_bindgen]
    pub fn set_cohesion(&mut self, centering_factor: f32) -> Result<(), JsError> {
        self.sim
            .update_config(|config| config.centering_factor = centering_factor)?;
        Ok(())
    }

    /// Set separation parameters
    #[wasm_bindgen]
    pub fn set_separation(
        &mut self,
        avoid_others_factor: f32,
        avoid_distance: f32,
    ) -> Result<(), JsError> {
        self.sim.update_config(|config| {
            config.avoid_others_factor = avoid_others_factor;
            config.avoid_distance = avoid_distance;
        })?;
        Ok(())
    }

    /// Set alignment weight
    #[wasm_bindgen]
    pub fn set_alignment(&mut self, match_velocity_factor: f32) -> Result<(), JsError> {
        self.sim
            .update_config(|config| config.match_velocity_factor = match_velocity_factor)?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_predator_avoidance(&mut self, avoid_predator_factor: f32) -> Result<(), JsError> {
        self.sim
            .update_config(|config| config.avoid_predator_factor = avoid_predator_factor)?;
        Ok(())
    }

    /// Set wall steering strength and the margin it kicks in at
    #[wasm_bindgen]
    pub fn set_wall_avoidance(
        &mut self,
        avoid_walls_factor: f32,
        bounds_margin: f32,
    ) -> Result<(), JsError> {
        self.sim.update_config(|config| {
            config.avoid_walls_factor = avoid_walls_factor;
            config.bounds_margin = bounds_margin;
        })?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_speed_limit(&mut self, speed_limit: f32) -> Result<(), JsError> {
        self.sim
            .update_config(|config| config.speed_limit = speed_limit)?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_visual_range(&mut self, visual_range: f32) -> Result<(), JsError> {
        self.sim
            .update_config(|config| config.visual_range = visual_range)?;
        Ok(())
    }

    /// Set how many ticks pass between grid rebuilds
    #[wasm_bindgen]
    pub fn set_rebuild_interval(&mut self, ticks: u32) -> Result<(), JsError> {
        self.sim
            .update_config(|config| config.rebuild_interval_ticks = ticks)?;
        Ok(())
    }

    /// Set neighbor query strategy (see `neighbor_query_*` constants)
    #[wasm_bindgen]
    pub fn set_neighbor_query(&mut self, code: u8) -> Result<(), JsError> {
        let query = NeighborQuery::from_code(code)
            .ok_or_else(|| JsError::new(&format!("unknown neighbor query code {code}")))?;
        self.sim
            .update_config(|config| config.neighbor_query = query)?;
        Ok(())
    }

    /// Change the grid cell size; re-buckets every agent
    #[wasm_bindgen]
    pub fn set_cell_size(&mut self, cell_size: f32) -> Result<(), JsError> {
        self.sim.set_cell_size(cell_size)?;
        Ok(())
    }

    /// Follow a canvas resize
    #[wasm_bindgen]
    pub fn resize(&mut self, viewport_width: f32, viewport_height: f32) -> Result<(), JsError> {
        self.sim.resize_viewport(viewport_width, viewport_height)?;
        Ok(())
    }

    // ==================== Computation ====================

    /// Advance the simulation by one tick
    ///
    /// A predator placed with `set_predator` since the previous tick is
    /// applied and then cleared. After calling, read positions through the
    /// pointer views.
    #[wasm_bindgen]
    pub fn tick(&mut self) {
        self.sim.tick(None);
    }
}

// ==================== Neighbor Query Constants ====================
// Exposed as getter functions for JS (wasm_bindgen doesn't support const exports)

/// Only the agent's own grid cell
#[wasm_bindgen]
pub fn neighbor_query_single_cell() -> u8 {
    NeighborQuery::SingleCell as u8
}

/// The agent's cell and the eight around it
#[wasm_bindgen]
pub fn neighbor_query_moore() -> u8 {
    NeighborQuery::Moore as u8
}

/// Every agent, no grid
#[wasm_bindgen]
pub fn neighbor_query_exhaustive() -> u8 {
    NeighborQuery::Exhaustive as u8
}

// Note: wasm-bindgen automatically exports `memory` - don't define it manually

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation() {
        let engine = FlockEngine::new(100, 800.0, 600.0, 1).ok().expect("engine");
        assert_eq!(engine.agent_count(), 100);
        assert_eq!(engine.tick_count(), 0.0);
        assert_eq!(engine.grid_width(), 16);
        assert_eq!(engine.grid_height(), 12);
    }

    #[test]
    fn test_engine_tick_consumes_predator() {
        let mut engine = FlockEngine::new(64, 400.0, 400.0, 2).ok().expect("engine");
        engine.set_predator(200.0, 200.0);
        assert!(engine.sim.predator().is_active());

        engine.tick();
        assert_eq!(engine.tick_count(), 1.0);
        assert!(!engine.sim.predator().is_active());
    }

    #[test]
    fn test_engine_setters() {
        let mut engine = FlockEngine::new(10, 400.0, 400.0, 3).ok().expect("engine");
        assert!(engine.set_cohesion(0.01).is_ok());
        assert!(engine.set_separation(0.05, 20.0).is_ok());
        assert!(engine.set_wall_avoidance(1.0, 25.0).is_ok());
        assert!(engine.set_rebuild_interval(5).is_ok());
        assert!(engine.set_cell_size(100.0).is_ok());

        let config = engine.sim.config();
        assert_eq!(config.centering_factor, 0.01);
        assert_eq!(config.avoid_distance, 20.0);
        assert_eq!(config.bounds_margin, 25.0);
        assert_eq!(config.rebuild_interval_ticks, 5);
        assert_eq!(engine.grid_width(), 4);
    }

    #[test]
    fn test_engine_setters_reject_non_finite_values() {
        let mut engine = FlockEngine::new(40, 400.0, 400.0, 5).ok().expect("engine");
        assert!(engine.set_speed_limit(f32::NAN).is_err());
        assert!(engine.set_cohesion(f32::INFINITY).is_err());
        assert!(engine.set_separation(0.05, f32::NAN).is_err());
        assert!(engine.set_wall_avoidance(f32::NEG_INFINITY, 10.0).is_err());
        assert_eq!(engine.sim.config(), &FlockConfig::default());

        for _ in 0..20 {
            engine.tick();
        }
        for agent in 0..engine.agent_count() {
            assert!(engine.sim.velocity(agent).manhattan_length() <= 7.0 + 1e-4);
        }
    }

    #[test]
    fn test_pointers_track_store() {
        let mut engine = FlockEngine::new(16, 300.0, 300.0, 4).ok().expect("engine");
        let before = engine.positions_x_ptr();
        engine.tick();
        assert_eq!(engine.positions_x_ptr(), before);

        let x0 = unsafe { *engine.positions_x_ptr() };
        assert_eq!(x0, engine.sim.position(0).x);
    }

    #[test]
    fn test_neighbor_query_constants() {
        assert_eq!(neighbor_query_single_cell(), 0);
        assert_eq!(neighbor_query_moore(), 1);
        assert_eq!(neighbor_query_exhaustive(), 2);
    }
}
