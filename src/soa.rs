//! Structure of Arrays (SoA) Agent Storage
//!
//! Stores agent data in contiguous arrays so the host can map each one
//! straight onto a `Float32Array` view of WASM memory:
//!
//! ```text
//! positions_x:   [x0, x1, x2, x3, x4, x5, x6, x7, ...]
//! positions_y:   [y0, y1, y2, y3, y4, y5, y6, y7, ...]
//! velocities_x:  [vx0, vx1, vx2, vx3, ...]
//! velocities_y:  [vy0, vy1, vy2, vy3, ...]
//! ```
//!
//! The population is fixed when the store is created. Arrays are never
//! reallocated afterwards, so raw pointers handed to JS stay valid for the
//! lifetime of the store.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::geometry::{Vec2, Viewport};

/// Initial velocity components are drawn from `[INITIAL_SPEED_MIN, INITIAL_SPEED_MAX)`
const INITIAL_SPEED_MIN: f32 = -2.0;
const INITIAL_SPEED_MAX: f32 = 3.0;

/// SoA buffer for agent positions and velocities
pub struct BoidStore {
    /// X positions of all agents
    positions_x: Vec<f32>,
    /// Y positions of all agents
    positions_y: Vec<f32>,
    /// X velocities of all agents
    velocities_x: Vec<f32>,
    /// Y velocities of all agents
    velocities_y: Vec<f32>,
}

impl BoidStore {
    /// Create a store of `len` agents at rest at the origin.
    pub fn new(len: usize) -> Self {
        Self {
            positions_x: vec![0.0; len],
            positions_y: vec![0.0; len],
            velocities_x: vec![0.0; len],
            velocities_y: vec![0.0; len],
        }
    }

    /// Scatter `len` agents uniformly over the viewport with small random velocities.
    ///
    /// Positions are floored to whole units, matching the rounding applied
    /// after every integration step.
    pub fn init<R: Rng + ?Sized>(len: usize, viewport: Viewport, rng: &mut R) -> Self {
        let mut store = Self::new(len);
        for i in 0..len {
            store.positions_x[i] = (rng.gen::<f32>() * viewport.width).floor();
            store.positions_y[i] = (rng.gen::<f32>() * viewport.height).floor();
            store.velocities_x[i] = rng.gen_range(INITIAL_SPEED_MIN..INITIAL_SPEED_MAX);
            store.velocities_y[i] = rng.gen_range(INITIAL_SPEED_MIN..INITIAL_SPEED_MAX);
        }
        store
    }

    /// Same as [`BoidStore::init`] with a ChaCha8 stream seeded from `seed`.
    pub fn seeded(len: usize, viewport: Viewport, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::init(len, viewport, &mut rng)
    }

    /// Build a store from explicit `(position, velocity)` pairs.
    pub fn from_agents(agents: &[(Vec2, Vec2)]) -> Self {
        let mut store = Self::new(agents.len());
        for (i, &(position, velocity)) in agents.iter().enumerate() {
            store.set_position(i, position);
            store.set_velocity(i, velocity);
        }
        store
    }

    /// Get agent count
    #[inline]
    pub fn len(&self) -> usize {
        self.positions_x.len()
    }

    /// Check if the store holds no agents
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions_x.is_empty()
    }

    #[inline]
    pub fn position(&self, index: usize) -> Vec2 {
        Vec2::new(self.positions_x[index], self.positions_y[index])
    }

    #[inline]
    pub fn velocity(&self, index: usize) -> Vec2 {
        Vec2::new(self.velocities_x[index], self.velocities_y[index])
    }

    #[inline]
    pub fn set_position(&mut self, index: usize, position: Vec2) {
        self.positions_x[index] = position.x;
        self.positions_y[index] = position.y;
    }

    #[inline]
    pub fn set_velocity(&mut self, index: usize, velocity: Vec2) {
        self.velocities_x[index] = velocity.x;
        self.velocities_y[index] = velocity.y;
    }

    #[inline]
    pub fn positions_x(&self) -> &[f32] {
        &self.positions_x
    }

    #[inline]
    pub fn positions_y(&self) -> &[f32] {
        &self.positions_y
    }

    #[inline]
    pub fn velocities_x(&self) -> &[f32] {
        &self.velocities_x
    }

    #[inline]
    pub fn velocities_y(&self) -> &[f32] {
        &self.velocities_y
    }

    // ==================== JS Interop ====================

    /// Get raw pointer to positions_x for JS interop
    #[inline]
    pub fn positions_x_ptr(&self) -> *const f32 {
        self.positions_x.as_ptr()
    }

    /// Get raw pointer to positions_y for JS interop
    #[inline]
    pub fn positions_y_ptr(&self) -> *const f32 {
        self.positions_y.as_ptr()
    }

    /// Get raw pointer to velocities_x for JS interop
    #[inline]
    pub fn velocities_x_ptr(&self) -> *const f32 {
        self.velocities_x.as_ptr()
    }

    /// Get raw pointer to velocities_y for JS interop
    #[inline]
    pub fn velocities_y_ptr(&self) -> *const f32 {
        self.velocities_y.as_ptr()
    }
}
