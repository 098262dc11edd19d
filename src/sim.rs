//! Simulation state and the per-tick update.
//!
//! A tick runs in three steps:
//! 1. Update pass over agents `0..n` in order. Results are written straight
//!    back into the store, so later agents see earlier agents' new state.
//! 2. Countdown maintenance. When the countdown drops below zero the grid is
//!    rebuilt and the countdown is reset to `rebuild_interval_ticks`.
//! 3. Predator reset to the off-screen sentinel.
//!
//! `tick` takes `&mut self`, so only one tick can be in flight and nothing
//! else can touch the config or predator while it runs.

use tracing::{debug, info};

use crate::config::{FlockConfig, NeighborQuery};
use crate::error::FlockError;
use crate::flocking::FlockingEvaluator;
use crate::geometry::{Vec2, Viewport};
use crate::grid::{RebuildStats, SpatialGrid};
use crate::integrate;
use crate::predator::Predator;
use crate::soa::BoidStore;

pub struct Simulation {
    store: BoidStore,
    grid: SpatialGrid,
    config: FlockConfig,
    viewport: Viewport,
    predator: Predator,
    rebuild_countdown: i64,
    ticks: u64,
    last_rebuild: Option<RebuildStats>,
}

impl Simulation {
    /// Scatter `agent_count` agents over the viewport and bucket them.
    pub fn initialize(
        agent_count: usize,
        viewport_width: f32,
        viewport_height: f32,
        config: FlockConfig,
        seed: u64,
    ) -> Result<Self, FlockError> {
        let viewport = Viewport::new(viewport_width, viewport_height);
        if !viewport.is_valid() {
            return Err(FlockError::InvalidViewport {
                width: viewport_width,
                height: viewport_height,
            });
        }
        let store = BoidStore::seeded(agent_count, viewport, seed);
        Self::from_store(store, viewport, config)
    }

    /// Wrap an existing store, e.g. hand-placed agents.
    pub fn from_store(
        store: BoidStore,
        viewport: Viewport,
        config: FlockConfig,
    ) -> Result<Self, FlockError> {
        config.validate()?;
        if store.len() > u32::MAX as usize {
            return Err(FlockError::PopulationTooLarge(store.len()));
        }

        let mut grid = SpatialGrid::new(config.cell_size, viewport)?;
        grid.build(&store)?;

        debug!(
            agents = store.len(),
            grid_width = grid.width(),
            grid_height = grid.height(),
            "simulation initialized"
        );

        Ok(Self {
            store,
            grid,
            config,
            viewport,
            predator: Predator::inactive(),
            rebuild_countdown: config.rebuild_interval_ticks as i64,
            ticks: 0,
            last_rebuild: None,
        })
    }

    /// Advance one step. `predator`, if given, is active for this tick only.
    pub fn tick(&mut self, predator: Option<Vec2>) {
        if let Some(position) = predator {
            self.predator.place(position);
        }

        let config = self.config;
        for agent in 0..self.store.len() {
            self.update_agent(agent, &config);
        }

        self.rebuild_countdown -= 1;
        if self.rebuild_countdown < 0 {
            self.last_rebuild = Some(self.grid.rebuild(&self.store));
            self.rebuild_countdown = config.rebuild_interval_ticks as i64;
        }

        self.predator.reset();
        self.ticks += 1;
    }

    fn update_agent(&mut self, agent: usize, config: &FlockConfig) {
        let position = self.store.position(agent);
        let mut velocity = self.store.velocity(agent);

        let out_of_bounds =
            integrate::steer_from_walls(position, &mut velocity, self.viewport, config);

        // Agents hugging a wall or alone in their cell skip the rules
        let query = config.neighbor_query;
        if !out_of_bounds && self.grid.candidate_count(agent, query) > 1 {
            let evaluator = FlockingEvaluator::new(&self.store, config, self.predator);
            let steering = match query {
                NeighborQuery::SingleCell => {
                    evaluator.evaluate(agent, self.grid.neighbors_of(agent).iter().copied())
                }
                NeighborQuery::Moore => evaluator.evaluate(agent, self.grid.neighborhood_of(agent)),
                NeighborQuery::Exhaustive => {
                    evaluator.evaluate(agent, 0..self.store.len() as u32)
                }
            };
            velocity += steering.total();
        }

        let velocity = integrate::clamp_speed(velocity, config.speed_limit);
        self.store.set_velocity(agent, velocity);
        self.store.set_position(agent, integrate::advance(position, velocity));
    }

    /// Place the predator for the next tick.
    pub fn set_predator(&mut self, position: Vec2) {
        self.predator.place(position);
    }

    pub fn clear_predator(&mut self) {
        self.predator.reset();
    }

    #[inline]
    pub fn predator(&self) -> Predator {
        self.predator
    }

    #[inline]
    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// Replace all coefficients. A different cell size re-creates the grid.
    ///
    /// Nothing changes if `config` fails validation.
    pub fn set_config(&mut self, config: FlockConfig) -> Result<(), FlockError> {
        config.validate()?;
        if config.cell_size != self.grid.cell_size() {
            self.regrid(config.cell_size, self.viewport, config.rebuild_interval_ticks)?;
        }
        self.config = config;
        Ok(())
    }

    /// Edit a copy of the current coefficients and commit it through
    /// [`Simulation::set_config`].
    pub fn update_config<F>(&mut self, edit: F) -> Result<(), FlockError>
    where
        F: FnOnce(&mut FlockConfig),
    {
        let mut config = self.config;
        edit(&mut config);
        self.set_config(config)
    }

    /// Re-create the grid with a new cell size from current positions.
    pub fn set_cell_size(&mut self, cell_size: f32) -> Result<(), FlockError> {
        self.update_config(|config| config.cell_size = cell_size)
    }

    /// Track a new viewport extent, re-creating the grid to cover it.
    pub fn resize_viewport(&mut self, width: f32, height: f32) -> Result<(), FlockError> {
        let viewport = Viewport::new(width, height);
        self.regrid(
            self.grid.cell_size(),
            viewport,
            self.config.rebuild_interval_ticks,
        )?;
        self.viewport = viewport;
        info!(width, height, "viewport resized");
        Ok(())
    }

    fn regrid(
        &mut self,
        cell_size: f32,
        viewport: Viewport,
        rebuild_interval_ticks: u32,
    ) -> Result<(), FlockError> {
        let mut grid = SpatialGrid::new(cell_size, viewport)?;
        grid.build(&self.store)?;
        debug!(
            cell_size,
            grid_width = grid.width(),
            grid_height = grid.height(),
            "spatial grid re-created"
        );
        self.grid = grid;
        self.rebuild_countdown = rebuild_interval_ticks as i64;
        Ok(())
    }

    // ==================== Read Accessors ====================

    #[inline]
    pub fn agent_count(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn store(&self) -> &BoidStore {
        &self.store
    }

    #[inline]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn position(&self, agent: usize) -> Vec2 {
        self.store.position(agent)
    }

    #[inline]
    pub fn velocity(&self, agent: usize) -> Vec2 {
        self.store.velocity(agent)
    }

    #[inline]
    pub fn positions_x(&self) -> &[f32] {
        self.store.positions_x()
    }

    #[inline]
    pub fn positions_y(&self) -> &[f32] {
        self.store.positions_y()
    }

    #[inline]
    pub fn velocities_x(&self) -> &[f32] {
        self.store.velocities_x()
    }

    #[inline]
    pub fn velocities_y(&self) -> &[f32] {
        self.store.velocities_y()
    }

    /// Cached grid cell of an agent.
    #[inline]
    pub fn cell_of_agent(&self, agent: usize) -> u32 {
        self.grid.cell_id(agent)
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Ticks left before the next rebuild fires (it fires when this goes negative).
    #[inline]
    pub fn ticks_until_rebuild(&self) -> i64 {
        self.rebuild_countdown
    }

    #[inline]
    pub fn last_rebuild(&self) -> Option<RebuildStats> {
        self.last_rebuild
    }
}
