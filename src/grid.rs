//! Uniform spatial hash over the viewport.
//!
//! Each bucket holds the indices of the agents whose cached cell id points at
//! it. Cached ids are refreshed only by [`SpatialGrid::rebuild`], which the
//! simulation runs every few ticks, so between rebuilds a bucket can list
//! agents that have already flown elsewhere. Neighbor queries accept that
//! staleness in exchange for O(1) lookups.
//!
//! Every agent is a member of exactly one bucket at all times. Agents that
//! leave the covered area keep their last in-range cell until they return.

use tracing::{debug, warn};

use crate::config::NeighborQuery;
use crate::error::FlockError;
use crate::geometry::Viewport;
use crate::soa::BoidStore;

/// Outcome of a [`SpatialGrid::rebuild`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Agents moved to a different bucket
    pub relocated: usize,
    /// Agents whose current position maps outside the grid
    pub untracked: usize,
}

pub struct SpatialGrid {
    cell_size: f32,
    width: u32,
    height: u32,
    buckets: Vec<Vec<u32>>,
    /// Cached cell id per agent
    cell_ids: Vec<u32>,
    /// Position of each agent inside its bucket, for O(1) removal
    slots: Vec<u32>,
}

impl SpatialGrid {
    /// Lay out `ceil(w / cell_size) x ceil(h / cell_size)` empty buckets.
    pub fn new(cell_size: f32, viewport: Viewport) -> Result<Self, FlockError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(FlockError::InvalidCellSize(cell_size));
        }
        if !viewport.is_valid() {
            return Err(FlockError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let width = (viewport.width / cell_size).ceil() as u64;
        let height = (viewport.height / cell_size).ceil() as u64;
        let bucket_count = width
            .checked_mul(height)
            .filter(|&count| count <= u32::MAX as u64)
            .ok_or(FlockError::GridTooLarge { width, height })?;

        Ok(Self {
            cell_size,
            width: width as u32,
            height: height as u32,
            buckets: vec![Vec::new(); bucket_count as usize],
            cell_ids: Vec::new(),
            slots: Vec::new(),
        })
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Cell id for a world position: `floor(x / cell) + floor(y / cell) * width`.
    ///
    /// The result is only meaningful when it falls in `[0, bucket_count)`.
    /// Positions left of or above the viewport give negative ids; positions
    /// past the right edge alias into the next row. Ids too large for `i64`
    /// come back as `i64::MIN`, which is always out of range.
    #[inline]
    pub fn cell_of(&self, x: f32, y: f32) -> i64 {
        let col = (x / self.cell_size).floor() as i64;
        let row = (y / self.cell_size).floor() as i64;
        row.checked_mul(self.width as i64)
            .and_then(|offset| offset.checked_add(col))
            .unwrap_or(i64::MIN)
    }

    #[inline]
    fn in_range(&self, cell: i64) -> Option<u32> {
        if cell >= 0 && (cell as u64) < self.buckets.len() as u64 {
            Some(cell as u32)
        } else {
            None
        }
    }

    /// Cell for a position clamped onto the grid edge.
    fn clamped_cell_of(&self, x: f32, y: f32) -> u32 {
        let max_col = (self.width - 1) as f32;
        let max_row = (self.height - 1) as f32;
        let col = (x / self.cell_size).floor().clamp(0.0, max_col) as u32;
        let row = (y / self.cell_size).floor().clamp(0.0, max_row) as u32;
        col + row * self.width
    }

    /// Assign every agent to a bucket from scratch.
    ///
    /// Agents outside the covered area are placed in the nearest edge cell.
    pub fn build(&mut self, store: &BoidStore) -> Result<(), FlockError> {
        if store.len() > u32::MAX as usize {
            return Err(FlockError::PopulationTooLarge(store.len()));
        }

        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.cell_ids.clear();
        self.slots.clear();

        for agent in 0..store.len() {
            let p = store.position(agent);
            let cell = self.clamped_cell_of(p.x, p.y);
            let bucket = &mut self.buckets[cell as usize];
            self.cell_ids.push(cell);
            self.slots.push(bucket.len() as u32);
            bucket.push(agent as u32);
        }

        debug!(
            agents = store.len(),
            width = self.width,
            height = self.height,
            cell_size = self.cell_size,
            "spatial grid built"
        );
        Ok(())
    }

    /// Move agents whose position now maps to a different in-range cell.
    ///
    /// Agents whose new cell is out of range keep their old membership and
    /// cached id. Calling this twice without movement in between is a no-op.
    pub fn rebuild(&mut self, store: &BoidStore) -> RebuildStats {
        let mut stats = RebuildStats::default();

        for agent in 0..self.cell_ids.len() {
            let p = store.position(agent);
            let new_cell = self.cell_of(p.x, p.y);
            if new_cell == self.cell_ids[agent] as i64 {
                continue;
            }

            let Some(new_cell) = self.in_range(new_cell) else {
                stats.untracked += 1;
                continue;
            };

            self.remove(agent);
            self.insert(agent, new_cell);
            stats.relocated += 1;
        }

        if stats.untracked > 0 && stats.untracked == self.cell_ids.len() {
            warn!(agents = stats.untracked, "every agent is outside the tracked area");
        }
        debug!(
            relocated = stats.relocated,
            untracked = stats.untracked,
            "spatial grid rebuilt"
        );
        stats
    }

    fn remove(&mut self, agent: usize) {
        let cell = self.cell_ids[agent] as usize;
        let slot = self.slots[agent] as usize;
        let bucket = &mut self.buckets[cell];
        bucket.swap_remove(slot);
        if let Some(&moved) = bucket.get(slot) {
            self.slots[moved as usize] = slot as u32;
        }
    }

    fn insert(&mut self, agent: usize, cell: u32) {
        let bucket = &mut self.buckets[cell as usize];
        self.slots[agent] = bucket.len() as u32;
        bucket.push(agent as u32);
        self.cell_ids[agent] = cell;
    }

    /// Cached cell id of an agent (may be stale between rebuilds).
    #[inline]
    pub fn cell_id(&self, agent: usize) -> u32 {
        self.cell_ids[agent]
    }

    #[inline]
    pub fn bucket(&self, cell: u32) -> &[u32] {
        &self.buckets[cell as usize]
    }

    /// Members of the agent's cached bucket, the agent itself included.
    #[inline]
    pub fn neighbors_of(&self, agent: usize) -> &[u32] {
        self.bucket(self.cell_ids[agent])
    }

    /// Members of the agent's cached bucket and the in-range buckets around it.
    pub fn neighborhood_of(&self, agent: usize) -> impl Iterator<Item = u32> + '_ {
        let cell = self.cell_ids[agent];
        let col = (cell % self.width) as i64;
        let row = (cell / self.width) as i64;
        let (width, height) = (self.width as i64, self.height as i64);

        (-1..=1i64)
            .flat_map(move |dy| (-1..=1i64).map(move |dx| (col + dx, row + dy)))
            .filter(move |&(c, r)| c >= 0 && r >= 0 && c < width && r < height)
            .flat_map(move |(c, r)| self.buckets[(c + r * width) as usize].iter().copied())
    }

    /// Number of candidates `query` would hand to the flocking rules.
    pub fn candidate_count(&self, agent: usize, query: NeighborQuery) -> usize {
        match query {
            NeighborQuery::SingleCell => self.neighbors_of(agent).len(),
            NeighborQuery::Moore => self.neighborhood_of(agent).count(),
            NeighborQuery::Exhaustive => self.cell_ids.len(),
        }
    }
}
