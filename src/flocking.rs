//! Flocking Rule Evaluation
//!
//! Boids behaviors implemented:
//! - **Cohesion**: steer toward the mean position of in-range neighbors
//! - **Separation**: push away from neighbors closer than `avoid_distance`
//! - **Alignment**: add a fraction of the mean neighbor velocity
//! - **Predator avoidance**: push away from an active predator within `visual_range`
//!
//! Neighbor and separation tests use Manhattan distance. The predator test
//! uses true Euclidean distance. Both are kept as tuned.

use crate::config::FlockConfig;
use crate::geometry::Vec2;
use crate::predator::Predator;
use crate::soa::BoidStore;

/// Per-rule velocity deltas for a single agent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    pub cohesion: Vec2,
    pub separation: Vec2,
    pub alignment: Vec2,
    pub predator: Vec2,
    /// Candidates that passed the visual range test
    pub neighbors: u32,
}

impl Steering {
    /// Sum of all four rule contributions.
    #[inline]
    pub fn total(&self) -> Vec2 {
        self.cohesion + self.separation + self.alignment + self.predator
    }
}

/// Evaluates the flocking rules against the current contents of a store.
///
/// Reads whatever the store holds right now, so agents already updated
/// earlier in the same pass are seen at their new state.
pub struct FlockingEvaluator<'a> {
    store: &'a BoidStore,
    config: &'a FlockConfig,
    predator: Predator,
}

impl<'a> FlockingEvaluator<'a> {
    pub fn new(store: &'a BoidStore, config: &'a FlockConfig, predator: Predator) -> Self {
        Self {
            store,
            config,
            predator,
        }
    }

    /// Compute the velocity delta for `agent` from a candidate set.
    ///
    /// `candidates` may contain `agent` itself; it is skipped.
    pub fn evaluate<I>(&self, agent: usize, candidates: I) -> Steering
    where
        I: IntoIterator<Item = u32>,
    {
        let config = self.config;
        let position = self.store.position(agent);

        let mut position_sum = Vec2::ZERO;
        let mut velocity_sum = Vec2::ZERO;
        let mut avoid = Vec2::ZERO;
        let mut count = 0u32;

        for neighbor in candidates {
            let ni = neighbor as usize;

            // Skip self
            if ni == agent {
                continue;
            }

            let other = self.store.position(ni);
            let distance = position.manhattan_distance(other);
            if distance > config.visual_range {
                continue;
            }

            position_sum += other;
            velocity_sum += self.store.velocity(ni);
            if distance < config.avoid_distance {
                avoid += position - other;
            }
            count += 1;
        }

        let mut steering = Steering {
            neighbors: count,
            ..Steering::default()
        };

        if count > 0 {
            let n = count as f32;
            let center = position_sum / n;
            let mean_velocity = velocity_sum / n;

            steering.cohesion = (center - position) * config.centering_factor;
            steering.separation = avoid * config.avoid_others_factor;
            steering.alignment = mean_velocity * config.match_velocity_factor;
        }

        if let Some(predator) = self.predator.active_position() {
            if position.distance(predator) < config.visual_range {
                steering.predator = (position - predator) * config.avoid_predator_factor;
            }
        }

        steering
    }
}
