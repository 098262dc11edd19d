//! Per-agent kinematics: wall steering, speed limiting and the position step.

use crate::config::FlockConfig;
use crate::geometry::{Vec2, Viewport};

/// Nudge `velocity` away from any viewport edge within `bounds_margin`.
///
/// Each of the four edges is checked independently, so a corner pushes on
/// both axes. Returns `true` if any edge fired.
pub fn steer_from_walls(
    position: Vec2,
    velocity: &mut Vec2,
    viewport: Viewport,
    config: &FlockConfig,
) -> bool {
    let margin = config.bounds_margin;
    let push = config.avoid_walls_factor;
    let mut out_of_bounds = false;

    if position.x < margin {
        out_of_bounds = true;
        velocity.x += push;
    }
    if position.y < margin {
        out_of_bounds = true;
        velocity.y += push;
    }
    if position.x > viewport.width - margin {
        out_of_bounds = true;
        velocity.x -= push;
    }
    if position.y > viewport.height - margin {
        out_of_bounds = true;
        velocity.y -= push;
    }

    out_of_bounds
}

/// Scale `velocity` down so `|vx| + |vy|` does not exceed `speed_limit`.
#[inline]
pub fn clamp_speed(velocity: Vec2, speed_limit: f32) -> Vec2 {
    let speed = velocity.manhattan_length();
    if speed > speed_limit {
        Vec2::new(
            (velocity.x / speed) * speed_limit,
            (velocity.y / speed) * speed_limit,
        )
    } else {
        velocity
    }
}

/// Step `position` by `velocity` and snap to whole units.
#[inline]
pub fn advance(position: Vec2, velocity: Vec2) -> Vec2 {
    (position + velocity).round_half_up()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn test_near_wall_pushes_inward() {
        let config = FlockConfig {
            avoid_walls_factor: 1.0,
            ..FlockConfig::default()
        };
        let position = Vec2::new(config.bounds_margin - 1.0, 100.0);
        let mut velocity = Vec2::new(2.0, -1.0);

        assert!(steer_from_walls(position, &mut velocity, viewport(), &config));
        assert_eq!(velocity, Vec2::new(3.0, -1.0));
    }

    #[test]
    fn test_corner_pushes_both_axes() {
        let config = FlockConfig::default();
        let mut velocity = Vec2::ZERO;

        assert!(steer_from_walls(Vec2::new(795.0, 595.0), &mut velocity, viewport(), &config));
        assert_eq!(velocity, Vec2::new(-0.8, -0.8));
    }

    #[test]
    fn test_inside_margin_is_untouched() {
        let config = FlockConfig::default();
        let mut velocity = Vec2::new(1.0, 1.0);

        assert!(!steer_from_walls(Vec2::new(400.0, 300.0), &mut velocity, viewport(), &config));
        // Exactly on the margin does not count
        assert!(!steer_from_walls(Vec2::new(10.0, 590.0), &mut velocity, viewport(), &config));
        assert_eq!(velocity, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_clamp_speed() {
        let clamped = clamp_speed(Vec2::new(6.0, -8.0), 7.0);
        assert!(clamped.manhattan_length() <= 7.0 + 1e-5);
        assert!((clamped.x - 3.0).abs() < 1e-5);
        assert!((clamped.y + 4.0).abs() < 1e-5);

        let slow = Vec2::new(2.0, 3.0);
        assert_eq!(clamp_speed(slow, 7.0), slow);
    }

    #[test]
    fn test_advance_rounds_half_up() {
        assert_eq!(
            advance(Vec2::new(10.0, 20.0), Vec2::new(1.4, -2.5)),
            Vec2::new(11.0, 18.0)
        );
        assert_eq!(
            advance(Vec2::new(0.0, 0.0), Vec2::new(0.5, -0.6)),
            Vec2::new(1.0, -1.0)
        );
    }
}
