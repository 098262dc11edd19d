//! Small 2D value types shared by every stage of the tick.

use std::ops::{Add, AddAssign, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A 2D point or vector in world units (pixels on the host canvas).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// `|x| + |y|`, the cheap distance used for neighbor tests and speed.
    #[inline]
    pub fn manhattan_length(self) -> f32 {
        self.x.abs() + self.y.abs()
    }

    #[inline]
    pub fn manhattan_distance(self, other: Vec2) -> f32 {
        (self - other).manhattan_length()
    }

    /// True Euclidean length; only predator avoidance uses it.
    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    /// Round each component half-up to a whole unit.
    #[inline]
    pub fn round_half_up(self) -> Self {
        Self::new((self.x + 0.5).floor(), (self.y + 0.5).floor())
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

/// Extent of the area agents are steered to stay inside, and that the grid covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(5.0, -5.0);
        assert_eq!(a.manhattan_distance(b), 10.0);
        assert!((a.distance(b) - 50.0f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(Vec2::new(1.5, 2.49).round_half_up(), Vec2::new(2.0, 2.0));
        // Negative halves round toward +inf, not away from zero
        assert_eq!(Vec2::new(-1.5, -0.4).round_half_up(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_viewport_validity() {
        assert!(Viewport::new(800.0, 600.0).is_valid());
        assert!(!Viewport::new(0.0, 600.0).is_valid());
        assert!(!Viewport::new(f32::NAN, 600.0).is_valid());
    }
}
