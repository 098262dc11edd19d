//! The pointer-driven predator.
//!
//! The host moves the predator with the mouse between ticks. After every
//! tick the simulation parks it at an off-screen sentinel, so it only
//! repels agents on ticks where the host placed it again.

use crate::geometry::Vec2;

/// Where an inactive predator is parked, well outside any viewport.
pub const INACTIVE_PREDATOR: Vec2 = Vec2::new(-1000.0, -1000.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Predator {
    position: Vec2,
}

impl Predator {
    pub fn inactive() -> Self {
        Self {
            position: INACTIVE_PREDATOR,
        }
    }

    pub fn at(position: Vec2) -> Self {
        Self { position }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// A predator counts only while both coordinates are positive.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.position.x > 0.0 && self.position.y > 0.0
    }

    #[inline]
    pub fn active_position(&self) -> Option<Vec2> {
        self.is_active().then_some(self.position)
    }

    pub fn place(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn reset(&mut self) {
        self.position = INACTIVE_PREDATOR;
    }
}

impl Default for Predator {
    fn default() -> Self {
        Self::inactive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predator_lifecycle() {
        let mut predator = Predator::default();
        assert!(!predator.is_active());
        assert_eq!(predator.active_position(), None);

        predator.place(Vec2::new(320.0, 200.0));
        assert_eq!(predator.active_position(), Some(Vec2::new(320.0, 200.0)));

        predator.reset();
        assert_eq!(predator.position(), INACTIVE_PREDATOR);
        assert!(!predator.is_active());
    }

    #[test]
    fn test_predator_on_viewport_edge_is_inactive() {
        assert!(!Predator::at(Vec2::new(0.0, 150.0)).is_active());
        assert!(!Predator::at(Vec2::new(150.0, -3.0)).is_active());
    }
}
