//! State marker components.
//!
//! These components mirror a character's ground and wall contact for use in
//! queries (animation selection, sound triggers). They are added and removed
//! during [`PlatformerSet::Finalize`](crate::PlatformerSet::Finalize) from the
//! [`Character`](crate::character::Character) and its sensor results.

use bevy::prelude::*;

/// Marker component indicating the character stands on terrain or a platform.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use platformer_controller::prelude::*;
///
/// fn count_grounded(q: Query<(), (With<Character>, With<Grounded>)>) -> usize {
///     q.iter().count()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the character is pressed against a wall.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct TouchingWall {
    /// Direction from the character center to the wall.
    pub direction: Vec2,
    /// Normal of the wall surface.
    pub normal: Vec2,
}

impl Default for TouchingWall {
    fn default() -> Self {
        Self {
            direction: Vec2::X,
            normal: Vec2::NEG_X,
        }
    }
}

impl TouchingWall {
    pub fn new(direction: Vec2, normal: Vec2) -> Self {
        Self { direction, normal }
    }

    /// Check if the wall is on the left side.
    pub fn is_left(&self) -> bool {
        self.direction.x < 0.0
    }

    /// Check if the wall is on the right side.
    pub fn is_right(&self) -> bool {
        self.direction.x > 0.0
    }
}
