//! The controlled character.
//!
//! [`Character`] is the central hub for a character's kinematic state. It is
//! the single writer of position and velocity each step; gimmicks holding a
//! [`GimmickMode`] borrow that authority through the contact context.

use bevy::prelude::*;

use crate::actions::Actions;
use crate::config::ControllerConfig;
use crate::contact::ActiveContacts;
use crate::detection::{CollisionMask, SensorArray};
use crate::gimmick_mode::{GimmickMode, GimmickModeTracker};
use crate::ground::{normalize_angle, surface_normal, to_ground_velocity, to_world_velocity};
use crate::intent::ControlIntent;

/// Facing direction.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// `-1.0` for left, `1.0` for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Facing for a direction sign. Returns `None` for zero.
    pub fn from_sign(value: f32) -> Option<Self> {
        if value > 0.0 {
            Some(Self::Right)
        } else if value < 0.0 {
            Some(Self::Left)
        } else {
            None
        }
    }

    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Axes on which movement is blocked.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MovementRestriction {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl MovementRestriction {
    /// Whether horizontal movement is blocked.
    pub fn blocks_horizontal(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    /// Whether vertical movement is blocked.
    pub fn blocks_vertical(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }

    /// Combine two restrictions.
    pub fn union(self, other: Self) -> Self {
        match (
            self.blocks_horizontal() || other.blocks_horizontal(),
            self.blocks_vertical() || other.blocks_vertical(),
        ) {
            (true, true) => Self::Both,
            (true, false) => Self::Horizontal,
            (false, true) => Self::Vertical,
            (false, false) => Self::None,
        }
    }

    /// Zero the blocked components of a vector.
    pub fn apply(self, value: Vec2) -> Vec2 {
        Vec2::new(
            if self.blocks_horizontal() { 0.0 } else { value.x },
            if self.blocks_vertical() { 0.0 } else { value.y },
        )
    }
}

/// Link to a moving owner whose displacement is applied to the character.
///
/// Replaces parenting the character to a moving platform: each step the
/// owner's displacement since `anchor` is added to the character position.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct RelativeMotion {
    /// Entity carrying the character.
    pub owner: Entity,
    /// Owner position at the last applied step.
    pub anchor: Vec2,
}

/// Platformer character state.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct Character {
    // === Kinematics ===
    /// World position (center of the solid bounds).
    pub position: Vec2,
    /// World velocity.
    pub velocity: Vec2,
    /// Scalar speed along the ground tangent. Authoritative while grounded.
    pub ground_velocity: f32,
    /// Current ground angle in radians, `[0, 2π)`.
    pub ground_angle: f32,
    /// Whether the character stands on terrain.
    pub grounded: bool,
    /// Facing direction.
    pub facing: Facing,

    // === Constraints ===
    /// Axes on which movement is blocked by a gimmick.
    pub restrictions: MovementRestriction,
    /// Terrain layers the sensors may hit.
    pub collision_mask: CollisionMask,
    /// Half size of the solid bounds.
    pub half_extents: Vec2,
    /// Position restored on respawn.
    pub spawn_point: Vec2,

    mode: GimmickModeTracker,
    relative_motion: Option<RelativeMotion>,
    /// Consecutive steps without ground contact while grounded.
    pub(crate) ungrounded_ticks: u32,
}

impl Character {
    /// Create an airborne character at `position`.
    pub fn new(position: Vec2, half_extents: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            ground_velocity: 0.0,
            ground_angle: 0.0,
            grounded: false,
            facing: Facing::Right,
            restrictions: MovementRestriction::None,
            collision_mask: CollisionMask::default(),
            half_extents,
            spawn_point: position,
            mode: GimmickModeTracker::default(),
            relative_motion: None,
            ungrounded_ticks: 0,
        }
    }

    /// Solid bounds used for contact dispatch.
    pub fn solid_bounds(&self) -> Rect {
        Rect::from_center_half_size(self.position, self.half_extents)
    }

    /// Surface normal of the current ground (world up while airborne).
    pub fn ground_normal(&self) -> Vec2 {
        if self.grounded {
            surface_normal(self.ground_angle)
        } else {
            Vec2::Y
        }
    }

    /// Speed along the current movement axis: ground velocity while grounded,
    /// horizontal velocity otherwise.
    pub fn forward_speed(&self) -> f32 {
        if self.grounded {
            self.ground_velocity
        } else {
            self.velocity.x
        }
    }

    /// Set the ground velocity. While grounded the world velocity is
    /// re-derived from it.
    pub fn set_ground_velocity(&mut self, ground_velocity: f32) {
        self.ground_velocity = ground_velocity;
        if self.grounded {
            self.velocity = to_world_velocity(ground_velocity, self.ground_angle);
        }
    }

    /// Set the speed along the current movement axis.
    pub fn set_forward_speed(&mut self, speed: f32) {
        if self.grounded {
            self.set_ground_velocity(speed);
        } else {
            self.velocity.x = speed;
        }
    }

    /// Become grounded on a surface with the given angle, projecting the
    /// world velocity onto it.
    pub fn land(&mut self, angle: f32) {
        let angle = normalize_angle(angle);
        self.grounded = true;
        self.ungrounded_ticks = 0;
        self.ground_angle = angle;
        self.ground_velocity = to_ground_velocity(self.velocity, angle);
        self.velocity = to_world_velocity(self.ground_velocity, angle);
    }

    /// Become airborne. The last derived world velocity is kept.
    pub fn leave_ground(&mut self) {
        self.grounded = false;
        self.ungrounded_ticks = 0;
        self.ground_angle = 0.0;
    }

    /// Move the character along `normal` so its bounds rest on `point`.
    pub fn snap_to_surface(&mut self, point: Vec2, normal: Vec2) {
        let offset = (self.position - point).dot(normal);
        self.position += normal * (self.half_extents.y - offset);
    }

    /// Current gimmick mode.
    #[inline]
    pub fn active_gimmick_mode(&self) -> GimmickMode {
        self.mode.get()
    }

    /// Whether `mode` is the active gimmick mode.
    #[inline]
    pub fn in_gimmick_mode(&self, mode: GimmickMode) -> bool {
        self.mode.is(mode)
    }

    /// Set the gimmick mode, returning the previous one.
    ///
    /// Setting [`GimmickMode::None`] restores unrestricted movement and drops
    /// any relative-motion owner.
    pub fn set_active_gimmick_mode(&mut self, mode: GimmickMode) -> GimmickMode {
        let previous = self.mode.set(mode);
        if mode == GimmickMode::None {
            self.clear_gimmick_control();
        }
        previous
    }

    /// Reset the mode to [`GimmickMode::None`] only if `mode` is still active.
    pub fn release_gimmick_mode(&mut self, mode: GimmickMode) -> bool {
        let released = self.mode.release(mode);
        if released {
            self.clear_gimmick_control();
        }
        released
    }

    fn clear_gimmick_control(&mut self) {
        self.restrictions = MovementRestriction::None;
        self.relative_motion = None;
    }

    /// Add a movement restriction.
    pub fn restrict(&mut self, restriction: MovementRestriction) {
        self.restrictions = self.restrictions.union(restriction);
    }

    /// Link the character to a moving owner.
    pub fn attach_to(&mut self, owner: Entity, owner_position: Vec2) {
        self.relative_motion = Some(RelativeMotion {
            owner,
            anchor: owner_position,
        });
    }

    /// Drop the link if `owner` holds it. Returns whether it did.
    pub fn detach_from(&mut self, owner: Entity) -> bool {
        if self.relative_motion.is_some_and(|link| link.owner == owner) {
            self.relative_motion = None;
            true
        } else {
            false
        }
    }

    /// Current relative-motion link.
    pub fn relative_motion(&self) -> Option<RelativeMotion> {
        self.relative_motion
    }

    /// Apply the owner's displacement since the last step.
    pub fn follow_owner(&mut self, owner_position: Vec2) {
        if let Some(link) = self.relative_motion.as_mut() {
            self.position += owner_position - link.anchor;
            link.anchor = owner_position;
        }
    }

    /// Drop the relative-motion link unconditionally.
    pub fn clear_relative_motion(&mut self) {
        self.relative_motion = None;
    }

    /// Return to the spawn point with all motion and gimmick control reset.
    pub fn respawn(&mut self) {
        self.position = self.spawn_point;
        self.velocity = Vec2::ZERO;
        self.ground_velocity = 0.0;
        self.leave_ground();
        self.facing = Facing::Right;
        self.set_active_gimmick_mode(GimmickMode::None);
    }
}

/// Bundle for spawning a platformer character.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use platformer_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn(PlatformerCharacterBundle::new(
///         Vec2::new(0.0, 32.0),
///         Vec2::new(9.0, 19.0),
///         ControllerConfig::default(),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct PlatformerCharacterBundle {
    pub character: Character,
    pub config: ControllerConfig,
    pub actions: Actions,
    pub intent: ControlIntent,
    pub sensors: SensorArray,
    pub contacts: ActiveContacts,
    pub transform: Transform,
}

impl PlatformerCharacterBundle {
    /// Create a character at `position` with its action slots configured from
    /// `config`.
    pub fn new(position: Vec2, half_extents: Vec2, config: ControllerConfig) -> Self {
        Self {
            character: Character::new(position, half_extents),
            actions: Actions::new(&config.actions),
            config,
            intent: ControlIntent::new(),
            sensors: SensorArray::default(),
            contacts: ActiveContacts::default(),
            transform: Transform::from_translation(position.extend(0.0)),
        }
    }
}
