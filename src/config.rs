//! Controller configuration components.
//!
//! This module defines the tuning values for platformer characters: ground
//! movement, slope physics, sensor reach and action parameters. Values are
//! in world units (pixels) per second. They are defaults for tuning, not
//! canonical constants.

use bevy::prelude::*;

/// Ability performed when jump is pressed in mid-air.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AirAbility {
    /// No mid-air ability.
    None,
    /// Glide (requires an active jump).
    #[default]
    Glide,
    /// Homing attack towards the nearest target.
    HomingAttack,
}

/// Tuning for the actions in the action registry.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct ActionConfig {
    // === Jump ===
    /// Jump speed along the surface normal.
    pub jump_speed: f32,
    /// Upward speed is capped to this when jump is released early.
    pub jump_release_speed: f32,

    // === Roll ===
    /// Minimum ground speed to start rolling.
    pub roll_min_speed: f32,
    /// Rolling ends below this ground speed.
    pub unroll_speed: f32,

    // === Glide ===
    /// Horizontal glide speed.
    pub glide_speed: f32,
    /// Constant sink speed while gliding.
    pub glide_sink_speed: f32,
    /// Steps needed to turn around mid-glide.
    pub glide_turn_ticks: u32,
    /// Steps spent standing up after a glide landing.
    pub glide_stand_up_ticks: u32,

    // === Homing attack ===
    /// Dash speed of the homing attack.
    pub homing_speed: f32,
    /// Maximum dash duration in steps.
    pub homing_ticks: u32,
    /// Maximum distance to a homing target.
    pub homing_range: f32,

    // === Hurt ===
    /// Knockback velocity (x away from facing, y up).
    pub hurt_knockback: Vec2,
    /// Invulnerability after recovering, in steps.
    pub hurt_invulnerable_ticks: u32,

    // === Die ===
    /// Upward speed when dying.
    pub death_bounce_speed: f32,
    /// Steps before respawning.
    pub death_respawn_ticks: u32,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            jump_speed: 390.0,
            jump_release_speed: 240.0,

            roll_min_speed: 61.875,
            unroll_speed: 30.0,

            glide_speed: 240.0,
            glide_sink_speed: 30.0,
            glide_turn_ticks: 12,
            glide_stand_up_ticks: 16,

            homing_speed: 720.0,
            homing_ticks: 30,
            homing_range: 160.0,

            hurt_knockback: Vec2::new(120.0, 240.0),
            hurt_invulnerable_ticks: 120,

            death_bounce_speed: 420.0,
            death_respawn_ticks: 90,
        }
    }
}

/// Configuration parameters for a platformer character.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct ControllerConfig {
    // === Ground Movement ===
    /// Top running speed reachable by input alone.
    pub top_speed: f32,
    /// Acceleration while input agrees with the ground velocity.
    pub acceleration: f32,
    /// Deceleration while input opposes the ground velocity.
    pub deceleration: f32,
    /// Friction without input.
    pub friction: f32,
    /// Friction while rolling.
    pub roll_friction: f32,

    // === Air Movement ===
    /// Horizontal acceleration in the air.
    pub air_acceleration: f32,
    /// Gravity magnitude.
    pub gravity: f32,
    /// Maximum falling speed.
    pub max_fall_speed: f32,

    // === Slope Settings ===
    /// Gravity along the slope applied to the ground velocity.
    pub slope_factor: f32,
    /// Below this ground speed the character falls off walls and ceilings.
    pub wall_fall_speed: f32,

    // === Sensor Settings ===
    /// Reach below the feet while grounded.
    pub ground_snap_distance: f32,
    /// Reach below the feet while airborne.
    pub landing_distance: f32,
    /// Consecutive ground misses tolerated before becoming airborne.
    pub ground_miss_tolerance: u32,
    /// Horizontal inset of the ground probes from the bounds edges.
    pub sensor_inset: f32,
    /// Wall probe reach beyond the bounds. Also the furthest a character
    /// can move towards a wall in one step without passing it.
    pub wall_probe_margin: f32,
    /// Ceiling probe reach beyond the bounds. Same per-step limit as walls.
    pub ceiling_probe_margin: f32,

    // === Actions ===
    /// Mid-air ability on jump press.
    pub air_ability: AirAbility,
    /// Action tuning.
    pub actions: ActionConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Ground movement
            top_speed: 360.0,
            acceleration: 168.75,
            deceleration: 1800.0,
            friction: 168.75,
            roll_friction: 84.375,

            // Air movement
            air_acceleration: 337.5,
            gravity: 787.5,
            max_fall_speed: 960.0,

            // Slope settings
            slope_factor: 450.0,
            wall_fall_speed: 150.0,

            // Sensor settings
            ground_snap_distance: 14.0,
            landing_distance: 2.0,
            ground_miss_tolerance: 1,
            sensor_inset: 1.0,
            wall_probe_margin: 16.0,
            ceiling_probe_margin: 16.0,

            air_ability: AirAbility::Glide,
            actions: ActionConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Config for a character with the homing attack instead of the glide.
    pub fn homing() -> Self {
        Self {
            air_ability: AirAbility::HomingAttack,
            ..default()
        }
    }

    /// Config with slope physics disabled (useful for flat test levels).
    pub fn flat() -> Self {
        Self {
            slope_factor: 0.0,
            ..default()
        }
    }

    /// Builder: set movement parameters.
    pub fn with_movement(mut self, top_speed: f32, acceleration: f32) -> Self {
        self.top_speed = top_speed;
        self.acceleration = acceleration;
        self
    }

    /// Builder: set gravity magnitude.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set friction.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Builder: set slope factor.
    pub fn with_slope_factor(mut self, slope_factor: f32) -> Self {
        self.slope_factor = slope_factor;
        self
    }

    /// Builder: set ground miss tolerance.
    pub fn with_ground_miss_tolerance(mut self, ticks: u32) -> Self {
        self.ground_miss_tolerance = ticks;
        self
    }

    /// Builder: set ground snap distance.
    pub fn with_ground_snap_distance(mut self, distance: f32) -> Self {
        self.ground_snap_distance = distance;
        self
    }

    /// Builder: set air ability.
    pub fn with_air_ability(mut self, ability: AirAbility) -> Self {
        self.air_ability = ability;
        self
    }

    /// Builder: set action tuning.
    pub fn with_actions(mut self, actions: ActionConfig) -> Self {
        self.actions = actions;
        self
    }

    /// Builder: set jump speed.
    pub fn with_jump_speed(mut self, speed: f32) -> Self {
        self.actions.jump_speed = speed;
        self
    }
}

/// Global physics timing.
///
/// All position and velocity integration is multiplied by `multiplier`, so
/// slow-motion and fast-forward effects keep the simulation consistent.
#[derive(Resource, Reflect, Debug, Clone, Copy)]
#[reflect(Resource)]
pub struct PhysicsStep {
    /// Global physics speed multiplier.
    pub multiplier: f32,
}

impl Default for PhysicsStep {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl PhysicsStep {
    /// Scaled step delta, with a fallback for testing scenarios where the
    /// fixed clock has not advanced yet.
    pub fn delta(&self, fixed: Option<&Time<Fixed>>) -> f32 {
        let dt = fixed
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0);
        let multiplier = if self.multiplier.is_finite() {
            self.multiplier.max(0.0)
        } else {
            0.0
        };
        dt * multiplier
    }
}
