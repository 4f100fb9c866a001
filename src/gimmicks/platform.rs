use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::actions::ActionKind;
use crate::contact::{
    horizontal_overlap, target_is_above, ContactConfigError, ContactContext, ContactView, Gimmick,
};
use crate::gimmick_mode::GimmickMode;

/// How deep a riding character's feet sit inside the platform bounds, so the
/// pair keeps overlapping while both move.
const RIDE_DEPTH: f32 = 0.5;

/// Moving platform configuration.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct PlatformConfig {
    /// Peak displacement from the starting position.
    pub amplitude: Vec2,
    /// Seconds per full oscillation.
    pub period: f32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            amplitude: Vec2::new(64.0, 0.0),
            period: 4.0,
        }
    }
}

/// Oscillating platform that carries a character standing on it.
///
/// While ridden the character holds [`GimmickMode::OnPlatform`]: the platform
/// supports it instead of terrain, and its displacement is applied through
/// relative motion.
#[derive(Debug, Clone, Default)]
pub struct MovingPlatform {
    pub config: PlatformConfig,
    origin: Option<Vec2>,
    elapsed: f32,
}

impl MovingPlatform {
    pub fn new(config: PlatformConfig) -> Self {
        Self {
            config,
            origin: None,
            elapsed: 0.0,
        }
    }

    fn ride_height(ctx: &ContactContext) -> f32 {
        ctx.gimmick_bounds.max.y + ctx.character.half_extents.y - RIDE_DEPTH
    }
}

impl Gimmick for MovingPlatform {
    fn name(&self) -> &'static str {
        "moving_platform"
    }

    fn is_collision_valid(&self, view: &ContactView) -> bool {
        if view.pair_active {
            return view.character.grounded
                && view.character.in_gimmick_mode(GimmickMode::OnPlatform)
                && horizontal_overlap(view.character_bounds, view.gimmick_bounds);
        }
        view.character.velocity.y <= 0.0
            && target_is_above(view.character_bounds, view.gimmick_bounds)
            && view.character.in_gimmick_mode(GimmickMode::None)
            && !view.actions.is_performing(ActionKind::Die)
    }

    fn on_collision_enter(&mut self, ctx: &mut ContactContext) {
        let height = Self::ride_height(ctx);
        ctx.character.position.y = height;
        if !ctx.character.grounded {
            ctx.character.velocity.y = 0.0;
            ctx.character.land(0.0);
            ctx.actions.notify_landed(ctx.character);
        }
        ctx.character.set_active_gimmick_mode(GimmickMode::OnPlatform);
        ctx.character.attach_to(ctx.gimmick_entity, ctx.gimmick_position);
    }

    fn on_collision_stay(&mut self, ctx: &mut ContactContext) {
        let height = Self::ride_height(ctx);
        ctx.character.position.y = height;
    }

    fn on_collision_exit(&mut self, ctx: &mut ContactContext) {
        ctx.character.release_gimmick_mode(GimmickMode::OnPlatform);
        ctx.character.detach_from(ctx.gimmick_entity);
    }

    fn update(&mut self, position: &mut Vec2, dt: f32) {
        let origin = *self.origin.get_or_insert(*position);
        self.elapsed = (self.elapsed + dt) % self.config.period.max(f32::EPSILON);
        let phase = TAU * self.elapsed / self.config.period.max(f32::EPSILON);
        *position = origin + self.config.amplitude * phase.sin();
    }

    fn validate(&self) -> Result<(), ContactConfigError> {
        super::ensure_positive(self.name(), "period", self.config.period)
    }

    fn debug_color(&self) -> Color {
        Color::srgb(0.8, 0.8, 0.8)
    }
}
