use bevy::prelude::*;

use super::{Action, ActionContext, ActionKind, ActionStatus};
use crate::character::Character;
use crate::config::ActionConfig;
use crate::gimmick_mode::GimmickMode;
use crate::intent::ControlIntent;

/// Knockback after taking damage.
///
/// Lasts until landing, then grants a short invulnerability window.
#[derive(Debug, Clone)]
pub struct Hurt {
    knockback: Vec2,
    invulnerable_ticks: u32,
    invulnerable_remaining: u32,
}

impl Hurt {
    pub fn new(config: &ActionConfig) -> Self {
        Self {
            knockback: config.hurt_knockback,
            invulnerable_ticks: config.hurt_invulnerable_ticks,
            invulnerable_remaining: 0,
        }
    }

    /// Whether the invulnerability window is running.
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_remaining > 0
    }
}

impl Action for Hurt {
    fn kind(&self) -> ActionKind {
        ActionKind::Hurt
    }

    fn can_perform(&self, ctx: &ActionContext) -> bool {
        !ctx.is_incapacitated() && !self.is_invulnerable()
    }

    fn on_start(&mut self, character: &mut Character) {
        character.set_active_gimmick_mode(GimmickMode::None);
        character.leave_ground();
        character.velocity = Vec2::new(
            -character.facing.sign() * self.knockback.x,
            self.knockback.y,
        );
    }

    fn on_end(&mut self, _character: &mut Character) {
        self.invulnerable_remaining = self.invulnerable_ticks;
    }

    fn tick(&mut self, _character: &mut Character, _intent: &ControlIntent, _dt: f32) -> ActionStatus {
        ActionStatus::Running
    }

    fn on_landed(&mut self, character: &mut Character) -> ActionStatus {
        character.set_ground_velocity(0.0);
        ActionStatus::Finished
    }

    fn locks_input(&self) -> bool {
        true
    }

    fn update_timers(&mut self, active: bool) {
        if !active {
            self.invulnerable_remaining = self.invulnerable_remaining.saturating_sub(1);
        }
    }
}
