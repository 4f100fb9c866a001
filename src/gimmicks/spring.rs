use bevy::prelude::*;

use crate::actions::ActionKind;
use crate::character::Facing;
use crate::contact::{ContactConfigError, ContactContext, ContactView, Gimmick};
use crate::effects::SideEffect;

/// Spring configuration.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct SpringConfig {
    /// Launch velocity. A zero x component keeps the horizontal velocity.
    pub launch: Vec2,
    /// Steps before the spring can fire again.
    pub rearm_ticks: u32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            launch: Vec2::new(0.0, 600.0),
            rearm_ticks: 10,
        }
    }
}

impl SpringConfig {
    /// Builder: set the launch velocity.
    pub fn with_launch(mut self, launch: Vec2) -> Self {
        self.launch = launch;
        self
    }
}

/// Launches the character and re-arms after a short delay.
#[derive(Debug, Clone, Default)]
pub struct Spring {
    pub config: SpringConfig,
    cooldown: u32,
}

impl Spring {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            config,
            cooldown: 0,
        }
    }

    /// Whether the spring can fire.
    pub fn is_armed(&self) -> bool {
        self.cooldown == 0
    }
}

impl Gimmick for Spring {
    fn name(&self) -> &'static str {
        "spring"
    }

    fn is_collision_valid(&self, view: &ContactView) -> bool {
        (view.pair_active || self.is_armed()) && !view.actions.is_performing(ActionKind::Die)
    }

    fn on_collision_enter(&mut self, ctx: &mut ContactContext) {
        if !ctx.actions.is_performing(ActionKind::Hurt) {
            ctx.actions.end_current(ctx.character);
        }
        ctx.actions.refresh_air_abilities();

        let launch = self.config.launch;
        let velocity = ctx.character.velocity;
        ctx.character.leave_ground();
        ctx.character.velocity = Vec2::new(
            if launch.x == 0.0 { velocity.x } else { launch.x },
            launch.y,
        );
        if let Some(facing) = Facing::from_sign(launch.x) {
            ctx.character.facing = facing;
        }

        self.cooldown = self.config.rearm_ticks;
        ctx.emit(SideEffect::sound("spring"));
    }

    fn update(&mut self, _position: &mut Vec2, _dt: f32) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    fn validate(&self) -> Result<(), ContactConfigError> {
        if self.config.launch.is_finite() && self.config.launch != Vec2::ZERO {
            Ok(())
        } else {
            Err(ContactConfigError::InvalidParameter {
                gimmick: self.name(),
                parameter: "launch",
                reason: "must be finite and non-zero",
            })
        }
    }

    fn debug_color(&self) -> Color {
        Color::srgb(1.0, 0.9, 0.1)
    }
}
