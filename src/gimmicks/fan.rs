use bevy::prelude::*;

use crate::actions::ActionKind;
use crate::contact::{ContactConfigError, ContactContext, ContactView, Gimmick};
use crate::effects::SideEffect;
use crate::gimmick_mode::GimmickMode;

/// Fan configuration.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct FanConfig {
    /// Upward speed while inside the wind column.
    pub wind_speed: f32,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self { wind_speed: 300.0 }
    }
}

/// Wind column carrying the character upwards.
#[derive(Debug, Clone, Default)]
pub struct Fan {
    pub config: FanConfig,
}

impl Fan {
    pub fn new(config: FanConfig) -> Self {
        Self { config }
    }
}

impl Gimmick for Fan {
    fn name(&self) -> &'static str {
        "fan"
    }

    fn is_collision_valid(&self, view: &ContactView) -> bool {
        let mode = view.character.active_gimmick_mode();
        let free = !matches!(
            view.actions.current(),
            Some(ActionKind::Hurt | ActionKind::Die)
        );
        free && matches!(mode, GimmickMode::None | GimmickMode::InFan)
    }

    fn on_collision_enter(&mut self, ctx: &mut ContactContext) {
        ctx.actions.end_current(ctx.character);
        ctx.character.set_active_gimmick_mode(GimmickMode::InFan);
        ctx.character.leave_ground();
        ctx.character.velocity.y = self.config.wind_speed;
        ctx.emit(SideEffect::sound("fan"));
    }

    fn on_collision_stay(&mut self, ctx: &mut ContactContext) {
        if ctx.character.in_gimmick_mode(GimmickMode::InFan) {
            ctx.character.velocity.y = self.config.wind_speed;
        }
    }

    fn on_collision_exit(&mut self, ctx: &mut ContactContext) {
        ctx.character.release_gimmick_mode(GimmickMode::InFan);
        ctx.character.detach_from(ctx.gimmick_entity);
    }

    fn validate(&self) -> Result<(), ContactConfigError> {
        super::ensure_positive(self.name(), "wind_speed", self.config.wind_speed)
    }

    fn debug_color(&self) -> Color {
        Color::srgb(0.6, 0.9, 1.0)
    }
}
