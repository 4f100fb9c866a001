use bevy::prelude::*;

use crate::actions::ActionKind;
use crate::character::Facing;
use crate::contact::{ContactContext, ContactView, Gimmick};
use crate::effects::SideEffect;

/// Hazard configuration.
#[derive(Reflect, Debug, Clone, Copy, Default)]
pub struct HazardConfig {
    /// Kill instead of hurting.
    pub lethal: bool,
}

impl HazardConfig {
    /// A hazard that kills on touch (pits, crushers).
    pub fn lethal() -> Self {
        Self { lethal: true }
    }
}

/// Spikes and other damaging objects.
///
/// Strikes on enter and again on every stay step once the hurt
/// invulnerability has run out.
#[derive(Debug, Clone, Default)]
pub struct Hazard {
    pub config: HazardConfig,
}

impl Hazard {
    pub fn new(config: HazardConfig) -> Self {
        Self { config }
    }

    fn strike(&self, ctx: &mut ContactContext) {
        let kind = if self.config.lethal {
            ActionKind::Die
        } else {
            ActionKind::Hurt
        };
        if !ctx.actions.can_perform(kind, ctx.character) {
            return;
        }

        // Face the hazard so the knockback pushes away from it.
        let towards = ctx.gimmick_bounds.center().x - ctx.character.position.x;
        if let Some(facing) = Facing::from_sign(towards) {
            ctx.character.facing = facing;
        }
        ctx.actions.perform(kind, ctx.character);
        ctx.emit(SideEffect::sound(if self.config.lethal { "death" } else { "hurt" }));
    }
}

impl Gimmick for Hazard {
    fn name(&self) -> &'static str {
        "hazard"
    }

    fn is_collision_valid(&self, view: &ContactView) -> bool {
        !view.actions.is_performing(ActionKind::Die)
    }

    fn on_collision_enter(&mut self, ctx: &mut ContactContext) {
        self.strike(ctx);
    }

    fn on_collision_stay(&mut self, ctx: &mut ContactContext) {
        self.strike(ctx);
    }

    fn debug_color(&self) -> Color {
        Color::srgb(1.0, 0.0, 0.0)
    }
}
