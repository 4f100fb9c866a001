use bevy::prelude::*;

use crate::actions::ActionKind;
use crate::character::Facing;
use crate::contact::{ContactContext, ContactView, Gimmick};
use crate::gimmick_mode::GimmickMode;

/// Force-roll tunnel configuration.
#[derive(Reflect, Debug, Clone, Copy, Default)]
pub struct TunnelConfig {
    /// Direction sign to push a stalled character in. Zero keeps its facing.
    pub push_direction: f32,
}

/// Keeps the character rolling while inside, so it cannot stand up in a low
/// passage.
#[derive(Debug, Clone, Default)]
pub struct ForceRollTunnel {
    pub config: TunnelConfig,
}

impl ForceRollTunnel {
    pub fn new(config: TunnelConfig) -> Self {
        Self { config }
    }
}

impl Gimmick for ForceRollTunnel {
    fn name(&self) -> &'static str {
        "force_roll_tunnel"
    }

    fn is_collision_valid(&self, view: &ContactView) -> bool {
        let mode = view.character.active_gimmick_mode();
        if view.pair_active {
            return mode == GimmickMode::ForceRoll;
        }
        view.character.grounded
            && mode == GimmickMode::None
            && !matches!(
                view.actions.current(),
                Some(ActionKind::Hurt | ActionKind::Die)
            )
    }

    fn on_collision_enter(&mut self, ctx: &mut ContactContext) {
        ctx.character.set_active_gimmick_mode(GimmickMode::ForceRoll);
        if let Some(facing) = Facing::from_sign(self.config.push_direction) {
            ctx.character.facing = facing;
        }
        if !ctx.actions.is_performing(ActionKind::Roll) {
            ctx.actions.perform(ActionKind::Roll, ctx.character);
        }
    }

    fn on_collision_stay(&mut self, ctx: &mut ContactContext) {
        if ctx.character.grounded && !ctx.actions.is_performing(ActionKind::Roll) {
            ctx.actions.perform(ActionKind::Roll, ctx.character);
        }
    }

    fn on_collision_exit(&mut self, ctx: &mut ContactContext) {
        ctx.character.release_gimmick_mode(GimmickMode::ForceRoll);
    }

    fn debug_color(&self) -> Color {
        Color::srgb(0.5, 0.3, 0.9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ContactPhase;
    use crate::gimmicks::harness::Harness;

    const TUNNEL: Vec2 = Vec2::new(0.0, 16.0);
    const EXTENTS: Vec2 = Vec2::new(64.0, 16.0);

    #[test]
    fn slow_character_is_forced_to_roll() {
        let mut harness = Harness::grounded(Vec2::new(0.0, 16.0));
        let mut tunnel = ForceRollTunnel::default();

        assert_eq!(harness.step(&mut tunnel, TUNNEL, EXTENTS), Some(ContactPhase::Enter));
        assert_eq!(harness.character.active_gimmick_mode(), GimmickMode::ForceRoll);
        assert!(harness.actions.is_performing(ActionKind::Roll));
    }

    #[test]
    fn leaving_releases_mode_and_roll_can_end() {
        let mut harness = Harness::grounded(Vec2::new(0.0, 16.0));
        let mut tunnel = ForceRollTunnel::default();
        harness.step(&mut tunnel, TUNNEL, EXTENTS);

        harness.character.position.x = 500.0;
        assert_eq!(harness.step(&mut tunnel, TUNNEL, EXTENTS), Some(ContactPhase::Exit));
        assert_eq!(harness.character.active_gimmick_mode(), GimmickMode::None);

        harness.character.set_ground_velocity(0.0);
        let Harness {
            character,
            actions,
            intent,
            ..
        } = &mut harness;
        actions.tick(character, intent, 1.0 / 60.0);
        assert!(!actions.is_performing(ActionKind::Roll));
    }
}
