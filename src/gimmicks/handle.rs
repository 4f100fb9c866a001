use bevy::prelude::*;

use crate::actions::ActionKind;
use crate::character::MovementRestriction;
use crate::contact::{ContactContext, ContactView, Gimmick};
use crate::effects::SideEffect;
use crate::gimmick_mode::GimmickMode;

/// Hanging bar configuration.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct HangingBarConfig {
    /// Character position relative to the bar while hanging.
    pub hang_offset: Vec2,
    /// Velocity when letting go with jump (x along facing).
    pub release_velocity: Vec2,
    /// Steps before the bar can be grabbed again.
    pub rearm_ticks: u32,
}

impl Default for HangingBarConfig {
    fn default() -> Self {
        Self {
            hang_offset: Vec2::new(0.0, -20.0),
            release_velocity: Vec2::new(60.0, 330.0),
            rearm_ticks: 20,
        }
    }
}

/// Bar the character grabs in mid-air and hangs from until jump is pressed.
///
/// The character is linked to the bar through relative motion, so bars
/// attached to moving entities carry it along.
#[derive(Debug, Clone, Default)]
pub struct HangingBar {
    pub config: HangingBarConfig,
    cooldown: u32,
}

impl HangingBar {
    pub fn new(config: HangingBarConfig) -> Self {
        Self {
            config,
            cooldown: 0,
        }
    }
}

impl Gimmick for HangingBar {
    fn name(&self) -> &'static str {
        "handle"
    }

    fn is_collision_valid(&self, view: &ContactView) -> bool {
        let mode = view.character.active_gimmick_mode();
        if view.pair_active {
            return mode == GimmickMode::OnHandle;
        }
        self.cooldown == 0
            && !view.character.grounded
            && mode == GimmickMode::None
            && !matches!(
                view.actions.current(),
                Some(ActionKind::Hurt | ActionKind::Die)
            )
    }

    fn on_collision_enter(&mut self, ctx: &mut ContactContext) {
        ctx.actions.end_current(ctx.character);
        ctx.character.set_active_gimmick_mode(GimmickMode::OnHandle);
        ctx.character.restrict(MovementRestriction::Both);
        ctx.character.attach_to(ctx.gimmick_entity, ctx.gimmick_position);
        ctx.character.position = ctx.gimmick_position + self.config.hang_offset;
        ctx.character.velocity = Vec2::ZERO;
        ctx.emit(SideEffect::sound("grab"));
    }

    fn on_collision_stay(&mut self, ctx: &mut ContactContext) {
        if !ctx.intent.jump_just_pressed() {
            ctx.character.velocity = Vec2::ZERO;
            return;
        }

        ctx.character.release_gimmick_mode(GimmickMode::OnHandle);
        let release = self.config.release_velocity;
        ctx.character.velocity = Vec2::new(ctx.character.facing.sign() * release.x, release.y);
        self.cooldown = self.config.rearm_ticks;
        ctx.emit(SideEffect::sound("release"));
    }

    fn on_collision_exit(&mut self, ctx: &mut ContactContext) {
        ctx.character.release_gimmick_mode(GimmickMode::OnHandle);
        ctx.character.detach_from(ctx.gimmick_entity);
    }

    fn update(&mut self, _position: &mut Vec2, _dt: f32) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    fn debug_color(&self) -> Color {
        Color::srgb(0.7, 0.5, 0.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ContactPhase;
    use crate::gimmicks::harness::{Harness, SOURCE};

    const BAR: Vec2 = Vec2::new(0.0, 100.0);
    const BAR_EXTENTS: Vec2 = Vec2::new(8.0, 4.0);

    #[test]
    fn grab_claims_character() {
        let mut harness = Harness::airborne(Vec2::new(0.0, 90.0));
        let mut handle = HangingBar::default();

        assert_eq!(harness.step(&mut handle, BAR, BAR_EXTENTS), Some(ContactPhase::Enter));
        let character = &harness.character;
        assert_eq!(character.active_gimmick_mode(), GimmickMode::OnHandle);
        assert_eq!(character.restrictions, MovementRestriction::Both);
        assert_eq!(character.relative_motion().map(|link| link.owner), Some(SOURCE));
        assert_eq!(character.position, Vec2::new(0.0, 80.0));
    }

    #[test]
    fn grounded_character_cannot_grab() {
        let mut harness = Harness::grounded(Vec2::new(0.0, 90.0));
        let mut handle = HangingBar::default();
        assert_eq!(harness.step(&mut handle, BAR, BAR_EXTENTS), None);
    }

    #[test]
    fn jump_releases_then_exits() {
        let mut harness = Harness::airborne(Vec2::new(0.0, 90.0));
        let mut handle = HangingBar::default();
        harness.step(&mut handle, BAR, BAR_EXTENTS);

        harness.intent.set_jump_pressed(true);
        assert_eq!(harness.step(&mut handle, BAR, BAR_EXTENTS), Some(ContactPhase::Stay));
        assert_eq!(harness.character.active_gimmick_mode(), GimmickMode::None);
        assert_eq!(harness.character.restrictions, MovementRestriction::None);
        assert!(harness.character.relative_motion().is_none());
        assert!(harness.character.velocity.y > 0.0);

        assert_eq!(harness.step(&mut handle, BAR, BAR_EXTENTS), Some(ContactPhase::Exit));
        // Still overlapping but cooling down.
        assert_eq!(harness.step(&mut handle, BAR, BAR_EXTENTS), None);
    }
}
