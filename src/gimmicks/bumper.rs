use bevy::prelude::*;

use crate::actions::{ActionKind, GlideState};
use crate::contact::{ContactConfigError, ContactContext, ContactView, Gimmick};
use crate::effects::SideEffect;

/// Bumper configuration.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct BumperConfig {
    /// Rebound speed per axis, scaled by the cosine and sine of the hit angle.
    pub rebound: Vec2,
}

impl Default for BumperConfig {
    fn default() -> Self {
        Self {
            rebound: Vec2::new(420.0, 420.0),
        }
    }
}

/// Round bumper knocking the character away from its center.
///
/// The hit angle is the direction from the bumper center to the character:
/// `0` means the character is directly to the right.
#[derive(Debug, Clone, Default)]
pub struct Bumper {
    pub config: BumperConfig,
}

impl Bumper {
    pub fn new(config: BumperConfig) -> Self {
        Self { config }
    }

    /// Rebound velocity for a hit angle.
    pub fn rebound_velocity(&self, angle: f32) -> Vec2 {
        Vec2::new(
            self.config.rebound.x * angle.cos(),
            self.config.rebound.y * angle.sin(),
        )
    }
}

impl Gimmick for Bumper {
    fn name(&self) -> &'static str {
        "bumper"
    }

    fn is_collision_valid(&self, view: &ContactView) -> bool {
        !view.actions.is_performing(ActionKind::Die)
    }

    fn on_collision_enter(&mut self, ctx: &mut ContactContext) {
        let offset = ctx.character.position - ctx.gimmick_bounds.center();
        let angle = offset.y.atan2(offset.x);
        let rebound = self.rebound_velocity(angle);

        ctx.actions.end(ActionKind::HomingAttack, ctx.character);
        ctx.actions.refresh_air_abilities();
        ctx.character.leave_ground();
        if ctx.actions.glide_state() == Some(GlideState::Gliding) {
            ctx.character.velocity.y = rebound.y;
        } else {
            ctx.character.velocity = rebound;
        }

        ctx.emit(SideEffect::PlaySound {
            clip: "bumper".into(),
            direction: Some(offset.normalize_or_zero()),
        });
        ctx.emit(SideEffect::spawn("bumper_hit", ctx.gimmick_bounds.center()));
    }

    fn validate(&self) -> Result<(), ContactConfigError> {
        if self.config.rebound.is_finite() {
            Ok(())
        } else {
            Err(ContactConfigError::InvalidParameter {
                gimmick: self.name(),
                parameter: "rebound",
                reason: "must be finite",
            })
        }
    }

    fn debug_color(&self) -> Color {
        Color::srgb(1.0, 0.2, 0.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gimmicks::harness::Harness;

    #[test]
    fn rebound_at_angle_zero_is_horizontal() {
        let bumper = Bumper::new(BumperConfig {
            rebound: Vec2::new(300.0, 500.0),
        });
        let velocity = bumper.rebound_velocity(0.0);
        assert_eq!(velocity, Vec2::new(300.0, 0.0));
    }

    #[test]
    fn character_right_of_bumper_is_pushed_right() {
        let mut harness = Harness::grounded(Vec2::new(10.0, 0.0));
        let mut bumper = Bumper::default();
        harness.step(&mut bumper, Vec2::ZERO, Vec2::splat(8.0));

        assert!(!harness.character.grounded);
        assert!((harness.character.velocity.x - 420.0).abs() < 1e-3);
        assert!(harness.character.velocity.y.abs() < 1e-3);
        assert_eq!(harness.effects.len(), 2);
    }

    #[test]
    fn gliding_keeps_horizontal_velocity() {
        let mut harness = Harness::grounded(Vec2::new(0.0, 10.0));
        let Harness {
            character, actions, ..
        } = &mut harness;
        actions.perform(ActionKind::Jump, character);
        actions.perform(ActionKind::Glide, character);
        let glide_vx = character.velocity.x;

        let mut bumper = Bumper::default();
        harness.step(&mut bumper, Vec2::ZERO, Vec2::splat(8.0));
        assert_eq!(harness.character.velocity.x, glide_vx);
        assert!((harness.character.velocity.y - 420.0).abs() < 1e-3);
    }
}
