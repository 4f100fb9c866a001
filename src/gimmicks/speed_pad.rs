use bevy::prelude::*;

use crate::actions::ActionKind;
use crate::character::{Facing, MovementRestriction};
use crate::contact::{ContactConfigError, ContactContext, ContactView, Gimmick};
use crate::effects::SideEffect;

/// Speed pad configuration.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct SpeedPadConfig {
    /// Speed applied along the pad direction.
    pub speed: f32,
    /// Launch direction sign (`1.0` right, `-1.0` left).
    pub direction: f32,
    /// Horizontal input lock after launching, in seconds.
    pub lock_duration: f32,
}

impl Default for SpeedPadConfig {
    fn default() -> Self {
        Self {
            speed: 720.0,
            direction: 1.0,
            lock_duration: 0.25,
        }
    }
}

impl SpeedPadConfig {
    /// Builder: set speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Builder: set direction sign.
    pub fn with_direction(mut self, direction: f32) -> Self {
        self.direction = direction;
        self
    }
}

/// Launches the character along its direction unless it already moves faster.
#[derive(Debug, Clone, Default)]
pub struct SpeedPad {
    pub config: SpeedPadConfig,
}

impl SpeedPad {
    pub fn new(config: SpeedPadConfig) -> Self {
        Self { config }
    }

    fn direction(&self) -> f32 {
        if self.config.direction < 0.0 {
            -1.0
        } else {
            1.0
        }
    }
}

impl Gimmick for SpeedPad {
    fn name(&self) -> &'static str {
        "speed_pad"
    }

    fn is_collision_valid(&self, view: &ContactView) -> bool {
        view.pair_active || self.direction() * view.character.forward_speed() < self.config.speed
    }

    fn on_collision_enter(&mut self, ctx: &mut ContactContext) {
        ctx.actions.end(ActionKind::Glide, ctx.character);

        let direction = self.direction();
        ctx.character.set_forward_speed(direction * self.config.speed);
        if let Some(facing) = Facing::from_sign(direction) {
            ctx.character.facing = facing;
        }
        ctx.intent
            .lock_controls(self.config.lock_duration, MovementRestriction::Horizontal);
        ctx.emit(SideEffect::PlaySound {
            clip: "speed_pad".into(),
            direction: Some(Vec2::new(direction, 0.0)),
        });
    }

    fn validate(&self) -> Result<(), ContactConfigError> {
        super::ensure_positive(self.name(), "speed", self.config.speed)?;
        super::ensure_duration(self.name(), "lock_duration", self.config.lock_duration)
    }

    fn debug_color(&self) -> Color {
        Color::srgb(0.2, 0.6, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::GlideState;
    use crate::effects::ContactPhase;
    use crate::gimmicks::harness::Harness;

    fn pad(speed: f32) -> SpeedPad {
        SpeedPad::new(SpeedPadConfig::default().with_speed(speed))
    }

    #[test]
    fn slower_character_is_launched() {
        let mut harness = Harness::grounded(Vec2::new(0.0, 16.0));
        harness.character.set_ground_velocity(10.0);
        let mut pad = pad(16.0);

        let phase = harness.step(&mut pad, Vec2::new(0.0, 4.0), Vec2::new(16.0, 4.0));
        assert_eq!(phase, Some(ContactPhase::Enter));
        assert_eq!(harness.character.ground_velocity, 16.0);
        assert!(harness.intent.is_horizontal_locked());
        assert_eq!(harness.effects.len(), 1);
    }

    #[test]
    fn faster_character_is_ignored() {
        let mut harness = Harness::grounded(Vec2::new(0.0, 16.0));
        harness.character.set_ground_velocity(20.0);
        let mut pad = pad(16.0);

        assert_eq!(harness.step(&mut pad, Vec2::new(0.0, 4.0), Vec2::new(16.0, 4.0)), None);
        assert_eq!(harness.character.ground_velocity, 20.0);
    }

    #[test]
    fn stays_while_overlapping() {
        let mut harness = Harness::grounded(Vec2::new(0.0, 16.0));
        let mut pad = pad(16.0);
        harness.step(&mut pad, Vec2::new(0.0, 4.0), Vec2::new(16.0, 4.0));
        let phase = harness.step(&mut pad, Vec2::new(0.0, 4.0), Vec2::new(16.0, 4.0));
        assert_eq!(phase, Some(ContactPhase::Stay));
    }

    #[test]
    fn left_pad_launches_left() {
        let mut harness = Harness::grounded(Vec2::new(0.0, 16.0));
        let mut pad = SpeedPad::new(SpeedPadConfig::default().with_direction(-1.0));
        harness.step(&mut pad, Vec2::new(0.0, 4.0), Vec2::new(16.0, 4.0));
        assert!(harness.character.ground_velocity < 0.0);
        assert_eq!(harness.character.facing, Facing::Left);
    }

    #[test]
    fn dropping_glide_ends_on_pad() {
        let mut harness = Harness::grounded(Vec2::new(0.0, 16.0));
        let Harness {
            character,
            actions,
            intent,
            ..
        } = &mut harness;
        assert!(actions.perform(ActionKind::Jump, character));
        assert!(actions.perform(ActionKind::Glide, character));
        intent.set_jump_pressed(false);
        actions.tick(character, intent, 1.0 / 60.0);
        assert_eq!(actions.glide_state(), Some(GlideState::Dropping));

        let mut pad = pad(720.0);
        let center = harness.character.position;
        assert_eq!(
            harness.step(&mut pad, center, Vec2::new(16.0, 4.0)),
            Some(ContactPhase::Enter)
        );
        assert!(!harness.actions.is_performing(ActionKind::Glide));
    }

    #[test]
    fn validate_rejects_unbounded_lock() {
        assert!(SpeedPad::default().validate().is_ok());

        for lock_duration in [f32::INFINITY, f32::NAN, -1.0] {
            let pad = SpeedPad::new(SpeedPadConfig {
                lock_duration,
                ..default()
            });
            assert!(matches!(
                pad.validate(),
                Err(ContactConfigError::InvalidParameter {
                    parameter: "lock_duration",
                    ..
                })
            ));
        }
    }
}
