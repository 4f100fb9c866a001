use super::{Action, ActionContext, ActionKind, ActionStatus};
use crate::character::Character;
use crate::config::ActionConfig;
use crate::gimmick_mode::GimmickMode;
use crate::intent::ControlIntent;

/// Jump off the ground along the surface normal.
///
/// Stays current for the whole airtime so mid-air abilities can check for it.
/// Releasing the button early caps the upward speed (variable jump height).
#[derive(Debug, Clone)]
pub struct Jump {
    speed: f32,
    release_speed: f32,
    released: bool,
}

impl Jump {
    pub fn new(config: &ActionConfig) -> Self {
        Self {
            speed: config.jump_speed,
            release_speed: config.jump_release_speed,
            released: false,
        }
    }
}

impl Action for Jump {
    fn kind(&self) -> ActionKind {
        ActionKind::Jump
    }

    fn can_perform(&self, ctx: &ActionContext) -> bool {
        ctx.character.grounded
            && !ctx.is_incapacitated()
            && !ctx.character.in_gimmick_mode(GimmickMode::InFan)
    }

    fn on_start(&mut self, character: &mut Character) {
        let velocity = character.velocity + character.ground_normal() * self.speed;
        character.leave_ground();
        character.velocity = velocity;
        self.released = false;
    }

    fn tick(&mut self, character: &mut Character, intent: &ControlIntent, _dt: f32) -> ActionStatus {
        if !self.released && !intent.jump_held() {
            self.released = true;
            if character.velocity.y > self.release_speed {
                character.velocity.y = self.release_speed;
            }
        }
        ActionStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::*;
    use crate::actions::tests::grounded_character;
    use crate::actions::Actions;

    #[test]
    fn jump_launches_along_normal() {
        let mut character = grounded_character();
        let mut actions = Actions::default();
        assert!(actions.perform(ActionKind::Jump, &mut character));
        assert!(!character.grounded);
        assert!((character.velocity.y - ActionConfig::default().jump_speed).abs() < 1e-3);
    }

    #[test]
    fn jump_requires_ground() {
        let character = Character::new(Vec2::ZERO, Vec2::new(8.0, 16.0));
        let actions = Actions::default();
        assert!(!actions.can_perform(ActionKind::Jump, &character));
    }

    #[test]
    fn early_release_caps_upward_speed() {
        let config = ActionConfig::default();
        let mut character = grounded_character();
        let mut jump = Jump::new(&config);
        jump.on_start(&mut character);

        let released = ControlIntent::new();
        jump.tick(&mut character, &released, 1.0 / 60.0);
        assert_eq!(character.velocity.y, config.jump_release_speed);

        // The cap applies once; later upward boosts are kept.
        character.velocity.y = 1000.0;
        jump.tick(&mut character, &released, 1.0 / 60.0);
        assert_eq!(character.velocity.y, 1000.0);
    }

    #[test]
    fn held_jump_keeps_speed() {
        let config = ActionConfig::default();
        let mut character = grounded_character();
        let mut jump = Jump::new(&config);
        jump.on_start(&mut character);

        let mut held = ControlIntent::new();
        held.set_jump_pressed(true);
        jump.tick(&mut character, &held, 1.0 / 60.0);
        assert_eq!(character.velocity.y, config.jump_speed);
    }
}
