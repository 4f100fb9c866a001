use bevy::prelude::*;

use super::{Action, ActionContext, ActionKind, ActionStatus};
use crate::character::Character;
use crate::config::ActionConfig;
use crate::detection::CollisionMask;
use crate::gimmick_mode::GimmickMode;
use crate::intent::ControlIntent;

/// Death bounce followed by a respawn.
///
/// The collision mask is cleared so the character falls through terrain, and
/// restored when the action ends.
#[derive(Debug, Clone)]
pub struct Die {
    bounce_speed: f32,
    respawn_ticks: u32,
    remaining: u32,
    saved_mask: Option<CollisionMask>,
}

impl Die {
    pub fn new(config: &ActionConfig) -> Self {
        Self {
            bounce_speed: config.death_bounce_speed,
            respawn_ticks: config.death_respawn_ticks,
            remaining: 0,
            saved_mask: None,
        }
    }
}

impl Action for Die {
    fn kind(&self) -> ActionKind {
        ActionKind::Die
    }

    fn can_perform(&self, ctx: &ActionContext) -> bool {
        !ctx.is_current(ActionKind::Die)
    }

    fn on_start(&mut self, character: &mut Character) {
        self.saved_mask = Some(character.collision_mask);
        self.remaining = self.respawn_ticks;
        character.collision_mask = CollisionMask::NONE;
        character.set_active_gimmick_mode(GimmickMode::None);
        character.leave_ground();
        character.ground_velocity = 0.0;
        character.velocity = Vec2::new(0.0, self.bounce_speed);
    }

    fn on_end(&mut self, character: &mut Character) {
        if let Some(mask) = self.saved_mask.take() {
            character.collision_mask = mask;
        }
        character.respawn();
    }

    fn tick(&mut self, _character: &mut Character, _intent: &ControlIntent, _dt: f32) -> ActionStatus {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            ActionStatus::Finished
        } else {
            ActionStatus::Running
        }
    }

    fn on_landed(&mut self, _character: &mut Character) -> ActionStatus {
        ActionStatus::Running
    }

    fn locks_input(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::grounded_character;
    use crate::actions::Actions;

    #[test]
    fn die_clears_mask_and_respawns() {
        let config = ActionConfig {
            death_respawn_ticks: 3,
            ..default()
        };
        let mut character = grounded_character();
        let spawn = character.spawn_point;
        let mask = character.collision_mask;
        let mut actions = Actions::new(&config);

        assert!(actions.perform(ActionKind::Die, &mut character));
        assert_eq!(character.collision_mask, CollisionMask::NONE);
        assert!(character.velocity.y > 0.0);

        character.position.y -= 400.0;
        let intent = ControlIntent::new();
        for _ in 0..3 {
            actions.tick(&mut character, &intent, 0.0);
        }
        assert_eq!(actions.current(), None);
        assert_eq!(character.collision_mask, mask);
        assert_eq!(character.position, spawn);
    }

    #[test]
    fn die_ignores_landing() {
        let mut character = grounded_character();
        let mut actions = Actions::default();
        actions.perform(ActionKind::Die, &mut character);
        character.land(0.0);
        actions.notify_landed(&mut character);
        assert!(actions.is_performing(ActionKind::Die));
    }
}
