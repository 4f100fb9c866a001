use super::{Action, ActionContext, ActionKind, ActionStatus};
use crate::character::Character;
use crate::config::ActionConfig;
use crate::gimmick_mode::GimmickMode;
use crate::intent::ControlIntent;

/// Roll along the ground.
///
/// Ends once ground speed drops below the unroll threshold, unless a
/// force-roll gimmick holds the character, in which case speed is kept at the
/// roll threshold in the facing direction.
#[derive(Debug, Clone)]
pub struct Roll {
    min_speed: f32,
    unroll_speed: f32,
}

impl Roll {
    pub fn new(config: &ActionConfig) -> Self {
        Self {
            min_speed: config.roll_min_speed,
            unroll_speed: config.unroll_speed,
        }
    }
}

impl Action for Roll {
    fn kind(&self) -> ActionKind {
        ActionKind::Roll
    }

    fn can_perform(&self, ctx: &ActionContext) -> bool {
        let forced = ctx.character.in_gimmick_mode(GimmickMode::ForceRoll);
        ctx.character.grounded
            && !ctx.is_current(ActionKind::Roll)
            && !ctx.is_incapacitated()
            && (forced || ctx.character.ground_velocity.abs() >= self.min_speed)
    }

    fn on_start(&mut self, _character: &mut Character) {}

    fn tick(&mut self, character: &mut Character, _intent: &ControlIntent, _dt: f32) -> ActionStatus {
        if !character.grounded {
            return ActionStatus::Running;
        }

        let speed = character.ground_velocity.abs();
        if character.in_gimmick_mode(GimmickMode::ForceRoll) {
            if speed < self.min_speed {
                character.set_ground_velocity(character.facing.sign() * self.min_speed);
            }
            ActionStatus::Running
        } else if speed < self.unroll_speed {
            ActionStatus::Finished
        } else {
            ActionStatus::Running
        }
    }

    fn on_landed(&mut self, _character: &mut Character) -> ActionStatus {
        ActionStatus::Running
    }
}
