use bevy::prelude::*;

use super::{Action, ActionContext, ActionKind, ActionStatus};
use crate::character::Character;
use crate::config::ActionConfig;
use crate::gimmick_mode::GimmickMode;
use crate::intent::ControlIntent;

/// Sub-state of an active glide.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GlideState {
    /// Button released: falling under gravity until landing.
    Dropping,
    /// Sinking slowly at constant horizontal speed.
    #[default]
    Gliding,
    /// Turning around after opposite input.
    Turning,
    /// Getting up after a glide landing.
    StandUp,
}

/// Glide from a jump.
#[derive(Debug, Clone)]
pub struct Glide {
    speed: f32,
    sink_speed: f32,
    turn_ticks: u32,
    stand_up_ticks: u32,
    state: GlideState,
    counter: u32,
}

impl Glide {
    pub fn new(config: &ActionConfig) -> Self {
        Self {
            speed: config.glide_speed,
            sink_speed: config.glide_sink_speed,
            turn_ticks: config.glide_turn_ticks.max(1),
            stand_up_ticks: config.glide_stand_up_ticks,
            state: GlideState::Gliding,
            counter: 0,
        }
    }

    /// Current sub-state.
    pub fn state(&self) -> GlideState {
        self.state
    }

    fn enter(&mut self, state: GlideState) {
        trace!("Glide {:?} -> {:?}", self.state, state);
        self.state = state;
        self.counter = 0;
    }
}

impl Action for Glide {
    fn kind(&self) -> ActionKind {
        ActionKind::Glide
    }

    fn can_perform(&self, ctx: &ActionContext) -> bool {
        !ctx.character.grounded
            && ctx.is_current(ActionKind::Jump)
            && ctx.character.in_gimmick_mode(GimmickMode::None)
    }

    fn on_start(&mut self, character: &mut Character) {
        self.enter(GlideState::Gliding);
        character.velocity = Vec2::new(character.facing.sign() * self.speed, -self.sink_speed);
    }

    fn tick(&mut self, character: &mut Character, intent: &ControlIntent, _dt: f32) -> ActionStatus {
        match self.state {
            GlideState::Gliding | GlideState::Turning if !intent.jump_held() => {
                self.enter(GlideState::Dropping);
                character.velocity.x *= 0.25;
            }
            GlideState::Gliding => {
                let input = intent.effective_horizontal();
                if input != 0.0 && input.signum() != character.facing.sign() {
                    self.enter(GlideState::Turning);
                } else {
                    character.velocity =
                        Vec2::new(character.facing.sign() * self.speed, -self.sink_speed);
                }
            }
            GlideState::Turning => {
                self.counter += 1;
                let progress = self.counter as f32 / self.turn_ticks as f32;
                // Horizontal speed passes through zero halfway through the turn.
                let speed = self.speed * (1.0 - 2.0 * progress.min(1.0));
                character.velocity = Vec2::new(character.facing.sign() * speed, -self.sink_speed);
                if self.counter >= self.turn_ticks {
                    character.facing = character.facing.flipped();
                    self.enter(GlideState::Gliding);
                }
            }
            GlideState::Dropping => {}
            GlideState::StandUp => {
                if character.grounded {
                    character.set_ground_velocity(0.0);
                }
                self.counter += 1;
                if self.counter >= self.stand_up_ticks {
                    return ActionStatus::Finished;
                }
            }
        }
        ActionStatus::Running
    }

    fn on_landed(&mut self, character: &mut Character) -> ActionStatus {
        match self.state {
            GlideState::Gliding | GlideState::Turning => {
                self.enter(GlideState::StandUp);
                character.set_ground_velocity(0.0);
                ActionStatus::Running
            }
            GlideState::StandUp => ActionStatus::Running,
            GlideState::Dropping => ActionStatus::Finished,
        }
    }

    fn on_end(&mut self, _character: &mut Character) {
        self.state = GlideState::Gliding;
        self.counter = 0;
    }

    fn controls_gravity(&self) -> bool {
        matches!(self.state, GlideState::Gliding | GlideState::Turning)
    }

    fn locks_input(&self) -> bool {
        self.state != GlideState::Dropping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Facing;

    const DT: f32 = 1.0 / 60.0;

    fn gliding() -> (Glide, Character, ControlIntent) {
        let config = ActionConfig {
            glide_turn_ticks: 4,
            glide_stand_up_ticks: 3,
            ..default()
        };
        let mut character = Character::new(Vec2::new(0.0, 100.0), Vec2::new(8.0, 16.0));
        let mut glide = Glide::new(&config);
        glide.on_start(&mut character);
        let mut intent = ControlIntent::new();
        intent.set_jump_pressed(true);
        (glide, character, intent)
    }

    #[test]
    fn start_enters_gliding() {
        let (glide, character, _) = gliding();
        assert_eq!(glide.state(), GlideState::Gliding);
        assert!(glide.controls_gravity());
        assert!(character.velocity.x > 0.0);
        assert!(character.velocity.y < 0.0);
    }

    #[test]
    fn release_drops() {
        let (mut glide, mut character, mut intent) = gliding();
        intent.set_jump_pressed(false);
        glide.tick(&mut character, &intent, DT);
        assert_eq!(glide.state(), GlideState::Dropping);
        assert!(!glide.controls_gravity());
        assert_eq!(glide.on_landed(&mut character), ActionStatus::Finished);
    }

    #[test]
    fn opposite_input_turns_and_flips_facing() {
        let (mut glide, mut character, mut intent) = gliding();
        intent.set_horizontal(-1.0);
        glide.tick(&mut character, &intent, DT);
        assert_eq!(glide.state(), GlideState::Turning);

        for _ in 0..4 {
            glide.tick(&mut character, &intent, DT);
        }
        assert_eq!(character.facing, Facing::Left);
        assert_eq!(glide.state(), GlideState::Gliding);
    }

    #[test]
    fn landing_while_gliding_stands_up() {
        let (mut glide, mut character, intent) = gliding();
        character.land(0.0);
        assert_eq!(glide.on_landed(&mut character), ActionStatus::Running);
        assert_eq!(glide.state(), GlideState::StandUp);
        assert_eq!(character.ground_velocity, 0.0);

        assert_eq!(glide.tick(&mut character, &intent, DT), ActionStatus::Running);
        assert_eq!(glide.tick(&mut character, &intent, DT), ActionStatus::Running);
        assert_eq!(glide.tick(&mut character, &intent, DT), ActionStatus::Finished);
    }
}
