use bevy::prelude::*;

use super::{Action, ActionContext, ActionKind, ActionStatus};
use crate::character::{Character, Facing};
use crate::config::ActionConfig;
use crate::gimmick_mode::GimmickMode;
use crate::intent::ControlIntent;

/// Mid-air dash towards the nearest target, or straight ahead without one.
///
/// Usable once per airtime; landing or a bounce gimmick refreshes it.
#[derive(Debug, Clone)]
pub struct HomingAttack {
    speed: f32,
    ticks: u32,
    range: f32,
    used: bool,
    remaining: u32,
    target: Option<Vec2>,
    direction: Vec2,
}

impl HomingAttack {
    pub fn new(config: &ActionConfig) -> Self {
        Self {
            speed: config.homing_speed,
            ticks: config.homing_ticks,
            range: config.homing_range,
            used: false,
            remaining: 0,
            target: None,
            direction: Vec2::X,
        }
    }

    /// Maximum distance at which a target is picked.
    pub fn range(&self) -> f32 {
        self.range
    }

    /// Whether the dash was already used this airtime.
    pub fn is_used(&self) -> bool {
        self.used
    }

    pub(crate) fn set_target(&mut self, target: Option<Vec2>) {
        self.target = target;
    }

    pub(crate) fn refresh(&mut self) {
        self.used = false;
    }
}

impl Action for HomingAttack {
    fn kind(&self) -> ActionKind {
        ActionKind::HomingAttack
    }

    fn can_perform(&self, ctx: &ActionContext) -> bool {
        !ctx.character.grounded
            && (ctx.current.is_none() || ctx.is_current(ActionKind::Jump))
            && !self.used
            && ctx.character.in_gimmick_mode(GimmickMode::None)
    }

    fn on_start(&mut self, character: &mut Character) {
        self.used = true;
        self.remaining = self.ticks;
        self.direction = self
            .target
            .map(|target| (target - character.position).normalize_or_zero())
            .filter(|direction| *direction != Vec2::ZERO)
            .unwrap_or(Vec2::new(character.facing.sign(), 0.0));
        if let Some(facing) = Facing::from_sign(self.direction.x) {
            character.facing = facing;
        }
        character.velocity = self.direction * self.speed;
    }

    fn on_end(&mut self, character: &mut Character) {
        self.target = None;
        self.remaining = 0;
        if !character.grounded {
            character.velocity *= 0.25;
        }
    }

    fn tick(&mut self, character: &mut Character, _intent: &ControlIntent, _dt: f32) -> ActionStatus {
        if self.remaining == 0 {
            return ActionStatus::Finished;
        }
        self.remaining -= 1;
        character.velocity = self.direction * self.speed;
        ActionStatus::Running
    }

    fn controls_gravity(&self) -> bool {
        true
    }

    fn locks_input(&self) -> bool {
        true
    }
}
