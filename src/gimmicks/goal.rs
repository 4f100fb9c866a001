use bevy::prelude::*;

use crate::actions::ActionKind;
use crate::character::MovementRestriction;
use crate::contact::{ContactConfigError, ContactContext, ContactView, Gimmick};
use crate::effects::{CameraMode, SideEffect};

/// Goal sign configuration.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct GoalConfig {
    /// Seconds the controls stay locked after passing the goal.
    pub lock_duration: f32,
    /// Camera behavior once the goal is passed.
    pub camera_mode: CameraMode,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            lock_duration: 3.0,
            camera_mode: CameraMode::Locked,
        }
    }
}

/// End-of-stage sign. Fires once per stage attempt.
#[derive(Debug, Clone, Default)]
pub struct Goal {
    pub config: GoalConfig,
    reached: bool,
}

impl Goal {
    pub fn new(config: GoalConfig) -> Self {
        Self {
            config,
            reached: false,
        }
    }

    /// Whether a character passed the goal.
    pub fn is_reached(&self) -> bool {
        self.reached
    }
}

impl Gimmick for Goal {
    fn name(&self) -> &'static str {
        "goal"
    }

    fn is_collision_valid(&self, view: &ContactView) -> bool {
        view.pair_active || (!self.reached && !view.actions.is_performing(ActionKind::Die))
    }

    fn on_collision_enter(&mut self, ctx: &mut ContactContext) {
        self.reached = true;
        ctx.intent
            .lock_controls(self.config.lock_duration, MovementRestriction::Both);
        ctx.emit(SideEffect::CameraMode(self.config.camera_mode));
        ctx.emit(SideEffect::CameraTarget(Some(ctx.gimmick_entity)));
        ctx.emit(SideEffect::sound("goal"));
        ctx.emit(SideEffect::spawn("goal_spin", ctx.gimmick_bounds.center()));
    }

    fn validate(&self) -> Result<(), ContactConfigError> {
        super::ensure_duration(self.name(), "lock_duration", self.config.lock_duration)
    }

    fn debug_color(&self) -> Color {
        Color::srgb(0.2, 0.4, 1.0)
    }
}
