//! Exclusive character actions.
//!
//! A character performs at most one primary action at a time. Every action
//! kind has a pre-allocated slot in [`Actions`]; performing one ends the
//! current action first. Arbitration lives with each action in
//! [`Action::can_perform`].

mod die;
mod glide;
mod homing;
mod hurt;
mod jump;
mod roll;

pub use die::Die;
pub use glide::{Glide, GlideState};
pub use homing::HomingAttack;
pub use hurt::Hurt;
pub use jump::Jump;
pub use roll::Roll;

use bevy::prelude::*;

use crate::character::Character;
use crate::config::ActionConfig;
use crate::intent::ControlIntent;

/// Tag identifying an action slot.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    Roll,
    Jump,
    Glide,
    HomingAttack,
    Hurt,
    Die,
}

impl ActionKind {
    /// All kinds, in slot order.
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Roll,
        ActionKind::Jump,
        ActionKind::Glide,
        ActionKind::HomingAttack,
        ActionKind::Hurt,
        ActionKind::Die,
    ];
}

/// Read-only view handed to eligibility checks.
pub struct ActionContext<'a> {
    /// The character that would perform the action.
    pub character: &'a Character,
    /// The action currently performed, if any.
    pub current: Option<ActionKind>,
}

impl ActionContext<'_> {
    /// Whether `kind` is the current action.
    pub fn is_current(&self, kind: ActionKind) -> bool {
        self.current == Some(kind)
    }

    /// Whether the character is hurt or dying.
    pub fn is_incapacitated(&self) -> bool {
        matches!(self.current, Some(ActionKind::Hurt | ActionKind::Die))
    }
}

/// Outcome of a single action step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    Finished,
}

/// Exclusive behavior occupying one slot of the registry.
pub trait Action: Send + Sync + 'static {
    /// Slot tag.
    fn kind(&self) -> ActionKind;

    /// Eligibility check. Must not mutate anything.
    fn can_perform(&self, ctx: &ActionContext) -> bool;

    /// Called when the action becomes current.
    fn on_start(&mut self, character: &mut Character);

    /// Called when the action stops being current, for any reason.
    fn on_end(&mut self, _character: &mut Character) {}

    /// Advance the action by one step while it is current.
    fn tick(&mut self, character: &mut Character, intent: &ControlIntent, dt: f32) -> ActionStatus;

    /// Called when the character lands while the action is current.
    fn on_landed(&mut self, _character: &mut Character) -> ActionStatus {
        ActionStatus::Finished
    }

    /// Whether the action drives vertical velocity itself.
    fn controls_gravity(&self) -> bool {
        false
    }

    /// Whether player input is ignored while the action is current.
    fn locks_input(&self) -> bool {
        false
    }

    /// Per-step bookkeeping, called on every slot whether current or not.
    fn update_timers(&mut self, _active: bool) {}
}

/// One action was started or ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTransition {
    Started(ActionKind),
    Ended(ActionKind),
}

/// Pre-allocated action instances, one per kind.
#[derive(Debug, Clone)]
struct ActionSlots {
    roll: Roll,
    jump: Jump,
    glide: Glide,
    homing: HomingAttack,
    hurt: Hurt,
    die: Die,
}

impl ActionSlots {
    fn new(config: &ActionConfig) -> Self {
        Self {
            roll: Roll::new(config),
            jump: Jump::new(config),
            glide: Glide::new(config),
            homing: HomingAttack::new(config),
            hurt: Hurt::new(config),
            die: Die::new(config),
        }
    }

    fn get(&self, kind: ActionKind) -> &dyn Action {
        match kind {
            ActionKind::Roll => &self.roll,
            ActionKind::Jump => &self.jump,
            ActionKind::Glide => &self.glide,
            ActionKind::HomingAttack => &self.homing,
            ActionKind::Hurt => &self.hurt,
            ActionKind::Die => &self.die,
        }
    }

    fn get_mut(&mut self, kind: ActionKind) -> &mut dyn Action {
        match kind {
            ActionKind::Roll => &mut self.roll,
            ActionKind::Jump => &mut self.jump,
            ActionKind::Glide => &mut self.glide,
            ActionKind::HomingAttack => &mut self.homing,
            ActionKind::Hurt => &mut self.hurt,
            ActionKind::Die => &mut self.die,
        }
    }
}

/// Action registry of a character.
#[derive(Component, Debug, Clone)]
pub struct Actions {
    slots: ActionSlots,
    current: Option<ActionKind>,
    transitions: Vec<ActionTransition>,
}

impl Default for Actions {
    fn default() -> Self {
        Self::new(&ActionConfig::default())
    }
}

impl Actions {
    /// Create a registry with every slot configured from `config`.
    pub fn new(config: &ActionConfig) -> Self {
        Self {
            slots: ActionSlots::new(config),
            current: None,
            transitions: Vec::new(),
        }
    }

    /// The action currently performed.
    pub fn current(&self) -> Option<ActionKind> {
        self.current
    }

    /// Whether `kind` is the current action.
    pub fn is_performing(&self, kind: ActionKind) -> bool {
        self.current == Some(kind)
    }

    /// Access a slot.
    pub fn get(&self, kind: ActionKind) -> &dyn Action {
        self.slots.get(kind)
    }

    /// Whether `kind` would be accepted right now.
    pub fn can_perform(&self, kind: ActionKind, character: &Character) -> bool {
        let ctx = ActionContext {
            character,
            current: self.current,
        };
        self.slots.get(kind).can_perform(&ctx)
    }

    /// Start `kind`, ending the current action first.
    ///
    /// Returns `false` without changing anything when the action rejects.
    pub fn perform(&mut self, kind: ActionKind, character: &mut Character) -> bool {
        if !self.can_perform(kind, character) {
            trace!("Action {:?} rejected (current: {:?})", kind, self.current);
            return false;
        }

        self.end_current(character);
        self.slots.get_mut(kind).on_start(character);
        self.current = Some(kind);
        self.transitions.push(ActionTransition::Started(kind));
        debug!("Action {:?} started", kind);
        true
    }

    /// End `kind` if it is current. No-op otherwise.
    pub fn end(&mut self, kind: ActionKind, character: &mut Character) -> bool {
        if self.current != Some(kind) {
            return false;
        }
        self.current = None;
        self.slots.get_mut(kind).on_end(character);
        self.transitions.push(ActionTransition::Ended(kind));
        debug!("Action {:?} ended", kind);
        true
    }

    /// End whatever action is current.
    pub fn end_current(&mut self, character: &mut Character) -> Option<ActionKind> {
        let kind = self.current?;
        self.end(kind, character);
        Some(kind)
    }

    /// Glide sub-state, if gliding.
    pub fn glide_state(&self) -> Option<GlideState> {
        self.is_performing(ActionKind::Glide)
            .then(|| self.slots.glide.state())
    }

    /// Set the point the next homing attack dashes towards.
    pub fn set_homing_target(&mut self, target: Option<Vec2>) {
        self.slots.homing.set_target(target);
    }

    /// Allow the once-per-airtime abilities again (e.g. after a bounce).
    pub fn refresh_air_abilities(&mut self) {
        self.slots.homing.refresh();
    }

    /// Whether the hurt invulnerability window is running.
    pub fn is_invulnerable(&self) -> bool {
        self.slots.hurt.is_invulnerable()
    }

    /// Whether the current action drives vertical velocity.
    pub fn controls_gravity(&self) -> bool {
        self.current
            .is_some_and(|kind| self.slots.get(kind).controls_gravity())
    }

    /// Whether the current action ignores player input.
    pub fn locks_input(&self) -> bool {
        self.current
            .is_some_and(|kind| self.slots.get(kind).locks_input())
    }

    /// Advance the current action and all slot timers by one step.
    pub fn tick(&mut self, character: &mut Character, intent: &ControlIntent, dt: f32) {
        if let Some(kind) = self.current {
            if self.slots.get_mut(kind).tick(character, intent, dt) == ActionStatus::Finished {
                self.end(kind, character);
            }
        }
        for kind in ActionKind::ALL {
            let active = self.current == Some(kind);
            self.slots.get_mut(kind).update_timers(active);
        }
    }

    /// Notify the registry that the character just landed.
    pub fn notify_landed(&mut self, character: &mut Character) {
        self.refresh_air_abilities();
        if let Some(kind) = self.current {
            if self.slots.get_mut(kind).on_landed(character) == ActionStatus::Finished {
                self.end(kind, character);
            }
        }
    }

    /// Take the transitions recorded since the last drain.
    pub fn drain_transitions(&mut self) -> Vec<ActionTransition> {
        std::mem::take(&mut self.transitions)
    }
}
