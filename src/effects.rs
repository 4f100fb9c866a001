//! Side effects and events.
//!
//! Gimmicks never talk to audio, camera or pooling code directly. They push
//! [`SideEffect`]s into a per-step buffer that the dispatcher flushes as
//! [`GimmickEffect`] events for the game to act on.

use bevy::prelude::*;

use crate::actions::ActionKind;

/// Camera behavior requested by a gimmick.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraMode {
    /// Follow the character.
    #[default]
    Follow,
    /// Stop scrolling at the current position.
    Locked,
    /// Frame the requested target.
    Focus,
}

/// Side effect requested by a gimmick.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// Play a sound clip, optionally panned towards `direction`.
    PlaySound {
        clip: String,
        direction: Option<Vec2>,
    },
    /// Spawn a visual effect.
    Spawn { tag: String, position: Vec2 },
    /// Switch the camera behavior.
    CameraMode(CameraMode),
    /// Make the camera follow another entity (or the character again).
    CameraTarget(Option<Entity>),
}

impl SideEffect {
    /// Shorthand for a non-positional sound.
    pub fn sound(clip: impl Into<String>) -> Self {
        Self::PlaySound {
            clip: clip.into(),
            direction: None,
        }
    }

    /// Shorthand for a visual effect.
    pub fn spawn(tag: impl Into<String>, position: Vec2) -> Self {
        Self::Spawn {
            tag: tag.into(),
            position,
        }
    }
}

/// A side effect emitted by a contact source for a character.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct GimmickEffect {
    pub character: Entity,
    pub source: Entity,
    pub effect: SideEffect,
}

/// A character started or ended an action.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionChanged {
    pub character: Entity,
    pub action: ActionKind,
    pub started: bool,
}

/// Phase of a contact lifecycle notification.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
    /// Entry dropped because its source no longer exists. No exit handler ran.
    Pruned,
}

/// Contact lifecycle notification for a (character, source) pair.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub character: Entity,
    pub source: Entity,
    pub phase: ContactPhase,
}

/// Request to put a character back at its spawn point.
///
/// Ends the current action and releases any gimmick mode. Contacts the
/// character held exit on the next dispatch.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespawnRequest {
    pub character: Entity,
}

/// Marks an entity the homing attack can lock on to.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct HomingTarget;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_constructors() {
        assert_eq!(
            SideEffect::sound("spring"),
            SideEffect::PlaySound {
                clip: "spring".into(),
                direction: None
            }
        );
        assert_eq!(
            SideEffect::spawn("dust", Vec2::ONE),
            SideEffect::Spawn {
                tag: "dust".into(),
                position: Vec2::ONE
            }
        );
    }
}
