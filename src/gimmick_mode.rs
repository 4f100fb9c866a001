//! Gimmick mode tracking.
//!
//! A gimmick mode records which gimmick currently holds kinematic control of
//! a character outside the action registry. It is a flat exclusive value:
//! arbitration happens in the gimmicks' enter and exit handlers.

use bevy::prelude::*;

/// Temporary external control of a character by a gimmick.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GimmickMode {
    /// No gimmick holds the character.
    #[default]
    None,
    /// Carried upwards by a fan.
    InFan,
    /// Hanging from a bar.
    OnHandle,
    /// Forced to keep rolling inside a tunnel.
    ForceRoll,
    /// Riding a moving platform.
    OnPlatform,
}

impl GimmickMode {
    /// Whether this mode replaces the character's own gravity.
    pub fn claims_gravity(self) -> bool {
        matches!(self, Self::InFan | Self::OnHandle)
    }
}

/// Holder for the active gimmick mode.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GimmickModeTracker {
    mode: GimmickMode,
}

impl GimmickModeTracker {
    /// Current mode.
    #[inline]
    pub fn get(&self) -> GimmickMode {
        self.mode
    }

    /// Replace the mode, returning the previous one.
    pub fn set(&mut self, mode: GimmickMode) -> GimmickMode {
        std::mem::replace(&mut self.mode, mode)
    }

    /// Reset to [`GimmickMode::None`] only if `mode` is still active.
    ///
    /// Used by exit handlers so a gimmick never clears a mode another gimmick
    /// has claimed since.
    pub fn release(&mut self, mode: GimmickMode) -> bool {
        if self.mode == mode && mode != GimmickMode::None {
            self.mode = GimmickMode::None;
            true
        } else {
            false
        }
    }

    /// Whether `mode` is active.
    #[inline]
    pub fn is(&self, mode: GimmickMode) -> bool {
        self.mode == mode
    }
}
