//! Control intent components.
//!
//! Intents represent the desired input from a player or AI. The controller
//! systems read these intents; gimmicks may temporarily lock them.

use std::time::Duration;

use bevy::prelude::*;

use crate::character::MovementRestriction;

/// Per-character input intent.
///
/// You handle input detection in your code and write a plain value here each
/// frame; the controller handles edge detection and control locks.
///
/// # Example
///
/// ```rust
/// use platformer_controller::prelude::*;
///
/// let mut intent = ControlIntent::new();
/// intent.set_horizontal(1.0);
/// intent.set_jump_pressed(true);
/// assert!(intent.jump_just_pressed());
///
/// intent.end_step();
/// assert!(!intent.jump_just_pressed());
/// assert!(intent.jump_held());
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct ControlIntent {
    /// Horizontal input (-1.0 = left, 1.0 = right).
    pub horizontal: f32,
    /// Vertical input (-1.0 = down, 1.0 = up).
    pub vertical: f32,
    /// Whether the jump button is held this step.
    ///
    /// ```rust,ignore
    /// intent.set_jump_pressed(keyboard.pressed(KeyCode::Space));
    /// ```
    pub jump_pressed: bool,
    /// Previous step's jump state (for edge detection).
    /// This is managed internally by the controller.
    pub(crate) jump_pressed_prev: bool,
    /// Active control lock, if any.
    pub lock: Option<ControlLock>,
}

impl ControlIntent {
    /// Create a new empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal direction (-1.0 = left, 1.0 = right).
    pub fn set_horizontal(&mut self, direction: f32) {
        self.horizontal = direction.clamp(-1.0, 1.0);
    }

    /// Set the vertical direction (-1.0 = down, 1.0 = up).
    pub fn set_vertical(&mut self, direction: f32) {
        self.vertical = direction.clamp(-1.0, 1.0);
    }

    /// Set the jump button state.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        self.jump_pressed = pressed;
    }

    /// Clear axis input.
    pub fn clear(&mut self) {
        self.horizontal = 0.0;
        self.vertical = 0.0;
    }

    /// Jump went from released to pressed this step.
    pub fn jump_just_pressed(&self) -> bool {
        self.jump_pressed && !self.jump_pressed_prev
    }

    /// Jump is held.
    pub fn jump_held(&self) -> bool {
        self.jump_pressed
    }

    /// Ignore input on `axes` for `duration` seconds.
    ///
    /// A new lock replaces any running one.
    pub fn lock_controls(&mut self, duration: f32, axes: MovementRestriction) {
        self.lock = Some(ControlLock::new(duration, axes));
    }

    /// Remove any control lock.
    pub fn unlock_controls(&mut self) {
        self.lock = None;
    }

    /// Whether horizontal input is currently locked.
    pub fn is_horizontal_locked(&self) -> bool {
        self.lock
            .as_ref()
            .is_some_and(|lock| lock.is_active() && lock.axes.blocks_horizontal())
    }

    /// Whether vertical input is currently locked.
    pub fn is_vertical_locked(&self) -> bool {
        self.lock
            .as_ref()
            .is_some_and(|lock| lock.is_active() && lock.axes.blocks_vertical())
    }

    /// Horizontal input after applying locks.
    pub fn effective_horizontal(&self) -> f32 {
        if self.is_horizontal_locked() {
            0.0
        } else {
            self.horizontal
        }
    }

    /// Vertical input after applying locks.
    pub fn effective_vertical(&self) -> f32 {
        if self.is_vertical_locked() {
            0.0
        } else {
            self.vertical
        }
    }

    /// Advance the control lock. Expired locks are removed.
    pub fn tick(&mut self, delta: Duration) {
        if let Some(lock) = self.lock.as_mut() {
            lock.tick(delta);
            if !lock.is_active() {
                self.lock = None;
            }
        }
    }

    /// Record the jump state for next step's edge detection.
    pub fn end_step(&mut self) {
        self.jump_pressed_prev = self.jump_pressed;
    }
}

/// Timed input lock on a set of axes.
#[derive(Reflect, Debug, Clone, Default)]
pub struct ControlLock {
    /// Timer for the lock. When finished, input is accepted again.
    #[reflect(ignore)]
    pub timer: Timer,
    /// Locked axes.
    pub axes: MovementRestriction,
}

impl ControlLock {
    /// Create a lock for `duration` seconds.
    ///
    /// Durations too long to represent lock until [`ControlIntent::unlock_controls`].
    pub fn new(duration: f32, axes: MovementRestriction) -> Self {
        let duration = Duration::try_from_secs_f32(duration.max(0.0)).unwrap_or(Duration::MAX);
        Self {
            timer: Timer::new(duration, TimerMode::Once),
            axes,
        }
    }

    /// Tick the lock timer. Call this once per step.
    pub fn tick(&mut self, delta: Duration) {
        self.timer.tick(delta);
    }

    /// Check if the lock still applies.
    pub fn is_active(&self) -> bool {
        !self.timer.finished()
    }
}
