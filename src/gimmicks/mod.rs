//! Example gimmick policies.
//!
//! Each gimmick is a plain struct with its own config implementing
//! [`Gimmick`](crate::contact::Gimmick). Spawn one wrapped in a
//! [`ContactSource`](crate::contact::ContactSource):
//!
//! ```rust
//! use bevy::prelude::*;
//! use platformer_controller::prelude::*;
//!
//! fn spawn_level(mut commands: Commands) {
//!     commands.spawn((
//!         Transform::from_xyz(120.0, 8.0, 0.0),
//!         ContactSource::new(SpeedPad::new(SpeedPadConfig::default()), Vec2::new(16.0, 8.0)),
//!     ));
//! }
//! ```

mod bumper;
mod fan;
mod goal;
mod handle;
mod hazard;
mod layer_switch;
mod platform;
mod speed_pad;
mod spring;
mod tunnel;

pub use bumper::{Bumper, BumperConfig};
pub use fan::{Fan, FanConfig};
pub use goal::{Goal, GoalConfig};
pub use handle::{HangingBar, HangingBarConfig};
pub use hazard::{Hazard, HazardConfig};
pub use layer_switch::{LayerSwitch, LayerSwitchConfig};
pub use platform::{MovingPlatform, PlatformConfig};
pub use speed_pad::{SpeedPad, SpeedPadConfig};
pub use spring::{Spring, SpringConfig};
pub use tunnel::{ForceRollTunnel, TunnelConfig};

use crate::contact::ContactConfigError;

/// Reject a parameter that must be strictly positive and finite.
pub(crate) fn ensure_positive(
    gimmick: &'static str,
    parameter: &'static str,
    value: f32,
) -> Result<(), ContactConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ContactConfigError::InvalidParameter {
            gimmick,
            parameter,
            reason: "must be positive and finite",
        })
    }
}

/// Reject a duration that is negative or not finite.
pub(crate) fn ensure_duration(
    gimmick: &'static str,
    parameter: &'static str,
    seconds: f32,
) -> Result<(), ContactConfigError> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(())
    } else {
        Err(ContactConfigError::InvalidParameter {
            gimmick,
            parameter,
            reason: "must be zero or positive",
        })
    }
}

#[cfg(test)]
pub(crate) mod harness {
    //! Drives a single gimmick through [`dispatch_contacts`].

    use bevy::prelude::*;

    use crate::actions::Actions;
    use crate::character::Character;
    use crate::contact::{dispatch_contacts, ActiveContacts, ContactCandidate, ContactTarget, Gimmick};
    use crate::effects::{ContactPhase, SideEffect};
    use crate::intent::ControlIntent;

    pub const SOURCE: Entity = Entity::from_raw(1);

    pub struct Harness {
        pub character: Character,
        pub actions: Actions,
        pub intent: ControlIntent,
        pub contacts: ActiveContacts,
        pub effects: Vec<SideEffect>,
    }

    impl Harness {
        pub fn new(character: Character) -> Self {
            Self {
                character,
                actions: Actions::default(),
                intent: ControlIntent::new(),
                contacts: ActiveContacts::default(),
                effects: Vec::new(),
            }
        }

        /// Character standing on flat ground at `position`.
        pub fn grounded(position: Vec2) -> Self {
            let mut character = Character::new(position, Vec2::new(8.0, 16.0));
            character.land(0.0);
            Self::new(character)
        }

        /// Airborne character at `position`.
        pub fn airborne(position: Vec2) -> Self {
            Self::new(Character::new(position, Vec2::new(8.0, 16.0)))
        }

        /// One dispatch step against a source centered at `center`.
        pub fn step(
            &mut self,
            gimmick: &mut dyn Gimmick,
            center: Vec2,
            half_extents: Vec2,
        ) -> Option<ContactPhase> {
            let mut candidates = [ContactCandidate {
                entity: SOURCE,
                position: center,
                bounds: Rect::from_center_half_size(center, half_extents),
                enabled: true,
                gimmick,
            }];
            let report = dispatch_contacts(
                ContactTarget {
                    character: &mut self.character,
                    actions: &mut self.actions,
                    intent: &mut self.intent,
                    contacts: &mut self.contacts,
                },
                &mut candidates,
                1.0 / 60.0,
            );
            self.effects
                .extend(report.effects.into_iter().map(|(_, effect)| effect));
            report.phases.first().map(|(_, phase)| *phase)
        }
    }
}
