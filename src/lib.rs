//! # `platformer_controller`
//!
//! Terrain contact, action state machine and gimmick contact dispatch for 2D
//! platformer characters, with a terrain backend abstraction.
//!
//! This crate provides the decision core of a fast platforming character:
//! - Resolves how the character sits on sloped terrain, walls and ceilings
//!   using directional sensor probes
//! - Converts between ground-relative speed and world velocity
//! - Arbitrates one exclusive action at a time (roll, jump, glide, homing
//!   attack, hurt, die)
//! - Dispatches enter / stay / exit contact events to level gimmicks (springs,
//!   bumpers, fans, speed pads, ...)
//! - Abstracts terrain probing for easy swapping (segment terrain and Rapier2D
//!   included)
//!
//! ## Architecture
//!
//! Every physics step runs the [`PlatformerSet`]s in order:
//! 1. Preparation: control locks, respawns, gimmick updates, relative motion
//! 2. Sensors: the backend probes terrain around each character
//! 3. Resolve: grounded / airborne transitions and slope velocity
//! 4. Actions: input starts actions, the current action advances
//! 5. Movement: acceleration, gravity and position integration
//! 6. Contacts: gimmick contact lifecycle and side effects
//! 7. Finalize: transforms, state markers and events
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use platformer_controller::prelude::*;
//!
//! let mut app = App::new();
//! app.add_plugins(MinimalPlugins)
//!     .add_plugins(PlatformerPlugin::<SegmentTerrainBackend>::default());
//!
//! app.world_mut()
//!     .resource_mut::<TerrainSegments>()
//!     .push(TerrainSegment::new(Vec2::new(-500.0, 0.0), Vec2::new(500.0, 0.0)));
//! app.world_mut().spawn(PlatformerCharacterBundle::new(
//!     Vec2::new(0.0, 40.0),
//!     Vec2::new(9.0, 19.0),
//!     ControllerConfig::default(),
//! ));
//! ```

use bevy::prelude::*;

pub mod actions;
pub mod backend;
pub mod character;
pub mod config;
pub mod contact;
pub mod debug;
pub mod detection;
pub mod effects;
pub mod gimmick_mode;
pub mod gimmicks;
pub mod ground;
pub mod intent;
pub mod state;
pub mod systems;
pub mod terrain;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::actions::{ActionKind, Actions, GlideState};
    pub use crate::backend::{SegmentTerrainBackend, TerrainBackend, TerrainProbe};
    pub use crate::character::{
        Character, Facing, MovementRestriction, PlatformerCharacterBundle, RelativeMotion,
    };
    pub use crate::config::{ActionConfig, AirAbility, ControllerConfig, PhysicsStep};
    pub use crate::contact::{ActiveContacts, ContactConfigError, ContactSource, Gimmick};
    pub use crate::debug::PlatformerDebugPlugin;
    pub use crate::detection::{CollisionMask, SensorArray, SensorResult};
    pub use crate::effects::{
        ActionChanged, CameraMode, ContactEvent, ContactPhase, GimmickEffect, HomingTarget,
        RespawnRequest, SideEffect,
    };
    pub use crate::gimmick_mode::GimmickMode;
    pub use crate::gimmicks::*;
    pub use crate::intent::ControlIntent;
    pub use crate::state::{Airborne, Grounded, TouchingWall};
    pub use crate::terrain::{TerrainSegment, TerrainSegments};
    pub use crate::{PlatformerPlugin, PlatformerSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::Rapier2dBackend;
}

/// System sets of one physics step, chained in declaration order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformerSet {
    /// Control locks, respawns, gimmick updates, relative motion.
    Preparation,
    /// Terrain probes (contributed by the backend).
    Sensors,
    /// Ground state resolution.
    Resolve,
    /// Action starts and updates.
    Actions,
    /// Velocity and position integration.
    Movement,
    /// Gimmick contact dispatch.
    Contacts,
    /// Transforms, markers and events.
    Finalize,
}

/// Main plugin for the platformer controller.
///
/// This plugin is generic over a terrain backend `B` which provides the
/// sensor probes.
///
/// # Type Parameters
/// - `B`: The terrain backend implementation (e.g. [`SegmentTerrainBackend`](backend::SegmentTerrainBackend))
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platformer_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(PlatformerPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct PlatformerPlugin<B: backend::TerrainBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::TerrainBackend> Default for PlatformerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::TerrainBackend> Plugin for PlatformerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<character::Character>();
        app.register_type::<config::ControllerConfig>();
        app.register_type::<config::PhysicsStep>();
        app.register_type::<intent::ControlIntent>();
        app.register_type::<detection::SensorArray>();
        app.register_type::<effects::HomingTarget>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::TouchingWall>();

        app.init_resource::<config::PhysicsStep>();

        app.add_event::<effects::GimmickEffect>();
        app.add_event::<effects::ActionChanged>();
        app.add_event::<effects::ContactEvent>();
        app.add_event::<effects::RespawnRequest>();

        app.configure_sets(
            FixedUpdate,
            (
                PlatformerSet::Preparation,
                PlatformerSet::Sensors,
                PlatformerSet::Resolve,
                PlatformerSet::Actions,
                PlatformerSet::Movement,
                PlatformerSet::Contacts,
                PlatformerSet::Finalize,
            )
                .chain(),
        );

        // Add the terrain backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            (
                systems::tick_control_intent,
                systems::handle_respawn_requests,
                systems::advance_gimmicks,
                systems::apply_relative_motion,
                systems::validate_contact_sources,
            )
                .chain()
                .in_set(PlatformerSet::Preparation),
        );
        app.add_systems(
            FixedUpdate,
            systems::resolve_ground_system.in_set(PlatformerSet::Resolve),
        );
        app.add_systems(
            FixedUpdate,
            systems::update_actions.in_set(PlatformerSet::Actions),
        );
        app.add_systems(
            FixedUpdate,
            systems::apply_movement.in_set(PlatformerSet::Movement),
        );
        app.add_systems(
            FixedUpdate,
            systems::dispatch_contacts_system.in_set(PlatformerSet::Contacts),
        );
        app.add_systems(
            FixedUpdate,
            (
                systems::despawn_retired_sources,
                systems::sync_transforms,
                systems::sync_state_markers,
                systems::flush_action_transitions,
                systems::end_intent_step,
            )
                .chain()
                .in_set(PlatformerSet::Finalize),
        );
    }
}
