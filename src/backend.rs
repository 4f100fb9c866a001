//! Terrain backend abstraction.
//!
//! This module defines the traits terrain backends implement to work with the
//! platformer controller. This allows swapping between the built-in segment
//! terrain and a physics engine (Rapier2D) for probing level geometry.

use bevy::prelude::*;

use crate::detection::{CollisionMask, SensorResult};

/// A directional distance query against level collision geometry.
///
/// A miss is a valid, expected outcome and is reported as
/// [`SensorResult::miss`], never as an error.
pub trait TerrainProbe {
    /// Cast a ray from `origin` along `direction` up to `max_distance`.
    ///
    /// # Arguments
    /// * `origin` - Ray origin in world space
    /// * `direction` - Cast direction (normalized by the caller)
    /// * `max_distance` - Maximum cast distance
    /// * `mask` - Layers the ray may hit
    /// * `exclude` - Entity to exclude from the cast (usually the character)
    fn probe(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CollisionMask,
        exclude: Option<Entity>,
    ) -> SensorResult;
}

/// Trait for terrain backend implementations.
///
/// A backend contributes the system that fills every character's
/// [`SensorArray`](crate::detection::SensorArray) during
/// [`PlatformerSet::Sensors`](crate::PlatformerSet::Sensors), usually by
/// calling [`sense_terrain`](crate::detection::sense_terrain) with its own
/// [`TerrainProbe`].
///
/// For an example implementation, see [`SegmentTerrainBackend`], or the
/// `rapier` module's `Rapier2dBackend`.
pub trait TerrainBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;
}

/// Backend probing the [`TerrainSegments`](crate::terrain::TerrainSegments)
/// resource. Needs no physics engine.
pub struct SegmentTerrainBackend;

impl TerrainBackend for SegmentTerrainBackend {
    fn plugin() -> impl Plugin {
        SegmentTerrainPlugin
    }
}

/// Plugin that registers the segment terrain sensor system.
pub struct SegmentTerrainPlugin;

impl Plugin for SegmentTerrainPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<crate::terrain::TerrainSegments>();
        app.init_resource::<crate::terrain::TerrainSegments>();
        app.add_systems(
            FixedUpdate,
            crate::terrain::segment_terrain_sensors.in_set(crate::PlatformerSet::Sensors),
        );
    }
}
