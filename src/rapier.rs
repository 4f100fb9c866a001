//! Rapier2D terrain backend implementation.
//!
//! This module provides the terrain backend for Bevy Rapier2D.
//! Enable with the `rapier2d` feature.
//!
//! Level colliders are probed with rays; a collider's [`CollisionGroups`]
//! memberships are its terrain layers, matched against each character's
//! [`CollisionMask`]. Sensor colliders (usually gimmicks) are never hit.

use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;

use crate::backend::{TerrainBackend, TerrainProbe};
use crate::character::Character;
use crate::config::ControllerConfig;
use crate::contact::ContactSource;
use crate::detection::{sense_terrain, CollisionMask, SensorArray, SensorResult};

/// Rapier2D terrain backend for the platformer controller.
///
/// Probes run against the [`RapierContext`] as a system parameter. Characters
/// stay kinematic: the controller owns their position and Rapier only
/// provides the level geometry.
pub struct Rapier2dBackend;

impl TerrainBackend for Rapier2dBackend {
    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }
}

/// Plugin that sets up Rapier2D-specific systems for the platformer controller.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::PlatformerSet;

        // Preparation - Fill missing contact extents before validation
        app.add_systems(
            FixedUpdate,
            discover_contact_extents
                .in_set(PlatformerSet::Preparation)
                .before(crate::systems::validate_contact_sources),
        );

        // Sensors - Rapier raycasts
        app.add_systems(
            FixedUpdate,
            rapier_terrain_sensors.in_set(PlatformerSet::Sensors),
        );
    }
}

/// Collision groups for a level collider on the given terrain layers.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platformer_controller::prelude::*;
/// use platformer_controller::rapier::terrain_groups;
///
/// fn spawn_loop_path(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 64.0, 0.0),
///         Collider::cuboid(4.0, 64.0),
///         terrain_groups(CollisionMask::LAYER_A),
///     ));
/// }
/// ```
pub fn terrain_groups(layers: CollisionMask) -> CollisionGroups {
    CollisionGroups::new(Group::from_bits_truncate(layers.bits()), Group::ALL)
}

/// Query groups for a character sensor mask.
fn mask_groups(mask: CollisionMask) -> CollisionGroups {
    CollisionGroups::new(Group::ALL, Group::from_bits_truncate(mask.bits()))
}

/// Half extents of the axis-aligned bounds of a collider, for the shapes
/// gimmicks commonly use.
pub fn collider_half_extents(collider: &Collider) -> Option<Vec2> {
    if let Some(cuboid) = collider.as_cuboid() {
        Some(cuboid.half_extents())
    } else if let Some(ball) = collider.as_ball() {
        Some(Vec2::splat(ball.radius()))
    } else if let Some(capsule) = collider.as_capsule() {
        let segment = capsule.segment();
        let half_segment = (segment.a() - segment.b()).abs() / 2.0;
        Some(half_segment + Vec2::splat(capsule.radius()))
    } else {
        None
    }
}

impl TerrainProbe for RapierContext<'_> {
    fn probe(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CollisionMask,
        exclude: Option<Entity>,
    ) -> SensorResult {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || max_distance <= 0.0 || mask == CollisionMask::NONE {
            return SensorResult::miss();
        }

        // Create filter to skip sensors and the probing entity
        let mut filter = QueryFilter::default()
            .exclude_sensors()
            .groups(mask_groups(mask));
        if let Some(entity) = exclude {
            filter = filter.exclude_rigid_body(entity).exclude_collider(entity);
        }

        self.cast_ray_and_get_normal(
            origin,
            direction,
            max_distance,
            true, // solid = true so a ray starting inside reports a hit
            filter,
        )
        .map(|(hit_entity, hit)| {
            let normal = if hit.normal == Vec2::ZERO {
                -direction
            } else {
                hit.normal
            };
            SensorResult::hit(hit.time_of_impact, hit.point, normal, Some(hit_entity))
        })
        .unwrap_or_else(SensorResult::miss)
    }
}

/// Rapier-specific sensor system.
fn rapier_terrain_sensors(
    rapier_context: ReadRapierContext,
    mut q_characters: Query<(Entity, &Character, &ControllerConfig, &mut SensorArray)>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, character, config, mut sensors) in &mut q_characters {
        let previous = *sensors;
        *sensors = sense_terrain(&context, entity, character, config, &previous);
    }
}

/// Take missing contact extents from the source's collider.
fn discover_contact_extents(
    mut q_sources: Query<(Entity, &mut ContactSource, &Collider), Added<ContactSource>>,
) {
    for (entity, mut source, collider) in &mut q_sources {
        if source.half_extents != Vec2::ZERO {
            continue;
        }
        match collider_half_extents(collider) {
            Some(half_extents) => {
                debug!("{} ({entity}) uses collider extents {half_extents}", source.name());
                source.half_extents = half_extents;
            }
            None => warn!("{} ({entity}): collider shape has no usable extents", source.name()),
        }
    }
}

/// Bundle making a platformer character visible to Rapier.
///
/// The body is kinematic and moved by the controller through its
/// [`Transform`]; other bodies collide with it but never push it.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use platformer_controller::prelude::*;
/// use platformer_controller::rapier::Rapier2dCharacterBundle;
///
/// fn spawn_player(mut commands: Commands) {
///     let half_extents = Vec2::new(9.0, 19.0);
///     commands.spawn((
///         PlatformerCharacterBundle::new(Vec2::ZERO, half_extents, ControllerConfig::default()),
///         Rapier2dCharacterBundle::new(half_extents),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier2dCharacterBundle {
    /// Always [`RigidBody::KinematicPositionBased`].
    pub rigid_body: RigidBody,
    /// Box matching the character's solid bounds.
    pub collider: Collider,
    /// Characters never block each other's terrain probes.
    pub collision_groups: CollisionGroups,
}

impl Rapier2dCharacterBundle {
    pub fn new(half_extents: Vec2) -> Self {
        Self {
            rigid_body: RigidBody::KinematicPositionBased,
            collider: Collider::cuboid(half_extents.x, half_extents.y),
            collision_groups: CollisionGroups::new(Group::NONE, Group::ALL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gimmicks::{Fan, FanConfig, SpeedPad, SpeedPadConfig};
    use crate::PlatformerPlugin;

    fn create_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
        app.add_plugins(PlatformerPlugin::<Rapier2dBackend>::default());
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app
    }

    #[test]
    fn half_extents_from_common_shapes() {
        assert_eq!(
            collider_half_extents(&Collider::cuboid(4.0, 8.0)),
            Some(Vec2::new(4.0, 8.0))
        );
        assert_eq!(collider_half_extents(&Collider::ball(5.0)), Some(Vec2::splat(5.0)));

        let capsule = collider_half_extents(&Collider::capsule_y(8.0, 4.0))
            .expect("capsule has extents");
        assert!((capsule - Vec2::new(4.0, 12.0)).length() < 1e-4);
    }

    #[test]
    fn mask_groups_filter_layers() {
        let query = mask_groups(CollisionMask::TERRAIN.union(CollisionMask::LAYER_A));
        let loop_path = terrain_groups(CollisionMask::LAYER_A);
        let other_path = terrain_groups(CollisionMask::LAYER_B);

        let interacts = |a: CollisionGroups, b: CollisionGroups| {
            a.memberships.intersects(b.filters) && b.memberships.intersects(a.filters)
        };
        assert!(interacts(query, loop_path));
        assert!(!interacts(query, other_path));
    }

    #[test]
    fn contact_extents_discovered_from_collider() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                ContactSource::from_collider(Fan::new(FanConfig::default())),
                Collider::cuboid(16.0, 48.0),
                Sensor,
            ))
            .id();

        app.world_mut().run_schedule(FixedUpdate);

        let source = app.world().get::<ContactSource>(entity).expect("source exists");
        assert_eq!(source.half_extents, Vec2::new(16.0, 48.0));
        assert!(source.is_active());
    }

    #[test]
    fn source_without_extents_is_disabled() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                ContactSource::from_collider(SpeedPad::new(SpeedPadConfig::default())),
            ))
            .id();

        app.world_mut().run_schedule(FixedUpdate);

        let source = app.world().get::<ContactSource>(entity).expect("source exists");
        assert!(!source.is_active());
    }
}
