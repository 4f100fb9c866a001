//! Built-in line-segment terrain.
//!
//! A lightweight level representation for headless simulation and tests:
//! every solid edge is a segment with its own layer mask.

use bevy::prelude::*;

use crate::backend::TerrainProbe;
use crate::character::Character;
use crate::config::ControllerConfig;
use crate::detection::{sense_terrain, CollisionMask, SensorArray, SensorResult};

/// A solid terrain edge.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct TerrainSegment {
    /// First endpoint.
    pub a: Vec2,
    /// Second endpoint.
    pub b: Vec2,
    /// Layers this segment belongs to.
    pub layers: CollisionMask,
    /// Entity reported on hits (e.g. a platform).
    pub entity: Option<Entity>,
}

impl TerrainSegment {
    /// Create a segment on the base terrain layer.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            a,
            b,
            layers: CollisionMask::TERRAIN,
            entity: None,
        }
    }

    /// Builder: set the layers.
    pub fn with_layers(mut self, layers: CollisionMask) -> Self {
        self.layers = layers;
        self
    }

    /// Builder: set the reported entity.
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Intersect a ray with this segment.
    ///
    /// Returns the distance along the ray and the segment normal facing the
    /// ray origin.
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<(f32, Vec2)> {
        let edge = self.b - self.a;
        let denom = direction.perp_dot(edge);
        if denom.abs() < f32::EPSILON {
            return None;
        }

        let to_start = self.a - origin;
        let distance = to_start.perp_dot(edge) / denom;
        let along = to_start.perp_dot(direction) / denom;
        if distance < 0.0 || distance > max_distance || !(0.0..=1.0).contains(&along) {
            return None;
        }

        let mut normal = edge.perp().normalize_or_zero();
        if normal.dot(direction) > 0.0 {
            normal = -normal;
        }
        Some((distance, normal))
    }
}

/// All terrain segments of the loaded level.
#[derive(Resource, Reflect, Debug, Clone, Default)]
#[reflect(Resource)]
pub struct TerrainSegments {
    pub segments: Vec<TerrainSegment>,
}

impl TerrainSegments {
    pub fn new(segments: Vec<TerrainSegment>) -> Self {
        Self { segments }
    }

    /// Append a segment.
    pub fn push(&mut self, segment: TerrainSegment) {
        self.segments.push(segment);
    }

    /// Append a closed polyline (e.g. a box or a slope outline).
    pub fn push_loop(&mut self, points: &[Vec2], layers: CollisionMask) {
        for (i, &a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            self.segments.push(TerrainSegment::new(a, b).with_layers(layers));
        }
    }
}

impl TerrainProbe for TerrainSegments {
    fn probe(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: CollisionMask,
        exclude: Option<Entity>,
    ) -> SensorResult {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || max_distance <= 0.0 {
            return SensorResult::miss();
        }

        self.segments
            .iter()
            .filter(|segment| segment.layers.intersects(mask))
            .filter(|segment| exclude.is_none() || segment.entity != exclude)
            .filter_map(|segment| {
                segment
                    .raycast(origin, direction, max_distance)
                    .map(|(distance, normal)| {
                        SensorResult::hit(distance, origin + direction * distance, normal, segment.entity)
                    })
            })
            .fold(SensorResult::miss(), SensorResult::nearest)
    }
}

/// Segment terrain sensor system.
pub(crate) fn segment_terrain_sensors(
    terrain: Res<TerrainSegments>,
    mut q_characters: Query<(Entity, &Character, &ControllerConfig, &mut SensorArray)>,
) {
    for (entity, character, config, mut sensors) in &mut q_characters {
        let previous = *sensors;
        *sensors = sense_terrain(&*terrain, entity, character, config, &previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_segment_with_facing_normal() {
        let segment = TerrainSegment::new(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0));
        let (distance, normal) = segment
            .raycast(Vec2::new(2.0, 5.0), Vec2::NEG_Y, 10.0)
            .expect("ray should hit");
        assert!((distance - 5.0).abs() < 1e-5);
        assert!((normal - Vec2::Y).length() < 1e-5);

        let (_, normal) = segment
            .raycast(Vec2::new(2.0, -5.0), Vec2::Y, 10.0)
            .expect("ray should hit from below");
        assert!((normal - Vec2::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn ray_misses_out_of_range_or_parallel() {
        let segment = TerrainSegment::new(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0));
        assert!(segment.raycast(Vec2::new(0.0, 5.0), Vec2::NEG_Y, 4.0).is_none());
        assert!(segment.raycast(Vec2::new(20.0, 5.0), Vec2::NEG_Y, 10.0).is_none());
        assert!(segment.raycast(Vec2::new(0.0, 5.0), Vec2::X, 10.0).is_none());
        assert!(segment.raycast(Vec2::new(0.0, 5.0), Vec2::Y, 10.0).is_none());
    }

    #[test]
    fn probe_returns_nearest_segment() {
        let terrain = TerrainSegments::new(vec![
            TerrainSegment::new(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0)),
            TerrainSegment::new(Vec2::new(-10.0, 3.0), Vec2::new(10.0, 3.0)),
        ]);
        let result = terrain.probe(Vec2::new(0.0, 8.0), Vec2::NEG_Y, 20.0, CollisionMask::ALL, None);
        assert!(result.hit);
        assert!((result.distance - 5.0).abs() < 1e-5);
        assert!((result.point.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn probe_excludes_entity() {
        let platform = Entity::from_raw(7);
        let terrain = TerrainSegments::new(vec![TerrainSegment::new(
            Vec2::new(-10.0, 0.0),
            Vec2::new(10.0, 0.0),
        )
        .with_entity(platform)]);
        let hit = terrain.probe(Vec2::new(0.0, 5.0), Vec2::NEG_Y, 10.0, CollisionMask::ALL, None);
        assert_eq!(hit.entity, Some(platform));
        let miss = terrain.probe(
            Vec2::new(0.0, 5.0),
            Vec2::NEG_Y,
            10.0,
            CollisionMask::ALL,
            Some(platform),
        );
        assert!(!miss.hit);
    }

    #[test]
    fn push_loop_closes_shape() {
        let mut terrain = TerrainSegments::default();
        terrain.push_loop(
            &[
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(10.0, 10.0),
            ],
            CollisionMask::TERRAIN,
        );
        assert_eq!(terrain.segments.len(), 3);
        assert_eq!(terrain.segments[2].b, Vec2::ZERO);
    }
}
