//! Terrain sensor array.
//!
//! These structures hold the results of terrain probes (raycasts) used for
//! ground, wall and ceiling detection, and the routine that casts them from a
//! character's solid bounds.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use crate::backend::TerrainProbe;
use crate::character::Character;
use crate::config::ControllerConfig;
use crate::ground::{angle_degrees, angle_from_normal};

/// Set of collidable terrain layers a probe is allowed to hit.
///
/// Each character carries its own mask; layer-switch gimmicks add and remove
/// layers to move a character between foreground and background paths.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionMask(u32);

impl CollisionMask {
    pub const NONE: Self = Self(0);
    pub const TERRAIN: Self = Self(1 << 0);
    pub const LAYER_A: Self = Self(1 << 1);
    pub const LAYER_B: Self = Self(1 << 2);
    pub const PLATFORM: Self = Self(1 << 3);
    pub const ALL: Self = Self(u32::MAX);

    /// Create a mask from raw layer bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw layer bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Union of two masks.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether any layer is shared with `other`.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether every layer of `other` is present.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Add the layers of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Remove the layers of `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl Default for CollisionMask {
    fn default() -> Self {
        Self::TERRAIN.union(Self::LAYER_A).union(Self::PLATFORM)
    }
}

/// Result of a single terrain probe.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorResult {
    /// Whether the probe hit something.
    pub hit: bool,
    /// Distance from the probe origin to the hit point.
    pub distance: f32,
    /// World position of the hit point.
    pub point: Vec2,
    /// Surface normal at the hit point.
    pub normal: Vec2,
    /// Ground angle of the surface, normalized to `[0, 2π)`.
    pub angle: f32,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
}

impl SensorResult {
    /// Create an empty (no hit) result.
    pub fn miss() -> Self {
        Self::default()
    }

    /// Create a hit result. The angle is derived from the normal.
    pub fn hit(distance: f32, point: Vec2, normal: Vec2, entity: Option<Entity>) -> Self {
        Self {
            hit: true,
            distance,
            point,
            normal,
            angle: angle_from_normal(normal),
            entity,
        }
    }

    /// Pick the nearest hit, preferring `self` on ties.
    pub fn nearest(self, other: Self) -> Self {
        match (self.hit, other.hit) {
            (true, true) if other.distance < self.distance => other,
            (false, true) => other,
            _ => self,
        }
    }
}

/// Orientation of the sensor array, derived from the ground angle.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroundQuadrant {
    #[default]
    Floor,
    RightWall,
    Ceiling,
    LeftWall,
}

impl GroundQuadrant {
    /// Quadrant for a ground angle (radians).
    pub fn from_angle(angle: f32) -> Self {
        let degrees = angle_degrees(angle);
        if degrees <= 45.0 || degrees >= 315.0 {
            Self::Floor
        } else if degrees < 135.0 {
            Self::RightWall
        } else if degrees <= 225.0 {
            Self::Ceiling
        } else {
            Self::LeftWall
        }
    }

    /// Rotation of this quadrant relative to the floor (radians).
    pub fn rotation(self) -> f32 {
        match self {
            Self::Floor => 0.0,
            Self::RightWall => FRAC_PI_2,
            Self::Ceiling => 2.0 * FRAC_PI_2,
            Self::LeftWall => 3.0 * FRAC_PI_2,
        }
    }

    /// Direction the ground probes cast in.
    pub fn down(self) -> Vec2 {
        match self {
            Self::Floor => Vec2::NEG_Y,
            Self::RightWall => Vec2::X,
            Self::Ceiling => Vec2::Y,
            Self::LeftWall => Vec2::NEG_X,
        }
    }

    /// Direction of positive ground velocity on a flat surface of this quadrant.
    pub fn right(self) -> Vec2 {
        match self {
            Self::Floor => Vec2::X,
            Self::RightWall => Vec2::Y,
            Self::Ceiling => Vec2::NEG_X,
            Self::LeftWall => Vec2::NEG_Y,
        }
    }
}

/// Combined results of all terrain probes for one character.
///
/// Recomputed every physics step. Only `last_ground_entity` carries over,
/// for continuity checks such as detecting that the character is still on
/// the same platform.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct SensorArray {
    /// Quadrant the probes were cast in.
    pub quadrant: GroundQuadrant,
    /// Left and right ground probes.
    pub ground_probes: [SensorResult; 2],
    /// Nearest ground probe hit.
    pub ground: SensorResult,
    /// Nearest ceiling probe hit.
    pub ceiling: SensorResult,
    /// Wall probe towards the quadrant's left.
    pub left_wall: SensorResult,
    /// Wall probe towards the quadrant's right.
    pub right_wall: SensorResult,
    /// Ground entity from the previous step.
    pub last_ground_entity: Option<Entity>,
}

impl SensorArray {
    /// Whether a wall probe hit within `reach` in the given direction sign.
    pub fn wall_within(&self, direction: f32, reach: f32) -> Option<SensorResult> {
        let wall = if direction < 0.0 {
            self.left_wall
        } else if direction > 0.0 {
            self.right_wall
        } else {
            return None;
        };
        (wall.hit && wall.distance < reach).then_some(wall)
    }

    /// Whether the ground entity changed since the previous step.
    pub fn ground_entity_changed(&self) -> bool {
        self.ground.entity != self.last_ground_entity
    }
}

/// Cast all probes for a character and combine them.
///
/// Ground probes start at the left and right edges of the solid bounds (inset
/// by `sensor_inset`) and cast along the quadrant's down direction. While
/// grounded they reach `ground_snap_distance` below the feet, otherwise only
/// `landing_distance`. Airborne characters always probe in the floor quadrant.
pub fn sense_terrain<P: TerrainProbe + ?Sized>(
    probe: &P,
    exclude: Entity,
    character: &Character,
    config: &ControllerConfig,
    previous: &SensorArray,
) -> SensorArray {
    let quadrant = if character.grounded {
        GroundQuadrant::from_angle(character.ground_angle)
    } else {
        GroundQuadrant::Floor
    };
    let down = quadrant.down();
    let right = quadrant.right();
    let half = character.half_extents;
    let mask = character.collision_mask;
    let exclude = Some(exclude);

    let foot_offset = (half.x - config.sensor_inset).max(0.0);
    let ground_reach = half.y
        + if character.grounded {
            config.ground_snap_distance
        } else {
            config.landing_distance
        };

    let ground_probes = [
        probe.probe(character.position - right * foot_offset, down, ground_reach, mask, exclude),
        probe.probe(character.position + right * foot_offset, down, ground_reach, mask, exclude),
    ];
    let ground = ground_probes[0].nearest(ground_probes[1]);

    let ceiling_reach = half.y + config.ceiling_probe_margin;
    let ceiling = probe
        .probe(character.position - right * foot_offset, -down, ceiling_reach, mask, exclude)
        .nearest(probe.probe(
            character.position + right * foot_offset,
            -down,
            ceiling_reach,
            mask,
            exclude,
        ));

    let wall_reach = half.x + config.wall_probe_margin;
    let left_wall = probe.probe(character.position, -right, wall_reach, mask, exclude);
    let right_wall = probe.probe(character.position, right, wall_reach, mask, exclude);

    SensorArray {
        quadrant,
        ground_probes,
        ground,
        ceiling,
        left_wall,
        right_wall,
        last_ground_entity: previous.ground.entity,
    }
}
