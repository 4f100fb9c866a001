//! Ground angle and velocity resolution.
//!
//! Converts surface normals into ground angles and translates between the
//! character's scalar ground velocity and its world-space velocity. Also
//! decides, each step, whether the character stays grounded.
//!
//! # Angle convention
//!
//! A ground angle `θ` describes the surface tangent `(cos θ, sin θ)`. Flat
//! floor is `0`, a wall on the character's right is `π/2`, a ceiling is `π`
//! and a wall on the left is `3π/2`. Angles are always normalized to
//! `[0, 2π)` before comparisons.

use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::character::Character;
use crate::config::ControllerConfig;
use crate::detection::{GroundQuadrant, SensorArray};

/// Normalize an angle in radians to `[0, 2π)`.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Ground angle in degrees, normalized to `[0, 360)`.
#[inline]
pub fn angle_degrees(angle: f32) -> f32 {
    normalize_angle(angle).to_degrees()
}

/// Check whether a normalized angle lies in `(min_degrees, max_degrees]`.
///
/// Several gimmicks compare against fixed ranges such as `> 90` and `<= 270`;
/// the angle is normalized first so wrapped inputs compare correctly.
pub fn angle_in_range(angle: f32, min_degrees: f32, max_degrees: f32) -> bool {
    let degrees = angle_degrees(angle);
    degrees > min_degrees && degrees <= max_degrees
}

/// Convert a surface normal into a ground angle (radians, `[0, 2π)`).
///
/// Returns `0` for a zero-length normal.
pub fn angle_from_normal(normal: Vec2) -> f32 {
    let normal = normal.normalize_or_zero();
    if normal == Vec2::ZERO {
        return 0.0;
    }
    // Tangent is the normal rotated clockwise: (n.y, -n.x).
    normalize_angle((-normal.x).atan2(normal.y))
}

/// Surface normal for a ground angle.
#[inline]
pub fn surface_normal(angle: f32) -> Vec2 {
    Vec2::new(-angle.sin(), angle.cos())
}

/// Surface tangent for a ground angle.
#[inline]
pub fn surface_tangent(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Project a world velocity onto the surface tangent.
#[inline]
pub fn to_ground_velocity(world_velocity: Vec2, angle: f32) -> f32 {
    world_velocity.dot(surface_tangent(angle))
}

/// Expand a ground velocity into world space along the surface tangent.
#[inline]
pub fn to_world_velocity(ground_velocity: f32, angle: f32) -> Vec2 {
    surface_tangent(angle) * ground_velocity
}

/// Result of resolving the ground state for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundTransition {
    /// Was airborne, now grounded.
    Landed,
    /// Was grounded and still is.
    Stayed,
    /// Was grounded, now airborne.
    Left,
    /// Was airborne and still is.
    Airborne,
}

/// Update the character's grounded state from the latest sensor results.
///
/// While grounded the world velocity is re-derived from the ground velocity
/// and the fresh surface angle, and the character is snapped onto the
/// surface. Missing ground only detaches the character after
/// `ground_miss_tolerance` consecutive misses. On wall and ceiling quadrants,
/// ground speed below `wall_fall_speed` detaches immediately.
pub fn resolve_ground(
    character: &mut Character,
    sensors: &SensorArray,
    config: &ControllerConfig,
) -> GroundTransition {
    let ground = sensors.ground;

    if character.grounded {
        let within_snap = ground.hit
            && ground.distance <= character.half_extents.y + config.ground_snap_distance;

        if !within_snap {
            character.ungrounded_ticks += 1;
            if character.ungrounded_ticks > config.ground_miss_tolerance {
                character.leave_ground();
                return GroundTransition::Left;
            }
            return GroundTransition::Stayed;
        }

        character.ungrounded_ticks = 0;
        character.ground_angle = ground.angle;
        character.snap_to_surface(ground.point, ground.normal);

        let quadrant = GroundQuadrant::from_angle(ground.angle);
        if quadrant != GroundQuadrant::Floor
            && character.ground_velocity.abs() < config.wall_fall_speed
        {
            character.velocity = to_world_velocity(character.ground_velocity, ground.angle);
            character.leave_ground();
            return GroundTransition::Left;
        }

        character.velocity = to_world_velocity(character.ground_velocity, ground.angle);
        return GroundTransition::Stayed;
    }

    // Airborne: only land on a close surface while not moving away from it.
    let landing = ground.hit
        && ground.distance <= character.half_extents.y + config.landing_distance
        && character.velocity.dot(ground.normal) <= 0.0;

    if landing {
        character.land(ground.angle);
        character.snap_to_surface(ground.point, ground.normal);
        GroundTransition::Landed
    } else {
        GroundTransition::Airborne
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::SensorResult;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn normalize_wraps_negative_and_large_angles() {
        assert!(approx(normalize_angle(-FRAC_PI_2), 3.0 * FRAC_PI_2));
        assert!(approx(normalize_angle(TAU + 0.5), 0.5));
        assert_eq!(normalize_angle(-1e-9), 0.0);
    }

    #[test]
    fn angle_from_cardinal_normals() {
        assert!(approx(angle_from_normal(Vec2::Y), 0.0));
        // Wall on the right faces left.
        assert!(approx(angle_from_normal(Vec2::NEG_X), FRAC_PI_2));
        assert!(approx(angle_from_normal(Vec2::NEG_Y), PI));
        assert!(approx(angle_from_normal(Vec2::X), 3.0 * FRAC_PI_2));
    }

    #[test]
    fn angle_from_normal_matches_surface_normal() {
        for degrees in [0.0_f32, 30.0, 45.0, 100.0, 200.0, 300.0] {
            let angle = degrees.to_radians();
            assert!(approx(angle_from_normal(surface_normal(angle)), angle));
        }
    }

    #[test]
    fn range_check_uses_normalized_angle() {
        // -45 degrees is 315 and must not fall into (90, 270].
        assert!(!angle_in_range(-FRAC_PI_4, 90.0, 270.0));
        assert!(angle_in_range(PI, 90.0, 270.0));
        assert!(angle_in_range(PI + TAU, 90.0, 270.0));
    }

    #[test]
    fn ground_world_round_trip() {
        for degrees in [0.0_f32, 22.5, 45.0, 90.0, 135.0, 180.0, 270.0, 330.0] {
            let angle = degrees.to_radians();
            for speed in [-12.0_f32, -1.0, 0.0, 3.5, 16.0] {
                let world = to_world_velocity(speed, angle);
                let back = to_world_velocity(to_ground_velocity(world, angle), angle);
                assert!((back - world).length() < 1e-3);
            }
        }
    }

    #[test]
    fn flat_ground_velocity_is_horizontal() {
        assert_eq!(to_world_velocity(5.0, 0.0), Vec2::new(5.0, 0.0));
        assert!(approx(to_ground_velocity(Vec2::new(3.0, -7.0), 0.0), 3.0));
    }

    fn sensors_with_ground(distance: f32, normal: Vec2, point: Vec2) -> SensorArray {
        SensorArray {
            ground: SensorResult::hit(distance, point, normal, None),
            ..default()
        }
    }

    #[test]
    fn grounded_character_follows_slope() {
        let config = ControllerConfig::default();
        let mut character = Character::new(Vec2::new(0.0, 16.0), Vec2::new(8.0, 16.0));
        character.land(0.0);
        character.set_ground_velocity(10.0);

        let slope = 30.0_f32.to_radians();
        let sensors = sensors_with_ground(16.0, surface_normal(slope), Vec2::ZERO);
        let transition = resolve_ground(&mut character, &sensors, &config);

        assert_eq!(transition, GroundTransition::Stayed);
        assert!(approx(character.ground_angle, slope));
        assert!((character.velocity - to_world_velocity(10.0, slope)).length() < 1e-4);
    }

    #[test]
    fn leaving_ground_waits_for_tolerance_and_freezes_velocity() {
        let config = ControllerConfig::default().with_ground_miss_tolerance(2);
        let mut character = Character::new(Vec2::ZERO, Vec2::new(8.0, 16.0));
        character.land(0.3);
        character.set_ground_velocity(6.0);
        let frozen = character.velocity;

        let sensors = SensorArray::default();
        assert_eq!(resolve_ground(&mut character, &sensors, &config), GroundTransition::Stayed);
        assert_eq!(resolve_ground(&mut character, &sensors, &config), GroundTransition::Stayed);
        assert_eq!(resolve_ground(&mut character, &sensors, &config), GroundTransition::Left);
        assert!(!character.grounded);
        assert_eq!(character.velocity, frozen);
    }

    #[test]
    fn landing_projects_velocity_onto_surface() {
        let config = ControllerConfig::default();
        let mut character = Character::new(Vec2::new(0.0, 20.0), Vec2::new(8.0, 16.0));
        character.velocity = Vec2::new(4.0, -3.0);

        let sensors = sensors_with_ground(16.0, Vec2::Y, Vec2::new(0.0, 4.0));
        let transition = resolve_ground(&mut character, &sensors, &config);

        assert_eq!(transition, GroundTransition::Landed);
        assert!(character.grounded);
        assert!(approx(character.ground_velocity, 4.0));
        assert_eq!(character.velocity, Vec2::new(4.0, 0.0));
        assert!(approx(character.position.y, 20.0));
    }

    #[test]
    fn rising_character_does_not_land() {
        let config = ControllerConfig::default();
        let mut character = Character::new(Vec2::new(0.0, 20.0), Vec2::new(8.0, 16.0));
        character.velocity = Vec2::new(0.0, 5.0);

        let sensors = sensors_with_ground(16.0, Vec2::Y, Vec2::new(0.0, 4.0));
        assert_eq!(resolve_ground(&mut character, &sensors, &config), GroundTransition::Airborne);
    }

    #[test]
    fn slow_character_falls_off_wall() {
        let config = ControllerConfig::default();
        let mut character = Character::new(Vec2::ZERO, Vec2::new(8.0, 16.0));
        character.land(FRAC_PI_2);
        character.set_ground_velocity(config.wall_fall_speed * 0.5);

        let sensors = sensors_with_ground(16.0, Vec2::NEG_X, Vec2::new(16.0, 0.0));
        assert_eq!(resolve_ground(&mut character, &sensors, &config), GroundTransition::Left);
        assert!(!character.grounded);
    }
}
