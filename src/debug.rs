//! Debug drawing with gizmos.
//!
//! Add [`PlatformerDebugPlugin`] next to the main plugin to see contact
//! bounds in each gimmick's debug color and the terrain sensor hits of every
//! character. Requires Bevy's gizmo support (part of `DefaultPlugins`).

use bevy::math::Isometry2d;
use bevy::prelude::*;

use crate::character::Character;
use crate::contact::ContactSource;
use crate::detection::{SensorArray, SensorResult};

const DISABLED_COLOR: Color = Color::srgb(0.4, 0.4, 0.4);
const CHARACTER_COLOR: Color = Color::WHITE;
const GROUND_COLOR: Color = Color::srgb(0.2, 1.0, 0.2);
const CEILING_COLOR: Color = Color::srgb(0.2, 0.6, 1.0);
const WALL_COLOR: Color = Color::srgb(1.0, 0.2, 0.2);
const NORMAL_LENGTH: f32 = 12.0;

/// What the debug plugin draws.
#[derive(Resource, Reflect, Debug, Clone, Copy)]
#[reflect(Resource)]
pub struct DebugDraw {
    /// Draw contact source bounds.
    pub contact_sources: bool,
    /// Draw character bounds and sensor hits.
    pub sensors: bool,
}

impl Default for DebugDraw {
    fn default() -> Self {
        Self {
            contact_sources: true,
            sensors: true,
        }
    }
}

/// Plugin drawing contact bounds and sensor probes.
pub struct PlatformerDebugPlugin;

impl Plugin for PlatformerDebugPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<DebugDraw>();
        app.init_resource::<DebugDraw>();
        app.add_systems(
            Update,
            (
                draw_contact_sources.run_if(|draw: Res<DebugDraw>| draw.contact_sources),
                draw_sensors.run_if(|draw: Res<DebugDraw>| draw.sensors),
            ),
        );
    }
}

fn draw_contact_sources(mut gizmos: Gizmos, q_sources: Query<(&ContactSource, &Transform)>) {
    for (source, transform) in &q_sources {
        let bounds = source.bounds(transform.translation.truncate());
        let color = if source.is_active() {
            source.gimmick().debug_color()
        } else {
            DISABLED_COLOR
        };
        gizmos.rect_2d(Isometry2d::from_translation(bounds.center()), bounds.size(), color);
    }
}

fn draw_sensors(mut gizmos: Gizmos, q_characters: Query<(&Character, &SensorArray)>) {
    for (character, sensors) in &q_characters {
        let bounds = character.solid_bounds();
        gizmos.rect_2d(Isometry2d::from_translation(bounds.center()), bounds.size(), CHARACTER_COLOR);

        for probe in sensors.ground_probes {
            draw_hit(&mut gizmos, character.position, probe, GROUND_COLOR);
        }
        draw_hit(&mut gizmos, character.position, sensors.ceiling, CEILING_COLOR);
        draw_hit(&mut gizmos, character.position, sensors.left_wall, WALL_COLOR);
        draw_hit(&mut gizmos, character.position, sensors.right_wall, WALL_COLOR);
    }
}

fn draw_hit(gizmos: &mut Gizmos, origin: Vec2, result: SensorResult, color: Color) {
    if !result.hit {
        return;
    }
    gizmos.line_2d(origin, result.point, color.with_alpha(0.3));
    gizmos.circle_2d(Isometry2d::from_translation(result.point), 2.0, color);
    gizmos.arrow_2d(result.point, result.point + result.normal * NORMAL_LENGTH, color);
}
