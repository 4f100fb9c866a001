//! Core controller systems.
//!
//! Every system runs in `FixedUpdate` inside one of the chained
//! [`PlatformerSet`](crate::PlatformerSet)s. Sensor systems are contributed by
//! the terrain backend; everything else is backend independent.

use std::f32::consts::FRAC_1_SQRT_2;
use std::time::Duration;

use bevy::prelude::*;

use crate::actions::{ActionKind, ActionTransition, Actions};
use crate::character::{Character, Facing};
use crate::config::{AirAbility, ControllerConfig, PhysicsStep};
use crate::contact::{dispatch_contacts, ActiveContacts, ContactCandidate, ContactSource, ContactTarget};
use crate::detection::{SensorArray, SensorResult};
use crate::effects::{ActionChanged, ContactEvent, GimmickEffect, HomingTarget, RespawnRequest};
use crate::gimmick_mode::GimmickMode;
use crate::ground::{resolve_ground, GroundTransition};
use crate::intent::ControlIntent;
use crate::state::{Airborne, Grounded, TouchingWall};

/// Distance beyond the bounds at which a wall counts as touched.
const WALL_TOUCH_TOLERANCE: f32 = 1.0;

/// Cosine of the turn (60 degrees) between the ground and a surface ahead
/// from which on the surface stops a grounded character.
const GROUNDED_BLOCK_TURN_COS: f32 = 0.5;

/// Move `value` towards zero by `amount` without crossing it.
fn approach_zero(value: f32, amount: f32) -> f32 {
    if value > 0.0 {
        (value - amount).max(0.0)
    } else {
        (value + amount).min(0.0)
    }
}

// ==================== Preparation ====================

/// Advance control locks.
pub fn tick_control_intent(
    step: Res<PhysicsStep>,
    time: Option<Res<Time<Fixed>>>,
    mut q_intents: Query<&mut ControlIntent>,
) {
    let dt = step.delta(time.as_deref());
    let delta = Duration::try_from_secs_f32(dt).unwrap_or(Duration::ZERO);
    for mut intent in &mut q_intents {
        intent.tick(delta);
    }
}

/// Reset characters that requested a respawn.
///
/// Active contacts are left alone: they exit on the next dispatch because the
/// character no longer overlaps them.
pub fn handle_respawn_requests(
    mut requests: EventReader<RespawnRequest>,
    mut q_characters: Query<(&mut Character, &mut Actions, Option<&mut ControlIntent>)>,
) {
    for request in requests.read() {
        let Ok((mut character, mut actions, intent)) = q_characters.get_mut(request.character) else {
            warn!("Respawn requested for {} which is not a character", request.character);
            continue;
        };
        actions.end_current(&mut character);
        character.respawn();
        if let Some(mut intent) = intent {
            intent.unlock_controls();
        }
        debug!("Respawned {} at {}", request.character, character.spawn_point);
    }
}

/// Run every gimmick's own per-step update and write its motion back.
pub fn advance_gimmicks(
    step: Res<PhysicsStep>,
    time: Option<Res<Time<Fixed>>>,
    mut q_sources: Query<(&mut ContactSource, &mut Transform)>,
) {
    let dt = step.delta(time.as_deref());
    for (mut source, mut transform) in &mut q_sources {
        let before = transform.translation.truncate();
        let mut position = before;
        source.gimmick_mut().update(&mut position, dt);
        if position != before {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
    }
}

/// Carry characters along with the owner they are attached to.
pub fn apply_relative_motion(
    mut q_characters: Query<&mut Character>,
    q_owners: Query<&Transform>,
) {
    for mut character in &mut q_characters {
        let Some(link) = character.relative_motion() else {
            continue;
        };
        match q_owners.get(link.owner) {
            Ok(transform) => character.follow_owner(transform.translation.truncate()),
            Err(_) => {
                debug!("Relative motion owner {} is gone", link.owner);
                character.clear_relative_motion();
            }
        }
    }
}

/// Validate newly added contact sources, disabling broken ones.
pub fn validate_contact_sources(mut q_sources: Query<(Entity, &mut ContactSource), Added<ContactSource>>) {
    for (entity, mut source) in &mut q_sources {
        if let Err(error) = source.validate() {
            warn!("Contact source {entity} disabled: {error}");
            source.deactivate();
        }
    }
}

// ==================== Resolve ====================

/// Update grounded state and slope velocity from the sensor results.
///
/// Characters held by a platform or a hanging bar are positioned by the
/// gimmick and skip terrain resolution.
pub fn resolve_ground_system(
    mut q_characters: Query<(&mut Character, &mut Actions, &SensorArray, &ControllerConfig)>,
) {
    for (mut character, mut actions, sensors, config) in &mut q_characters {
        if character.in_gimmick_mode(GimmickMode::OnPlatform)
            || character.in_gimmick_mode(GimmickMode::OnHandle)
        {
            continue;
        }

        match resolve_ground(&mut character, sensors, config) {
            GroundTransition::Landed => {
                trace!("Landed at angle {:.2}", character.ground_angle);
                actions.notify_landed(&mut character);
            }
            GroundTransition::Left => trace!("Left the ground"),
            GroundTransition::Stayed | GroundTransition::Airborne => {}
        }
    }
}

// ==================== Actions ====================

/// Start actions from input, then advance the current action.
pub fn update_actions(
    step: Res<PhysicsStep>,
    time: Option<Res<Time<Fixed>>>,
    mut q_characters: Query<(&mut Character, &mut Actions, &ControlIntent, &ControllerConfig)>,
    q_targets: Query<&Transform, With<HomingTarget>>,
) {
    let dt = step.delta(time.as_deref());

    for (mut character, mut actions, intent, config) in &mut q_characters {
        if !actions.locks_input() {
            if intent.jump_just_pressed() {
                if character.grounded {
                    actions.perform(ActionKind::Jump, &mut character);
                } else {
                    match config.air_ability {
                        AirAbility::Glide => {
                            actions.perform(ActionKind::Glide, &mut character);
                        }
                        AirAbility::HomingAttack => {
                            let target = nearest_homing_target(
                                &character,
                                config.actions.homing_range,
                                q_targets.iter().map(|t| t.translation.truncate()),
                            );
                            actions.set_homing_target(target);
                            actions.perform(ActionKind::HomingAttack, &mut character);
                        }
                        AirAbility::None => {}
                    }
                }
            } else if character.grounded
                && intent.effective_vertical() < 0.0
                && !actions.is_performing(ActionKind::Roll)
            {
                actions.perform(ActionKind::Roll, &mut character);
            }
        }

        actions.tick(&mut character, intent, dt);
    }
}

/// Nearest target within `range` that is not behind the character.
fn nearest_homing_target(
    character: &Character,
    range: f32,
    targets: impl Iterator<Item = Vec2>,
) -> Option<Vec2> {
    let origin = character.position;
    let forward = character.facing.sign();
    targets
        .filter(|target| (target.x - origin.x) * forward >= 0.0)
        .filter(|target| target.distance(origin) <= range)
        .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))
}

// ==================== Movement ====================

/// Apply input, slope and gravity to velocity, then integrate position.
pub fn apply_movement(
    step: Res<PhysicsStep>,
    time: Option<Res<Time<Fixed>>>,
    mut q_characters: Query<(&mut Character, &Actions, &ControlIntent, &ControllerConfig, &SensorArray)>,
) {
    let dt = step.delta(time.as_deref());

    for (mut character, actions, intent, config, sensors) in &mut q_characters {
        let input = if actions.locks_input() {
            0.0
        } else {
            intent.effective_horizontal()
        };

        if character.grounded {
            apply_ground_movement(&mut character, actions, config, input, dt);
        } else {
            apply_air_movement(&mut character, actions, config, input, dt);
        }

        let delta = character.restrictions.apply(character.velocity) * dt;
        let delta = clamp_to_walls(&mut character, sensors, config, delta);
        character.position += delta;
    }
}

fn apply_ground_movement(
    character: &mut Character,
    actions: &Actions,
    config: &ControllerConfig,
    input: f32,
    dt: f32,
) {
    let mut speed = character.ground_velocity;
    speed -= config.slope_factor * character.ground_angle.sin() * dt;

    if actions.is_performing(ActionKind::Roll) {
        // Rolling can only brake, never accelerate.
        if input != 0.0 && speed != 0.0 && input.signum() != speed.signum() {
            speed = approach_zero(speed, config.deceleration * 0.25 * dt);
        }
        speed = approach_zero(speed, config.roll_friction * dt);
    } else if input != 0.0 {
        if speed != 0.0 && input.signum() != speed.signum() {
            speed += input.signum() * config.deceleration * dt;
        } else if speed.abs() < config.top_speed {
            speed = (speed + input * config.acceleration * dt)
                .clamp(-config.top_speed, config.top_speed);
        }
        if let Some(facing) = Facing::from_sign(input) {
            character.facing = facing;
        }
    } else {
        speed = approach_zero(speed, config.friction * dt);
    }

    character.set_ground_velocity(speed);
}

fn apply_air_movement(
    character: &mut Character,
    actions: &Actions,
    config: &ControllerConfig,
    input: f32,
    dt: f32,
) {
    if input != 0.0 {
        let vx = character.velocity.x;
        let accelerated = vx + input * config.air_acceleration * dt;
        if vx.abs() < config.top_speed {
            character.velocity.x = accelerated.clamp(-config.top_speed, config.top_speed);
        } else if input.signum() != vx.signum() {
            character.velocity.x = accelerated;
        }
        if let Some(facing) = Facing::from_sign(input) {
            character.facing = facing;
        }
    }

    let gravity_claimed =
        actions.controls_gravity() || character.active_gimmick_mode().claims_gravity();
    if !gravity_claimed {
        character.velocity.y = (character.velocity.y - config.gravity * dt).max(-config.max_fall_speed);
    }
}

/// Whether a wall probe hit stops motion along `direction`.
///
/// A grounded character only stops at surfaces turning away from its ground
/// by more than [`GROUNDED_BLOCK_TURN_COS`], so curves keep being run along
/// regardless of the quadrant the probes were cast in. In the air anything
/// steeper than 45 degrees blocks.
fn blocks_motion(character: &Character, wall: &SensorResult, direction: Vec2) -> bool {
    let facing = wall.normal.dot(-direction);
    if facing <= 0.0 {
        return false;
    }
    if character.grounded {
        wall.normal.dot(character.ground_normal()) < GROUNDED_BLOCK_TURN_COS
    } else {
        facing > FRAC_1_SQRT_2
    }
}

/// Stop movement at walls, ceilings and floors reported by the sensors.
fn clamp_to_walls(
    character: &mut Character,
    sensors: &SensorArray,
    config: &ControllerConfig,
    mut delta: Vec2,
) -> Vec2 {
    let half = character.half_extents;
    let right = sensors.quadrant.right();
    let along = delta.dot(right);

    if let Some(wall) = sensors.wall_within(along, half.x + along.abs().min(config.wall_probe_margin)) {
        if blocks_motion(character, &wall, right * along.signum()) {
            let allowed = (wall.distance - half.x).max(0.0);
            delta -= right * along.signum() * (along.abs() - allowed).max(0.0);
            if character.grounded {
                character.set_ground_velocity(0.0);
            } else {
                let into_wall = character.velocity.dot(right);
                character.velocity -= right * into_wall;
            }
        }
    }

    if !character.grounded {
        let ceiling = sensors.ceiling;
        if delta.y > 0.0 && ceiling.hit {
            let allowed = (ceiling.distance - half.y).max(0.0);
            if delta.y > allowed {
                delta.y = allowed;
                character.velocity.y = 0.0;
            }
        }

        let ground = sensors.ground;
        if delta.y < 0.0 && ground.hit {
            let allowed = (ground.distance - half.y).max(0.0);
            delta.y = delta.y.max(-allowed);
        }
    }

    delta
}

// ==================== Contacts ====================

/// Run contact dispatch for every character against every source.
pub fn dispatch_contacts_system(
    step: Res<PhysicsStep>,
    time: Option<Res<Time<Fixed>>>,
    mut q_characters: Query<(
        Entity,
        &mut Character,
        &mut Actions,
        &mut ControlIntent,
        &mut ActiveContacts,
    )>,
    mut q_sources: Query<(Entity, &mut ContactSource, &Transform)>,
    mut contact_events: EventWriter<ContactEvent>,
    mut effect_events: EventWriter<GimmickEffect>,
) {
    let dt = step.delta(time.as_deref());

    for (entity, mut character, mut actions, mut intent, mut contacts) in &mut q_characters {
        let mut candidates: Vec<ContactCandidate> = q_sources
            .iter_mut()
            .map(|(source_entity, source, transform)| {
                let source = source.into_inner();
                let position = transform.translation.truncate();
                ContactCandidate {
                    entity: source_entity,
                    position,
                    bounds: source.bounds(position),
                    enabled: source.is_active(),
                    gimmick: source.gimmick_mut(),
                }
            })
            .collect();

        let report = dispatch_contacts(
            ContactTarget {
                character: &mut *character,
                actions: &mut *actions,
                intent: &mut *intent,
                contacts: &mut *contacts,
            },
            &mut candidates,
            dt,
        );

        for (source, phase) in report.phases {
            contact_events.write(ContactEvent {
                character: entity,
                source,
                phase,
            });
        }
        for (source, effect) in report.effects {
            effect_events.write(GimmickEffect {
                character: entity,
                source,
                effect,
            });
        }
    }
}

// ==================== Finalize ====================

/// Despawn retired sources once no character is in contact with them.
pub fn despawn_retired_sources(
    mut commands: Commands,
    q_sources: Query<(Entity, &ContactSource)>,
    q_contacts: Query<&ActiveContacts>,
) {
    for (entity, source) in &q_sources {
        if source.is_retired() && !q_contacts.iter().any(|contacts| contacts.contains(entity)) {
            debug!("Despawning retired {} ({entity})", source.name());
            commands.entity(entity).despawn();
        }
    }
}

/// Copy the simulated position to the transform.
pub fn sync_transforms(mut q_characters: Query<(&Character, &mut Transform)>) {
    for (character, mut transform) in &mut q_characters {
        transform.translation.x = character.position.x;
        transform.translation.y = character.position.y;
    }
}

/// Sync state marker components from the character and its sensors.
pub fn sync_state_markers(
    mut commands: Commands,
    q_characters: Query<(
        Entity,
        &Character,
        &SensorArray,
        Has<Grounded>,
        Has<Airborne>,
        Has<TouchingWall>,
    )>,
) {
    for (entity, character, sensors, has_grounded, has_airborne, has_wall) in &q_characters {
        // Sync Grounded/Airborne
        if character.grounded && !has_grounded {
            commands.entity(entity).insert(Grounded);
            commands.entity(entity).remove::<Airborne>();
        } else if !character.grounded && has_grounded {
            commands.entity(entity).remove::<Grounded>();
            commands.entity(entity).insert(Airborne);
        } else if !character.grounded && !has_airborne && !has_grounded {
            commands.entity(entity).insert(Airborne);
        }

        // Sync TouchingWall in the quadrant's frame
        let reach = character.half_extents.x + WALL_TOUCH_TOLERANCE;
        let right = sensors.quadrant.right();
        let touching = sensors
            .wall_within(-1.0, reach)
            .map(|wall| (-right, wall.normal))
            .or_else(|| sensors.wall_within(1.0, reach).map(|wall| (right, wall.normal)));
        match touching {
            Some((direction, normal)) => {
                commands
                    .entity(entity)
                    .insert(TouchingWall::new(direction, normal));
            }
            None if has_wall => {
                commands.entity(entity).remove::<TouchingWall>();
            }
            None => {}
        }
    }
}

/// Send [`ActionChanged`] events for the transitions of this step.
pub fn flush_action_transitions(
    mut q_actions: Query<(Entity, &mut Actions)>,
    mut events: EventWriter<ActionChanged>,
) {
    for (entity, mut actions) in &mut q_actions {
        for transition in actions.drain_transitions() {
            let (action, started) = match transition {
                ActionTransition::Started(kind) => (kind, true),
                ActionTransition::Ended(kind) => (kind, false),
            };
            events.write(ActionChanged {
                character: entity,
                action,
                started,
            });
        }
    }
}

/// Record this step's jump state for edge detection.
pub fn end_intent_step(mut q_intents: Query<&mut ControlIntent>) {
    for mut intent in &mut q_intents {
        intent.end_step();
    }
}
