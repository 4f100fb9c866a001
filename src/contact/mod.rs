//! Contact dispatch protocol.
//!
//! Every gimmick shares one lifecycle per (character, source) pair:
//!
//! ```text
//! NotInContact --valid--> Entered --valid--> Staying ...
//!       ^                    |                  |
//!       +------ invalid, no overlap or disabled +
//! ```
//!
//! [`ActiveContacts`] on the character is the only record of which pairs are
//! entered, so exit fires exactly once per enter and never for a source the
//! character did not enter.

mod geometry;
mod source;

pub use geometry::{
    bounds_overlap, horizontal_overlap, target_is_above, target_is_below, target_is_left_of,
    target_is_right_of, vertical_overlap,
};
pub use source::{ContactConfigError, ContactSource};

use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::actions::Actions;
use crate::character::Character;
use crate::effects::{ContactPhase, SideEffect};
use crate::gimmick_mode::GimmickMode;
use crate::intent::ControlIntent;

/// Read-only data handed to [`Gimmick::is_collision_valid`].
pub struct ContactView<'a> {
    pub character: &'a Character,
    pub actions: &'a Actions,
    pub intent: &'a ControlIntent,
    pub character_bounds: Rect,
    pub gimmick_bounds: Rect,
    pub gimmick_entity: Entity,
    pub gimmick_position: Vec2,
    /// Whether the pair is currently entered.
    pub pair_active: bool,
}

/// Mutable data handed to the lifecycle handlers.
pub struct ContactContext<'a> {
    pub character: &'a mut Character,
    pub actions: &'a mut Actions,
    pub intent: &'a mut ControlIntent,
    pub character_bounds: Rect,
    pub gimmick_bounds: Rect,
    pub gimmick_entity: Entity,
    pub gimmick_position: Vec2,
    /// Scaled step delta.
    pub dt: f32,
    effects: &'a mut Vec<SideEffect>,
}

impl ContactContext<'_> {
    /// Queue a side effect. Effects are flushed as events after dispatch.
    pub fn emit(&mut self, effect: SideEffect) {
        self.effects.push(effect);
    }
}

/// Policy of an interactive level object.
///
/// All handlers default to no-ops, so a gimmick only implements the phases it
/// cares about.
pub trait Gimmick: Send + Sync + 'static {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Whether an overlapping character should be in contact.
    fn is_collision_valid(&self, _view: &ContactView) -> bool {
        true
    }

    /// First valid step of a contact.
    fn on_collision_enter(&mut self, _ctx: &mut ContactContext) {}

    /// Every further valid step.
    fn on_collision_stay(&mut self, _ctx: &mut ContactContext) {}

    /// The contact ended. Release anything claimed in enter here.
    fn on_collision_exit(&mut self, _ctx: &mut ContactContext) {}

    /// Per-step update of the gimmick itself (counters, movement).
    fn update(&mut self, _position: &mut Vec2, _dt: f32) {}

    /// Check configuration parameters.
    fn validate(&self) -> Result<(), ContactConfigError> {
        Ok(())
    }

    /// Color used by the debug drawing plugin.
    fn debug_color(&self) -> Color {
        Color::srgb(1.0, 0.6, 0.0)
    }
}

/// Sources a character is currently in contact with.
#[derive(Component, Debug, Clone, Default)]
pub struct ActiveContacts {
    entities: BTreeSet<Entity>,
    /// Source that last claimed the character's gimmick mode, and the mode.
    mode_holder: Option<(Entity, GimmickMode)>,
}

impl ActiveContacts {
    /// Source that last claimed the character's gimmick mode.
    pub fn mode_holder(&self) -> Option<(Entity, GimmickMode)> {
        self.mode_holder
    }

    fn track_mode(&mut self, source: Entity, before: GimmickMode, after: GimmickMode) {
        if after == GimmickMode::None {
            self.mode_holder = None;
        } else if after != before {
            self.mode_holder = Some((source, after));
        }
    }

    /// Whether the pair with `source` is entered.
    pub fn contains(&self, source: Entity) -> bool {
        self.entities.contains(&source)
    }

    /// Entered sources in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// A contact source as seen by [`dispatch_contacts`].
pub struct ContactCandidate<'a> {
    pub entity: Entity,
    pub position: Vec2,
    pub bounds: Rect,
    pub enabled: bool,
    pub gimmick: &'a mut dyn Gimmick,
}

/// The character side of [`dispatch_contacts`].
pub struct ContactTarget<'a> {
    pub character: &'a mut Character,
    pub actions: &'a mut Actions,
    pub intent: &'a mut ControlIntent,
    pub contacts: &'a mut ActiveContacts,
}

/// Output of one dispatch pass.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Lifecycle notifications in the order they fired.
    pub phases: Vec<(Entity, ContactPhase)>,
    /// Side effects tagged with the emitting source.
    pub effects: Vec<(Entity, SideEffect)>,
}

/// Run one step of the contact lifecycle for a single character.
///
/// Candidates are visited in ascending entity order whatever order they are
/// passed in. Entered sources missing from `candidates` are pruned without an
/// exit.
pub fn dispatch_contacts(
    target: ContactTarget,
    candidates: &mut [ContactCandidate],
    dt: f32,
) -> DispatchReport {
    let ContactTarget {
        character,
        actions,
        intent,
        contacts,
    } = target;
    let mut report = DispatchReport::default();

    candidates.sort_by_key(|candidate| candidate.entity);

    let stale: Vec<Entity> = contacts
        .iter()
        .filter(|entity| {
            candidates
                .binary_search_by_key(entity, |candidate| candidate.entity)
                .is_err()
        })
        .collect();
    for entity in stale {
        contacts.entities.remove(&entity);
        match contacts.mode_holder.take_if(|(holder, _)| *holder == entity) {
            Some((_, mode)) if character.release_gimmick_mode(mode) => {
                warn!("Contact with {entity} pruned: source no longer exists, released {mode:?}");
            }
            _ => warn!("Contact with {entity} pruned: source no longer exists"),
        }
        report.phases.push((entity, ContactPhase::Pruned));
    }

    let mut effects = Vec::new();
    for candidate in candidates.iter_mut() {
        let character_bounds = character.solid_bounds();
        let pair_active = contacts.contains(candidate.entity);
        let overlapping = candidate.enabled && bounds_overlap(character_bounds, candidate.bounds);

        let valid = overlapping && {
            let view = ContactView {
                character: &*character,
                actions: &*actions,
                intent: &*intent,
                character_bounds,
                gimmick_bounds: candidate.bounds,
                gimmick_entity: candidate.entity,
                gimmick_position: candidate.position,
                pair_active,
            };
            candidate.gimmick.is_collision_valid(&view)
        };

        let phase = match (valid, pair_active) {
            (true, false) => ContactPhase::Enter,
            (true, true) => ContactPhase::Stay,
            (false, true) => ContactPhase::Exit,
            (false, false) => continue,
        };

        let mut ctx = ContactContext {
            character: &mut *character,
            actions: &mut *actions,
            intent: &mut *intent,
            character_bounds,
            gimmick_bounds: candidate.bounds,
            gimmick_entity: candidate.entity,
            gimmick_position: candidate.position,
            dt,
            effects: &mut effects,
        };
        let mode_before = ctx.character.active_gimmick_mode();
        match phase {
            ContactPhase::Enter => {
                contacts.entities.insert(candidate.entity);
                debug!("{} entered ({})", candidate.gimmick.name(), candidate.entity);
                candidate.gimmick.on_collision_enter(&mut ctx);
            }
            ContactPhase::Stay => candidate.gimmick.on_collision_stay(&mut ctx),
            ContactPhase::Exit => {
                contacts.entities.remove(&candidate.entity);
                debug!("{} exited ({})", candidate.gimmick.name(), candidate.entity);
                candidate.gimmick.on_collision_exit(&mut ctx);
            }
            ContactPhase::Pruned => {}
        }
        contacts.track_mode(candidate.entity, mode_before, character.active_gimmick_mode());

        report.phases.push((candidate.entity, phase));
        report
            .effects
            .extend(effects.drain(..).map(|effect| (candidate.entity, effect)));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::MovementRestriction;
    use crate::gimmicks::HangingBar;

    /// Counts lifecycle calls and toggles validity on demand.
    #[derive(Default)]
    struct Tally {
        valid: bool,
        enters: u32,
        stays: u32,
        exits: u32,
    }

    impl Gimmick for Tally {
        fn name(&self) -> &'static str {
            "tally"
        }

        fn is_collision_valid(&self, _view: &ContactView) -> bool {
            self.valid
        }

        fn on_collision_enter(&mut self, ctx: &mut ContactContext) {
            self.enters += 1;
            ctx.emit(SideEffect::sound("enter"));
        }

        fn on_collision_stay(&mut self, _ctx: &mut ContactContext) {
            self.stays += 1;
        }

        fn on_collision_exit(&mut self, _ctx: &mut ContactContext) {
            self.exits += 1;
        }
    }

    struct Fixture {
        character: Character,
        actions: Actions,
        intent: ControlIntent,
        contacts: ActiveContacts,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                character: Character::new(Vec2::ZERO, Vec2::new(8.0, 16.0)),
                actions: Actions::default(),
                intent: ControlIntent::new(),
                contacts: ActiveContacts::default(),
            }
        }

        fn step(&mut self, candidates: &mut [ContactCandidate]) -> DispatchReport {
            dispatch_contacts(
                ContactTarget {
                    character: &mut self.character,
                    actions: &mut self.actions,
                    intent: &mut self.intent,
                    contacts: &mut self.contacts,
                },
                candidates,
                1.0 / 60.0,
            )
        }
    }

    fn candidate<'a>(entity: u32, center: Vec2, gimmick: &'a mut dyn Gimmick) -> ContactCandidate<'a> {
        ContactCandidate {
            entity: Entity::from_raw(entity),
            position: center,
            bounds: Rect::from_center_half_size(center, Vec2::splat(4.0)),
            enabled: true,
            gimmick,
        }
    }

    fn phases(report: &DispatchReport) -> Vec<ContactPhase> {
        report.phases.iter().map(|(_, phase)| *phase).collect()
    }

    #[test]
    fn enter_stay_exit_lifecycle() {
        let mut fixture = Fixture::new();
        let mut tally = Tally {
            valid: true,
            ..default()
        };

        let report = fixture.step(&mut [candidate(1, Vec2::ZERO, &mut tally)]);
        assert_eq!(phases(&report), vec![ContactPhase::Enter]);
        assert_eq!(report.effects.len(), 1);
        assert_eq!(report.effects[0].0, Entity::from_raw(1));

        let report = fixture.step(&mut [candidate(1, Vec2::ZERO, &mut tally)]);
        assert_eq!(phases(&report), vec![ContactPhase::Stay]);

        let report = fixture.step(&mut [candidate(1, Vec2::new(100.0, 0.0), &mut tally)]);
        assert_eq!(phases(&report), vec![ContactPhase::Exit]);

        let report = fixture.step(&mut [candidate(1, Vec2::new(100.0, 0.0), &mut tally)]);
        assert!(report.phases.is_empty());

        assert_eq!((tally.enters, tally.stays, tally.exits), (1, 1, 1));
        assert!(fixture.contacts.is_empty());
    }

    #[test]
    fn invalid_overlap_never_enters() {
        let mut fixture = Fixture::new();
        let mut tally = Tally::default();
        let report = fixture.step(&mut [candidate(1, Vec2::ZERO, &mut tally)]);
        assert!(report.phases.is_empty());
        assert_eq!(tally.enters, 0);
        assert_eq!(tally.exits, 0);
    }

    #[test]
    fn becoming_invalid_exits_once() {
        let mut fixture = Fixture::new();
        let mut tally = Tally {
            valid: true,
            ..default()
        };
        fixture.step(&mut [candidate(1, Vec2::ZERO, &mut tally)]);
        tally.valid = false;
        fixture.step(&mut [candidate(1, Vec2::ZERO, &mut tally)]);
        fixture.step(&mut [candidate(1, Vec2::ZERO, &mut tally)]);
        assert_eq!((tally.enters, tally.exits), (1, 1));
    }

    #[test]
    fn disabled_source_exits() {
        let mut fixture = Fixture::new();
        let mut tally = Tally {
            valid: true,
            ..default()
        };
        fixture.step(&mut [candidate(1, Vec2::ZERO, &mut tally)]);

        let mut disabled = candidate(1, Vec2::ZERO, &mut tally);
        disabled.enabled = false;
        let report = fixture.step(&mut [disabled]);
        assert_eq!(phases(&report), vec![ContactPhase::Exit]);
    }

    #[test]
    fn missing_source_is_pruned_without_exit() {
        let mut fixture = Fixture::new();
        let mut tally = Tally {
            valid: true,
            ..default()
        };
        fixture.step(&mut [candidate(1, Vec2::ZERO, &mut tally)]);

        let report = fixture.step(&mut []);
        assert_eq!(report.phases, vec![(Entity::from_raw(1), ContactPhase::Pruned)]);
        assert_eq!(tally.exits, 0);
        assert!(fixture.contacts.is_empty());
    }

    #[test]
    fn pruned_mode_holder_releases_character() {
        let mut fixture = Fixture::new();
        let mut bar = HangingBar::default();
        fixture.step(&mut [candidate(1, Vec2::ZERO, &mut bar)]);
        assert_eq!(fixture.character.active_gimmick_mode(), GimmickMode::OnHandle);
        assert_eq!(
            fixture.contacts.mode_holder(),
            Some((Entity::from_raw(1), GimmickMode::OnHandle))
        );

        fixture.step(&mut []);
        assert_eq!(fixture.character.active_gimmick_mode(), GimmickMode::None);
        assert_eq!(fixture.character.restrictions, MovementRestriction::None);
        assert!(fixture.character.relative_motion().is_none());
        assert!(fixture.contacts.mode_holder().is_none());
    }

    #[test]
    fn pruning_other_source_keeps_mode() {
        let mut fixture = Fixture::new();
        let mut bar = HangingBar::default();
        let mut tally = Tally {
            valid: true,
            ..default()
        };
        fixture.step(&mut [
            candidate(1, Vec2::ZERO, &mut bar),
            candidate(2, Vec2::ZERO, &mut tally),
        ]);

        let report = fixture.step(&mut [candidate(1, Vec2::ZERO, &mut bar)]);
        assert_eq!(
            report.phases,
            vec![
                (Entity::from_raw(2), ContactPhase::Pruned),
                (Entity::from_raw(1), ContactPhase::Stay),
            ]
        );
        assert_eq!(fixture.character.active_gimmick_mode(), GimmickMode::OnHandle);
    }

    #[test]
    fn candidates_visited_in_entity_order() {
        let mut fixture = Fixture::new();
        let mut a = Tally {
            valid: true,
            ..default()
        };
        let mut b = Tally {
            valid: true,
            ..default()
        };
        let mut c = Tally {
            valid: true,
            ..default()
        };
        let report = fixture.step(&mut [
            candidate(9, Vec2::ZERO, &mut a),
            candidate(2, Vec2::ZERO, &mut b),
            candidate(5, Vec2::ZERO, &mut c),
        ]);
        let order: Vec<Entity> = report.phases.iter().map(|(entity, _)| *entity).collect();
        assert_eq!(
            order,
            vec![Entity::from_raw(2), Entity::from_raw(5), Entity::from_raw(9)]
        );
    }
}
