use bevy::prelude::*;

use crate::contact::{ContactContext, ContactView, Gimmick};
use crate::detection::CollisionMask;

/// Layer switch configuration.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct LayerSwitchConfig {
    /// Layers added to the character's mask.
    pub add: CollisionMask,
    /// Layers removed from the character's mask.
    pub remove: CollisionMask,
    /// Only switch when moving in this direction sign. `None` switches always.
    pub direction: Option<f32>,
}

impl Default for LayerSwitchConfig {
    fn default() -> Self {
        Self {
            add: CollisionMask::LAYER_B,
            remove: CollisionMask::LAYER_A,
            direction: None,
        }
    }
}

impl LayerSwitchConfig {
    /// Switch from `from` to `to`.
    pub fn between(from: CollisionMask, to: CollisionMask) -> Self {
        Self {
            add: to,
            remove: from,
            direction: None,
        }
    }

    /// Builder: only switch when moving in `direction`.
    pub fn when_moving(mut self, direction: f32) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Moves the character between terrain layers (e.g. loop paths).
///
/// When two switches touch the character in the same step, the one visited
/// last in dispatch order wins.
#[derive(Debug, Clone, Default)]
pub struct LayerSwitch {
    pub config: LayerSwitchConfig,
}

impl LayerSwitch {
    pub fn new(config: LayerSwitchConfig) -> Self {
        Self { config }
    }
}

impl Gimmick for LayerSwitch {
    fn name(&self) -> &'static str {
        "layer_switch"
    }

    fn is_collision_valid(&self, view: &ContactView) -> bool {
        view.pair_active
            || self
                .config
                .direction
                .is_none_or(|direction| view.character.forward_speed() * direction > 0.0)
    }

    fn on_collision_enter(&mut self, ctx: &mut ContactContext) {
        let mask = &mut ctx.character.collision_mask;
        mask.remove(self.config.remove);
        mask.insert(self.config.add);
        trace!("Layer switch: mask now {:#b}", mask.bits());
    }

    fn debug_color(&self) -> Color {
        Color::srgb(0.3, 1.0, 0.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ContactPhase;
    use crate::gimmicks::harness::Harness;

    #[test]
    fn swaps_layers_on_enter() {
        let mut harness = Harness::grounded(Vec2::new(0.0, 16.0));
        let mut switch = LayerSwitch::default();
        harness.step(&mut switch, Vec2::new(0.0, 16.0), Vec2::splat(8.0));

        let mask = harness.character.collision_mask;
        assert!(mask.contains(CollisionMask::LAYER_B));
        assert!(!mask.intersects(CollisionMask::LAYER_A));
        assert!(mask.contains(CollisionMask::TERRAIN));
    }

    #[test]
    fn directional_switch_ignores_wrong_direction() {
        let mut harness = Harness::grounded(Vec2::new(0.0, 16.0));
        harness.character.set_ground_velocity(-100.0);
        let mut switch = LayerSwitch::new(LayerSwitchConfig::default().when_moving(1.0));

        assert_eq!(harness.step(&mut switch, Vec2::new(0.0, 16.0), Vec2::splat(8.0)), None);
        assert!(harness.character.collision_mask.contains(CollisionMask::LAYER_A));

        harness.character.set_ground_velocity(100.0);
        assert_eq!(
            harness.step(&mut switch, Vec2::new(0.0, 16.0), Vec2::splat(8.0)),
            Some(ContactPhase::Enter)
        );
    }
}
