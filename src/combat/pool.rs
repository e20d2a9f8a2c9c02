//! Mana Pool
//!
//! A clamped resource pool with atomic spending: a cast either affords the
//! whole cost and deducts it, or leaves the pool untouched. Regeneration and
//! level-up floors are applied by systems in the upkeep phase.

use bevy::prelude::*;

use crate::combat::events::LevelUpEvent;
use crate::combat::health::Health;
use crate::constants::LEVEL_UP_MANA_FLOOR_PCT;
use crate::stats::{BaseStats, Progression, Stat, StatModifiers};

/// Spendable resource pool for ability costs.
#[derive(Component, Debug)]
pub struct Mana {
    current: f32,
    max: f32,
    /// Points restored per second during upkeep
    pub regen_per_second: f32,
}

impl Mana {
    /// Create a full pool with no regeneration
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            regen_per_second: 0.0,
        }
    }

    pub fn with_regen(max: f32, regen_per_second: f32) -> Self {
        Self {
            current: max,
            max,
            regen_per_second,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// Whether the pool could cover a cost right now
    pub fn can_afford(&self, cost: f32) -> bool {
        self.current >= cost
    }

    /// Deduct a cost if the pool covers it. Returns false and leaves the
    /// pool unchanged otherwise.
    pub fn spend(&mut self, cost: f32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.current -= cost;
        true
    }

    /// Add points, clamped to the maximum
    pub fn restore(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }

    /// Raise the maximum for a new level and lift the current value to at
    /// least `floor_pct` percent of it
    pub fn set_level_maximum(&mut self, new_max: f32, floor_pct: f32) {
        self.max = new_max;
        self.current = self.current.max(new_max * floor_pct / 100.0);
    }

    /// Overwrite the current value, clamped to `0.0..=max`. Used by snapshot
    /// restoration.
    pub fn set_current(&mut self, value: f32) {
        self.current = value.clamp(0.0, self.max);
    }
}

/// Regenerate mana pools each tick. Dead casters stop regenerating.
pub fn regenerate_mana(time: Res<Time>, mut pools: Query<(&mut Mana, Option<&Health>)>) {
    let delta = time.delta_secs();
    for (mut mana, health) in pools.iter_mut() {
        if health.is_some_and(|h| h.is_dead()) {
            continue;
        }
        if mana.regen_per_second > 0.0 && mana.current < mana.max {
            let amount = mana.regen_per_second * delta;
            mana.restore(amount);
        }
    }
}

/// On level up, raise the mana maximum to the new level's stat and apply the
/// restoration floor
pub fn restore_mana_on_level_up(
    mut level_ups: EventReader<LevelUpEvent>,
    progression: Res<Progression>,
    mut casters: Query<(&BaseStats, &mut Mana)>,
) {
    for event in level_ups.read() {
        if let Ok((stats, mut mana)) = casters.get_mut(event.entity) {
            let new_max = stats.stat(&progression, Stat::Mana, StatModifiers::none());
            mana.set_level_maximum(new_max, LEVEL_UP_MANA_FLOOR_PCT);
            mana.regen_per_second = stats.stat(&progression, Stat::ManaRegen, StatModifiers::none());
        }
    }
}
