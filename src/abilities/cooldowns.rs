//! Per-Caster Cooldown Tracking
//!
//! Each caster carries a [`CooldownStore`] mapping ability keys to the time
//! left before that ability may be cast again. Entries are removed the tick
//! they elapse, so an absent key always means "ready".

use bevy::prelude::*;
use std::collections::HashMap;

use crate::abilities::config::AbilityKey;

#[derive(Clone, Copy, Debug)]
struct CooldownEntry {
    remaining: f32,
    initial: f32,
}

/// Active cooldowns for one caster, keyed by ability identity.
///
/// Two casts of the same definition share one entry, so a shared key means a
/// shared cooldown.
#[derive(Component, Default)]
pub struct CooldownStore {
    entries: HashMap<AbilityKey, CooldownEntry>,
}

impl CooldownStore {
    /// Begin tracking a cooldown. A non-positive duration is not tracked at
    /// all, leaving the ability immediately ready again even if an earlier
    /// cooldown on the same key was still running.
    pub fn start(&mut self, key: AbilityKey, duration: f32) {
        if duration <= 0.0 {
            self.entries.remove(&key);
            return;
        }
        self.entries.insert(
            key,
            CooldownEntry {
                remaining: duration,
                initial: duration,
            },
        );
    }

    /// Seconds left on an ability's cooldown. Zero when the key is untracked.
    pub fn remaining(&self, key: &AbilityKey) -> f32 {
        self.entries.get(key).map_or(0.0, |e| e.remaining)
    }

    /// Whether the ability may be cast right now
    pub fn is_ready(&self, key: &AbilityKey) -> bool {
        !self.entries.contains_key(key)
    }

    /// Fraction of the cooldown still to run, in `0.0..=1.0`. Zero for
    /// untracked keys and for entries started with a zero duration.
    pub fn fraction_remaining(&self, key: &AbilityKey) -> f32 {
        match self.entries.get(key) {
            Some(entry) if entry.initial > 0.0 => entry.remaining / entry.initial,
            _ => 0.0,
        }
    }

    /// Advance every tracked cooldown, dropping entries that elapse
    pub fn tick(&mut self, delta: f32) {
        self.entries.retain(|_, entry| {
            entry.remaining -= delta;
            entry.remaining > 0.0
        });
    }

    /// All tracked entries as `(key, remaining, initial)` triples
    pub fn snapshot_entries(&self) -> Vec<(AbilityKey, f32, f32)> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.remaining, entry.initial))
            .collect()
    }

    /// Re-insert an entry captured by [`snapshot_entries`](Self::snapshot_entries)
    pub fn restore_entry(&mut self, key: AbilityKey, remaining: f32, initial: f32) {
        if remaining <= 0.0 || initial <= 0.0 {
            return;
        }
        self.entries
            .insert(key, CooldownEntry { remaining, initial });
    }

    /// Number of abilities currently cooling down
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Advance all cooldown stores by the frame delta
pub fn tick_cooldowns(time: Res<Time>, mut stores: Query<&mut CooldownStore>) {
    let delta = time.delta_secs();
    for mut store in stores.iter_mut() {
        if !store.is_empty() {
            store.tick(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untracked_key_is_ready() {
        let store = CooldownStore::default();
        let key = AbilityKey::from("fireball");
        assert!(store.is_ready(&key));
        assert_eq!(store.remaining(&key), 0.0);
        assert_eq!(store.fraction_remaining(&key), 0.0);
    }

    #[test]
    fn test_tick_counts_down_and_removes_on_expiry() {
        let mut store = CooldownStore::default();
        let key = AbilityKey::from("fireball");

        store.start(key.clone(), 10.0);
        store.tick(4.0);
        assert_eq!(store.remaining(&key), 6.0);
        assert!(!store.is_ready(&key));

        store.tick(6.0);
        assert_eq!(store.remaining(&key), 0.0);
        assert!(store.is_ready(&key));
        assert_eq!(store.fraction_remaining(&key), 0.0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_fraction_remaining() {
        let mut store = CooldownStore::default();
        let key = AbilityKey::from("heal");

        store.start(key.clone(), 8.0);
        store.tick(2.0);
        assert!((store.fraction_remaining(&key) - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_duration_is_not_tracked() {
        let mut store = CooldownStore::default();
        let key = AbilityKey::from("jab");

        store.start(key.clone(), 0.0);
        assert!(store.is_ready(&key));
        assert_eq!(store.fraction_remaining(&key), 0.0);
    }

    #[test]
    fn test_zero_duration_clears_running_cooldown() {
        let mut store = CooldownStore::default();
        let key = AbilityKey::from("jab");

        store.start(key.clone(), 10.0);
        store.tick(1.0);
        assert!(!store.is_ready(&key));

        store.start(key.clone(), 0.0);
        assert!(store.is_ready(&key));
        assert_eq!(store.remaining(&key), 0.0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_restart_resets_the_clock() {
        let mut store = CooldownStore::default();
        let key = AbilityKey::from("fireball");

        store.start(key.clone(), 10.0);
        store.tick(9.0);
        store.start(key.clone(), 10.0);
        store.tick(5.0);
        assert_eq!(store.remaining(&key), 5.0);
    }

    #[test]
    fn test_keys_tick_independently() {
        let mut store = CooldownStore::default();
        let fireball = AbilityKey::from("fireball");
        let heal = AbilityKey::from("heal");

        store.start(fireball.clone(), 10.0);
        store.start(heal.clone(), 3.0);
        store.tick(4.0);

        assert_eq!(store.remaining(&fireball), 6.0);
        assert!(store.is_ready(&heal));
        assert_eq!(store.len(), 1);
    }
}
