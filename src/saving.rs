//! Actor Snapshots
//!
//! Serializable capture and restore of an actor's mutable gameplay state:
//! current health and mana, active cooldowns, equipped weapon, experience,
//! and position. The host owns the container format; this module only defines
//! the per-actor payload and the component plumbing.
//!
//! Restoration is clamping, not trusting: pool values are clamped to the
//! actor's current maxima, and elapsed or malformed cooldown entries are
//! dropped rather than re-armed.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::config::AbilityKey;
use crate::abilities::cooldowns::CooldownStore;
use crate::combat::fighter::Fighter;
use crate::combat::health::Health;
use crate::combat::pool::Mana;
use crate::combat::weapons::WeaponKey;
use crate::stats::Experience;

/// One tracked cooldown at capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownSnapshot {
    pub ability: AbilityKey,
    pub remaining: f32,
    pub initial: f32,
}

/// The mutable state of one actor, detached from the ECS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub health_current: f32,
    pub mana_current: f32,
    pub cooldowns: Vec<CooldownSnapshot>,
    pub weapon: Option<WeaponKey>,
    pub experience_points: f32,
    pub position: [f32; 3],
}

/// Capture an actor's restorable state. Absent components capture as their
/// neutral values and restore as no-ops.
pub fn capture_actor(
    transform: &Transform,
    health: &Health,
    mana: Option<&Mana>,
    cooldowns: Option<&CooldownStore>,
    fighter: Option<&Fighter>,
    experience: Option<&Experience>,
) -> ActorSnapshot {
    ActorSnapshot {
        health_current: health.current(),
        mana_current: mana.map_or(0.0, Mana::current),
        cooldowns: cooldowns
            .map(|store| {
                store
                    .snapshot_entries()
                    .into_iter()
                    .map(|(ability, remaining, initial)| CooldownSnapshot {
                        ability,
                        remaining,
                        initial,
                    })
                    .collect()
            })
            .unwrap_or_default(),
        weapon: fighter.and_then(|f| f.weapon.clone()),
        experience_points: experience.map_or(0.0, Experience::points),
        position: transform.translation.to_array(),
    }
}

/// Apply a snapshot back onto an actor's components.
///
/// Re-equips the captured weapon, overwrites pools and position, replaces
/// the cooldown table, and resets experience. The caller passes whatever
/// components the actor actually has; the rest of the snapshot is ignored.
pub fn restore_actor(
    snapshot: &ActorSnapshot,
    transform: &mut Transform,
    health: &mut Health,
    mut mana: Option<&mut Mana>,
    cooldowns: Option<&mut CooldownStore>,
    fighter: Option<&mut Fighter>,
    experience: Option<&mut Experience>,
) {
    transform.translation = Vec3::from_array(snapshot.position);
    health.set_current(snapshot.health_current);

    if let Some(mana) = mana.as_deref_mut() {
        mana.set_current(snapshot.mana_current);
    }

    if let Some(store) = cooldowns {
        *store = CooldownStore::default();
        for entry in &snapshot.cooldowns {
            store.restore_entry(entry.ability.clone(), entry.remaining, entry.initial);
        }
    }

    if let Some(fighter) = fighter {
        if let Some(weapon) = &snapshot.weapon {
            fighter.equip(weapon.clone());
        } else {
            fighter.weapon = None;
        }
    }

    if let Some(experience) = experience {
        experience.set_points(snapshot.experience_points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_restore_round_trip() {
        let mut transform = Transform::from_xyz(3.0, 0.0, -2.0);
        let mut health = Health::new(100.0);
        health.take_damage(40.0);
        let mut mana = Mana::new(50.0);
        mana.spend(20.0);
        let mut cooldowns = CooldownStore::default();
        cooldowns.start(AbilityKey::from("fireball"), 10.0);
        cooldowns.tick(4.0);
        let mut fighter = Fighter::with_weapon(WeaponKey::from("sword"));
        let mut experience = Experience::new(120.0);

        let snapshot = capture_actor(
            &transform,
            &health,
            Some(&mana),
            Some(&cooldowns),
            Some(&fighter),
            Some(&experience),
        );

        // Mutate everything, then restore
        transform.translation = Vec3::ZERO;
        health.heal(100.0);
        mana.restore(50.0);
        cooldowns.tick(100.0);
        fighter.weapon = None;
        experience.gain(500.0);

        restore_actor(
            &snapshot,
            &mut transform,
            &mut health,
            Some(&mut mana),
            Some(&mut cooldowns),
            Some(&mut fighter),
            Some(&mut experience),
        );

        assert_eq!(transform.translation, Vec3::new(3.0, 0.0, -2.0));
        assert_eq!(health.current(), 60.0);
        assert_eq!(mana.current(), 30.0);
        assert_eq!(cooldowns.remaining(&AbilityKey::from("fireball")), 6.0);
        assert_eq!(fighter.weapon, Some(WeaponKey::from("sword")));
        assert_eq!(experience.points(), 120.0);
    }

    #[test]
    fn test_restore_clamps_to_pool_maxima() {
        let snapshot = ActorSnapshot {
            health_current: 999.0,
            mana_current: -5.0,
            cooldowns: Vec::new(),
            weapon: None,
            experience_points: 0.0,
            position: [0.0; 3],
        };

        let mut transform = Transform::default();
        let mut health = Health::new(100.0);
        let mut mana = Mana::new(50.0);

        restore_actor(
            &snapshot,
            &mut transform,
            &mut health,
            Some(&mut mana),
            None,
            None,
            None,
        );

        assert_eq!(health.current(), 100.0);
        assert_eq!(mana.current(), 0.0);
    }

    #[test]
    fn test_elapsed_cooldown_entries_are_dropped() {
        let snapshot = ActorSnapshot {
            health_current: 1.0,
            mana_current: 0.0,
            cooldowns: vec![CooldownSnapshot {
                ability: AbilityKey::from("heal"),
                remaining: 0.0,
                initial: 8.0,
            }],
            weapon: None,
            experience_points: 0.0,
            position: [0.0; 3],
        };

        let mut transform = Transform::default();
        let mut health = Health::new(10.0);
        let mut cooldowns = CooldownStore::default();

        restore_actor(
            &snapshot,
            &mut transform,
            &mut health,
            None,
            Some(&mut cooldowns),
            None,
            None,
        );

        assert!(cooldowns.is_ready(&AbilityKey::from("heal")));
        assert!(cooldowns.is_empty());
    }
}
