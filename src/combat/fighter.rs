//! Auto-Attack Combat Loop
//!
//! Fighters chase their target into weapon range, trigger a swing when the
//! inter-attack timer elapses, and land the damage on a later discrete impact
//! so animation timing can drive when the hit connects. The swing captures
//! its target: retargeting mid-swing does not redirect a blow already in
//! flight.
//!
//! Damage never lands here directly. Melee impacts emit a `DamageEvent`;
//! ranged weapons launch a projectile that carries the damage instead.

use bevy::prelude::*;

use crate::combat::actions::{ActionKind, CurrentAction};
use crate::combat::events::{AnimationCueEvent, DamageEvent};
use crate::combat::health::Health;
use crate::combat::movement::Mover;
use crate::combat::projectiles::Projectile;
use crate::combat::weapons::{WeaponDefinitions, WeaponKey};
use crate::constants::{
    ATTACK_IMPACT_DELAY, AUTO_ATTACK_SEARCH_RADIUS, CENTER_OF_MASS_LIFT, DEFAULT_ATTACK_INTERVAL,
};
use crate::stats::{BaseStats, Progression, Stat};

/// A swing that has been triggered but whose damage has not landed yet.
#[derive(Clone, Copy, Debug)]
struct PendingImpact {
    target: Entity,
    remaining: f32,
}

/// Per-actor auto-attack state.
#[derive(Component, Debug)]
pub struct Fighter {
    target: Option<Entity>,
    /// Equipped weapon key; `None` fights unarmed
    pub weapon: Option<WeaponKey>,
    /// Seconds between attack triggers
    pub time_between_attacks: f32,
    time_since_last_attack: f32,
    pending_impact: Option<PendingImpact>,
}

impl Default for Fighter {
    fn default() -> Self {
        Self {
            target: None,
            weapon: None,
            time_between_attacks: DEFAULT_ATTACK_INTERVAL,
            // Start ready to swing so the first attack is not delayed
            time_since_last_attack: DEFAULT_ATTACK_INTERVAL,
            pending_impact: None,
        }
    }
}

impl Fighter {
    pub fn with_weapon(weapon: WeaponKey) -> Self {
        Self {
            weapon: Some(weapon),
            ..Default::default()
        }
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    /// Begin auto-attacking a target. The caller is responsible for making
    /// this the actor's exclusive action.
    pub fn attack(&mut self, target: Entity) {
        self.target = Some(target);
    }

    pub fn equip(&mut self, weapon: WeaponKey) {
        self.weapon = Some(weapon);
    }

    /// Clear the target and reset trigger state. Swings already in flight
    /// still land; cancellation only stops future ones.
    pub fn stop(&mut self) {
        self.target = None;
        self.time_since_last_attack = self.time_between_attacks;
    }

    /// Stagger the first swing, used at spawn so a crowd of fighters does not
    /// attack in lockstep
    pub fn set_attack_timer(&mut self, elapsed: f32) {
        self.time_since_last_attack = elapsed;
    }

    pub fn is_attacking(&self) -> bool {
        self.target.is_some()
    }
}

/// Whether an attack order on this target could ever land a hit:
/// the target must exist, be alive, and be in range or reachable.
pub fn can_attack(
    fighter_position: Vec3,
    weapon_range: f32,
    mover: Option<&Mover>,
    target_position: Option<Vec3>,
    target_alive: bool,
) -> bool {
    let Some(target_position) = target_position else {
        return false;
    };
    if !target_alive {
        return false;
    }
    if fighter_position.distance(target_position) <= weapon_range {
        return true;
    }
    mover.is_some_and(|m| m.can_reach(fighter_position, target_position))
}

/// One damageable actor as seen at the start of the fighter pass.
#[derive(Clone, Copy)]
struct CandidateSnapshot {
    entity: Entity,
    position: Vec3,
    alive: bool,
}

/// Per-tick fighter decisions: retarget, chase, trigger swings.
///
/// Runs in the Decisions phase; the impacts it schedules are resolved later
/// the same tick or on a following one by `resolve_attack_impacts`. Candidate
/// positions are snapshotted up front so every fighter decides against the
/// same view of the encounter.
pub fn fighter_auto_attack(
    time: Res<Time>,
    weapons: Res<WeaponDefinitions>,
    mut cues: EventWriter<AnimationCueEvent>,
    mut set: ParamSet<(
        Query<(Entity, &Transform, &Health)>,
        Query<(
            Entity,
            &mut Transform,
            &mut Fighter,
            Option<&mut Mover>,
            Option<&mut CurrentAction>,
            Option<&Health>,
        )>,
    )>,
) {
    let delta = time.delta_secs();

    let candidates: Vec<CandidateSnapshot> = set
        .p0()
        .iter()
        .map(|(entity, transform, health)| CandidateSnapshot {
            entity,
            position: transform.translation,
            alive: !health.is_dead(),
        })
        .collect();

    for (entity, mut transform, mut fighter, mover, action, health) in set.p1().iter_mut() {
        fighter.time_since_last_attack += delta;

        if health.is_some_and(|h| h.is_dead()) {
            continue;
        }
        let Some(target) = fighter.target else {
            continue;
        };

        // A dead or despawned target triggers a bounded-radius retarget
        let target_state = candidates
            .iter()
            .find(|c| c.entity == target && c.alive)
            .map(|c| c.position);
        let target_position = match target_state {
            Some(position) => position,
            None => {
                let replacement = find_new_target_in_range(
                    entity,
                    transform.translation,
                    AUTO_ATTACK_SEARCH_RADIUS,
                    &candidates,
                );
                match replacement {
                    Some((new_target, position)) => {
                        fighter.target = Some(new_target);
                        position
                    }
                    None => {
                        fighter.stop();
                        if let Some(mut action) = action {
                            if action.current() == Some(ActionKind::Attack) {
                                action.clear();
                            }
                        }
                        continue;
                    }
                }
            }
        };

        let weapon = weapons.resolve(fighter.weapon.as_ref());
        let distance = transform.translation.distance(target_position);

        if distance > weapon.range {
            if let Some(mut mover) = mover {
                mover.move_to(target_position, 1.0);
            }
            continue;
        }

        if let Some(mut mover) = mover {
            mover.stop();
        }

        let facing = Vec3::new(
            target_position.x - transform.translation.x,
            0.0,
            target_position.z - transform.translation.z,
        );
        if facing.length_squared() > f32::EPSILON {
            transform.rotation = Quat::from_rotation_arc(Vec3::Z, facing.normalize());
        }

        if fighter.time_since_last_attack >= fighter.time_between_attacks {
            fighter.time_since_last_attack = 0.0;
            let target = fighter.target.unwrap_or(target);
            fighter.pending_impact = Some(PendingImpact {
                target,
                remaining: ATTACK_IMPACT_DELAY,
            });
            cues.send(AnimationCueEvent {
                entity,
                trigger: "attack".to_string(),
            });
        }
    }
}

/// Nearest alive candidate within `radius`, excluding the searcher itself
fn find_new_target_in_range(
    searcher: Entity,
    origin: Vec3,
    radius: f32,
    candidates: &[CandidateSnapshot],
) -> Option<(Entity, Vec3)> {
    candidates
        .iter()
        .filter(|c| c.entity != searcher && c.alive)
        .filter_map(|c| {
            let distance = origin.distance(c.position);
            (distance <= radius).then_some((c.entity, c.position, distance))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(entity, position, _)| (entity, position))
}

/// Land scheduled impacts: compute damage from the attacker's stat block and
/// route it through the weapon's projectile (ranged) or apply it directly
/// (melee). Targets that died or despawned during the windup are skipped.
pub fn resolve_attack_impacts(
    time: Res<Time>,
    weapons: Res<WeaponDefinitions>,
    progression: Res<Progression>,
    mut commands: Commands,
    mut damage_events: EventWriter<DamageEvent>,
    mut fighters: Query<(Entity, &Transform, &mut Fighter, Option<&BaseStats>)>,
    targets: Query<(&Transform, &Health)>,
) {
    let delta = time.delta_secs();

    for (entity, transform, mut fighter, stats) in fighters.iter_mut() {
        let Some(mut impact) = fighter.pending_impact else {
            continue;
        };
        impact.remaining -= delta;
        if impact.remaining > 0.0 {
            fighter.pending_impact = Some(impact);
            continue;
        }
        fighter.pending_impact = None;

        let Ok((target_transform, target_health)) = targets.get(impact.target) else {
            continue;
        };
        if target_health.is_dead() {
            continue;
        }

        let weapon = weapons.resolve(fighter.weapon.as_ref());
        let damage = match stats {
            Some(stats) => stats.stat(&progression, Stat::Damage, weapon.damage_modifiers()),
            None => weapon.damage,
        };

        match &weapon.projectile {
            Some(spec) => {
                let origin = transform.translation + Vec3::Y * CENTER_OF_MASS_LIFT;
                commands.spawn((
                    Transform::from_translation(origin),
                    Projectile::aimed_at_entity(
                        spec,
                        damage,
                        entity,
                        impact.target,
                        target_transform.translation,
                    ),
                ));
            }
            None => {
                damage_events.send(DamageEvent {
                    instigator: entity,
                    target: impact.target,
                    amount: damage,
                    ability_name: None,
                });
            }
        }
    }
}
