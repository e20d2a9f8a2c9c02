//! Projectiles
//!
//! Kinematic movers spawned by ranged weapons and ability effects. Homing
//! projectiles re-aim at their target's center of mass every tick; the rest
//! fly at the point they were aimed at when launched. A projectile damages
//! exactly once, lingers briefly after impact, and despawns on a lifetime
//! cap if it never connects.

use bevy::prelude::*;

use crate::abilities::config::ProjectileSpec;
use crate::combat::events::DamageEvent;
use crate::combat::health::Health;
use crate::constants::CENTER_OF_MASS_LIFT;

/// An in-flight projectile.
#[derive(Component, Debug)]
pub struct Projectile {
    pub speed: f32,
    pub homing: bool,
    pub damage: f32,
    /// Actor credited with the damage
    pub instigator: Entity,
    /// Intended target; `None` for point-aimed projectiles, which hit the
    /// first damageable actor they touch
    pub target: Option<Entity>,
    pub hit_radius: f32,
    pub max_lifetime: f32,
    pub life_after_impact: f32,
    /// Ability name carried into the damage event, `None` for weapon shots
    pub label: Option<String>,
    aim_point: Vec3,
    age: f32,
    impacted_for: Option<f32>,
}

impl Projectile {
    /// Launch at a live target, capturing its center of mass at launch time.
    /// Homing projectiles re-aim every tick; the rest fly at this captured
    /// point even if the target moves.
    pub fn aimed_at_entity(
        spec: &ProjectileSpec,
        damage: f32,
        instigator: Entity,
        target: Entity,
        target_position: Vec3,
    ) -> Self {
        Self {
            speed: spec.speed,
            homing: spec.homing,
            damage,
            instigator,
            target: Some(target),
            hit_radius: spec.hit_radius,
            max_lifetime: spec.max_lifetime,
            life_after_impact: spec.life_after_impact,
            label: None,
            aim_point: target_position + Vec3::Y * CENTER_OF_MASS_LIFT,
            age: 0.0,
            impacted_for: None,
        }
    }

    /// Launch at a fixed point; hits the first damageable actor in its path
    pub fn aimed_at_point(
        spec: &ProjectileSpec,
        damage: f32,
        instigator: Entity,
        point: Vec3,
    ) -> Self {
        Self {
            speed: spec.speed,
            homing: false,
            damage,
            instigator,
            target: None,
            hit_radius: spec.hit_radius,
            max_lifetime: spec.max_lifetime,
            life_after_impact: spec.life_after_impact,
            label: None,
            aim_point: point,
            age: 0.0,
            impacted_for: None,
        }
    }

    pub fn with_label(mut self, label: String) -> Self {
        self.label = Some(label);
        self
    }

    pub fn has_impacted(&self) -> bool {
        self.impacted_for.is_some()
    }

    fn mark_impacted(&mut self) {
        self.impacted_for = Some(0.0);
        self.speed = 0.0;
    }
}

/// Translate projectiles toward their aim point, re-aiming homing ones
pub fn move_projectiles(
    time: Res<Time>,
    mut projectiles: Query<(&mut Projectile, &mut Transform)>,
    targets: Query<&Transform, (With<Health>, Without<Projectile>)>,
) {
    let delta = time.delta_secs();

    for (mut projectile, mut transform) in projectiles.iter_mut() {
        if projectile.has_impacted() {
            continue;
        }

        if projectile.homing {
            if let Some(target) = projectile.target {
                if let Ok(target_transform) = targets.get(target) {
                    projectile.aim_point =
                        target_transform.translation + Vec3::Y * CENTER_OF_MASS_LIFT;
                }
            }
        }

        let direction = (projectile.aim_point - transform.translation).normalize_or_zero();
        if direction != Vec3::ZERO {
            transform.translation += direction * projectile.speed * delta;
            transform.rotation = Quat::from_rotation_arc(Vec3::Z, direction);
        }
    }
}

/// Detect first contact, apply damage once, and despawn on the lifetime caps
pub fn process_projectile_hits(
    time: Res<Time>,
    mut commands: Commands,
    mut damage_events: EventWriter<DamageEvent>,
    mut projectiles: Query<(Entity, &mut Projectile, &Transform)>,
    targets: Query<(Entity, &Transform, &Health), Without<Projectile>>,
) {
    let delta = time.delta_secs();

    for (entity, mut projectile, transform) in projectiles.iter_mut() {
        if let Some(since_impact) = projectile.impacted_for {
            let since_impact = since_impact + delta;
            if since_impact >= projectile.life_after_impact {
                commands.entity(entity).despawn();
            } else {
                projectile.impacted_for = Some(since_impact);
            }
            continue;
        }

        projectile.age += delta;
        if projectile.age >= projectile.max_lifetime {
            commands.entity(entity).despawn();
            continue;
        }

        let hit = match projectile.target {
            Some(target) => match targets.get(target) {
                Ok((_, target_transform, health)) if !health.is_dead() => {
                    let center = target_transform.translation + Vec3::Y * CENTER_OF_MASS_LIFT;
                    (transform.translation.distance(center) <= projectile.hit_radius)
                        .then_some(target)
                }
                // The intended target died or despawned in flight
                _ => {
                    commands.entity(entity).despawn();
                    continue;
                }
            },
            None => targets
                .iter()
                .filter(|(candidate, _, health)| {
                    *candidate != projectile.instigator && !health.is_dead()
                })
                .find(|(_, target_transform, _)| {
                    let center = target_transform.translation + Vec3::Y * CENTER_OF_MASS_LIFT;
                    transform.translation.distance(center) <= projectile.hit_radius
                })
                .map(|(candidate, _, _)| candidate),
        };

        if let Some(target) = hit {
            damage_events.send(DamageEvent {
                instigator: projectile.instigator,
                target,
                amount: projectile.damage,
                ability_name: projectile.label.clone(),
            });
            projectile.mark_impacted();
        }
    }
}
