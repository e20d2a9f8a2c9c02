//! Effect Fan-Out
//!
//! Effects are the consequences of a committed cast. Every started effect
//! signals completion exactly once: most complete synchronously inside
//! [`start_effect`], while `Delayed` parks its nested effects on a timer
//! entity and completes when the timer fires. The cast context counts
//! outstanding asynchronous completions and tears itself down at zero.
//!
//! Cancellation is cooperative: a delayed effect looks at the context's
//! cancelled flag once, at the moment its delay elapses, and never earlier.

use bevy::prelude::*;

use crate::abilities::cast::{CastContext, CastPhase};
use crate::abilities::config::{AbilityDefinitions, EffectSpec};
use crate::combat::actions::CurrentAction;
use crate::combat::events::{AnimationCueEvent, DamageEvent, HealingEvent};
use crate::combat::health::Health;
use crate::combat::projectiles::Projectile;
use crate::constants::CENTER_OF_MASS_LIFT;

/// One resolved target as the effect layer sees it.
#[derive(Clone, Copy, Debug)]
pub struct EffectTarget {
    pub entity: Entity,
    pub position: Vec3,
    /// Whether the target still carries a `Health` component
    pub damageable: bool,
}

/// Marker entity spawned at a targeted point. Persists forever when spawned
/// with a negative lifetime.
#[derive(Component, Debug)]
pub struct PointEffect {
    remaining: Option<f32>,
}

impl PointEffect {
    pub fn new(lifetime: f32) -> Self {
        Self {
            remaining: (lifetime >= 0.0).then_some(lifetime),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.remaining.is_none()
    }
}

/// Nested effects waiting out their delay before starting.
#[derive(Component, Debug)]
pub struct DelayedEffect {
    /// The cast context entity this effect belongs to
    pub context: Entity,
    /// Whether to observe the cancellation flag when the delay elapses
    pub abort_if_cancelled: bool,
    pub effects: Vec<EffectSpec>,
    timer: Timer,
}

/// Start one effect against the filtered targets.
///
/// Synchronous variants finish before returning; `Delayed` bumps the
/// context's pending counter and hands off to [`run_delayed_effects`].
/// Missing collaborators (no targets, no point, no health) skip that
/// consequence rather than failing the cast.
#[allow(clippy::too_many_arguments)]
pub fn start_effect(
    effect: &EffectSpec,
    cast_entity: Entity,
    context: &mut CastContext,
    ability_name: &str,
    caster_position: Vec3,
    targets: &[EffectTarget],
    point: Option<Vec3>,
    commands: &mut Commands,
    damage: &mut EventWriter<DamageEvent>,
    healing: &mut EventWriter<HealingEvent>,
    cues: &mut EventWriter<AnimationCueEvent>,
) {
    match effect {
        EffectSpec::HealthChange { amount } => {
            for target in targets.iter().filter(|t| t.damageable) {
                if *amount < 0.0 {
                    damage.send(DamageEvent {
                        instigator: context.caster,
                        target: target.entity,
                        amount: -amount,
                        ability_name: Some(ability_name.to_string()),
                    });
                } else if *amount > 0.0 {
                    healing.send(HealingEvent {
                        source: context.caster,
                        target: target.entity,
                        amount: *amount,
                        ability_name: Some(ability_name.to_string()),
                    });
                }
            }
        }
        EffectSpec::SpawnProjectile {
            damage: projectile_damage,
            projectile,
        } => {
            let origin = caster_position + Vec3::Y * CENTER_OF_MASS_LIFT;
            let mut launched = false;
            for target in targets.iter().filter(|t| t.damageable) {
                commands.spawn((
                    Transform::from_translation(origin),
                    Projectile::aimed_at_entity(
                        projectile,
                        *projectile_damage,
                        context.caster,
                        target.entity,
                        target.position,
                    )
                    .with_label(ability_name.to_string()),
                ));
                launched = true;
            }
            // Point-aimed fallback when the filtered set came up empty
            if !launched {
                if let Some(point) = point {
                    commands.spawn((
                        Transform::from_translation(origin),
                        Projectile::aimed_at_point(
                            projectile,
                            *projectile_damage,
                            context.caster,
                            point,
                        )
                        .with_label(ability_name.to_string()),
                    ));
                }
            }
        }
        EffectSpec::SpawnPointEffect { lifetime } => {
            let position = point.or_else(|| targets.first().map(|t| t.position));
            if let Some(position) = position {
                commands.spawn((
                    Transform::from_translation(position),
                    PointEffect::new(*lifetime),
                ));
            }
        }
        EffectSpec::Delayed {
            delay,
            abort_if_cancelled,
            effects,
        } => {
            context.pending_effects += 1;
            commands.spawn(DelayedEffect {
                context: cast_entity,
                abort_if_cancelled: *abort_if_cancelled,
                effects: effects.clone(),
                timer: Timer::from_seconds(*delay, TimerMode::Once),
            });
        }
        EffectSpec::AnimationCue { trigger } => {
            cues.send(AnimationCueEvent {
                entity: context.caster,
                trigger: trigger.clone(),
            });
        }
    }
}

/// Fire delayed effects whose timers elapsed this tick.
///
/// The cancellation flag is observed here and only here, making the fire
/// instant the one abort checkpoint of a delayed effect. Either way the
/// effect completes, decrementing the context's pending counter.
#[allow(clippy::too_many_arguments)]
pub fn run_delayed_effects(
    time: Res<Time>,
    mut commands: Commands,
    abilities: Res<AbilityDefinitions>,
    mut delayed: Query<(Entity, &mut DelayedEffect)>,
    mut contexts: Query<&mut CastContext>,
    mut casters: Query<(&Transform, Option<&mut CurrentAction>)>,
    target_info: Query<(&Transform, Option<&Health>)>,
    mut damage: EventWriter<DamageEvent>,
    mut healing: EventWriter<HealingEvent>,
    mut cues: EventWriter<AnimationCueEvent>,
) {
    for (entity, mut effect) in delayed.iter_mut() {
        if !effect.timer.tick(time.delta()).just_finished() {
            continue;
        }
        commands.entity(entity).despawn();

        let Ok(mut context) = contexts.get_mut(effect.context) else {
            continue;
        };

        // Abort checkpoint: cancellation after the cast committed only
        // suppresses effects that have not started yet
        let proceed = !(effect.abort_if_cancelled && context.is_cancelled());
        if proceed {
            let ability_name = abilities
                .get(&context.ability)
                .map(|def| def.name.clone())
                .unwrap_or_else(|| context.ability.to_string());
            let caster_position = casters
                .get(context.caster)
                .map(|(transform, _)| transform.translation)
                .unwrap_or_default();
            // Refresh target views; despawned targets drop out silently
            let targets: Vec<EffectTarget> = context
                .targets
                .iter()
                .filter_map(|target| {
                    target_info
                        .get(*target)
                        .ok()
                        .map(|(transform, health)| EffectTarget {
                            entity: *target,
                            position: transform.translation,
                            damageable: health.is_some(),
                        })
                })
                .collect();
            let point = context.point;

            for nested in &effect.effects {
                start_effect(
                    nested,
                    effect.context,
                    &mut context,
                    &ability_name,
                    caster_position,
                    &targets,
                    point,
                    &mut commands,
                    &mut damage,
                    &mut healing,
                    &mut cues,
                );
            }
        }

        context.pending_effects -= 1;
        if context.phase == CastPhase::Effecting && context.pending_effects == 0 {
            commands.entity(effect.context).despawn();
            if let Ok((_, Some(mut slot))) = casters.get_mut(context.caster) {
                slot.finish_cast(effect.context);
            }
        }
    }
}

/// Expire point-effect markers whose lifetime elapsed
pub fn tick_point_effects(
    time: Res<Time>,
    mut commands: Commands,
    mut effects: Query<(Entity, &mut PointEffect)>,
) {
    let delta = time.delta_secs();
    for (entity, mut effect) in effects.iter_mut() {
        if let Some(remaining) = effect.remaining.as_mut() {
            *remaining -= delta;
            if *remaining <= 0.0 {
                commands.entity(entity).despawn();
            }
        }
    }
}
