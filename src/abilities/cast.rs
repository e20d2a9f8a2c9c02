//! Cast State Machine
//!
//! A cast attempt lives on its own entity as a [`CastContext`]: requested in
//! the Decisions phase, optionally suspended awaiting pointer input, then
//! resolved and effected in the Resolution phase of a single tick.
//!
//! The request gate (mana and cooldown) is checked twice: once at request
//! time so unaffordable casts never pre-empt the current action, and again
//! at resolution, because state may have changed during a pointer suspend.
//! Cost and cooldown commit only at resolution; a cast cancelled any time
//! before that unwinds with zero side effects.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::abilities::config::{AbilityDefinitions, AbilityKey, TargetingSpec};
use crate::abilities::cooldowns::CooldownStore;
use crate::abilities::effects::{start_effect, EffectTarget};
use crate::abilities::filters::{apply_filters, FilterContext};
use crate::abilities::targeting::{
    acquire_targets, CasterSnapshot, TargetSnapshot, TYPICAL_TARGET_COUNT,
};
use crate::combat::actions::{ActionKind, CurrentAction};
use crate::combat::events::{
    ActionRequest, AnimationCueEvent, DamageEvent, HealingEvent, PointerClickEvent,
    RequestedAction,
};
use crate::combat::fighter::Fighter;
use crate::combat::health::Health;
use crate::combat::log::CombatLog;
use crate::combat::movement::Mover;
use crate::combat::pool::Mana;
use crate::combat::Team;

/// Where a cast attempt is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastPhase {
    /// Suspended until a pointer click arrives
    AwaitingPointer,
    /// Targeting complete; resolves this tick
    ReadyToResolve,
    /// Cost committed, effects running; despawns when the last one completes
    Effecting,
}

/// Ephemeral state of one cast attempt.
///
/// Holds the caster by id only; the context never owns the actor's lifetime,
/// and a caster that despawns mid-suspend aborts the cast silently.
#[derive(Component, Debug)]
pub struct CastContext {
    pub ability: AbilityKey,
    pub caster: Entity,
    /// Captured ground point for pointer-driven strategies
    pub point: Option<Vec3>,
    /// Filtered target set, fixed at resolution
    pub targets: SmallVec<[Entity; TYPICAL_TARGET_COUNT]>,
    pub phase: CastPhase,
    /// Outstanding asynchronous effect completions
    pub pending_effects: u32,
    cancelled: bool,
}

impl CastContext {
    pub fn new(ability: AbilityKey, caster: Entity, phase: CastPhase) -> Self {
        Self {
            ability,
            caster,
            point: None,
            targets: SmallVec::new(),
            phase,
            pending_effects: 0,
            cancelled: false,
        }
    }

    /// Flag the cast as cancelled. Monotonic: the flag never resets, and
    /// cancelling twice is a no-op.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Unwind whatever currently occupies the exclusive slot
fn displace_current_action(
    slot: &mut CurrentAction,
    fighter: Option<&mut Fighter>,
    mover: Option<&mut Mover>,
    contexts: &mut Query<&mut CastContext>,
) {
    match slot.clear() {
        Some(ActionKind::Cast(context)) => {
            // Dangling context ids are fine: the cast already finished
            if let Ok(mut context) = contexts.get_mut(context) {
                context.cancel();
            }
        }
        Some(ActionKind::Attack) => {
            if let Some(fighter) = fighter {
                fighter.stop();
            }
        }
        Some(ActionKind::Move) => {
            if let Some(mover) = mover {
                mover.stop();
            }
        }
        None => {}
    }
}

/// The exclusive-action funnel: every cast, attack, move, and cancel request
/// passes through here in arrival order, so pre-emption happens in one place.
///
/// `Cast` is the `Use` entry point of the pipeline: it gates on mana and
/// cooldown (a silent no-op on failure, the previous action keeps running)
/// and spawns the cast context. Re-requesting the kind of action already in
/// the slot updates it in place instead of unwinding it, so an AI repeating
/// its attack order every tick does not reset its own swing timer.
pub fn process_action_requests(
    mut commands: Commands,
    abilities: Res<AbilityDefinitions>,
    mut requests: EventReader<ActionRequest>,
    mut actors: Query<(
        &mut CurrentAction,
        Option<&mut Fighter>,
        Option<&mut Mover>,
        Option<&Mana>,
        Option<&CooldownStore>,
    )>,
    mut contexts: Query<&mut CastContext>,
) {
    for request in requests.read() {
        let Ok((mut slot, mut fighter, mut mover, mana, cooldowns)) =
            actors.get_mut(request.actor)
        else {
            continue;
        };

        match &request.kind {
            RequestedAction::Cast(key) => {
                let Some(def) = abilities.get(key) else {
                    debug!("Cast request for undefined ability {}", key);
                    continue;
                };
                let affordable =
                    def.mana_cost <= 0.0 || mana.is_some_and(|m| m.can_afford(def.mana_cost));
                let ready = cooldowns.map_or(true, |c| c.is_ready(key));
                if !affordable || !ready {
                    debug!("Cast of {} gated (affordable: {}, ready: {})", key, affordable, ready);
                    continue;
                }

                displace_current_action(
                    &mut slot,
                    fighter.as_deref_mut(),
                    mover.as_deref_mut(),
                    &mut contexts,
                );

                let phase = if def.targeting.is_pointer_driven() {
                    CastPhase::AwaitingPointer
                } else {
                    CastPhase::ReadyToResolve
                };
                let context = commands
                    .spawn(CastContext::new(key.clone(), request.actor, phase))
                    .id();
                slot.begin(ActionKind::Cast(context));
            }
            RequestedAction::Attack(target) => {
                let Some(fighter) = fighter.as_deref_mut() else {
                    continue;
                };
                if slot.current() != Some(ActionKind::Attack) {
                    displace_current_action(&mut slot, None, mover.as_deref_mut(), &mut contexts);
                    slot.begin(ActionKind::Attack);
                }
                fighter.attack(*target);
            }
            RequestedAction::MoveTo {
                point,
                speed_fraction,
            } => {
                let Some(mover) = mover.as_deref_mut() else {
                    continue;
                };
                if slot.current() != Some(ActionKind::Move) {
                    displace_current_action(&mut slot, fighter.as_deref_mut(), None, &mut contexts);
                    slot.begin(ActionKind::Move);
                }
                mover.move_to(*point, *speed_fraction);
            }
            RequestedAction::Cancel => {
                displace_current_action(
                    &mut slot,
                    fighter.as_deref_mut(),
                    mover.as_deref_mut(),
                    &mut contexts,
                );
            }
        }
    }
}

/// Deliver pointer clicks to suspended casts.
///
/// Every awaiting context completes its targeting on the click, cancelled
/// ones included: those fall through to resolution, which aborts them at the
/// pre-commit checkpoint. A miss click (no ground hit) completes with no
/// point, which resolves into an empty target set.
pub fn route_pointer_clicks(
    abilities: Res<AbilityDefinitions>,
    mut clicks: EventReader<PointerClickEvent>,
    mut contexts: Query<&mut CastContext>,
) {
    for click in clicks.read() {
        for mut context in contexts.iter_mut() {
            if context.phase != CastPhase::AwaitingPointer {
                continue;
            }
            let ground_offset = abilities
                .get(&context.ability)
                .map(|def| match def.targeting {
                    TargetingSpec::PointOnGround { ground_offset }
                    | TargetingSpec::AreaAroundPoint { ground_offset, .. } => ground_offset,
                    _ => 0.0,
                })
                .unwrap_or(0.0);
            context.point = click.point.map(|p| p + Vec3::Y * ground_offset);
            context.phase = CastPhase::ReadyToResolve;
        }
    }
}

/// Resolve casts whose targeting completed: the commit point of the pipeline.
///
/// Checkpoint order is fixed — cancellation, then re-checked affordability,
/// then spend, cooldown, filter chain, effect fan-out. Everything before the
/// spend unwinds to a perfect no-op.
#[allow(clippy::too_many_arguments)]
pub fn resolve_ready_casts(
    mut commands: Commands,
    abilities: Res<AbilityDefinitions>,
    mut log: ResMut<CombatLog>,
    mut contexts: Query<(Entity, &mut CastContext)>,
    mut casters: Query<(
        &Transform,
        Option<&mut Mana>,
        Option<&mut CooldownStore>,
        Option<&Fighter>,
        Option<&Team>,
        Option<&mut CurrentAction>,
    )>,
    candidates: Query<(Entity, &Transform, &Health, Option<&Team>)>,
    mut damage: EventWriter<DamageEvent>,
    mut healing: EventWriter<HealingEvent>,
    mut cues: EventWriter<AnimationCueEvent>,
) {
    for (context_entity, mut context) in contexts.iter_mut() {
        match context.phase {
            CastPhase::AwaitingPointer => {
                // A suspended cast that was cancelled, or whose caster
                // despawned, will never resolve; reap it now instead of
                // waiting for a click that may never come
                if context.is_cancelled() || casters.get(context.caster).is_err() {
                    commands.entity(context_entity).despawn();
                }
                continue;
            }
            CastPhase::Effecting => continue,
            CastPhase::ReadyToResolve => {}
        }

        let Ok((caster_transform, mana, cooldowns, fighter, team, slot)) =
            casters.get_mut(context.caster)
        else {
            commands.entity(context_entity).despawn();
            continue;
        };

        // Pre-commit cancellation checkpoint: nothing has been charged yet
        if context.is_cancelled() {
            commands.entity(context_entity).despawn();
            if let Some(mut slot) = slot {
                slot.finish_cast(context_entity);
            }
            continue;
        }

        let Some(def) = abilities.get(&context.ability) else {
            commands.entity(context_entity).despawn();
            if let Some(mut slot) = slot {
                slot.finish_cast(context_entity);
            }
            continue;
        };

        // Affordability re-check: mana may have drained during the suspend
        let affordable = def.mana_cost <= 0.0
            || mana.as_ref().is_some_and(|m| m.can_afford(def.mana_cost));
        if !affordable {
            commands.entity(context_entity).despawn();
            if let Some(mut slot) = slot {
                slot.finish_cast(context_entity);
            }
            continue;
        }

        // Commit: from here on, cancellation no longer refunds
        if def.mana_cost > 0.0 {
            if let Some(mut mana) = mana {
                mana.spend(def.mana_cost);
            }
        }
        if let Some(mut cooldowns) = cooldowns {
            cooldowns.start(context.ability.clone(), def.cooldown);
        }
        let caster_name = log.display_name(context.caster);
        let message = format!("{} casts {}", caster_name, def.name);
        log.log_cast(caster_name, def.name.clone(), message);

        let caster_snapshot = CasterSnapshot {
            entity: context.caster,
            position: caster_transform.translation,
            team: team.map(|t| t.0),
            designated_target: fighter.and_then(|f| f.target()),
        };
        let living: Vec<TargetSnapshot> = candidates
            .iter()
            .filter(|(_, _, health, _)| !health.is_dead())
            .map(|(entity, transform, _, team)| TargetSnapshot {
                entity,
                position: transform.translation,
                team: team.map(|t| t.0),
            })
            .collect();

        let acquired = acquire_targets(&def.targeting, &caster_snapshot, context.point, &living);
        let filter_ctx = FilterContext {
            caster: context.caster,
            caster_position: caster_snapshot.position,
            caster_team: caster_snapshot.team,
            point: context.point,
        };
        let filtered = apply_filters(&def.filters, &filter_ctx, acquired);

        context.targets = filtered.iter().map(|t| t.entity).collect();
        context.phase = CastPhase::Effecting;

        // Everything in the filtered set came from the living-candidates
        // snapshot, so it is damageable by construction
        let effect_targets: Vec<EffectTarget> = filtered
            .iter()
            .map(|t| EffectTarget {
                entity: t.entity,
                position: t.position,
                damageable: true,
            })
            .collect();
        let point = context.point;
        let caster_position = caster_snapshot.position;

        for effect in &def.effects {
            start_effect(
                effect,
                context_entity,
                &mut context,
                &def.name,
                caster_position,
                &effect_targets,
                point,
                &mut commands,
                &mut damage,
                &mut healing,
                &mut cues,
            );
        }

        // All effects completed synchronously: the cast is already done
        if context.pending_effects == 0 {
            commands.entity(context_entity).despawn();
            if let Some(mut slot) = slot {
                slot.finish_cast(context_entity);
            }
        }
    }
}
