//! AI Controller
//!
//! Patrol / suspicion / chase behavior for non-player actors. Controllers
//! pick the nearest living hostile as their quarry, chase and attack it when
//! aggravated, linger in suspicion after losing it, and otherwise walk their
//! patrol route (or hold their guard position). Taking a hit aggravates a
//! controller, and an aggravated controller shouts nearby allies into the
//! fight.
//!
//! Controllers never mutate other actors directly: every decision leaves as
//! an [`ActionRequest`] and goes through the exclusive-action funnel.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::combat::events::{ActionRequest, AggroActivationEvent, DamageEvent, RequestedAction};
use crate::combat::fighter::{can_attack, Fighter};
use crate::combat::health::Health;
use crate::combat::movement::Mover;
use crate::combat::weapons::WeaponDefinitions;
use crate::combat::{teams_hostile, Team};
use crate::constants::{
    AI_AGGRO_COOLDOWN, AI_CHASE_DISTANCE, AI_PATROL_SPEED_FRACTION, AI_SHOUT_DISTANCE,
    AI_SUSPICION_TIME, AI_WAYPOINT_DWELL_TIME, AI_WAYPOINT_TOLERANCE,
};

/// A cyclic list of patrol waypoints.
#[derive(Component, Debug, Clone)]
pub struct PatrolRoute {
    pub waypoints: Vec<Vec3>,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints }
    }

    pub fn waypoint(&self, index: usize) -> Option<Vec3> {
        self.waypoints.get(index).copied()
    }

    pub fn next_index(&self, index: usize) -> usize {
        if self.waypoints.is_empty() {
            0
        } else {
            (index + 1) % self.waypoints.len()
        }
    }
}

/// Per-actor chase/patrol state.
#[derive(Component, Debug)]
pub struct AiController {
    /// Disabled controllers stand still until their aggro group activates
    pub active: bool,
    pub chase_distance: f32,
    pub suspicion_time: f32,
    pub aggro_cooldown: f32,
    pub waypoint_tolerance: f32,
    pub dwell_time: f32,
    pub patrol_speed_fraction: f32,
    pub shout_distance: f32,
    /// Where the actor returns when it has no route and nothing to chase
    pub guard_position: Vec3,
    time_since_saw_quarry: f32,
    time_at_waypoint: f32,
    time_since_aggravated: f32,
    current_waypoint: usize,
}

impl AiController {
    pub fn new(guard_position: Vec3) -> Self {
        Self {
            active: true,
            chase_distance: AI_CHASE_DISTANCE,
            suspicion_time: AI_SUSPICION_TIME,
            aggro_cooldown: AI_AGGRO_COOLDOWN,
            waypoint_tolerance: AI_WAYPOINT_TOLERANCE,
            dwell_time: AI_WAYPOINT_DWELL_TIME,
            patrol_speed_fraction: AI_PATROL_SPEED_FRACTION,
            shout_distance: AI_SHOUT_DISTANCE,
            guard_position,
            time_since_saw_quarry: f32::MAX,
            time_at_waypoint: 0.0,
            time_since_aggravated: f32::MAX,
            current_waypoint: 0,
        }
    }

    pub fn inactive(guard_position: Vec3) -> Self {
        Self {
            active: false,
            ..Self::new(guard_position)
        }
    }

    /// Force the controller into its aggravated window
    pub fn aggravate(&mut self) {
        self.time_since_aggravated = 0.0;
    }

    fn is_aggravated(&self) -> bool {
        self.time_since_aggravated < self.aggro_cooldown
    }

    fn advance_timers(&mut self, delta: f32) {
        // Saturating adds keep the "never seen" sentinel from wrapping
        self.time_since_saw_quarry = (self.time_since_saw_quarry + delta).min(f32::MAX);
        self.time_at_waypoint += delta;
        self.time_since_aggravated = (self.time_since_aggravated + delta).min(f32::MAX);
    }
}

/// Members whose controllers switch on and off together.
#[derive(Component, Debug)]
pub struct AggroGroup {
    pub members: Vec<Entity>,
}

/// Enable or disable every controller in an activated group
pub fn process_aggro_activation(
    mut events: EventReader<AggroActivationEvent>,
    groups: Query<&AggroGroup>,
    mut controllers: Query<&mut AiController>,
) {
    for event in events.read() {
        let Ok(group) = groups.get(event.group) else {
            continue;
        };
        for member in &group.members {
            if let Ok(mut controller) = controllers.get_mut(*member) {
                controller.active = event.active;
            }
        }
    }
}

struct HostileSnapshot {
    entity: Entity,
    position: Vec3,
    team: Option<u8>,
}

/// Per-tick AI decisions: chase, suspicion, or patrol.
///
/// Candidate positions are snapshotted up front so every controller decides
/// against the same view of the encounter, AI-controlled quarries included.
pub fn ai_decisions(
    time: Res<Time>,
    weapons: Res<WeaponDefinitions>,
    mut requests: EventWriter<ActionRequest>,
    mut recent_damage: EventReader<DamageEvent>,
    mut set: ParamSet<(
        Query<(Entity, &Transform, &Health, Option<&Team>)>,
        Query<(
            Entity,
            &Transform,
            &mut AiController,
            Option<&PatrolRoute>,
            &Fighter,
            Option<&Mover>,
            Option<&Team>,
            &Health,
        )>,
    )>,
) {
    let delta = time.delta_secs();

    // Hits from the previous resolution phase aggravate their victims
    let hit_victims: HashSet<Entity> = recent_damage.read().map(|e| e.target).collect();

    let candidates: Vec<HostileSnapshot> = set
        .p0()
        .iter()
        .filter(|(_, _, health, _)| !health.is_dead())
        .map(|(entity, transform, _, team)| HostileSnapshot {
            entity,
            position: transform.translation,
            team: team.map(|t| t.0),
        })
        .collect();

    let mut shouts: Vec<(Entity, Option<u8>, Vec3)> = Vec::new();

    for (entity, transform, mut controller, route, fighter, mover, team, health) in
        set.p1().iter_mut()
    {
        controller.advance_timers(delta);
        if hit_victims.contains(&entity) {
            controller.aggravate();
        }
        if !controller.active || health.is_dead() {
            continue;
        }

        let own_team = team.map(|t| t.0);
        let position = transform.translation;

        // Nearest living hostile; teamless actors count everyone as hostile
        let quarry = candidates
            .iter()
            .filter(|h| h.entity != entity && teams_hostile(h.team, own_team))
            .min_by(|a, b| {
                position
                    .distance(a.position)
                    .total_cmp(&position.distance(b.position))
            });

        let weapon_range = weapons.resolve(fighter.weapon.as_ref()).range;

        let pursued = quarry.filter(|q| {
            let near = position.distance(q.position) <= controller.chase_distance;
            (near || controller.is_aggravated())
                && can_attack(position, weapon_range, mover, Some(q.position), true)
        });

        if let Some(quarry) = pursued {
            controller.time_since_saw_quarry = 0.0;
            controller.aggravate();
            if fighter.target() != Some(quarry.entity) {
                requests.send(ActionRequest {
                    actor: entity,
                    kind: RequestedAction::Attack(quarry.entity),
                });
            }
            shouts.push((entity, own_team, position));
        } else if controller.time_since_saw_quarry < controller.suspicion_time {
            // Stand alert where the quarry was last seen
            if fighter.is_attacking() || mover.is_some_and(|m| m.is_moving()) {
                requests.send(ActionRequest {
                    actor: entity,
                    kind: RequestedAction::Cancel,
                });
            }
        } else {
            patrol(
                entity,
                position,
                &mut controller,
                route,
                mover,
                &mut requests,
            );
        }
    }

    // One-level shout: chasing controllers pull same-team allies within
    // earshot into their aggravated window
    for (shouter, shout_team, shout_position) in shouts {
        for (entity, transform, mut controller, _, _, _, team, health) in set.p1().iter_mut() {
            if entity == shouter || health.is_dead() || !controller.active {
                continue;
            }
            if teams_hostile(team.map(|t| t.0), shout_team) {
                continue;
            }
            if transform.translation.distance(shout_position) <= controller.shout_distance {
                controller.aggravate();
            }
        }
    }
}

fn patrol(
    entity: Entity,
    position: Vec3,
    controller: &mut AiController,
    route: Option<&PatrolRoute>,
    mover: Option<&Mover>,
    requests: &mut EventWriter<ActionRequest>,
) {
    let destination = match route {
        Some(route) => {
            let Some(waypoint) = route.waypoint(controller.current_waypoint) else {
                return;
            };
            if position.distance(waypoint) <= controller.waypoint_tolerance {
                if controller.time_at_waypoint < controller.dwell_time {
                    // Dwell at the waypoint before moving on
                    return;
                }
                controller.current_waypoint = route.next_index(controller.current_waypoint);
                controller.time_at_waypoint = 0.0;
                match route.waypoint(controller.current_waypoint) {
                    Some(next) => next,
                    None => return,
                }
            } else {
                waypoint
            }
        }
        None => {
            if position.distance(controller.guard_position) <= controller.waypoint_tolerance {
                return;
            }
            controller.guard_position
        }
    };

    let already_headed_there = mover
        .and_then(|m| m.destination())
        .is_some_and(|d| d.distance(destination) < f32::EPSILON);
    if !already_headed_there {
        requests.send(ActionRequest {
            actor: entity,
            kind: RequestedAction::MoveTo {
                point: destination,
                speed_fraction: controller.patrol_speed_fraction,
            },
        });
    }
}
