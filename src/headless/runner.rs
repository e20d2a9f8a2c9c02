//! Headless encounter execution
//!
//! Runs a scenario to completion without a window and reports the result.
//!
//! The loop advances a fixed 60 Hz tick by stepping the `Time` resource
//! manually instead of reading the wall clock, so two runs of the same
//! scenario with the same seed replay tick for tick.

use bevy::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use crate::abilities::cooldowns::CooldownStore;
use crate::abilities::{AbilityConfigPlugin, AbilityKey};
use crate::combat::actions::CurrentAction;
use crate::combat::ai::{AiController, PatrolRoute};
use crate::combat::events::{ActionRequest, PointerClickEvent, RequestedAction};
use crate::combat::fighter::Fighter;
use crate::combat::health::Health;
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::combat::movement::Mover;
use crate::combat::pool::Mana;
use crate::combat::weapons::{WeaponConfigPlugin, WeaponKey};
use crate::combat::{ActorName, CombatPlugin, GameRng, Team};
use crate::constants::DEFAULT_ATTACK_INTERVAL;
use crate::stats::{BaseStats, Experience, Progression, ProgressionPlugin, Stat, StatModifiers};

use super::config::{ActorConfig, ScenarioConfig, ScriptAction};

/// Fixed simulation step of the headless loop
pub const TICK_SECONDS: f32 = 1.0 / 60.0;

/// How many combat log entries the report keeps
const LOG_TAIL_LENGTH: usize = 25;

/// How a completed encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EncounterOutcome {
    /// One team eliminated every hostile team
    TeamVictory(u8),
    /// Timeout, mutual elimination, or a scenario with nothing to win
    Draw,
}

/// Per-actor statistics at encounter end.
#[derive(Debug, Clone, Serialize)]
pub struct ActorReport {
    pub name: String,
    pub team: u8,
    pub class: String,
    pub level: u32,
    pub survived: bool,
    pub final_health: f32,
    pub max_health: f32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub healing_done: f32,
    pub killing_blows: usize,
}

/// Result of a completed headless encounter.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterReport {
    pub outcome: EncounterOutcome,
    /// Simulated encounter time in seconds
    pub duration: f32,
    /// Seed the encounter ran with, if deterministic
    pub seed: Option<u64>,
    pub actors: Vec<ActorReport>,
    /// Tail of the combat log, formatted for reading
    pub log_tail: Vec<String>,
}

impl EncounterReport {
    /// The winning team, if any
    pub fn winning_team(&self) -> Option<u8> {
        match self.outcome {
            EncounterOutcome::TeamVictory(team) => Some(team),
            EncounterOutcome::Draw => None,
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize report: {}", e))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write report: {}", e))?;
        Ok(())
    }
}

/// Run a scenario to completion and build its report.
///
/// Loads the ability, weapon, and progression tables from `assets/config/`,
/// so the working directory must be the project root.
pub fn run_scenario(config: &ScenarioConfig) -> Result<EncounterReport, String> {
    config.validate()?;

    let mut app = App::new();
    app.add_plugins(TransformPlugin)
        .init_resource::<Time>()
        .add_plugins((
            AbilityConfigPlugin,
            WeaponConfigPlugin,
            ProgressionPlugin,
            CombatPlugin,
        ));

    if let Some(seed) = config.seed {
        app.insert_resource(GameRng::from_seed(seed));
    }

    let world = app.world_mut();
    let mut entities: HashMap<String, Entity> = HashMap::new();
    for actor in &config.actors {
        let entity = spawn_actor(world, actor);
        entities.insert(actor.name.clone(), entity);
    }
    world
        .resource_mut::<CombatLog>()
        .log(CombatLogEventType::EncounterEvent, "Encounter started".to_string());

    // Script entries sorted by time; ties keep file order
    let mut script: Vec<(f32, &ScriptAction)> =
        config.script.iter().map(|s| (s.at, &s.action)).collect();
    script.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut next_scripted = 0;

    let hostile_teams = config
        .actors
        .iter()
        .map(|a| a.team)
        .collect::<HashSet<u8>>()
        .len()
        >= 2;

    let tick = Duration::from_secs_f32(TICK_SECONDS);
    let max_ticks = (config.max_duration / TICK_SECONDS).ceil() as u64;

    let mut outcome = EncounterOutcome::Draw;
    let mut elapsed = 0.0;

    for tick_index in 0..max_ticks {
        elapsed = tick_index as f32 * TICK_SECONDS;

        while next_scripted < script.len() && script[next_scripted].0 <= elapsed {
            inject_scripted_action(app.world_mut(), &entities, script[next_scripted].1);
            next_scripted += 1;
        }

        app.world_mut().resource_mut::<Time>().advance_by(tick);
        app.update();
        elapsed += TICK_SECONDS;

        if hostile_teams {
            let alive = alive_teams(app.world_mut());
            if alive.len() <= 1 {
                outcome = match alive.into_iter().next() {
                    Some(team) => EncounterOutcome::TeamVictory(team),
                    None => EncounterOutcome::Draw,
                };
                break;
            }
        }
    }

    let end_message = match outcome {
        EncounterOutcome::TeamVictory(team) => {
            format!("Encounter ended: team {} stands alone", team)
        }
        EncounterOutcome::Draw => "Encounter ended in a draw".to_string(),
    };
    app.world_mut()
        .resource_mut::<CombatLog>()
        .log(CombatLogEventType::EncounterEvent, end_message);

    Ok(build_report(
        app.world_mut(),
        config,
        &entities,
        outcome,
        elapsed,
    ))
}

/// Spawn one scenario actor with stats from the progression table
fn spawn_actor(world: &mut World, actor: &ActorConfig) -> Entity {
    let (max_health, max_mana, mana_regen) = {
        let progression = world.resource::<Progression>();
        let mut stats = BaseStats::new(actor.class, actor.level);
        if actor.player_controlled {
            stats = stats.with_modifiers();
        }
        (
            stats.stat(progression, Stat::Health, StatModifiers::none()),
            stats.stat(progression, Stat::Mana, StatModifiers::none()),
            stats.stat(progression, Stat::ManaRegen, StatModifiers::none()),
        )
    };

    // Stagger first swings so identically-specced fighters do not attack in
    // lockstep (still deterministic under a seeded run)
    let stagger = world
        .resource_mut::<GameRng>()
        .random_range(0.0, DEFAULT_ATTACK_INTERVAL);

    let position = Vec3::from_array(actor.position);
    let mut base_stats = BaseStats::new(actor.class, actor.level);
    if actor.player_controlled {
        base_stats = base_stats.with_modifiers();
    }
    let mut fighter = match &actor.weapon {
        Some(weapon) => Fighter::with_weapon(WeaponKey::from(weapon.clone())),
        None => Fighter::default(),
    };
    fighter.set_attack_timer(stagger);

    let entity = world
        .spawn((
            Transform::from_translation(position),
            ActorName(actor.name.clone()),
            Team(actor.team),
            base_stats,
            Health::new(max_health),
            fighter,
            CurrentAction::default(),
            CooldownStore::default(),
            Mover::default(),
        ))
        .id();

    if max_mana > 0.0 {
        world
            .entity_mut(entity)
            .insert(Mana::with_regen(max_mana, mana_regen));
    }
    if actor.player_controlled {
        world.entity_mut(entity).insert(Experience::default());
    }
    if let Some(ai) = &actor.ai {
        let controller = if ai.active {
            AiController::new(position)
        } else {
            AiController::inactive(position)
        };
        world.entity_mut(entity).insert(controller);
        if !ai.patrol.is_empty() {
            let waypoints = ai.patrol.iter().copied().map(Vec3::from_array).collect();
            world.entity_mut(entity).insert(PatrolRoute::new(waypoints));
        }
    }

    world
        .resource_mut::<CombatLog>()
        .register_actor(entity, actor.name.clone());

    entity
}

/// Translate one scripted action into the events the simulation consumes
fn inject_scripted_action(
    world: &mut World,
    entities: &HashMap<String, Entity>,
    action: &ScriptAction,
) {
    match action {
        ScriptAction::Cast { caster, ability } => {
            if let Some(&actor) = entities.get(caster) {
                world.send_event(ActionRequest {
                    actor,
                    kind: RequestedAction::Cast(AbilityKey::from(ability.clone())),
                });
            }
        }
        ScriptAction::PointerClick { point } => {
            world.send_event(PointerClickEvent {
                point: point.map(Vec3::from_array),
            });
        }
        ScriptAction::Attack { attacker, target } => {
            if let (Some(&actor), Some(&target)) = (entities.get(attacker), entities.get(target)) {
                world.send_event(ActionRequest {
                    actor,
                    kind: RequestedAction::Attack(target),
                });
            }
        }
        ScriptAction::CancelAction { actor } => {
            if let Some(&actor) = entities.get(actor) {
                world.send_event(ActionRequest {
                    actor,
                    kind: RequestedAction::Cancel,
                });
            }
        }
    }
}

/// Teams with at least one living member
fn alive_teams(world: &mut World) -> HashSet<u8> {
    let mut query = world.query::<(&Team, &Health)>();
    query
        .iter(world)
        .filter(|(_, health)| !health.is_dead())
        .map(|(team, _)| team.0)
        .collect()
}

fn build_report(
    world: &mut World,
    config: &ScenarioConfig,
    entities: &HashMap<String, Entity>,
    outcome: EncounterOutcome,
    duration: f32,
) -> EncounterReport {
    let mut actors = Vec::with_capacity(config.actors.len());
    {
        let mut health_query = world.query::<(&Health, &BaseStats)>();
        for actor in &config.actors {
            let (final_health, max_health, level, survived) = entities
                .get(&actor.name)
                .and_then(|&entity| health_query.get(world, entity).ok())
                .map(|(health, stats)| {
                    (
                        health.current(),
                        health.max(),
                        stats.current_level,
                        !health.is_dead(),
                    )
                })
                .unwrap_or((0.0, 0.0, actor.level, false));

            actors.push(ActorReport {
                name: actor.name.clone(),
                team: actor.team,
                class: actor.class.name().to_string(),
                level,
                survived,
                final_health,
                max_health,
                damage_dealt: 0.0,
                damage_taken: 0.0,
                healing_done: 0.0,
                killing_blows: 0,
            });
        }
    }

    let log = world.resource::<CombatLog>();
    for report in &mut actors {
        report.damage_dealt = log.total_damage_dealt(&report.name);
        report.damage_taken = log.total_damage_taken(&report.name);
        report.healing_done = log.total_healing_done(&report.name);
        report.killing_blows = log.killing_blows(&report.name);
    }

    let log_tail = log
        .recent(LOG_TAIL_LENGTH)
        .into_iter()
        .map(|entry| format!("[{:7.2}s] {}", entry.timestamp, entry.message))
        .collect();

    EncounterReport {
        outcome,
        duration,
        seed: config.seed,
        actors,
        log_tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_winning_team() {
        let report = EncounterReport {
            outcome: EncounterOutcome::TeamVictory(2),
            duration: 12.0,
            seed: Some(7),
            actors: Vec::new(),
            log_tail: Vec::new(),
        };
        assert_eq!(report.winning_team(), Some(2));

        let draw = EncounterReport {
            outcome: EncounterOutcome::Draw,
            ..report
        };
        assert_eq!(draw.winning_team(), None);
    }
}
