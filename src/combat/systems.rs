//! Simulation Phases
//!
//! Every gameplay system runs in one of three ordered phases per tick:
//!
//! 1. **Upkeep**: clocks. Log time, cooldowns, mana regeneration, point
//!    effect lifetimes. Nothing later in the tick mutates these again.
//! 2. **Decisions**: intents. AI, the exclusive-action funnel, pointer
//!    routing, fighter swing scheduling, pickups, movement.
//! 3. **Resolution**: consequences. Cast resolution, delayed effects,
//!    attack impacts, projectiles, damage and healing application, deaths,
//!    leveling.
//!
//! Hosts add their own systems relative to these sets; the headless runner
//! checks for encounter end after `SimulationPhase::Resolution`.

use bevy::prelude::*;

use crate::abilities::cast::{process_action_requests, resolve_ready_casts, route_pointer_clicks};
use crate::abilities::cooldowns::tick_cooldowns;
use crate::abilities::effects::{run_delayed_effects, tick_point_effects};
use crate::combat::ai::{ai_decisions, process_aggro_activation};
use crate::combat::fighter::{fighter_auto_attack, resolve_attack_impacts};
use crate::combat::health::{
    apply_damage_events, apply_healing_events, process_deaths, restore_health_on_level_up,
};
use crate::combat::log::advance_log_time;
use crate::combat::movement::apply_movement;
use crate::combat::pool::{regenerate_mana, restore_mana_on_level_up};
use crate::combat::projectiles::{move_projectiles, process_projectile_hits};
use crate::combat::weapons::update_pickups;
use crate::stats::recalculate_levels;

/// Labels for the three ordered phases of a simulation tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationPhase {
    /// Clocks and regeneration
    Upkeep,
    /// AI and action intents
    Decisions,
    /// Casts, impacts, damage, deaths
    Resolution,
}

/// Order the simulation phases within `Update`.
///
/// Call once during app setup, before adding simulation systems.
pub fn configure_simulation_phases(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SimulationPhase::Upkeep,
            SimulationPhase::Decisions,
            SimulationPhase::Resolution,
        )
            .chain(),
    );
}

/// Add the core simulation systems in their phase order.
///
/// Requires `AbilityDefinitions`, `WeaponDefinitions`, and `Progression`
/// resources to exist before the first update; the config plugins provide
/// them, or a test can insert hand-built tables.
pub fn add_core_simulation_systems(app: &mut App) {
    app.add_systems(
        Update,
        (
            advance_log_time,
            tick_cooldowns,
            regenerate_mana,
            tick_point_effects,
        )
            .chain()
            .in_set(SimulationPhase::Upkeep),
    );

    app.add_systems(
        Update,
        (
            process_aggro_activation,
            ai_decisions,
            process_action_requests,
            route_pointer_clicks,
            fighter_auto_attack,
            update_pickups,
            apply_movement,
        )
            .chain()
            .in_set(SimulationPhase::Decisions),
    );

    app.add_systems(
        Update,
        (
            resolve_ready_casts,
            run_delayed_effects,
            resolve_attack_impacts,
            move_projectiles,
            process_projectile_hits,
            apply_damage_events,
            apply_healing_events,
            process_deaths,
            recalculate_levels,
            restore_health_on_level_up,
            restore_mana_on_level_up,
        )
            .chain()
            .in_set(SimulationPhase::Resolution),
    );
}
