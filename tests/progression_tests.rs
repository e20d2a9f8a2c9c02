//! End-to-end tests of kill rewards and leveling
//!
//! These run the full resolution chain for a single killing blow: damage
//! application, death handling, the experience award, the level
//! recalculation, and the pool restoration floors, all within one tick.

use bevy::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use encountersim::abilities::config::{AbilitiesConfig, AbilityDefinitions};
use encountersim::combat::events::DamageEvent;
use encountersim::combat::health::Health;
use encountersim::combat::pool::Mana;
use encountersim::combat::weapons::WeaponDefinitions;
use encountersim::combat::{CombatPlugin, Team};
use encountersim::stats::{
    BaseStats, CharacterClass, ClassProgression, Experience, Progression, ProgressionConfig, Stat,
};

const TICK: f32 = 1.0 / 60.0;

// =============================================================================
// Test fixtures
// =============================================================================

/// Player levels up at 10 experience; a Grunt kill is worth exactly that,
/// an Archer kill less than half of it.
fn test_progression() -> Progression {
    let mut player_stats = HashMap::new();
    player_stats.insert(Stat::Health, vec![100.0, 120.0]);
    player_stats.insert(Stat::Mana, vec![50.0, 60.0]);
    player_stats.insert(Stat::ManaRegen, vec![1.0, 2.0]);
    player_stats.insert(Stat::Damage, vec![5.0, 6.0]);
    player_stats.insert(Stat::ExperienceToLevelUp, vec![10.0]);

    let mut grunt_stats = HashMap::new();
    grunt_stats.insert(Stat::Health, vec![20.0]);
    grunt_stats.insert(Stat::Damage, vec![2.0]);
    grunt_stats.insert(Stat::ExperienceReward, vec![10.0]);

    let mut archer_stats = HashMap::new();
    archer_stats.insert(Stat::Health, vec![20.0]);
    archer_stats.insert(Stat::Damage, vec![1.0]);
    archer_stats.insert(Stat::ExperienceReward, vec![4.0]);

    let mut classes = HashMap::new();
    classes.insert(CharacterClass::Player, ClassProgression { stats: player_stats });
    classes.insert(CharacterClass::Grunt, ClassProgression { stats: grunt_stats });
    classes.insert(CharacterClass::Archer, ClassProgression { stats: archer_stats });

    Progression::new(ProgressionConfig { classes })
}

fn test_app() -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .insert_resource(AbilityDefinitions::new(AbilitiesConfig {
            abilities: HashMap::new(),
        }))
        .insert_resource(WeaponDefinitions::default())
        .insert_resource(test_progression())
        .add_plugins(CombatPlugin);
    app
}

fn step(app: &mut App, seconds: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(seconds));
    app.update();
}

fn spawn_killer(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((
            Transform::default(),
            Team(1),
            Health::new(100.0),
            Mana::new(50.0),
            BaseStats::new(CharacterClass::Player, 1),
            Experience::default(),
        ))
        .id()
}

fn spawn_victim(app: &mut App, class: CharacterClass) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_xyz(2.0, 0.0, 0.0),
            Team(2),
            Health::new(20.0),
            BaseStats::new(class, 1),
        ))
        .id()
}

fn kill(app: &mut App, instigator: Entity, target: Entity) {
    app.world_mut().send_event(DamageEvent {
        instigator,
        target,
        amount: 25.0,
        ability_name: None,
    });
    step(app, TICK);
}

// =============================================================================
// Experience awards
// =============================================================================

#[test]
fn test_kill_awards_the_victims_experience_reward() {
    let mut app = test_app();
    let killer = spawn_killer(&mut app);
    let victim = spawn_victim(&mut app, CharacterClass::Archer);

    kill(&mut app, killer, victim);

    let victim_health = app.world().get::<Health>(victim).expect("victim health");
    assert!(victim_health.is_dead());
    let experience = app.world().get::<Experience>(killer).expect("experience");
    assert_eq!(experience.points(), 4.0);

    // Below the first threshold: no level up, pools untouched
    let stats = app.world().get::<BaseStats>(killer).expect("stats");
    assert_eq!(stats.current_level, 1);
    let health = app.world().get::<Health>(killer).expect("health");
    assert_eq!(health.max(), 100.0);
}

// =============================================================================
// Level-up restoration floors
// =============================================================================

#[test]
fn test_level_up_raises_maxima_and_applies_pool_floors() {
    let mut app = test_app();
    let killer = spawn_killer(&mut app);
    let victim = spawn_victim(&mut app, CharacterClass::Grunt);

    // Run the killer down so the floors have something to lift
    app.world_mut()
        .get_mut::<Health>(killer)
        .expect("health")
        .take_damage(80.0);
    app.world_mut()
        .get_mut::<Mana>(killer)
        .expect("mana")
        .spend(45.0);

    kill(&mut app, killer, victim);

    let experience = app.world().get::<Experience>(killer).expect("experience");
    assert_eq!(experience.points(), 10.0);
    let stats = app.world().get::<BaseStats>(killer).expect("stats");
    assert_eq!(stats.current_level, 2);

    // New maxima from the level 2 row, current lifted to 70% of them
    let health = app.world().get::<Health>(killer).expect("health");
    assert_eq!(health.max(), 120.0);
    assert_eq!(health.current(), 84.0);
    let mana = app.world().get::<Mana>(killer).expect("mana");
    assert_eq!(mana.max(), 60.0);
    assert_eq!(mana.current(), 42.0);
    assert_eq!(mana.regen_per_second, 2.0);
}

#[test]
fn test_level_up_keeps_pools_above_the_floor_untouched() {
    let mut app = test_app();
    let killer = spawn_killer(&mut app);
    let victim = spawn_victim(&mut app, CharacterClass::Grunt);

    kill(&mut app, killer, victim);

    // Full pools stay at their current values, only the maxima grow
    let health = app.world().get::<Health>(killer).expect("health");
    assert_eq!(health.max(), 120.0);
    assert_eq!(health.current(), 100.0);
    let mana = app.world().get::<Mana>(killer).expect("mana");
    assert_eq!(mana.max(), 60.0);
    assert_eq!(mana.current(), 50.0);
}
