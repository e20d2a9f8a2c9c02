//! End-to-end tests of projectile flight
//!
//! These drive the full simulation so the damage has to travel: a ranged
//! swing or a projectile effect launches the shot, the shot flies toward its
//! captured aim point (or chases a moving target when homing), and only
//! contact turns it into damage.

use bevy::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use encountersim::abilities::config::{
    AbilitiesConfig, AbilityDefinition, AbilityDefinitions, AbilityKey, EffectSpec, FilterSpec,
    ProjectileSpec, TargetingSpec, TeamRelation,
};
use encountersim::abilities::cooldowns::CooldownStore;
use encountersim::combat::actions::CurrentAction;
use encountersim::combat::events::{ActionRequest, PointerClickEvent, RequestedAction};
use encountersim::combat::fighter::Fighter;
use encountersim::combat::health::Health;
use encountersim::combat::pool::Mana;
use encountersim::combat::projectiles::Projectile;
use encountersim::combat::weapons::{WeaponConfig, WeaponDefinitions, WeaponKey, WeaponsConfig};
use encountersim::combat::{CombatPlugin, Team};
use encountersim::stats::{CharacterClass, ClassProgression, Progression, ProgressionConfig, Stat};

const TICK: f32 = 1.0 / 60.0;

// =============================================================================
// Test fixtures
// =============================================================================

fn bolt_spec(homing: bool) -> ProjectileSpec {
    ProjectileSpec {
        speed: 12.0,
        homing,
        hit_radius: 0.8,
        max_lifetime: 10.0,
        life_after_impact: 2.0,
    }
}

/// Ranged weapon whose shots fly straight at where the target stood
fn storm_staff_weapons() -> WeaponDefinitions {
    let mut weapons = HashMap::new();
    weapons.insert(
        WeaponKey::from("storm_staff"),
        WeaponConfig {
            name: "Storm Staff".to_string(),
            range: 30.0,
            damage: 9.0,
            percentage_bonus: 0.0,
            projectile: Some(bolt_spec(false)),
        },
    );
    WeaponDefinitions::new(WeaponsConfig { weapons })
}

/// Pointer-driven ability that launches a non-homing bolt at each hostile
/// near the click
fn bolt_definition() -> AbilityDefinition {
    AbilityDefinition {
        name: "Bolt".to_string(),
        targeting: TargetingSpec::AreaAroundPoint {
            radius: 3.0,
            ground_offset: 0.0,
        },
        filters: vec![FilterSpec::Faction {
            relation: TeamRelation::Hostile,
        }],
        effects: vec![EffectSpec::SpawnProjectile {
            damage: 12.0,
            projectile: bolt_spec(false),
        }],
        mana_cost: 20.0,
        cooldown: 5.0,
    }
}

fn definitions(entries: Vec<(&str, AbilityDefinition)>) -> AbilityDefinitions {
    let mut abilities = HashMap::new();
    for (key, def) in entries {
        abilities.insert(AbilityKey::from(key), def);
    }
    AbilityDefinitions::new(AbilitiesConfig { abilities })
}

fn test_progression() -> Progression {
    let mut stats = HashMap::new();
    stats.insert(Stat::Health, vec![100.0]);
    stats.insert(Stat::Damage, vec![5.0]);

    let mut classes = HashMap::new();
    classes.insert(CharacterClass::Player, ClassProgression { stats });

    Progression::new(ProgressionConfig { classes })
}

fn test_app(abilities: AbilityDefinitions, weapons: WeaponDefinitions) -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .insert_resource(abilities)
        .insert_resource(weapons)
        .insert_resource(test_progression())
        .add_plugins(CombatPlugin);
    app
}

/// Advance the simulation by one frame of the given length
fn step(app: &mut App, seconds: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(seconds));
    app.update();
}

fn health_of(app: &App, entity: Entity) -> f32 {
    app.world()
        .get::<Health>(entity)
        .expect("has health")
        .current()
}

fn projectile_count(app: &mut App) -> usize {
    let mut query = app.world_mut().query::<&Projectile>();
    query.iter(app.world()).count()
}

// =============================================================================
// Ranged auto-attack
// =============================================================================

#[test]
fn test_ranged_attack_damage_travels_with_the_projectile() {
    let mut app = test_app(definitions(Vec::new()), storm_staff_weapons());
    let attacker = app
        .world_mut()
        .spawn((
            Transform::default(),
            Team(1),
            Health::new(100.0),
            Fighter::with_weapon(WeaponKey::from("storm_staff")),
            CurrentAction::default(),
        ))
        .id();
    let target = app
        .world_mut()
        .spawn((
            Transform::from_xyz(5.0, 0.0, 0.0),
            Team(2),
            Health::new(40.0),
        ))
        .id();

    app.world_mut().send_event(ActionRequest {
        actor: attacker,
        kind: RequestedAction::Attack(target),
    });

    // The swing triggers immediately and the impact fires after the windup,
    // launching a projectile instead of applying damage directly
    for _ in 0..30 {
        step(&mut app, TICK);
    }
    assert_eq!(projectile_count(&mut app), 1);
    assert_eq!(health_of(&app, target), 40.0);

    // Five units at speed 12 lands well inside the next half second
    for _ in 0..42 {
        step(&mut app, TICK);
    }
    assert_eq!(health_of(&app, target), 31.0);
}

// =============================================================================
// Cast pipeline
// =============================================================================

#[test]
fn test_cast_projectile_flies_to_its_target_and_lands() {
    let mut app = test_app(definitions(vec![("bolt", bolt_definition())]), WeaponDefinitions::default());
    let caster = app
        .world_mut()
        .spawn((
            Transform::default(),
            Team(1),
            Health::new(100.0),
            Mana::new(50.0),
            CurrentAction::default(),
            CooldownStore::default(),
        ))
        .id();
    let target_position = Vec3::new(5.0, 0.0, 0.0);
    let target = app
        .world_mut()
        .spawn((
            Transform::from_translation(target_position),
            Team(2),
            Health::new(40.0),
        ))
        .id();

    app.world_mut().send_event(ActionRequest {
        actor: caster,
        kind: RequestedAction::Cast(AbilityKey::from("bolt")),
    });
    step(&mut app, TICK);
    app.world_mut().send_event(PointerClickEvent {
        point: Some(target_position),
    });
    step(&mut app, TICK);

    // Committed: cost paid, projectile in flight, no damage yet
    let mana = app.world().get::<Mana>(caster).expect("mana");
    assert_eq!(mana.current(), 30.0);
    assert_eq!(projectile_count(&mut app), 1);
    assert_eq!(health_of(&app, target), 40.0);

    for _ in 0..60 {
        step(&mut app, TICK);
    }
    assert_eq!(health_of(&app, target), 28.0);
}

// =============================================================================
// Homing vs fixed aim
// =============================================================================

#[test]
fn test_homing_projectile_chases_a_moving_target() {
    let mut app = test_app(definitions(Vec::new()), WeaponDefinitions::default());
    let shooter = app.world_mut().spawn_empty().id();
    let launch_position = Vec3::new(4.0, 0.0, 0.0);
    let target = app
        .world_mut()
        .spawn((
            Transform::from_translation(launch_position),
            Team(2),
            Health::new(40.0),
        ))
        .id();
    app.world_mut().spawn((
        Transform::from_xyz(0.0, 1.0, 0.0),
        Projectile::aimed_at_entity(&bolt_spec(true), 10.0, shooter, target, launch_position),
    ));

    for _ in 0..6 {
        step(&mut app, TICK);
    }
    // Sidestep mid-flight; a homing shot re-aims and still connects
    app.world_mut()
        .get_mut::<Transform>(target)
        .expect("target transform")
        .translation = Vec3::new(0.0, 0.0, 6.0);

    for _ in 0..90 {
        step(&mut app, TICK);
    }
    assert_eq!(health_of(&app, target), 30.0);
}

#[test]
fn test_non_homing_projectile_keeps_its_launch_aim() {
    let mut app = test_app(definitions(Vec::new()), WeaponDefinitions::default());
    let shooter = app.world_mut().spawn_empty().id();
    let launch_position = Vec3::new(4.0, 0.0, 0.0);
    let target = app
        .world_mut()
        .spawn((
            Transform::from_translation(launch_position),
            Team(2),
            Health::new(40.0),
        ))
        .id();
    app.world_mut().spawn((
        Transform::from_xyz(0.0, 1.0, 0.0),
        Projectile::aimed_at_entity(&bolt_spec(false), 10.0, shooter, target, launch_position),
    ));

    step(&mut app, TICK);
    // The target moves away; the shot keeps flying at where it stood
    app.world_mut()
        .get_mut::<Transform>(target)
        .expect("target transform")
        .translation = Vec3::new(0.0, 0.0, 6.0);

    for _ in 0..120 {
        step(&mut app, TICK);
    }
    assert_eq!(health_of(&app, target), 40.0);
    assert_eq!(projectile_count(&mut app), 1);
}
