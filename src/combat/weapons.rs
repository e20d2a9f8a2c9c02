//! Weapon Configuration and Pickups
//!
//! Weapons are immutable definitions loaded from `assets/config/weapons.ron`,
//! looked up by key on each fighter. A weapon contributes its damage as an
//! additive modifier and its percentage bonus on top of the wielder's base
//! damage stat. Fighters without a weapon fall back to the unarmed defaults.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::abilities::config::ProjectileSpec;
use crate::combat::events::HealingEvent;
use crate::combat::fighter::Fighter;
use crate::combat::health::Health;
use crate::constants::{DEFAULT_WEAPON_DAMAGE, DEFAULT_WEAPON_RANGE};
use crate::stats::StatModifiers;

/// Identity of a weapon definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeaponKey(String);

impl WeaponKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WeaponKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WeaponKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for WeaponKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn default_range() -> f32 {
    DEFAULT_WEAPON_RANGE
}

fn default_damage() -> f32 {
    DEFAULT_WEAPON_DAMAGE
}

/// Immutable weapon configuration shared by every wielder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeaponConfig {
    /// Display name
    pub name: String,
    /// Attack range in units
    #[serde(default = "default_range")]
    pub range: f32,
    /// Additive damage contributed to the wielder's damage stat
    #[serde(default = "default_damage")]
    pub damage: f32,
    /// Percentage bonus on top of base plus additive damage
    #[serde(default)]
    pub percentage_bonus: f32,
    /// Ranged weapons launch this projectile on impact instead of applying
    /// damage directly
    #[serde(default)]
    pub projectile: Option<ProjectileSpec>,
}

impl WeaponConfig {
    /// The bare-fists fallback used when a fighter has no weapon equipped
    pub fn unarmed() -> Self {
        Self {
            name: "Unarmed".to_string(),
            range: DEFAULT_WEAPON_RANGE,
            damage: DEFAULT_WEAPON_DAMAGE,
            percentage_bonus: 0.0,
            projectile: None,
        }
    }

    /// How this weapon enters the wielder's damage stat query
    pub fn damage_modifiers(&self) -> StatModifiers {
        StatModifiers {
            additive: self.damage,
            percentage: self.percentage_bonus,
        }
    }

    pub fn is_ranged(&self) -> bool {
        self.projectile.is_some()
    }
}

/// Root structure for the weapons.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct WeaponsConfig {
    pub weapons: HashMap<WeaponKey, WeaponConfig>,
}

/// Resource containing all weapon definitions.
///
/// Loaded from `assets/config/weapons.ron` at startup.
#[derive(Resource, Default)]
pub struct WeaponDefinitions {
    definitions: HashMap<WeaponKey, WeaponConfig>,
}

impl WeaponDefinitions {
    pub fn new(config: WeaponsConfig) -> Self {
        Self {
            definitions: config.weapons,
        }
    }

    pub fn get(&self, key: &WeaponKey) -> Option<&WeaponConfig> {
        self.definitions.get(key)
    }

    /// The fighter's weapon config, or the unarmed fallback.
    ///
    /// An equipped key that no longer resolves (definition removed between
    /// saves) also degrades to unarmed rather than failing the combat loop.
    pub fn resolve(&self, key: Option<&WeaponKey>) -> WeaponConfig {
        key.and_then(|k| self.definitions.get(k))
            .cloned()
            .unwrap_or_else(WeaponConfig::unarmed)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Check every definition for values the combat loop cannot use
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        for (key, def) in &self.definitions {
            if def.name.is_empty() {
                problems.push(format!("{}: display name is empty", key));
            }
            if def.range <= 0.0 {
                problems.push(format!("{}: range must be positive", key));
            }
            if def.damage < 0.0 {
                problems.push(format!("{}: damage is negative", key));
            }
            if let Some(projectile) = &def.projectile {
                if projectile.speed <= 0.0 {
                    problems.push(format!("{}: projectile speed must be positive", key));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

/// Load weapon definitions from assets/config/weapons.ron
pub fn load_weapon_definitions() -> Result<WeaponDefinitions, String> {
    let config_path = "assets/config/weapons.ron";

    let contents = std::fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read {}: {}", config_path, e))?;

    let config: WeaponsConfig = ron::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", config_path, e))?;

    let definitions = WeaponDefinitions::new(config);

    definitions
        .validate()
        .map_err(|problems| format!("Invalid weapon definitions: {}", problems.join("; ")))?;

    info!(
        "Loaded {} weapon definitions from {}",
        definitions.len(),
        config_path
    );

    Ok(definitions)
}

/// Bevy plugin for weapon configuration loading
pub struct WeaponConfigPlugin;

impl Plugin for WeaponConfigPlugin {
    fn build(&self, app: &mut App) {
        match load_weapon_definitions() {
            Ok(definitions) => {
                app.insert_resource(definitions);
            }
            Err(e) => {
                panic!("Failed to load weapon definitions: {}", e);
            }
        }
    }
}

/// Marks actors that may take weapons and healing from pickups.
#[derive(Component, Debug, Default)]
pub struct PickupCollector;

/// A ground pickup that equips a weapon and/or restores health on contact,
/// then hides until its respawn timer re-arms it.
#[derive(Component, Debug)]
pub struct WeaponPickup {
    /// Weapon handed to the collector, if any
    pub weapon: Option<WeaponKey>,
    /// Health restored to the collector
    pub health_to_restore: f32,
    /// Contact distance that triggers the pickup
    pub radius: f32,
    /// Seconds the pickup stays hidden after being taken
    pub respawn_time: f32,
    hidden_for: f32,
}

impl WeaponPickup {
    pub fn new(weapon: Option<WeaponKey>, health_to_restore: f32, respawn_time: f32) -> Self {
        Self {
            weapon,
            health_to_restore,
            radius: 1.0,
            respawn_time,
            hidden_for: 0.0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.hidden_for <= 0.0
    }
}

/// Tick pickup respawn timers and hand out weapons/healing on contact
pub fn update_pickups(
    time: Res<Time>,
    mut pickups: Query<(&Transform, &mut WeaponPickup)>,
    mut collectors: Query<
        (Entity, &Transform, &mut Fighter, Option<&Health>),
        With<PickupCollector>,
    >,
    mut healing: EventWriter<HealingEvent>,
) {
    let delta = time.delta_secs();

    for (pickup_transform, mut pickup) in pickups.iter_mut() {
        if !pickup.is_available() {
            pickup.hidden_for -= delta;
            continue;
        }

        for (collector, collector_transform, mut fighter, health) in collectors.iter_mut() {
            if health.is_some_and(|h| h.is_dead()) {
                continue;
            }
            let distance = collector_transform
                .translation
                .distance(pickup_transform.translation);
            if distance > pickup.radius {
                continue;
            }

            if let Some(weapon) = pickup.weapon.clone() {
                fighter.equip(weapon);
            }
            if pickup.health_to_restore > 0.0 {
                healing.send(HealingEvent {
                    source: collector,
                    target: collector,
                    amount: pickup.health_to_restore,
                    ability_name: None,
                });
            }

            pickup.hidden_for = pickup.respawn_time;
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions_with(key: &str, def: WeaponConfig) -> WeaponDefinitions {
        let mut weapons = HashMap::new();
        weapons.insert(WeaponKey::from(key), def);
        WeaponDefinitions::new(WeaponsConfig { weapons })
    }

    #[test]
    fn test_resolve_falls_back_to_unarmed() {
        let defs = WeaponDefinitions::default();
        let config = defs.resolve(None);
        assert_eq!(config.name, "Unarmed");
        assert_eq!(config.range, DEFAULT_WEAPON_RANGE);

        let config = defs.resolve(Some(&WeaponKey::from("missing")));
        assert_eq!(config.name, "Unarmed");
    }

    #[test]
    fn test_resolve_finds_defined_weapon() {
        let mut sword = WeaponConfig::unarmed();
        sword.name = "Sword".to_string();
        sword.damage = 12.0;
        let defs = definitions_with("sword", sword);

        let config = defs.resolve(Some(&WeaponKey::from("sword")));
        assert_eq!(config.name, "Sword");
        assert_eq!(config.damage_modifiers().additive, 12.0);
    }

    #[test]
    fn test_validate_rejects_zero_range() {
        let mut broken = WeaponConfig::unarmed();
        broken.range = 0.0;
        let defs = definitions_with("broken", broken);
        assert!(defs.validate().is_err());
    }

    #[test]
    fn test_ranged_weapon_detection() {
        let bow = WeaponConfig {
            name: "Bow".to_string(),
            range: 10.0,
            damage: 6.0,
            percentage_bonus: 0.0,
            projectile: Some(ProjectileSpec {
                speed: 15.0,
                homing: true,
                hit_radius: 0.5,
                max_lifetime: 10.0,
                life_after_impact: 2.0,
            }),
        };
        assert!(bow.is_ranged());
        assert!(!WeaponConfig::unarmed().is_ranged());
    }

    #[test]
    fn test_pickup_hides_after_collection() {
        let mut pickup = WeaponPickup::new(Some(WeaponKey::from("sword")), 0.0, 5.0);
        assert!(pickup.is_available());
        pickup.hidden_for = pickup.respawn_time;
        assert!(!pickup.is_available());
    }
}
