//! Data-Driven Ability Configuration
//!
//! Abilities are composed in `assets/config/abilities.ron` instead of being
//! hardcoded: each definition names one targeting strategy, an ordered filter
//! chain, and an ordered effect list, plus cost and cooldown. Definitions are
//! immutable once loaded and shared read-only by every caster.
//!
//! ## Usage
//! ```ignore
//! fn my_system(abilities: Res<AbilityDefinitions>) {
//!     if let Some(def) = abilities.get(&AbilityKey::from("fireball")) {
//!         println!("fireball costs {} mana", def.mana_cost);
//!     }
//! }
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::constants::{
    PROJECTILE_HIT_RADIUS, PROJECTILE_LIFE_AFTER_IMPACT, PROJECTILE_MAX_LIFETIME,
};

/// Identity of an ability definition. Used as the cooldown-map key, so two
/// casts of the same definition share one cooldown entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityKey(String);

impl AbilityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AbilityKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AbilityKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for AbilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn default_ground_offset() -> f32 {
    1.0
}

/// How a cast acquires its targets.
///
/// Pointer-driven variants suspend the cast until a `PointerClickEvent`
/// arrives; the others resolve in the tick the cast starts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TargetingSpec {
    /// Await a pointer click and take the clicked ground point
    PointOnGround {
        /// Lift applied to the clicked point so effects spawn off the floor
        #[serde(default = "default_ground_offset")]
        ground_offset: f32,
    },
    /// Await a pointer click, then gather everything damageable near it
    AreaAroundPoint {
        radius: f32,
        #[serde(default = "default_ground_offset")]
        ground_offset: f32,
    },
    /// The caster's current combat target, if it is still alive
    CurrentTarget,
    /// The caster itself
    CasterSelf,
}

impl TargetingSpec {
    /// Whether this strategy suspends awaiting pointer input
    pub fn is_pointer_driven(&self) -> bool {
        matches!(
            self,
            TargetingSpec::PointOnGround { .. } | TargetingSpec::AreaAroundPoint { .. }
        )
    }
}

/// Which side of the caster's team a faction filter keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamRelation {
    Allies,
    Hostile,
}

/// A stage of the filter chain. Filters only ever remove targets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FilterSpec {
    /// Keep targets within range of the caster, or of the targeted point
    /// when `from_point` is set
    WithinDistance {
        range: f32,
        #[serde(default)]
        from_point: bool,
    },
    /// Keep targets on the named side of the caster's team
    Faction { relation: TeamRelation },
    /// Drop the caster from the target set
    ExcludeCaster,
}

fn default_hit_radius() -> f32 {
    PROJECTILE_HIT_RADIUS
}

fn default_max_lifetime() -> f32 {
    PROJECTILE_MAX_LIFETIME
}

fn default_life_after_impact() -> f32 {
    PROJECTILE_LIFE_AFTER_IMPACT
}

/// Flight parameters shared by ability projectiles and weapon projectiles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectileSpec {
    /// Travel speed in units per second
    pub speed: f32,
    /// Whether the projectile re-aims at a moving target every tick
    #[serde(default)]
    pub homing: bool,
    /// Contact distance that counts as a hit
    #[serde(default = "default_hit_radius")]
    pub hit_radius: f32,
    /// Despawn after this many seconds without impacting
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime: f32,
    /// Linger this long after impact before despawning
    #[serde(default = "default_life_after_impact")]
    pub life_after_impact: f32,
}

fn default_point_effect_lifetime() -> f32 {
    -1.0
}

/// A gameplay consequence applied to the filtered targets.
///
/// Every started effect signals completion exactly once; `Delayed` is the
/// only variant that completes on a later tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EffectSpec {
    /// Instant health change: negative damages, positive heals
    HealthChange { amount: f32 },
    /// Launch a projectile at each damageable target
    SpawnProjectile {
        damage: f32,
        projectile: ProjectileSpec,
    },
    /// Spawn a marker entity at the targeted point. Negative lifetime means
    /// it persists for the rest of the encounter.
    SpawnPointEffect {
        #[serde(default = "default_point_effect_lifetime")]
        lifetime: f32,
    },
    /// Run nested effects after a delay. The cancellation flag is checked
    /// once, at the moment the delay elapses.
    Delayed {
        delay: f32,
        #[serde(default)]
        abort_if_cancelled: bool,
        effects: Vec<EffectSpec>,
    },
    /// Fire a named animation trigger on the caster
    AnimationCue { trigger: String },
}

fn validate_effects(ability: &str, effects: &[EffectSpec], problems: &mut Vec<String>) {
    if effects.is_empty() {
        problems.push(format!("{}: effect list is empty", ability));
    }
    for effect in effects {
        match effect {
            EffectSpec::HealthChange { amount } => {
                if !amount.is_finite() {
                    problems.push(format!("{}: HealthChange amount is not finite", ability));
                }
            }
            EffectSpec::SpawnProjectile { damage, projectile } => {
                if *damage < 0.0 {
                    problems.push(format!("{}: projectile damage is negative", ability));
                }
                if projectile.speed <= 0.0 {
                    problems.push(format!("{}: projectile speed must be positive", ability));
                }
            }
            EffectSpec::SpawnPointEffect { .. } => {}
            EffectSpec::Delayed { delay, effects, .. } => {
                if *delay < 0.0 {
                    problems.push(format!("{}: delayed effect has negative delay", ability));
                }
                validate_effects(ability, effects, problems);
            }
            EffectSpec::AnimationCue { trigger } => {
                if trigger.is_empty() {
                    problems.push(format!("{}: animation cue trigger is empty", ability));
                }
            }
        }
    }
}

/// Complete ability configuration loaded from RON.
///
/// Immutable at runtime; the cast pipeline reads it but never writes it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Display name of the ability
    pub name: String,
    /// How targets are acquired
    pub targeting: TargetingSpec,
    /// Applied in order to the acquired target set
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    /// Started together against the filtered target set
    pub effects: Vec<EffectSpec>,
    /// Mana deducted when the cast commits
    #[serde(default)]
    pub mana_cost: f32,
    /// Cooldown started when the cast commits
    #[serde(default)]
    pub cooldown: f32,
}

/// Root structure for the abilities.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct AbilitiesConfig {
    pub abilities: HashMap<AbilityKey, AbilityDefinition>,
}

/// Resource containing all ability definitions.
///
/// Loaded from `assets/config/abilities.ron` at startup.
/// Access via `Res<AbilityDefinitions>` in systems.
#[derive(Resource)]
pub struct AbilityDefinitions {
    definitions: HashMap<AbilityKey, AbilityDefinition>,
}

impl Default for AbilityDefinitions {
    /// Load ability definitions from the default config file.
    /// Panics if the file cannot be loaded - use for tests only.
    fn default() -> Self {
        load_ability_definitions()
            .expect("Failed to load ability definitions in Default impl")
    }
}

impl AbilityDefinitions {
    /// Create from a loaded config
    pub fn new(config: AbilitiesConfig) -> Self {
        Self {
            definitions: config.abilities,
        }
    }

    /// Get the definition for an ability key
    pub fn get(&self, key: &AbilityKey) -> Option<&AbilityDefinition> {
        self.definitions.get(key)
    }

    /// All defined ability keys
    pub fn keys(&self) -> impl Iterator<Item = &AbilityKey> {
        self.definitions.keys()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Check every definition for values the pipeline cannot execute
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        for (key, def) in &self.definitions {
            if def.name.is_empty() {
                problems.push(format!("{}: display name is empty", key));
            }
            if def.mana_cost < 0.0 {
                problems.push(format!("{}: mana cost is negative", key));
            }
            if def.cooldown < 0.0 {
                problems.push(format!("{}: cooldown is negative", key));
            }
            for filter in &def.filters {
                if let FilterSpec::WithinDistance { range, .. } = filter {
                    if *range < 0.0 {
                        problems.push(format!("{}: filter range is negative", key));
                    }
                }
            }
            if let TargetingSpec::AreaAroundPoint { radius, .. } = &def.targeting {
                if *radius <= 0.0 {
                    problems.push(format!("{}: area radius must be positive", key));
                }
            }
            validate_effects(key.as_str(), &def.effects, &mut problems);
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

/// Load ability definitions from assets/config/abilities.ron
pub fn load_ability_definitions() -> Result<AbilityDefinitions, String> {
    let config_path = "assets/config/abilities.ron";

    let contents = std::fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read {}: {}", config_path, e))?;

    let config: AbilitiesConfig = ron::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", config_path, e))?;

    let definitions = AbilityDefinitions::new(config);

    definitions
        .validate()
        .map_err(|problems| format!("Invalid ability definitions: {}", problems.join("; ")))?;

    info!(
        "Loaded {} ability definitions from {}",
        definitions.len(),
        config_path
    );

    Ok(definitions)
}

/// Bevy plugin for ability configuration loading
pub struct AbilityConfigPlugin;

impl Plugin for AbilityConfigPlugin {
    fn build(&self, app: &mut App) {
        match load_ability_definitions() {
            Ok(definitions) => {
                app.insert_resource(definitions);
            }
            Err(e) => {
                panic!("Failed to load ability definitions: {}", e);
            }
        }
    }
}
