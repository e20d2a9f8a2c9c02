//! Data-Driven Stat Progression
//!
//! Per-class, per-stat leveling curves loaded from RON config files. Instead
//! of hardcoding stat tables in Rust, curves are defined in
//! `assets/config/progression.ron` and shared read-only by every actor.
//!
//! ## Usage
//! ```ignore
//! fn my_system(progression: Res<Progression>) {
//!     let hp = progression.stat(Stat::Health, CharacterClass::Grunt, 3);
//! }
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stats an actor can have. Curve lookups ask for one of these per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Maximum health at a given level
    Health,
    /// Maximum mana at a given level
    Mana,
    /// Mana regenerated per second
    ManaRegen,
    /// Base damage before weapon modifiers
    Damage,
    /// Experience awarded to the killer when this actor dies
    ExperienceReward,
    /// Total experience required to reach the next level
    ExperienceToLevelUp,
}

/// Actor archetypes that index the progression table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Player,
    Grunt,
    Archer,
    Mage,
}

impl CharacterClass {
    /// Display name for logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Player => "Player",
            CharacterClass::Grunt => "Grunt",
            CharacterClass::Archer => "Archer",
            CharacterClass::Mage => "Mage",
        }
    }
}

/// Per-class block of the progression file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassProgression {
    /// Stat curves indexed by level (index 0 = level 1)
    pub stats: HashMap<Stat, Vec<f32>>,
}

/// Root structure for the progression.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    pub classes: HashMap<CharacterClass, ClassProgression>,
}

/// Resource containing all stat progression curves.
///
/// Loaded from `assets/config/progression.ron` at startup.
/// Access via `Res<Progression>` in systems.
#[derive(Resource)]
pub struct Progression {
    classes: HashMap<CharacterClass, ClassProgression>,
}

impl Default for Progression {
    /// Load progression from the default config file.
    /// Panics if the file cannot be loaded - use for tests only.
    fn default() -> Self {
        load_progression().expect("Failed to load progression in Default impl")
    }
}

impl Progression {
    /// Create from a loaded config
    pub fn new(config: ProgressionConfig) -> Self {
        Self {
            classes: config.classes,
        }
    }

    /// Look up a stat value for a class at a level (levels are 1-based).
    ///
    /// An undefined class or stat is worth 0. A level past the end of the
    /// curve returns the last entry, so curves only need to be as long as
    /// the content requires.
    pub fn stat(&self, stat: Stat, class: CharacterClass, level: u32) -> f32 {
        let Some(class_progression) = self.classes.get(&class) else {
            return 0.0;
        };
        let Some(levels) = class_progression.stats.get(&stat) else {
            return 0.0;
        };
        if levels.is_empty() {
            return 0.0;
        }
        let index = (level.max(1) as usize - 1).min(levels.len() - 1);
        levels[index]
    }

    /// Number of levels defined for a stat curve.
    ///
    /// For `ExperienceToLevelUp` this bounds level-ups: the reachable maximum
    /// level is one past the last threshold.
    pub fn levels(&self, stat: Stat, class: CharacterClass) -> u32 {
        self.classes
            .get(&class)
            .and_then(|c| c.stats.get(&stat))
            .map(|levels| levels.len() as u32)
            .unwrap_or(0)
    }

    /// All classes defined in the table
    pub fn class_list(&self) -> impl Iterator<Item = &CharacterClass> {
        self.classes.keys()
    }

    /// Check that the table is usable: every class needs non-empty Health and
    /// Damage curves, and no curve may contain a negative or non-finite value.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("progression table defines no classes".to_string());
        }

        for (class, class_progression) in &self.classes {
            for required in [Stat::Health, Stat::Damage] {
                let curve = class_progression.stats.get(&required);
                if curve.map_or(true, |c| c.is_empty()) {
                    return Err(format!(
                        "class {:?} is missing a {:?} curve",
                        class, required
                    ));
                }
            }

            for (stat, curve) in &class_progression.stats {
                for (i, value) in curve.iter().enumerate() {
                    if !value.is_finite() || *value < 0.0 {
                        return Err(format!(
                            "class {:?} stat {:?} has invalid value {} at level {}",
                            class,
                            stat,
                            value,
                            i + 1
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Load progression curves from assets/config/progression.ron
pub fn load_progression() -> Result<Progression, String> {
    let config_path = "assets/config/progression.ron";

    let contents = std::fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read {}: {}", config_path, e))?;

    let config: ProgressionConfig = ron::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", config_path, e))?;

    let progression = Progression::new(config);
    progression.validate()?;

    info!(
        "Loaded progression curves for {} classes from {}",
        progression.classes.len(),
        config_path
    );

    Ok(progression)
}

/// Bevy plugin for progression loading
pub struct ProgressionPlugin;

impl Plugin for ProgressionPlugin {
    fn build(&self, app: &mut App) {
        match load_progression() {
            Ok(progression) => {
                app.insert_resource(progression);
            }
            Err(e) => {
                panic!("Failed to load progression curves: {}", e);
            }
        }
    }
}
