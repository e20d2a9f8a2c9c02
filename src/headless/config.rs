//! Scenario configuration for headless encounters
//!
//! Parses RON scenario files describing the actors, their AI, and an optional
//! script of timed actions to inject while the encounter runs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::stats::CharacterClass;

fn default_max_duration() -> f32 {
    300.0
}

fn default_level() -> u32 {
    1
}

fn default_active() -> bool {
    true
}

/// A complete headless encounter description loaded from RON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Seed for deterministic simulation; omitted means system entropy
    #[serde(default)]
    pub seed: Option<u64>,
    /// Maximum encounter duration before declaring a draw
    #[serde(default = "default_max_duration")]
    pub max_duration: f32,
    /// Every actor present when the encounter starts
    pub actors: Vec<ActorConfig>,
    /// Timed actions injected while the encounter runs
    #[serde(default)]
    pub script: Vec<ScriptedAction>,
}

/// One actor in the scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Unique display name, also the script's handle for this actor
    pub name: String,
    /// Encounter side; different teams are hostile
    pub team: u8,
    /// Progression table row
    pub class: CharacterClass,
    #[serde(default = "default_level")]
    pub level: u32,
    pub position: [f32; 3],
    /// Weapon key from weapons.ron; omitted fights unarmed
    #[serde(default)]
    pub weapon: Option<String>,
    /// AI behavior; omitted actors only act when scripted
    #[serde(default)]
    pub ai: Option<AiConfig>,
    /// Player-controlled actors gain experience and use weapon stat modifiers
    #[serde(default)]
    pub player_controlled: bool,
}

/// AI behavior for one actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Cyclic patrol waypoints; empty means guard the spawn position
    #[serde(default)]
    pub patrol: Vec<[f32; 3]>,
    /// Inactive controllers wait for an aggro activation
    #[serde(default = "default_active")]
    pub active: bool,
}

/// One timed entry in the scenario script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedAction {
    /// Encounter time in seconds at which to inject the action
    pub at: f32,
    pub action: ScriptAction,
}

/// The actions a script can inject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScriptAction {
    /// Request an ability cast by name
    Cast { caster: String, ability: String },
    /// Deliver a ground click to pointer-awaiting casts; `None` is a miss
    PointerClick { point: Option<[f32; 3]> },
    /// Order one actor to auto-attack another
    Attack { attacker: String, target: String },
    /// Cancel the actor's current exclusive action
    CancelAction { actor: String },
}

impl ScenarioConfig {
    /// Load and validate a scenario from a RON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read scenario file: {}", e))?;

        let config: ScenarioConfig =
            ron::from_str(&contents).map_err(|e| format!("Failed to parse scenario RON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Check the scenario for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.actors.is_empty() {
            return Err("scenario defines no actors".to_string());
        }
        if self.max_duration <= 0.0 {
            return Err("max_duration must be positive".to_string());
        }

        let mut names = HashSet::new();
        for actor in &self.actors {
            if actor.name.is_empty() {
                return Err("actor names must not be empty".to_string());
            }
            if !names.insert(actor.name.as_str()) {
                return Err(format!("duplicate actor name '{}'", actor.name));
            }
            if actor.level == 0 {
                return Err(format!("{}: levels start at 1", actor.name));
            }
        }

        for entry in &self.script {
            if entry.at < 0.0 {
                return Err("script times must be non-negative".to_string());
            }
            for referenced in entry.action.actor_references() {
                if !names.contains(referenced) {
                    return Err(format!("script references unknown actor '{}'", referenced));
                }
            }
        }

        Ok(())
    }
}

impl ScriptAction {
    /// Actor names this action refers to
    fn actor_references(&self) -> Vec<&str> {
        match self {
            ScriptAction::Cast { caster, .. } => vec![caster],
            ScriptAction::PointerClick { .. } => Vec::new(),
            ScriptAction::Attack { attacker, target } => vec![attacker, target],
            ScriptAction::CancelAction { actor } => vec![actor],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_scenario() -> ScenarioConfig {
        ron::from_str(
            r#"(
                actors: [
                    (name: "Hero", team: 1, class: Player, position: (0.0, 0.0, 0.0)),
                    (name: "Grunt", team: 2, class: Grunt, position: (5.0, 0.0, 0.0)),
                ],
            )"#,
        )
        .expect("scenario parses")
    }

    #[test]
    fn test_minimal_scenario_parses_with_defaults() {
        let config = minimal_scenario();
        assert_eq!(config.max_duration, 300.0);
        assert_eq!(config.seed, None);
        assert!(config.script.is_empty());
        assert_eq!(config.actors[0].level, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut config = minimal_scenario();
        config.actors[1].name = "Hero".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_script_must_reference_known_actors() {
        let mut config = minimal_scenario();
        config.script.push(ScriptedAction {
            at: 1.0,
            action: ScriptAction::Attack {
                attacker: "Hero".to_string(),
                target: "Nobody".to_string(),
            },
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_full_scenario_parses() {
        let config: ScenarioConfig = ron::from_str(
            r#"(
                seed: Some(42),
                max_duration: 60.0,
                actors: [
                    (
                        name: "Hero",
                        team: 1,
                        class: Player,
                        level: 2,
                        position: (0.0, 0.0, 0.0),
                        weapon: Some("sword"),
                        player_controlled: true,
                    ),
                    (
                        name: "Grunt",
                        team: 2,
                        class: Grunt,
                        position: (8.0, 0.0, 0.0),
                        ai: Some((patrol: [(8.0, 0.0, 0.0), (8.0, 0.0, 6.0)])),
                    ),
                ],
                script: [
                    (at: 1.0, action: Cast(caster: "Hero", ability: "fireball")),
                    (at: 1.5, action: PointerClick(point: Some((8.0, 0.0, 0.0)))),
                    (at: 10.0, action: CancelAction(actor: "Hero")),
                ],
            )"#,
        )
        .expect("full scenario parses");

        assert!(config.validate().is_ok());
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.script.len(), 3);
        assert!(config.actors[1].ai.as_ref().is_some_and(|ai| ai.active));
    }
}
