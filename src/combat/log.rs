//! Combat logging
//!
//! Records damage, healing, casts, and deaths for post-encounter analysis.
//! Entries carry structured data alongside the human-readable message so the
//! headless report can aggregate per-actor totals without re-parsing text.

use bevy::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// Stable display identifier for an actor in the log (e.g. "Hero", "Grunt 2").
pub type ActorId = String;

/// Structured payload attached to damage/healing/cast/death entries
#[derive(Debug, Clone, Serialize)]
pub struct StructuredEventData {
    /// Actor responsible for the event
    pub source: Option<ActorId>,
    /// Actor the event happened to
    pub target: Option<ActorId>,
    /// Ability name, or "Auto Attack" style labels
    pub ability: Option<String>,
    /// Damage or healing amount (0 for non-numeric events)
    pub amount: f32,
    /// Whether a damage entry was the killing blow
    pub killing_blow: bool,
}

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize)]
pub struct CombatLogEntry {
    /// Timestamp in encounter time (seconds since encounter start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
    /// Structured data for aggregation (None for plain encounter events)
    pub data: Option<StructuredEventData>,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CombatLogEventType {
    /// Damage dealt
    Damage,
    /// Healing done
    Healing,
    /// Ability cast committed (cost paid, cooldown started)
    AbilityCast,
    /// Actor died
    Death,
    /// Encounter event (start, end, scripted markers)
    EncounterEvent,
}

/// The combat log resource storing all events
#[derive(Resource, Default)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current encounter time, advanced by the upkeep phase
    pub encounter_time: f32,
    /// Registered actors and their display names
    names: HashMap<Entity, ActorId>,
    /// Registration order, used when listing actors in reports
    roster: Vec<ActorId>,
}

impl CombatLog {
    /// Clear the log for a new encounter
    pub fn clear(&mut self) {
        self.entries.clear();
        self.encounter_time = 0.0;
        self.names.clear();
        self.roster.clear();
    }

    /// Register an actor so entities can be resolved to display names.
    /// Registering the same name twice keeps a single roster entry.
    pub fn register_actor(&mut self, entity: Entity, name: ActorId) {
        if !self.roster.contains(&name) {
            self.roster.push(name.clone());
        }
        self.names.insert(entity, name);
    }

    /// Display name for an entity, or a placeholder for unregistered ones
    pub fn display_name(&self, entity: Entity) -> ActorId {
        self.names
            .get(&entity)
            .cloned()
            .unwrap_or_else(|| format!("Unknown({:?})", entity))
    }

    /// All registered actors in registration order
    pub fn all_actors(&self) -> &[ActorId] {
        &self.roster
    }

    /// Add a plain entry with no structured data
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.encounter_time,
            event_type,
            message,
            data: None,
        });
    }

    /// Record damage dealt
    pub fn log_damage(
        &mut self,
        source: ActorId,
        target: ActorId,
        ability: String,
        amount: f32,
        killing_blow: bool,
        message: String,
    ) {
        self.entries.push(CombatLogEntry {
            timestamp: self.encounter_time,
            event_type: CombatLogEventType::Damage,
            message,
            data: Some(StructuredEventData {
                source: Some(source),
                target: Some(target),
                ability: Some(ability),
                amount,
                killing_blow,
            }),
        });
    }

    /// Record healing done
    pub fn log_healing(
        &mut self,
        source: ActorId,
        target: ActorId,
        ability: String,
        amount: f32,
        message: String,
    ) {
        self.entries.push(CombatLogEntry {
            timestamp: self.encounter_time,
            event_type: CombatLogEventType::Healing,
            message,
            data: Some(StructuredEventData {
                source: Some(source),
                target: Some(target),
                ability: Some(ability),
                amount,
                killing_blow: false,
            }),
        });
    }

    /// Record a committed ability cast (cost paid, cooldown started)
    pub fn log_cast(&mut self, caster: ActorId, ability: String, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.encounter_time,
            event_type: CombatLogEventType::AbilityCast,
            message,
            data: Some(StructuredEventData {
                source: Some(caster),
                target: None,
                ability: Some(ability),
                amount: 0.0,
                killing_blow: false,
            }),
        });
    }

    /// Record a death
    pub fn log_death(&mut self, victim: ActorId, killer: Option<ActorId>, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.encounter_time,
            event_type: CombatLogEventType::Death,
            message,
            data: Some(StructuredEventData {
                source: killer,
                target: Some(victim),
                ability: None,
                amount: 0.0,
                killing_blow: false,
            }),
        });
    }

    // ===== Aggregation queries =====

    /// Total damage dealt by an actor, broken down by ability
    pub fn damage_by_ability(&self, actor: &str) -> HashMap<String, f32> {
        let mut totals = HashMap::new();
        for entry in self.typed_entries(CombatLogEventType::Damage) {
            let Some(data) = &entry.data else { continue };
            if data.source.as_deref() == Some(actor) {
                if let Some(ability) = &data.ability {
                    *totals.entry(ability.clone()).or_insert(0.0) += data.amount;
                }
            }
        }
        totals
    }

    /// Total healing done by an actor, broken down by ability
    pub fn healing_by_ability(&self, actor: &str) -> HashMap<String, f32> {
        let mut totals = HashMap::new();
        for entry in self.typed_entries(CombatLogEventType::Healing) {
            let Some(data) = &entry.data else { continue };
            if data.source.as_deref() == Some(actor) {
                if let Some(ability) = &data.ability {
                    *totals.entry(ability.clone()).or_insert(0.0) += data.amount;
                }
            }
        }
        totals
    }

    /// Total damage an actor dealt across all abilities
    pub fn total_damage_dealt(&self, actor: &str) -> f32 {
        self.typed_entries(CombatLogEventType::Damage)
            .filter_map(|e| e.data.as_ref())
            .filter(|d| d.source.as_deref() == Some(actor))
            .map(|d| d.amount)
            .sum()
    }

    /// Total damage an actor received
    pub fn total_damage_taken(&self, actor: &str) -> f32 {
        self.typed_entries(CombatLogEventType::Damage)
            .filter_map(|e| e.data.as_ref())
            .filter(|d| d.target.as_deref() == Some(actor))
            .map(|d| d.amount)
            .sum()
    }

    /// Total healing an actor produced
    pub fn total_healing_done(&self, actor: &str) -> f32 {
        self.typed_entries(CombatLogEventType::Healing)
            .filter_map(|e| e.data.as_ref())
            .filter(|d| d.source.as_deref() == Some(actor))
            .map(|d| d.amount)
            .sum()
    }

    /// Number of killing blows an actor landed
    pub fn killing_blows(&self, actor: &str) -> usize {
        self.typed_entries(CombatLogEventType::Damage)
            .filter_map(|e| e.data.as_ref())
            .filter(|d| d.killing_blow && d.source.as_deref() == Some(actor))
            .count()
    }

    /// Whether an actor has no death entry
    pub fn actor_survived(&self, actor: &str) -> bool {
        !self
            .typed_entries(CombatLogEventType::Death)
            .filter_map(|e| e.data.as_ref())
            .any(|d| d.target.as_deref() == Some(actor))
    }

    /// Cast timeline for an actor: (timestamp, ability name)
    pub fn casts_for(&self, actor: &str) -> Vec<(f32, &str)> {
        self.typed_entries(CombatLogEventType::AbilityCast)
            .filter_map(|e| {
                let data = e.data.as_ref()?;
                if data.source.as_deref() != Some(actor) {
                    return None;
                }
                Some((e.timestamp, data.ability.as_deref()?))
            })
            .collect()
    }

    // ===== Filtering =====

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.typed_entries(event_type).collect()
    }

    /// Get only HP-changing events (damage and healing)
    pub fn hp_changes_only(&self) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.event_type,
                    CombatLogEventType::Damage | CombatLogEventType::Healing
                )
            })
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    fn typed_entries(
        &self,
        event_type: CombatLogEventType,
    ) -> impl Iterator<Item = &CombatLogEntry> {
        self.entries
            .iter()
            .filter(move |e| e.event_type == event_type)
    }
}

/// Advance the log clock. Runs first in the upkeep phase so everything logged
/// during a tick shares one timestamp.
pub fn advance_log_time(time: Res<Time>, mut log: ResMut<CombatLog>) {
    log.encounter_time += time.delta_secs();
}
