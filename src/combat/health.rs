//! Health, Damage Application, and Death
//!
//! Damage and healing flow through events so every source (auto-attacks,
//! projectiles, ability effects) funnels into one application point. Death is
//! observed here and broadcast for the rest of the pipeline to react to.

use bevy::prelude::*;

use crate::combat::actions::CurrentAction;
use crate::combat::events::{DamageEvent, DeathEvent, HealingEvent, LevelUpEvent};
use crate::combat::fighter::Fighter;
use crate::combat::log::CombatLog;
use crate::combat::movement::Mover;
use crate::constants::LEVEL_UP_HEALTH_FLOOR_PCT;
use crate::stats::{BaseStats, Experience, Progression, Stat, StatModifiers};

/// Hit points for anything damageable.
#[derive(Component, Debug)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    /// Create at full health
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Apply damage, clamping at zero. Returns true when this call is the
    /// killing blow.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        self.is_dead()
    }

    /// Restore points up to the maximum, returning the amount applied
    pub fn heal(&mut self, amount: f32) -> f32 {
        let applied = amount.min(self.max - self.current);
        self.current += applied;
        applied
    }

    /// Raise the maximum for a new level and lift the current value to at
    /// least `floor_pct` percent of it
    pub fn set_level_maximum(&mut self, new_max: f32, floor_pct: f32) {
        self.max = new_max;
        self.current = self.current.max(new_max * floor_pct / 100.0);
    }

    /// Overwrite the current value, clamped to `0.0..=max`. Used by snapshot
    /// restoration.
    pub fn set_current(&mut self, value: f32) {
        self.current = value.clamp(0.0, self.max);
    }
}

/// Apply queued damage events to target health and detect killing blows
pub fn apply_damage_events(
    mut damage_events: EventReader<DamageEvent>,
    mut death_events: EventWriter<DeathEvent>,
    mut combat_log: ResMut<CombatLog>,
    mut targets: Query<&mut Health>,
) {
    for event in damage_events.read() {
        let Ok(mut health) = targets.get_mut(event.target) else {
            continue;
        };
        if health.is_dead() {
            continue;
        }

        let killing_blow = health.take_damage(event.amount);
        let source = combat_log.display_name(event.instigator);
        let target = combat_log.display_name(event.target);
        let ability = event
            .ability_name
            .clone()
            .unwrap_or_else(|| "Auto Attack".to_string());
        let message = format!(
            "{}'s {} hits {} for {:.0}",
            source, ability, target, event.amount
        );
        combat_log.log_damage(source, target, ability, event.amount, killing_blow, message);

        if killing_blow {
            death_events.send(DeathEvent {
                victim: event.target,
                instigator: Some(event.instigator),
            });
        }
    }
}

/// Apply queued healing events. Dead targets cannot be healed back up.
pub fn apply_healing_events(
    mut healing_events: EventReader<HealingEvent>,
    mut combat_log: ResMut<CombatLog>,
    mut targets: Query<&mut Health>,
) {
    for event in healing_events.read() {
        let Ok(mut health) = targets.get_mut(event.target) else {
            continue;
        };
        if health.is_dead() {
            continue;
        }

        let applied = health.heal(event.amount);
        if applied > 0.0 {
            let source = combat_log.display_name(event.source);
            let target = combat_log.display_name(event.target);
            let ability = event
                .ability_name
                .clone()
                .unwrap_or_else(|| "Pickup".to_string());
            let message = format!(
                "{}'s {} heals {} for {:.0}",
                source, ability, target, applied
            );
            combat_log.log_healing(source, target, ability, applied, message);
        }
    }
}

/// React to deaths: halt the victim's activity and award experience to the
/// killer when it can gain any
pub fn process_deaths(
    mut death_events: EventReader<DeathEvent>,
    mut combat_log: ResMut<CombatLog>,
    progression: Res<Progression>,
    mut victims: Query<(
        Option<&BaseStats>,
        Option<&mut CurrentAction>,
        Option<&mut Fighter>,
        Option<&mut Mover>,
    )>,
    mut killers: Query<&mut Experience>,
) {
    for event in death_events.read() {
        let victim = combat_log.display_name(event.victim);
        let killer = event.instigator.map(|e| combat_log.display_name(e));
        let message = match &killer {
            Some(killer) => format!("{} has been slain by {}", victim, killer),
            None => format!("{} has died", victim),
        };
        combat_log.log_death(victim, killer, message);

        if let Ok((stats, action, fighter, mover)) = victims.get_mut(event.victim) {
            if let Some(mut action) = action {
                action.clear();
            }
            if let Some(mut fighter) = fighter {
                fighter.stop();
            }
            if let Some(mut mover) = mover {
                mover.stop();
            }

            let reward = stats
                .map(|s| s.stat(&progression, Stat::ExperienceReward, StatModifiers::none()))
                .unwrap_or(0.0);
            if reward > 0.0 {
                if let Some(instigator) = event.instigator {
                    if let Ok(mut experience) = killers.get_mut(instigator) {
                        experience.gain(reward);
                    }
                }
            }
        }
    }
}

/// On level up, raise the health maximum to the new level's stat and apply
/// the restoration floor
pub fn restore_health_on_level_up(
    mut level_ups: EventReader<LevelUpEvent>,
    progression: Res<Progression>,
    mut fighters: Query<(&BaseStats, &mut Health)>,
) {
    for event in level_ups.read() {
        if let Ok((stats, mut health)) = fighters.get_mut(event.entity) {
            let new_max = stats.stat(&progression, Stat::Health, StatModifiers::none());
            health.set_level_maximum(new_max, LEVEL_UP_HEALTH_FLOOR_PCT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut health = Health::new(30.0);
        let killed = health.take_damage(100.0);
        assert!(killed);
        assert_eq!(health.current(), 0.0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_killing_blow_reported_once() {
        let mut health = Health::new(10.0);
        assert!(health.take_damage(10.0));
        assert!(!health.take_damage(5.0));
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut health = Health::new(100.0);
        health.take_damage(30.0);
        let applied = health.heal(50.0);
        assert_eq!(applied, 30.0);
        assert_eq!(health.current(), 100.0);
    }

    #[test]
    fn test_level_floor_lifts_low_health() {
        let mut health = Health::new(100.0);
        health.take_damage(90.0);

        health.set_level_maximum(100.0, 70.0);
        assert_eq!(health.current(), 70.0);
    }

    #[test]
    fn test_level_floor_keeps_high_health() {
        let mut health = Health::new(100.0);
        health.take_damage(5.0);

        health.set_level_maximum(100.0, 70.0);
        assert_eq!(health.current(), 95.0);
    }
}
