//! Actor stats, experience, and leveling
//!
//! `BaseStats` ties an actor to a class and level in the progression table,
//! `Experience` accumulates kill rewards, and `recalculate_levels` promotes
//! actors whose experience crosses the next threshold. Weapon bonuses enter
//! stat queries as [`StatModifiers`] so the table itself stays immutable.

use bevy::prelude::*;

pub mod progression;

pub use progression::{
    load_progression, CharacterClass, ClassProgression, Progression, ProgressionConfig,
    ProgressionPlugin, Stat,
};

use crate::combat::events::LevelUpEvent;

/// Flat and percentage bonuses applied on top of a base stat value.
///
/// The only modifier source today is the equipped weapon; the split mirrors
/// how gear contributes "+X damage" and "+Y% damage" separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatModifiers {
    pub additive: f32,
    pub percentage: f32,
}

impl StatModifiers {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Links an actor to its class and level in the progression table.
#[derive(Component, Debug, Clone)]
pub struct BaseStats {
    /// Class row used for every curve lookup
    pub class: CharacterClass,
    /// Level used when the actor has no Experience component (NPCs)
    pub starting_level: u32,
    /// Current effective level; kept in sync by `recalculate_levels`
    pub current_level: u32,
    /// Whether gear modifiers apply to stat queries (players only)
    pub use_modifiers: bool,
}

impl BaseStats {
    pub fn new(class: CharacterClass, starting_level: u32) -> Self {
        Self {
            class,
            starting_level,
            current_level: starting_level,
            use_modifiers: false,
        }
    }

    pub fn with_modifiers(mut self) -> Self {
        self.use_modifiers = true;
        self
    }

    /// Look up a stat at the actor's current level, applying modifiers when
    /// this actor uses them: `(base + additive) * (1 + percentage / 100)`.
    pub fn stat(&self, progression: &Progression, stat: Stat, modifiers: StatModifiers) -> f32 {
        let base = progression.stat(stat, self.class, self.current_level);
        if !self.use_modifiers {
            return base;
        }
        (base + modifiers.additive) * (1.0 + modifiers.percentage / 100.0)
    }

    /// Derive the level from accumulated experience.
    ///
    /// Walks the `ExperienceToLevelUp` thresholds: the actor sits at the first
    /// level whose threshold its points have not yet reached, or one past the
    /// final threshold once every one is met.
    pub fn level_from_experience(&self, progression: &Progression, points: f32) -> u32 {
        let penultimate = progression.levels(Stat::ExperienceToLevelUp, self.class);
        if penultimate == 0 {
            return self.starting_level;
        }

        for level in 1..=penultimate {
            let threshold = progression.stat(Stat::ExperienceToLevelUp, self.class, level);
            if threshold > points {
                return level;
            }
        }

        penultimate + 1
    }
}

/// Accumulated experience points. Only actors that can level up carry this.
#[derive(Component, Debug, Clone, Default)]
pub struct Experience {
    points: f32,
}

impl Experience {
    pub fn new(points: f32) -> Self {
        Self { points }
    }

    pub fn points(&self) -> f32 {
        self.points
    }

    pub fn gain(&mut self, amount: f32) {
        self.points += amount;
    }

    /// Overwrite the total, used when restoring a saved actor.
    pub fn set_points(&mut self, points: f32) {
        self.points = points;
    }
}

/// Promote actors whose experience has crossed the next threshold.
///
/// Emits a `LevelUpEvent` per gained level batch; health and mana react to it
/// with their regeneration floors. Levels never go down, matching the
/// monotonic experience total.
pub fn recalculate_levels(
    progression: Res<Progression>,
    mut actors: Query<(Entity, &mut BaseStats, &Experience)>,
    mut level_ups: EventWriter<LevelUpEvent>,
) {
    for (entity, mut stats, experience) in actors.iter_mut() {
        let derived = stats.level_from_experience(&progression, experience.points());
        if derived > stats.current_level {
            stats.current_level = derived;
            info!("Actor {:?} reached level {}", entity, derived);
            level_ups.send(LevelUpEvent {
                entity,
                new_level: derived,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_progression() -> Progression {
        let mut stats = HashMap::new();
        stats.insert(Stat::Health, vec![100.0, 120.0, 150.0]);
        stats.insert(Stat::Damage, vec![5.0, 7.0, 10.0]);
        stats.insert(Stat::ExperienceToLevelUp, vec![10.0, 25.0]);

        let mut classes = HashMap::new();
        classes.insert(CharacterClass::Player, ClassProgression { stats });

        Progression::new(ProgressionConfig { classes })
    }

    #[test]
    fn test_stat_without_modifiers() {
        let progression = test_progression();
        let stats = BaseStats::new(CharacterClass::Player, 2);
        assert_eq!(
            stats.stat(&progression, Stat::Damage, StatModifiers::none()),
            7.0
        );
    }

    #[test]
    fn test_stat_with_modifiers() {
        let progression = test_progression();
        let stats = BaseStats::new(CharacterClass::Player, 1).with_modifiers();
        let modifiers = StatModifiers {
            additive: 5.0,
            percentage: 10.0,
        };
        // (5 base + 5 weapon) * 1.1
        assert_eq!(stats.stat(&progression, Stat::Damage, modifiers), 11.0);
    }

    #[test]
    fn test_modifiers_ignored_when_disabled() {
        let progression = test_progression();
        let stats = BaseStats::new(CharacterClass::Player, 1);
        let modifiers = StatModifiers {
            additive: 100.0,
            percentage: 100.0,
        };
        assert_eq!(stats.stat(&progression, Stat::Damage, modifiers), 5.0);
    }

    #[test]
    fn test_level_from_experience_thresholds() {
        let progression = test_progression();
        let stats = BaseStats::new(CharacterClass::Player, 1);

        assert_eq!(stats.level_from_experience(&progression, 0.0), 1);
        assert_eq!(stats.level_from_experience(&progression, 9.9), 1);
        assert_eq!(stats.level_from_experience(&progression, 10.0), 2);
        assert_eq!(stats.level_from_experience(&progression, 24.0), 2);
        // Both thresholds met: one past the final threshold
        assert_eq!(stats.level_from_experience(&progression, 25.0), 3);
        assert_eq!(stats.level_from_experience(&progression, 9999.0), 3);
    }

    #[test]
    fn test_level_without_thresholds_uses_starting_level() {
        let progression = test_progression();
        // Grunt has no class entry at all in this table
        let stats = BaseStats::new(CharacterClass::Grunt, 4);
        assert_eq!(stats.level_from_experience(&progression, 500.0), 4);
    }
}
