//! Gameplay Constants
//!
//! Centralized location for magic numbers used throughout the combat and
//! ability systems. This makes it easier to tune balance and ensures
//! consistency between systems and scenario defaults.

// ============================================================================
// Auto-Attack
// ============================================================================

/// Default seconds between auto-attack swings.
pub const DEFAULT_ATTACK_INTERVAL: f32 = 1.0;

/// Radius searched for a replacement target when the current one dies.
pub const AUTO_ATTACK_SEARCH_RADIUS: f32 = 4.0;

/// Delay between the attack trigger and the damage landing, standing in for
/// the animation-driven impact timing of a windup swing.
pub const ATTACK_IMPACT_DELAY: f32 = 0.4;

// ============================================================================
// Weapons
// ============================================================================

/// Range of the unarmed/default weapon in units.
pub const DEFAULT_WEAPON_RANGE: f32 = 2.0;

/// Damage of the unarmed/default weapon.
pub const DEFAULT_WEAPON_DAMAGE: f32 = 5.0;

// ============================================================================
// Projectiles
// ============================================================================

/// Distance at which a projectile counts as hitting its target.
pub const PROJECTILE_HIT_RADIUS: f32 = 0.5;

/// Vertical lift applied when aiming at an entity so projectiles fly toward
/// center of mass rather than the feet.
pub const CENTER_OF_MASS_LIFT: f32 = 1.0;

/// Seconds an impacted projectile lingers before despawning.
pub const PROJECTILE_LIFE_AFTER_IMPACT: f32 = 2.0;

/// Seconds before a projectile that never impacts is despawned.
pub const PROJECTILE_MAX_LIFETIME: f32 = 10.0;

// ============================================================================
// Movement
// ============================================================================

/// Maximum movement speed in units per second.
pub const MOVER_MAX_SPEED: f32 = 6.0;

/// Longest distance a mover will agree to travel in one command. Stands in
/// for the pathfinding cap of the original navigation layer.
pub const MOVER_MAX_PATH_LENGTH: f32 = 40.0;

/// Distance at which a mover considers itself arrived.
pub const MOVER_ARRIVE_TOLERANCE: f32 = 0.3;

// ============================================================================
// AI Controller
// ============================================================================

/// Distance at which an AI controller aggros on its quarry.
pub const AI_CHASE_DISTANCE: f32 = 5.0;

/// Seconds an AI lingers in suspicion after losing sight of its quarry.
pub const AI_SUSPICION_TIME: f32 = 3.0;

/// Seconds an AI stays aggravated after being shouted at or hit.
pub const AI_AGGRO_COOLDOWN: f32 = 5.0;

/// Distance at which a patrol waypoint counts as reached.
pub const AI_WAYPOINT_TOLERANCE: f32 = 1.0;

/// Seconds an AI dwells at each patrol waypoint.
pub const AI_WAYPOINT_DWELL_TIME: f32 = 3.0;

/// Movement speed fraction while patrolling (full speed while chasing).
pub const AI_PATROL_SPEED_FRACTION: f32 = 0.2;

/// Radius of the aggro shout that pulls nearby allies into a fight.
pub const AI_SHOUT_DISTANCE: f32 = 5.0;

// ============================================================================
// Attributes
// ============================================================================

/// Percentage of new max health guaranteed after a level up.
pub const LEVEL_UP_HEALTH_FLOOR_PCT: f32 = 70.0;

/// Percentage of new max mana guaranteed after a level up.
pub const LEVEL_UP_MANA_FLOOR_PCT: f32 = 70.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combat_constants_are_positive() {
        assert!(DEFAULT_ATTACK_INTERVAL > 0.0);
        assert!(AUTO_ATTACK_SEARCH_RADIUS > 0.0);
        assert!(PROJECTILE_HIT_RADIUS > 0.0);
        assert!(MOVER_MAX_SPEED > 0.0);
    }

    #[test]
    fn test_impact_lands_within_attack_interval() {
        // A swing must land before the next one can be triggered, otherwise
        // impacts would queue up behind each other.
        assert!(ATTACK_IMPACT_DELAY < DEFAULT_ATTACK_INTERVAL);
    }

    #[test]
    fn test_regen_floors_are_percentages() {
        assert!((0.0..=100.0).contains(&LEVEL_UP_HEALTH_FLOOR_PCT));
        assert!((0.0..=100.0).contains(&LEVEL_UP_MANA_FLOOR_PCT));
    }

    #[test]
    fn test_ai_distances_are_sane() {
        assert!(AI_WAYPOINT_TOLERANCE > 0.0);
        assert!(AI_CHASE_DISTANCE > AI_WAYPOINT_TOLERANCE);
        assert!((0.0..=1.0).contains(&AI_PATROL_SPEED_FRACTION));
    }
}
