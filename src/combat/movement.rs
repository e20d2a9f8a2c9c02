//! Kinematic Movement
//!
//! The [`Mover`] stands in for the original navigation layer: a destination,
//! a speed fraction, and a straight-line step toward the goal each tick.
//! `can_reach` approximates the navigation path-length cap with a straight
//! line bound, since pathfinding itself is an external collaborator.

use bevy::prelude::*;

use crate::constants::{MOVER_ARRIVE_TOLERANCE, MOVER_MAX_PATH_LENGTH, MOVER_MAX_SPEED};

/// Walks its actor toward a destination at a fraction of max speed.
#[derive(Component, Debug)]
pub struct Mover {
    /// Top speed in units per second
    pub max_speed: f32,
    /// Longest distance a single move command may cover
    pub max_path_length: f32,
    /// Distance at which the mover considers itself arrived
    pub arrive_tolerance: f32,
    destination: Option<Vec3>,
    speed_fraction: f32,
}

impl Default for Mover {
    fn default() -> Self {
        Self {
            max_speed: MOVER_MAX_SPEED,
            max_path_length: MOVER_MAX_PATH_LENGTH,
            arrive_tolerance: MOVER_ARRIVE_TOLERANCE,
            destination: None,
            speed_fraction: 1.0,
        }
    }
}

impl Mover {
    /// Head toward a point. The fraction is clamped to `0.0..=1.0`.
    pub fn move_to(&mut self, point: Vec3, speed_fraction: f32) {
        self.destination = Some(point);
        self.speed_fraction = speed_fraction.clamp(0.0, 1.0);
    }

    /// Drop the current destination
    pub fn stop(&mut self) {
        self.destination = None;
    }

    pub fn is_moving(&self) -> bool {
        self.destination.is_some()
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    /// Whether a move command from `from` to `to` would be accepted
    pub fn can_reach(&self, from: Vec3, to: Vec3) -> bool {
        from.distance(to) <= self.max_path_length
    }
}

/// Step every mover toward its destination and face the travel direction
pub fn apply_movement(time: Res<Time>, mut movers: Query<(&mut Transform, &mut Mover)>) {
    let delta = time.delta_secs();
    for (mut transform, mut mover) in movers.iter_mut() {
        let Some(destination) = mover.destination else {
            continue;
        };

        let offset = destination - transform.translation;
        let distance = offset.length();
        if distance <= mover.arrive_tolerance {
            mover.stop();
            continue;
        }

        let step = mover.max_speed * mover.speed_fraction * delta;
        let direction = offset / distance;
        if step >= distance {
            transform.translation = destination;
            mover.stop();
        } else {
            transform.translation += direction * step;
        }

        let flat = Vec3::new(direction.x, 0.0, direction.z);
        if flat.length_squared() > f32::EPSILON {
            transform.rotation = Quat::from_rotation_arc(Vec3::Z, flat.normalize());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_to_clamps_speed_fraction() {
        let mut mover = Mover::default();
        mover.move_to(Vec3::X, 2.5);
        assert_eq!(mover.speed_fraction, 1.0);
        mover.move_to(Vec3::X, -1.0);
        assert_eq!(mover.speed_fraction, 0.0);
    }

    #[test]
    fn test_stop_clears_destination() {
        let mut mover = Mover::default();
        mover.move_to(Vec3::new(3.0, 0.0, 0.0), 1.0);
        assert!(mover.is_moving());
        mover.stop();
        assert!(!mover.is_moving());
    }

    #[test]
    fn test_can_reach_bounds_path_length() {
        let mover = Mover::default();
        assert!(mover.can_reach(Vec3::ZERO, Vec3::new(MOVER_MAX_PATH_LENGTH, 0.0, 0.0)));
        assert!(!mover.can_reach(Vec3::ZERO, Vec3::new(MOVER_MAX_PATH_LENGTH + 1.0, 0.0, 0.0)));
    }
}
