//! Target Filter Chain
//!
//! Filters are pure functions over snapshots: each stage takes the set the
//! previous stage produced and can only remove entries. Running the same
//! chain twice over the same snapshot gives the same result, so resolution
//! can re-evaluate freely.

use bevy::prelude::*;

use crate::abilities::config::{FilterSpec, TeamRelation};
use crate::abilities::targeting::{TargetSet, TargetSnapshot};

/// Everything a filter stage may consult besides the targets themselves.
#[derive(Clone, Copy, Debug)]
pub struct FilterContext {
    pub caster: Entity,
    pub caster_position: Vec3,
    pub caster_team: Option<u8>,
    /// Captured point for pointer-driven casts
    pub point: Option<Vec3>,
}

fn keep(spec: &FilterSpec, ctx: &FilterContext, target: &TargetSnapshot) -> bool {
    match spec {
        FilterSpec::WithinDistance { range, from_point } => {
            let origin = match (from_point, ctx.point) {
                (true, Some(point)) => point,
                _ => ctx.caster_position,
            };
            target.position.distance(origin) <= *range
        }
        // Teamless actors are neutral and never pass a faction filter
        FilterSpec::Faction { relation } => match (ctx.caster_team, target.team) {
            (Some(caster_team), Some(target_team)) => match relation {
                TeamRelation::Allies => caster_team == target_team,
                TeamRelation::Hostile => caster_team != target_team,
            },
            _ => false,
        },
        FilterSpec::ExcludeCaster => target.entity != ctx.caster,
    }
}

/// Run the chain in order, each stage narrowing the set
pub fn apply_filters(specs: &[FilterSpec], ctx: &FilterContext, mut targets: TargetSet) -> TargetSet {
    for spec in specs {
        targets.retain(|t| keep(spec, ctx, t));
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn snapshot(index: u32, position: Vec3, team: Option<u8>) -> TargetSnapshot {
        TargetSnapshot {
            entity: Entity::from_raw(index),
            position,
            team,
        }
    }

    fn ctx() -> FilterContext {
        FilterContext {
            caster: Entity::from_raw(100),
            caster_position: Vec3::ZERO,
            caster_team: Some(1),
            point: None,
        }
    }

    #[test]
    fn test_within_distance_measures_from_caster() {
        let targets: TargetSet = smallvec![
            snapshot(1, Vec3::new(2.0, 0.0, 0.0), Some(2)),
            snapshot(2, Vec3::new(9.0, 0.0, 0.0), Some(2)),
        ];
        let specs = [FilterSpec::WithinDistance {
            range: 5.0,
            from_point: false,
        }];

        let kept = apply_filters(&specs, &ctx(), targets);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].entity, Entity::from_raw(1));
    }

    #[test]
    fn test_within_distance_from_point_falls_back_to_caster() {
        let targets: TargetSet = smallvec![snapshot(1, Vec3::new(2.0, 0.0, 0.0), Some(2))];
        let specs = [FilterSpec::WithinDistance {
            range: 1.0,
            from_point: true,
        }];

        // No captured point: origin falls back to the caster position
        let kept = apply_filters(&specs, &ctx(), targets.clone());
        assert!(kept.is_empty());

        let mut with_point = ctx();
        with_point.point = Some(Vec3::new(2.0, 0.0, 0.0));
        let kept = apply_filters(&specs, &with_point, targets);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_faction_hostile_keeps_other_teams_only() {
        let targets: TargetSet = smallvec![
            snapshot(1, Vec3::ZERO, Some(1)),
            snapshot(2, Vec3::ZERO, Some(2)),
            snapshot(3, Vec3::ZERO, None),
        ];
        let specs = [FilterSpec::Faction {
            relation: TeamRelation::Hostile,
        }];

        let kept = apply_filters(&specs, &ctx(), targets);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].entity, Entity::from_raw(2));
    }

    #[test]
    fn test_faction_allies_keeps_own_team_including_caster() {
        let targets: TargetSet = smallvec![
            snapshot(100, Vec3::ZERO, Some(1)),
            snapshot(2, Vec3::ZERO, Some(2)),
        ];
        let specs = [FilterSpec::Faction {
            relation: TeamRelation::Allies,
        }];

        let kept = apply_filters(&specs, &ctx(), targets);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].entity, Entity::from_raw(100));
    }

    #[test]
    fn test_exclude_caster() {
        let targets: TargetSet = smallvec![
            snapshot(100, Vec3::ZERO, Some(1)),
            snapshot(2, Vec3::ZERO, Some(2)),
        ];
        let specs = [FilterSpec::ExcludeCaster];

        let kept = apply_filters(&specs, &ctx(), targets);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].entity, Entity::from_raw(2));
    }

    #[test]
    fn test_chain_narrows_in_order_and_never_adds() {
        let targets: TargetSet = smallvec![
            snapshot(1, Vec3::new(1.0, 0.0, 0.0), Some(2)),
            snapshot(2, Vec3::new(2.0, 0.0, 0.0), Some(1)),
            snapshot(3, Vec3::new(50.0, 0.0, 0.0), Some(2)),
            snapshot(100, Vec3::ZERO, Some(1)),
        ];
        let specs = [
            FilterSpec::WithinDistance {
                range: 10.0,
                from_point: false,
            },
            FilterSpec::Faction {
                relation: TeamRelation::Hostile,
            },
            FilterSpec::ExcludeCaster,
        ];

        let input_len = targets.len();
        let kept = apply_filters(&specs, &ctx(), targets);
        assert!(kept.len() <= input_len);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].entity, Entity::from_raw(1));
    }

    #[test]
    fn test_filters_are_deterministic_over_same_snapshot() {
        let targets: TargetSet = smallvec![
            snapshot(1, Vec3::new(1.0, 0.0, 0.0), Some(2)),
            snapshot(2, Vec3::new(8.0, 0.0, 0.0), Some(2)),
        ];
        let specs = [FilterSpec::WithinDistance {
            range: 5.0,
            from_point: false,
        }];

        let first = apply_filters(&specs, &ctx(), targets.clone());
        let second = apply_filters(&specs, &ctx(), targets);
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].entity, second[0].entity);
    }

    #[test]
    fn test_empty_chain_keeps_everything() {
        let targets: TargetSet = smallvec![snapshot(1, Vec3::ZERO, None)];
        let kept = apply_filters(&[], &ctx(), targets);
        assert_eq!(kept.len(), 1);
    }
}
