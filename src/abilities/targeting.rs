//! Target Acquisition
//!
//! Targeting runs over immutable snapshots taken at resolution time, never
//! over live world queries, so acquisition and filtering see one consistent
//! view of the encounter. All four strategies produce a target set; pointer
//! suspension is handled by the cast pipeline before acquisition runs.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::abilities::config::TargetingSpec;

/// Working size for target sets; encounters rarely put more actors than this
/// inside one area of effect.
pub const TYPICAL_TARGET_COUNT: usize = 8;

pub type TargetSet = SmallVec<[TargetSnapshot; TYPICAL_TARGET_COUNT]>;

/// One living, damageable actor as seen at resolution time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSnapshot {
    pub entity: Entity,
    pub position: Vec3,
    pub team: Option<u8>,
}

/// The caster as seen at resolution time.
#[derive(Clone, Copy, Debug)]
pub struct CasterSnapshot {
    pub entity: Entity,
    pub position: Vec3,
    pub team: Option<u8>,
    /// The caster's designated combat target, if any
    pub designated_target: Option<Entity>,
}

impl CasterSnapshot {
    fn as_target(&self) -> TargetSnapshot {
        TargetSnapshot {
            entity: self.entity,
            position: self.position,
            team: self.team,
        }
    }
}

/// Produce the raw target set for a strategy.
///
/// `candidates` must already be restricted to living, damageable actors; a
/// designated target that died is therefore absent and yields an empty set.
/// Point strategies yield an empty set when no point was captured.
pub fn acquire_targets(
    spec: &TargetingSpec,
    caster: &CasterSnapshot,
    point: Option<Vec3>,
    candidates: &[TargetSnapshot],
) -> TargetSet {
    match spec {
        // Point-only: the effects act on the location, not on actors
        TargetingSpec::PointOnGround { .. } => TargetSet::new(),
        TargetingSpec::AreaAroundPoint { radius, .. } => {
            let Some(center) = point else {
                return TargetSet::new();
            };
            candidates
                .iter()
                .filter(|c| c.position.distance(center) <= *radius)
                .copied()
                .collect()
        }
        TargetingSpec::CurrentTarget => {
            let Some(designated) = caster.designated_target else {
                return TargetSet::new();
            };
            candidates
                .iter()
                .find(|c| c.entity == designated)
                .map(|c| TargetSet::from_elem(*c, 1))
                .unwrap_or_default()
        }
        TargetingSpec::CasterSelf => TargetSet::from_elem(caster.as_target(), 1),
    }
}
