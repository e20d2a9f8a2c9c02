//! Combat Loop
//!
//! The combat side of the gameplay core: health and mana attributes,
//! auto-attacking fighters, projectiles, kinematic movement, AI controllers,
//! weapon tables and pickups, the exclusive-action slot, and the combat log.
//!
//! [`CombatPlugin`] wires the whole simulation together, abilities included,
//! in three ordered phases per tick (see [`systems::SimulationPhase`]).

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub mod actions;
pub mod ai;
pub mod events;
pub mod fighter;
pub mod health;
pub mod log;
pub mod movement;
pub mod pool;
pub mod projectiles;
pub mod systems;
pub mod weapons;

pub use actions::CurrentAction;
pub use health::Health;
pub use pool::Mana;

use events::{
    ActionRequest, AggroActivationEvent, AnimationCueEvent, DamageEvent, DeathEvent, HealingEvent,
    LevelUpEvent, PointerClickEvent,
};

/// Which side of an encounter an actor fights for. Actors without a team, or
/// on different teams, are hostile to each other.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team(pub u8);

/// Whether actors on these teams fight each other. Only a shared team makes
/// two actors allies; teamless actors are hostile to everyone, each other
/// included.
pub fn teams_hostile(a: Option<u8>, b: Option<u8>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a != b,
        _ => true,
    }
}

/// Display name used by the combat log and reports.
#[derive(Component, Debug, Clone)]
pub struct ActorName(pub String);

/// Seeded random number generator for deterministic encounters.
///
/// With a seed, the same scenario always produces the same outcome. Without
/// one, system entropy is used.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed this generator was built from, if deterministic
    pub seed: Option<u64>,
}

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Random f32 in `[0.0, 1.0)`
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Plugin wiring the full simulation: events, the combat log, the phase
/// ordering, and every core system (abilities included).
///
/// Definition tables (`AbilityDefinitions`, `WeaponDefinitions`,
/// `Progression`) are not loaded here; add the config plugins or insert
/// hand-built tables before the first update.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ActionRequest>()
            .add_event::<PointerClickEvent>()
            .add_event::<DamageEvent>()
            .add_event::<HealingEvent>()
            .add_event::<DeathEvent>()
            .add_event::<LevelUpEvent>()
            .add_event::<AnimationCueEvent>()
            .add_event::<AggroActivationEvent>()
            .init_resource::<log::CombatLog>()
            .init_resource::<GameRng>();

        systems::configure_simulation_phases(app);
        systems::add_core_simulation_systems(app);
    }
}
