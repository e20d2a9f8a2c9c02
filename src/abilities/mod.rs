//! Ability Pipeline
//!
//! Data-driven abilities: an immutable [`config::AbilityDefinition`] composes
//! one targeting strategy, an ordered filter chain, and an ordered effect
//! list. The [`cast`] module drives the state machine from request through
//! effect completion; [`cooldowns`] gates repeat casts per actor.

pub mod cast;
pub mod config;
pub mod cooldowns;
pub mod effects;
pub mod filters;
pub mod targeting;

pub use cast::{CastContext, CastPhase};
pub use config::{AbilityConfigPlugin, AbilityDefinitions, AbilityKey};
pub use cooldowns::CooldownStore;
