//! Combat events
//!
//! Defines the events that flow between the ability pipeline, the combat
//! loop, and the attribute systems. Damage and healing are applied by the
//! systems in `health.rs`, never directly at the call site, so every health
//! change passes through here and is visible to the combat log.

use bevy::prelude::*;

use crate::abilities::config::AbilityKey;

/// An actor asking to start an exclusive action.
///
/// All action starts funnel through this event so pre-emption of the previous
/// action happens in one place, in arrival order.
#[derive(Event, Debug, Clone)]
pub struct ActionRequest {
    /// The actor the action belongs to
    pub actor: Entity,
    /// What the actor wants to do
    pub kind: RequestedAction,
}

/// The kinds of exclusive action an actor can request.
#[derive(Debug, Clone)]
pub enum RequestedAction {
    /// Cast an ability (the `Use` entry point of the cast pipeline)
    Cast(AbilityKey),
    /// Auto-attack a target until cancelled or the target dies
    Attack(Entity),
    /// Move to a point at a fraction of max speed
    MoveTo { point: Vec3, speed_fraction: f32 },
    /// Cancel whatever exclusive action is running
    Cancel,
}

/// A pointer click resolved against the ground by the host.
///
/// The gameplay core never raycasts; whatever drives it (a windowed host or a
/// scripted scenario) resolves the cursor against walkable terrain and sends
/// the result here. `None` is a click that hit nothing.
#[derive(Event, Debug, Clone, Copy)]
pub struct PointerClickEvent {
    pub point: Option<Vec3>,
}

/// Event fired when damage should be applied
#[derive(Event, Debug, Clone)]
pub struct DamageEvent {
    /// Entity dealing the damage
    pub instigator: Entity,
    /// Entity receiving the damage
    pub target: Entity,
    /// Amount of damage
    pub amount: f32,
    /// Name of the ability that caused the damage (None for auto-attack)
    pub ability_name: Option<String>,
}

/// Event fired when healing should be applied
#[derive(Event, Debug, Clone)]
pub struct HealingEvent {
    /// Entity doing the healing
    pub source: Entity,
    /// Entity receiving the healing
    pub target: Entity,
    /// Amount healed
    pub amount: f32,
    /// Name of the healing ability (None for non-ability sources like pickups)
    pub ability_name: Option<String>,
}

/// Event fired once when an actor's health first reaches zero
#[derive(Event, Debug, Clone)]
pub struct DeathEvent {
    /// Entity that died
    pub victim: Entity,
    /// Entity that dealt the killing blow, if it still exists
    pub instigator: Option<Entity>,
}

/// Event fired when an actor's derived level rises
#[derive(Event, Debug, Clone)]
pub struct LevelUpEvent {
    pub entity: Entity,
    pub new_level: u32,
}

/// Fire-and-forget animation cue for the host's animation layer.
///
/// The core emits these (attack windups, ability gestures) and never waits on
/// them; a headless run simply drops them on the floor.
#[derive(Event, Debug, Clone)]
pub struct AnimationCueEvent {
    pub entity: Entity,
    pub trigger: String,
}

/// Enables or disables every AI controller in an aggro group at once.
#[derive(Event, Debug, Clone)]
pub struct AggroActivationEvent {
    /// The entity carrying the `AggroGroup` component
    pub group: Entity,
    pub active: bool,
}
