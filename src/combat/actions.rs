//! Exclusive Action Slot
//!
//! Each actor does one thing at a time: cast, attack, or move. Starting a new
//! action displaces whatever occupied the slot, and the displaced action is
//! cancelled in the same tick by the intent system that caused it.
//!
//! A cast is tracked by the entity id of its context, never by reference: if
//! the context entity is gone by the time the slot is displaced, the cancel
//! simply has nothing left to do.

use bevy::prelude::*;

/// What an actor's exclusive slot is occupied by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// Casting; holds the id of the cast context entity
    Cast(Entity),
    /// Auto-attacking the fighter's current target
    Attack,
    /// Walking toward a destination
    Move,
}

/// The one-at-a-time action slot carried by every actor.
#[derive(Component, Debug, Default)]
pub struct CurrentAction {
    current: Option<ActionKind>,
}

impl CurrentAction {
    /// Occupy the slot, returning the displaced action so the caller can
    /// cancel it
    pub fn begin(&mut self, kind: ActionKind) -> Option<ActionKind> {
        self.current.replace(kind)
    }

    /// Empty the slot, returning what was in it
    pub fn clear(&mut self) -> Option<ActionKind> {
        self.current.take()
    }

    pub fn current(&self) -> Option<ActionKind> {
        self.current
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Whether the slot currently tracks the given cast context
    pub fn is_casting(&self, context: Entity) -> bool {
        self.current == Some(ActionKind::Cast(context))
    }

    /// Empty the slot only if it still tracks the given cast context. A cast
    /// that finishes after being displaced must not clear its successor.
    pub fn finish_cast(&mut self, context: Entity) {
        if self.is_casting(context) {
            self.current = None;
        }
    }
}
