//! Cooperative pause gate.
//!
//! The level-transition modal must freeze the world: while the gate is
//! engaged, no time-advancing worker may mutate simulation time. A spin flag
//! would satisfy that; a condvar gives the same observable contract without
//! burning a core, provided every release broadcasts so that both resume and
//! quit-during-pause wake all waiters.

use std::sync::{Condvar, Mutex, PoisonError};

/// A broadcast pause gate observed by the ball and AI workers each tick.
#[derive(Debug, Default)]
pub struct PauseGate {
    halted: Mutex<bool>,
    resumed: Condvar,
}

impl PauseGate {
    /// A released gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engage the gate. Workers reaching [`PauseGate::wait_released`] block
    /// until the next release.
    pub fn engage(&self) {
        *self.flag() = true;
    }

    /// Release the gate and wake every waiter. Called on resume and on any
    /// shutdown path, so a quit during the modal cannot strand a worker.
    pub fn release(&self) {
        *self.flag() = false;
        self.resumed.notify_all();
    }

    /// Whether the gate is currently engaged.
    pub fn is_engaged(&self) -> bool {
        *self.flag()
    }

    /// Block while the gate is engaged. Returns immediately when released.
    pub fn wait_released(&self) {
        let mut halted = self.flag();
        while *halted {
            halted = self
                .resumed
                .wait(halted)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn flag(&self) -> std::sync::MutexGuard<'_, bool> {
        self.halted.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
