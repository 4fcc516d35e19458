//! Input source boundary.
//!
//! The engine polls a token-level view of the input device: which tokens went
//! down this tick, plus a monotonic clock for the key-sequencer time limit.

use std::collections::HashSet;

use crate::combo::components::keys::InputToken;

pub trait InputSource {
    /// True if `token` was pressed this tick.
    fn is_token_down(&self, token: InputToken) -> bool;

    /// True if any token at all was pressed this tick.
    fn any_token_down(&self) -> bool;

    /// Monotonic clock in seconds.
    fn now(&self) -> f32;
}

/// Deterministic input double: the test (or demo) presses tokens for the
/// current tick and advances the clock explicitly.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    pressed: HashSet<InputToken>,
    time: f32,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `token` as pressed for the current tick.
    pub fn press(&mut self, token: InputToken) {
        self.pressed.insert(token);
    }

    /// Release everything (call at the end of each tick).
    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    /// Advance the clock by one tick.
    pub fn advance(&mut self, tick_delta: f32) {
        self.time += tick_delta;
    }
}

impl InputSource for ScriptedInput {
    fn is_token_down(&self, token: InputToken) -> bool {
        self.pressed.contains(&token)
    }

    fn any_token_down(&self) -> bool {
        !self.pressed.is_empty()
    }

    fn now(&self) -> f32 {
        self.time
    }
}
