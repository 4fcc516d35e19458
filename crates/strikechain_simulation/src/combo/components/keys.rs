//! Input-phrase matching.
//!
//! A `KeySequencer` holds a fixed phrase of input tokens and a live FIFO copy
//! that is consumed as the player reproduces the phrase. Every tick it reports
//! one of four states; the executor state machines key off those states.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::combo::input::InputSource;

/// One discrete input token (button, key, gesture id).
///
/// Opaque to the engine; the embedding game decides what the values mean.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputToken(pub u16);

/// How a combo consumes its phrase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceMode {
    /// The whole phrase must land before anything plays (rhythm-gated).
    Full,
    /// Each token fires the next chain link, but only inside the current
    /// segment's link window.
    PartialTimed,
    /// Recognized tokens are queued as pending actions and drained during
    /// timing-safe neutral windows, so rapid input is never dropped.
    PartialBuffered,
}

/// Per-tick verdict from the sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceState {
    /// The expected token landed and more of the phrase remains.
    Success,
    /// Wrong stroke or timeout; the phrase restarts.
    Interrupted,
    /// Nothing relevant happened this tick.
    Neutral,
    /// The final token of the phrase landed.
    Completed,
}

/// Matches a live input stream against a fixed token phrase.
#[derive(Debug, Clone)]
pub struct KeySequencer {
    phrase: Vec<InputToken>,
    queue: VecDeque<InputToken>,
    mode: SequenceMode,
    time_limit_enabled: bool,
    time_limit: f32,
    /// Baseline for the time limit: timestamp of the last accepted token.
    timer: f32,
}

impl KeySequencer {
    pub fn new(
        phrase: Vec<InputToken>,
        mode: SequenceMode,
        time_limit_enabled: bool,
        time_limit: f32,
    ) -> Self {
        Self {
            phrase,
            queue: VecDeque::new(),
            mode,
            time_limit_enabled,
            time_limit,
            timer: 0.0,
        }
    }

    /// Fill the live queue from the phrase and record the timer baseline.
    /// Must run once before `listen`.
    pub fn setup(&mut self, now: f32) {
        self.queue.clear();
        self.queue.extend(self.phrase.iter().copied());
        self.timer = now;
    }

    pub fn phrase_len(&self) -> usize {
        self.phrase.len()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn mode(&self) -> SequenceMode {
        self.mode
    }

    /// Force the consumption mode (the executor downgrades to `Full` when the
    /// phrase is longer than the segment list).
    pub(crate) fn set_mode(&mut self, mode: SequenceMode) {
        self.mode = mode;
    }

    /// Process this tick's input against the phrase.
    ///
    /// `ignore_this_tick` parks the sequencer in `Neutral` without consuming
    /// input or advancing the timer (used while a segment is outside its link
    /// window).
    pub fn listen(&mut self, input: &dyn InputSource, ignore_this_tick: bool) -> SequenceState {
        if ignore_this_tick {
            return SequenceState::Neutral;
        }

        let now = input.now();

        if self.time_limit_enabled && now - self.timer > self.time_limit {
            // Ran out of time.
            self.reset(now);
            return SequenceState::Interrupted;
        }

        if let Some(&expected) = self.queue.front() {
            if input.is_token_down(expected) {
                self.queue.pop_front();
                self.timer = now;

                if self.mode != SequenceMode::Full {
                    if !self.queue.is_empty() {
                        return SequenceState::Success;
                    }

                    self.reset(now);
                    return SequenceState::Completed;
                }
            } else if input.any_token_down() {
                // Incorrect stroke.
                self.reset(now);
                return SequenceState::Interrupted;
            }
        }

        if !self.queue.is_empty() {
            return SequenceState::Neutral;
        }

        self.reset(now);
        SequenceState::Completed
    }

    /// Buffered variant: no time limit, and a wrong stroke burns one token
    /// instead of restarting the phrase.
    pub fn buffered_listen(&mut self, input: &dyn InputSource) -> SequenceState {
        let Some(&expected) = self.queue.front() else {
            return SequenceState::Neutral;
        };

        if input.is_token_down(expected) {
            self.queue.pop_front();
            return if self.queue.is_empty() {
                SequenceState::Completed
            } else {
                SequenceState::Success
            };
        }

        if !input.any_token_down() {
            return SequenceState::Neutral;
        }

        // Wrong stroke: drop-and-penalize.
        self.queue.pop_front();
        SequenceState::Interrupted
    }

    /// Refill the live queue from the phrase and rebase the timer.
    ///
    /// The refill is skipped when the queue never moved (cheap dirty check).
    pub fn reset(&mut self, now: f32) {
        if self.queue.len() != self.phrase.len() {
            self.queue.clear();
            self.queue.extend(self.phrase.iter().copied());
        }

        self.timer = now;
    }
}
