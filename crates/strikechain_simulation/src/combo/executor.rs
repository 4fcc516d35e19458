//! Combo executor: one combo's chain, sequencer and mode state machine.
//!
//! The executor owns the combo's segment table, its chain of links and its
//! `KeySequencer`, and runs one of three mode-specific state machines each
//! tick:
//!
//! - **Full** gates the whole phrase before anything plays.
//! - **PartialTimed** fires the next link the instant its token lands, but
//!   only inside the current segment's link window.
//! - **PartialBuffered** defers recognized tokens into a pending-action queue
//!   drained during timing-safe neutral windows, so rapid input during a
//!   cross-fade is never dropped.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combo::components::{
    AttackSegment, ChainLink, InputToken, KeySequencer, SequenceMode, SequenceState,
};
use crate::combo::events::{ComboCompleted, ComboEvent, EventBus};
use crate::combo::host::PlaybackHost;
use crate::combo::hub::{HubHandle, TickCtx};
use crate::logger;

/// Authored description of one combo, loaded once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComboConfig {
    pub name: String,
    /// Name of the playback-host layer the combo plays on.
    pub layer_name: String,
    pub segments: Vec<AttackSegment>,
    pub input_phrase: Vec<InputToken>,
    pub mode: SequenceMode,
    pub time_limit_enabled: bool,
    /// Seconds allowed between accepted tokens (Full / PartialTimed only).
    pub time_limit: f32,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            layer_name: String::new(),
            segments: Vec::new(),
            input_phrase: Vec::new(),
            mode: SequenceMode::PartialTimed,
            time_limit_enabled: true,
            time_limit: 2.0,
        }
    }
}

/// Why a combo failed to initialise. The hub logs these and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComboError {
    #[error("combo `{0}`: no segments configured")]
    NoSegments(String),
    #[error("combo `{0}`: empty input phrase")]
    EmptyPhrase(String),
    #[error("combo `{0}`: no layer name configured")]
    MissingLayerName(String),
    #[error("combo `{0}`: segment at index {1} has no name")]
    UnnamedSegment(String, usize),
    #[error("combo `{0}`: layer `{1}` not found on the playback host")]
    UnresolvedLayer(String, String),
}

/// Deferred step recognized by the buffered sequencer. Tagged data instead of
/// opaque callbacks so the queue stays inspectable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingAction {
    /// Advance to the next chain link.
    Link,
    /// Advance into the final chain link (the phrase is fully entered).
    CompleteCombo,
    /// Cancel and restore pre-execution state.
    Reset,
}

/// Runtime state machine for one combo.
#[derive(Debug)]
pub struct ComboExecutor {
    name: String,
    layer_name: String,
    layer: usize,

    segments: Vec<AttackSegment>,
    keys: KeySequencer,

    /// Chain links; templates index into `segments`.
    chain: Vec<ChainLink>,
    /// Consumable order of links (indices into `chain`).
    chain_queue: VecDeque<usize>,
    current_link: Option<usize>,
    current_segment: Option<usize>,

    /// Buffered mode only.
    actions: VecDeque<PendingAction>,

    ignore_input: bool,
    initialised: bool,
}

impl ComboExecutor {
    pub fn new(config: ComboConfig) -> Self {
        let ComboConfig {
            name,
            layer_name,
            segments,
            input_phrase,
            mode,
            time_limit_enabled,
            time_limit,
        } = config;

        Self {
            name,
            layer_name,
            layer: 0,
            segments,
            keys: KeySequencer::new(input_phrase, mode, time_limit_enabled, time_limit),
            chain: Vec::new(),
            chain_queue: VecDeque::new(),
            current_link: None,
            current_segment: None,
            actions: VecDeque::new(),
            ignore_input: false,
            initialised: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> SequenceMode {
        self.keys.mode()
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }

    pub fn chain_queue_len(&self) -> usize {
        self.chain_queue.len()
    }

    pub fn chain_link(&self, index: usize) -> Option<&ChainLink> {
        self.chain.get(index)
    }

    pub fn pending_actions(&self) -> impl Iterator<Item = &PendingAction> {
        self.actions.iter()
    }

    pub fn current_segment_name(&self) -> Option<&str> {
        self.current_segment
            .map(|idx| self.segments[idx].name.as_str())
    }

    /// Validate the config, resolve the target layer and build the chain.
    /// Must run exactly once before `update`.
    ///
    /// If the phrase is longer than the segment list the mode is forced to
    /// `Full`; otherwise the chain has one link per phrase token, with the
    /// last link absorbing all leftover segments.
    pub fn initialise(
        &mut self,
        host: &dyn PlaybackHost,
        now: f32,
    ) -> Result<(), ComboError> {
        if self.segments.is_empty() {
            let err = ComboError::NoSegments(self.name.clone());
            logger::log_warning(&err.to_string());
            return Err(err);
        }

        if self.keys.phrase_len() == 0 {
            let err = ComboError::EmptyPhrase(self.name.clone());
            logger::log_warning(&err.to_string());
            return Err(err);
        }

        if self.layer_name.is_empty() {
            let err = ComboError::MissingLayerName(self.name.clone());
            logger::log_warning(&err.to_string());
            return Err(err);
        }

        if let Some(index) = self.segments.iter().position(|s| s.name.is_empty()) {
            let err = ComboError::UnnamedSegment(self.name.clone(), index);
            logger::log_warning(&err.to_string());
            return Err(err);
        }

        let Some(layer) = host.resolve_layer(&self.layer_name) else {
            let err = ComboError::UnresolvedLayer(self.name.clone(), self.layer_name.clone());
            logger::log_warning(&err.to_string());
            return Err(err);
        };
        self.layer = layer;

        for segment in &mut self.segments {
            segment.prepare();
        }

        if self.keys.phrase_len() > self.segments.len() {
            self.keys.set_mode(SequenceMode::Full);
        }

        let chain_len = if self.keys.mode() == SequenceMode::Full {
            1
        } else {
            self.keys.phrase_len()
        };

        self.chain.clear();
        for i in 0..chain_len {
            // The last link absorbs the remaining segments.
            if i + 1 == chain_len {
                self.chain.push(ChainLink::new((i..self.segments.len()).collect()));
                break;
            }
            self.chain.push(ChainLink::new(vec![i]));
        }

        self.chain_queue = (0..self.chain.len()).collect();
        self.current_link = None;
        self.current_segment = None;
        self.actions.clear();
        self.ignore_input = false;
        self.keys.setup(now);
        self.initialised = true;
        Ok(())
    }

    /// Run one tick of the mode state machine.
    pub(crate) fn update(&mut self, ctx: &mut TickCtx<'_>) {
        if !self.initialised {
            return;
        }

        match self.keys.mode() {
            SequenceMode::Full => self.full_sequencer(ctx),
            SequenceMode::PartialTimed => self.timed_sequencer(ctx),
            SequenceMode::PartialBuffered => self.buffered_sequencer(ctx),
        }
    }

    // ========================================================================
    // Mode state machines
    // ========================================================================

    fn full_sequencer(&mut self, ctx: &mut TickCtx<'_>) {
        match self.keys.listen(ctx.input, self.ignore_input) {
            SequenceState::Interrupted => {
                self.reset_all(&mut ctx.hub, ctx.input.now());
            }
            SequenceState::Neutral => {
                let Some(link) = self.current_link else {
                    return;
                };

                // Move automatically through the chain once the outgoing
                // segment opens its link window.
                if let Some(cur) = self.current_segment {
                    if self.is_beginning_link(&*ctx.host, cur) && !self.chain[link].is_empty() {
                        self.segments[cur].reset_runtime();
                        self.advance_within_link(ctx, link);
                    }
                }

                self.scan_timeline(ctx);

                // Whole chain played out.
                if let Some(cur) = self.current_segment {
                    if self.chain[link].is_empty()
                        && self.is_ending_link(&*ctx.host, ctx.tick_delta, cur)
                    {
                        self.reset_all(&mut ctx.hub, ctx.input.now());
                        ctx.bus.publish(ComboEvent::Completed(ComboCompleted {
                            combo: self.name.clone(),
                        }));
                    }
                }
            }
            SequenceState::Completed => {
                let Some(&link) = self.chain_queue.front() else {
                    logger::log_error(&format!(
                        "combo `{}`: chain exhausted unexpectedly on phrase completion",
                        self.name
                    ));
                    return;
                };

                ctx.hub.register();
                self.current_link = Some(link);
                self.ignore_input = true;

                match self.chain[link].dequeue() {
                    Some(first) => {
                        self.current_segment = Some(first);
                        self.start_segment(ctx, first);
                    }
                    None => {
                        // Invariant violation: skip the request, keep state.
                        logger::log_error(&format!(
                            "combo `{}`: first chain link is empty",
                            self.name
                        ));
                    }
                }
            }
            // Full mode never reports Success.
            SequenceState::Success => {}
        }
    }

    fn timed_sequencer(&mut self, ctx: &mut TickCtx<'_>) {
        match self.keys.listen(ctx.input, self.ignore_input) {
            SequenceState::Success | SequenceState::Completed => self.link(ctx),
            SequenceState::Interrupted => {
                self.reset_all(&mut ctx.hub, ctx.input.now());
            }
            SequenceState::Neutral => {
                let Some(link) = self.current_link else {
                    return;
                };

                self.scan_timeline(ctx);

                if let Some(cur) = self.current_segment {
                    // Input only counts while the segment is inside its link
                    // window.
                    self.ignore_input = !self.within_link(&*ctx.host, cur);

                    // Long final link: execute the remaining segments
                    // automatically.
                    if !self.chain[link].is_empty()
                        && self.is_ending_link(&*ctx.host, ctx.tick_delta, cur)
                    {
                        self.ignore_input = true;
                        self.segments[cur].reset_runtime();
                        self.advance_within_link(ctx, link);
                    }
                }

                // No further input and the segment has played out: close the
                // link, completing the combo if it was the last one.
                let finished = self.current_segment.is_some_and(|cur| {
                    self.chain[link].is_empty()
                        && self.is_existing(&*ctx.host, ctx.tick_delta, cur)
                });
                self.chain[link].has_finished = finished;

                if finished {
                    if self.chain[link].is_empty() && self.chain_queue.is_empty() {
                        ctx.bus.publish(ComboEvent::Completed(ComboCompleted {
                            combo: self.name.clone(),
                        }));
                    }
                    self.reset_all(&mut ctx.hub, ctx.input.now());
                }
            }
        }
    }

    fn buffered_sequencer(&mut self, ctx: &mut TickCtx<'_>) {
        match self.keys.buffered_listen(ctx.input) {
            SequenceState::Success => self.actions.push_back(PendingAction::Link),
            SequenceState::Completed => self.actions.push_back(PendingAction::CompleteCombo),
            SequenceState::Interrupted => self.actions.push_back(PendingAction::Reset),
            SequenceState::Neutral => {
                // Nothing playing: start directly from the queue.
                if self.current_link.is_none() && !self.actions.is_empty() {
                    self.run_pending_action(ctx);
                }

                let Some(link) = self.current_link else {
                    return;
                };

                self.scan_timeline(ctx);

                if let Some(cur) = self.current_segment {
                    if self.is_ending_link(&*ctx.host, ctx.tick_delta, cur) {
                        if !self.actions.is_empty() {
                            self.run_pending_action(ctx);
                        } else if !self.chain[link].is_empty() {
                            // Finish off a long link automatically.
                            self.segments[cur].reset_runtime();
                            self.advance_within_link(ctx, link);
                        }
                    }
                }

                // The action may have reset or re-linked us; re-check before
                // closing out.
                if let Some(link) = self.current_link {
                    let finished = self
                        .current_segment
                        .is_some_and(|cur| self.is_existing(&*ctx.host, ctx.tick_delta, cur));
                    self.chain[link].has_finished = finished;

                    if finished {
                        if self.chain[link].is_empty() && self.chain_queue.is_empty() {
                            ctx.bus.publish(ComboEvent::Completed(ComboCompleted {
                                combo: self.name.clone(),
                            }));
                        }
                        self.reset_all(&mut ctx.hub, ctx.input.now());
                    }
                }
            }
        }
    }

    fn run_pending_action(&mut self, ctx: &mut TickCtx<'_>) {
        match self.actions.pop_front() {
            Some(PendingAction::Link) | Some(PendingAction::CompleteCombo) => self.link(ctx),
            Some(PendingAction::Reset) => self.reset_all(&mut ctx.hub, ctx.input.now()),
            None => {}
        }
    }

    /// Advance to the next chain link: register with the hub, reset the
    /// outgoing segment and start the new link's first segment.
    fn link(&mut self, ctx: &mut TickCtx<'_>) {
        let Some(link) = self.chain_queue.pop_front() else {
            return;
        };

        ctx.hub.register();

        if let Some(prev) = self.current_segment {
            self.segments[prev].reset_runtime();
        }
        self.current_link = Some(link);

        match self.chain[link].dequeue() {
            Some(first) => {
                self.chain[link].has_finished = false;
                self.current_segment = Some(first);
                self.start_segment(ctx, first);
            }
            None => {
                // Invariant violation: skip the request, keep state.
                self.current_segment = None;
                logger::log_error(&format!(
                    "combo `{}`: chain link {} is empty",
                    self.name, link
                ));
            }
        }
    }

    /// Dequeue and start the next segment of the current link (auto-advance
    /// inside a multi-segment link).
    fn advance_within_link(&mut self, ctx: &mut TickCtx<'_>, link: usize) {
        if let Some(next) = self.chain[link].dequeue() {
            self.current_segment = Some(next);
            self.start_segment(ctx, next);
        }
    }

    /// Issue the cross-fade (unless the host is already on this segment) and
    /// publish `AttackTriggered`.
    fn start_segment(&mut self, ctx: &mut TickCtx<'_>, index: usize) {
        let redundant = self.is_currently_active(&*ctx.host, index);
        let layer = self.layer;
        let segment = &mut self.segments[index];

        if !redundant {
            ctx.host
                .cross_fade(&segment.name, segment.transition_duration, layer);
        }
        segment.mark_started();
        segment.publish_triggered(ctx.bus);
    }

    /// Fire any timeline markers the playhead crossed this tick.
    fn scan_timeline(&mut self, ctx: &mut TickCtx<'_>) {
        let Some(index) = self.current_segment else {
            return;
        };

        let norm = ctx
            .host
            .state(self.layer)
            .normalized_time
            .clamp(0.0, 1.0);
        self.segments[index].trigger_events(norm, ctx.bus);
    }

    // ========================================================================
    // Host predicates
    // ========================================================================

    /// Name match + normalized time, clamped to `[0, 1]`.
    fn layer_time(&self, host: &dyn PlaybackHost, index: usize) -> Option<f32> {
        let state = host.state(self.layer);
        if state.name_hash != self.segments[index].name_hash() {
            return None;
        }
        Some(state.normalized_time.clamp(0.0, 1.0))
    }

    /// The segment crossed its `link_begin` time stamp.
    fn is_beginning_link(&self, host: &dyn PlaybackHost, index: usize) -> bool {
        self.layer_time(host, index)
            .is_some_and(|norm| norm >= self.segments[index].link_begin)
    }

    /// The segment crossed its `link_end` time stamp (one tick of slack so
    /// the boundary frame is never missed).
    fn is_ending_link(&self, host: &dyn PlaybackHost, tick_delta: f32, index: usize) -> bool {
        self.layer_time(host, index)
            .is_some_and(|norm| norm >= self.segments[index].link_end - tick_delta)
    }

    /// The segment sits inside its link window.
    fn within_link(&self, host: &dyn PlaybackHost, index: usize) -> bool {
        self.layer_time(host, index).is_some_and(|norm| {
            norm >= self.segments[index].link_begin && norm <= self.segments[index].link_end
        })
    }

    /// The segment played past its link window and the host is blending out.
    fn is_existing(&self, host: &dyn PlaybackHost, tick_delta: f32, index: usize) -> bool {
        let state = host.state(self.layer);
        if state.name_hash != self.segments[index].name_hash() {
            return false;
        }
        let norm = state.normalized_time.clamp(0.0, 1.0);
        norm >= self.segments[index].link_end - tick_delta && state.in_transition
    }

    /// The host is already playing this segment for the current activation
    /// (used to suppress redundant cross-fade requests).
    fn is_currently_active(&self, host: &dyn PlaybackHost, index: usize) -> bool {
        host.state(self.layer).name_hash == self.segments[index].name_hash()
            && self.segments[index].has_started()
    }

    // ========================================================================
    // Reset
    // ========================================================================

    /// Restore pre-execution state. Callable from any state; never reallocates
    /// the static chain structure.
    pub(crate) fn reset_all(&mut self, hub: &mut HubHandle<'_>, now: f32) {
        match self.keys.mode() {
            SequenceMode::Full => self.reset_full_sequence(hub),
            SequenceMode::PartialTimed | SequenceMode::PartialBuffered => {
                self.reset_partial_sequence(hub, now);
            }
        }
    }

    /// Full mode consumed only the first (peeked) link: rebuild it in place.
    /// The key sequencer was already reset by its `Completed` transition.
    fn reset_full_sequence(&mut self, hub: &mut HubHandle<'_>) {
        hub.unregister();

        if let Some(&first) = self.chain_queue.front() {
            self.chain[first].reset();
        }
        for segment in &mut self.segments {
            segment.reset_runtime();
        }

        self.current_link = None;
        self.current_segment = None;
        self.ignore_input = false;
    }

    fn reset_partial_sequence(&mut self, hub: &mut HubHandle<'_>, now: f32) {
        hub.unregister();

        self.current_link = None;
        self.current_segment = None;
        self.ignore_input = false;
        self.actions.clear();

        if self.chain_queue.len() != self.chain.len() {
            for link in &mut self.chain {
                link.reset();
            }
            self.chain_queue = (0..self.chain.len()).collect();
        }
        for segment in &mut self.segments {
            segment.reset_runtime();
        }

        self.keys.reset(now);
    }
}
