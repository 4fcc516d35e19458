//! Sequencer hub: owns the combos sharing one playback host and enforces that
//! at most one executes at a time.

use crate::combo::events::EventBus;
use crate::combo::executor::{ComboConfig, ComboExecutor};
use crate::combo::host::PlaybackHost;
use crate::combo::input::InputSource;
use crate::logger;

/// Borrow of the hub's active-combo slot handed to an executor for the
/// duration of its tick. Registration is first-registrant-wins; unregister
/// only clears the slot if it belongs to this executor.
pub struct HubHandle<'a> {
    active: &'a mut Option<usize>,
    slot: usize,
}

impl HubHandle<'_> {
    pub fn register(&mut self) {
        if self.active.is_none() {
            *self.active = Some(self.slot);
        }
    }

    pub fn unregister(&mut self) {
        if *self.active == Some(self.slot) {
            *self.active = None;
        }
    }
}

/// Everything an executor needs for one tick.
pub struct TickCtx<'a> {
    pub host: &'a mut dyn PlaybackHost,
    pub input: &'a dyn InputSource,
    pub bus: &'a mut EventBus,
    pub hub: HubHandle<'a>,
    /// Seconds of normalized-time slack one tick is worth.
    pub tick_delta: f32,
}

/// Owns a collection of combo executors and the event bus they publish on.
#[derive(Debug, Default)]
pub struct SequencerHub {
    executors: Vec<ComboExecutor>,
    active: Option<usize>,
    bus: EventBus,
    initialised: bool,
}

impl SequencerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a combo; returns its index within the hub.
    pub fn add_combo(&mut self, config: ComboConfig) -> usize {
        self.executors.push(ComboExecutor::new(config));
        self.executors.len() - 1
    }

    pub fn executor(&self, index: usize) -> Option<&ComboExecutor> {
        self.executors.get(index)
    }

    pub fn executor_count(&self) -> usize {
        self.executors.len()
    }

    /// Initialise every combo: resolve layers, build chains, prime the key
    /// sequencers. Failures are logged and the remaining combos still
    /// initialise; returns true only if all succeeded.
    pub fn initialise(&mut self, host: &dyn PlaybackHost, now: f32) -> bool {
        let mut all_ok = true;
        for executor in &mut self.executors {
            if executor.initialise(host, now).is_err() {
                all_ok = false;
            }
        }

        self.initialised = true;
        if !all_ok {
            logger::log_warning("SequencerHub: one or more combos failed to initialise");
        }
        all_ok
    }

    /// Tick every combo. While one combo is registered active every other
    /// executor is skipped, so the shared playback host sees at most one
    /// cross-fade requester per tick.
    pub fn update(
        &mut self,
        host: &mut dyn PlaybackHost,
        input: &dyn InputSource,
        tick_delta: f32,
    ) {
        if !self.initialised {
            logger::log_error("SequencerHub::update called before initialise");
            return;
        }

        let active = &mut self.active;
        for (slot, executor) in self.executors.iter_mut().enumerate() {
            if !executor.is_initialised() {
                continue;
            }
            if active.is_some() && *active != Some(slot) {
                continue;
            }

            let mut ctx = TickCtx {
                host: &mut *host,
                input,
                bus: &mut self.bus,
                hub: HubHandle {
                    active: &mut *active,
                    slot,
                },
                tick_delta,
            };
            executor.update(&mut ctx);
        }
    }

    /// Restore every combo to pre-execution state.
    pub fn reset_all(&mut self, now: f32) {
        let active = &mut self.active;
        for (slot, executor) in self.executors.iter_mut().enumerate() {
            if !executor.is_initialised() {
                continue;
            }
            let mut handle = HubHandle {
                active: &mut *active,
                slot,
            };
            executor.reset_all(&mut handle, now);
        }
    }

    /// True while some combo is registered active.
    pub fn is_executing(&self) -> bool {
        self.active.is_some()
    }

    /// Name of the currently executing combo, if any.
    pub fn active_combo(&self) -> Option<&str> {
        self.active.map(|slot| self.executors[slot].name())
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }
}
