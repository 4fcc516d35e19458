//! Combo events and the event bus.
//!
//! Components publish onto an `EventBus` value owned by the hub instead of a
//! process-wide dispatcher: listeners subscribe explicitly and unsubscribe
//! with the returned id, and the Bevy bridge drains the per-tick pending list
//! into `EventWriter`s.

use bevy::prelude::*;

/// A damage window opened: listeners run their hit-scan / damage application.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct HitScan {
    /// Name of the segment whose marker fired.
    pub segment: String,
    /// Declaration index of the marker inside the segment.
    pub index: u32,
    pub damage: f32,
}

/// A generic cue fired (sound, VFX, camera hooks — engine doesn't care).
#[derive(Event, Clone, Debug, PartialEq)]
pub struct ComboCue {
    pub segment: String,
    pub index: u32,
    /// Opaque argument for the listener.
    pub key: String,
}

/// A segment was handed to the playback host.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct AttackTriggered {
    pub segment: String,
}

/// A combo chain played through to the end.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct ComboCompleted {
    pub combo: String,
}

/// Every notification the engine publishes.
#[derive(Clone, Debug, PartialEq)]
pub enum ComboEvent {
    HitScan(HitScan),
    Cue(ComboCue),
    Attack(AttackTriggered),
    Completed(ComboCompleted),
}

/// Subscription handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn FnMut(&ComboEvent) + Send + Sync>;

/// Typed publish/subscribe channel for combo notifications.
///
/// Handlers run synchronously at publish time, in subscription order. Every
/// published event is also appended to a pending list so a poll-driven
/// consumer (the Bevy bridge, tests) can drain the tick's events afterwards.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(HandlerId, Handler)>,
    next_id: u64,
    pending: Vec<ComboEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&ComboEvent) + Send + Sync + 'static,
    ) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a subscription. Returns false if the id is unknown.
    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    pub fn publish(&mut self, event: ComboEvent) {
        for (_, handler) in &mut self.handlers {
            handler(&event);
        }
        self.pending.push(event);
    }

    /// Events published since the last drain.
    pub fn pending(&self) -> &[ComboEvent] {
        &self.pending
    }

    pub fn drain_pending(&mut self) -> Vec<ComboEvent> {
        std::mem::take(&mut self.pending)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.len())
            .field("pending", &self.pending)
            .finish()
    }
}
