//! Attack segments and their timeline markers.
//!
//! An `AttackSegment` describes one animation segment: the window in which the
//! chain may advance, the cross-fade duration into it, and ordered damage /
//! generic event markers pinned to normalized playback time. Authored data is
//! immutable after load; only the per-activation flags mutate at runtime.

use serde::{Deserialize, Serialize};

use crate::combo::events::{AttackTriggered, ComboCue, ComboEvent, EventBus, HitScan};

/// Stable 64-bit FNV-1a over the segment name.
///
/// Host state matching relies on this hash staying identical across runs and
/// platforms, which rules out `DefaultHasher`.
pub fn name_hash(name: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for byte in name.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Hit-scan marker: at `trigger_time` a damage notification fires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageSpec {
    /// Normalized point on the segment timeline, in `[0, 1]`.
    pub trigger_time: f32,
    pub damage: f32,

    #[serde(skip)]
    triggered: bool,
}

impl DamageSpec {
    pub fn new(trigger_time: f32, damage: f32) -> Self {
        Self {
            trigger_time,
            damage,
            triggered: false,
        }
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }
}

/// Generic cue marker: at `trigger_time` an opaque `key` is published for
/// listeners (footstep sounds, camera shakes, VFX hooks).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenericSpec {
    /// Descriptive name; carried for tooling, no influence on the engine.
    pub name: String,
    /// Normalized point on the segment timeline, in `[0, 1]`.
    pub trigger_time: f32,
    /// Argument passed to listeners.
    pub key: String,

    #[serde(skip)]
    triggered: bool,
}

impl GenericSpec {
    pub fn new(name: impl Into<String>, trigger_time: f32, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trigger_time,
            key: key.into(),
            triggered: false,
        }
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }
}

/// One animation segment of a combo chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackSegment {
    pub name: String,

    /// Link window: chain advancement is permitted while normalized time is
    /// inside `[link_begin, link_end]`. Invariant `0 <= begin <= end <= 1`,
    /// enforced at load.
    pub link_begin: f32,
    pub link_end: f32,

    /// Cross-fade duration handed to the playback host. Sign normalized at
    /// load.
    pub transition_duration: f32,

    pub damage_events: Vec<DamageSpec>,
    pub generic_events: Vec<GenericSpec>,

    #[serde(skip)]
    name_hash: u64,
    #[serde(skip)]
    has_started: bool,
    /// Normalized position of the previous timeline scan.
    #[serde(skip)]
    prev_scan: f32,
}

impl AttackSegment {
    pub fn new(name: impl Into<String>, link_begin: f32, link_end: f32) -> Self {
        Self {
            name: name.into(),
            link_begin,
            link_end,
            transition_duration: 0.1,
            damage_events: Vec::new(),
            generic_events: Vec::new(),
            name_hash: 0,
            has_started: false,
            prev_scan: 0.0,
        }
    }

    pub fn with_transition(mut self, duration: f32) -> Self {
        self.transition_duration = duration;
        self
    }

    pub fn with_damage_event(mut self, trigger_time: f32, damage: f32) -> Self {
        self.damage_events.push(DamageSpec::new(trigger_time, damage));
        self
    }

    pub fn with_generic_event(
        mut self,
        name: impl Into<String>,
        trigger_time: f32,
        key: impl Into<String>,
    ) -> Self {
        self.generic_events.push(GenericSpec::new(name, trigger_time, key));
        self
    }

    /// Load-time normalization: compute the stable name hash once, strip the
    /// transition sign, clamp the link window into `[0, 1]` with
    /// `begin <= end`.
    pub(crate) fn prepare(&mut self) {
        self.name_hash = name_hash(&self.name);
        self.transition_duration = self.transition_duration.abs();
        self.link_begin = self.link_begin.clamp(0.0, 1.0);
        self.link_end = self.link_end.clamp(self.link_begin, 1.0);
        self.reset_runtime();
    }

    pub fn name_hash(&self) -> u64 {
        self.name_hash
    }

    /// True once this segment has been handed to the playback host during the
    /// current activation.
    pub fn has_started(&self) -> bool {
        self.has_started
    }

    pub(crate) fn mark_started(&mut self) {
        self.has_started = true;
    }

    /// Scan the timeline for markers crossed during this tick and publish
    /// them. Damage events fire before generic events; within each kind,
    /// declaration order. Each marker fires at most once per activation.
    ///
    /// A marker is due when the playhead crossed its `trigger_time` since the
    /// previous scan, so no marker is skipped however coarse the tick rate is
    /// relative to the clip length.
    pub(crate) fn trigger_events(&mut self, normalized_time: f32, bus: &mut EventBus) {
        let window_start = self.prev_scan.min(normalized_time);

        for (index, event) in self.damage_events.iter_mut().enumerate() {
            if event.triggered {
                continue;
            }
            if event.trigger_time >= window_start && event.trigger_time <= normalized_time {
                event.triggered = true;
                bus.publish(ComboEvent::HitScan(HitScan {
                    segment: self.name.clone(),
                    index: index as u32,
                    damage: event.damage,
                }));
            }
        }

        for (index, event) in self.generic_events.iter_mut().enumerate() {
            if event.triggered {
                continue;
            }
            if event.trigger_time >= window_start && event.trigger_time <= normalized_time {
                event.triggered = true;
                bus.publish(ComboEvent::Cue(ComboCue {
                    segment: self.name.clone(),
                    index: index as u32,
                    key: event.key.clone(),
                }));
            }
        }

        self.prev_scan = normalized_time;
    }

    /// Publish the activation event for this segment.
    pub(crate) fn publish_triggered(&self, bus: &mut EventBus) {
        bus.publish(ComboEvent::Attack(AttackTriggered {
            segment: self.name.clone(),
        }));
    }

    /// Clear `has_started` and every per-marker `triggered` flag.
    pub(crate) fn reset_runtime(&mut self) {
        self.has_started = false;
        self.prev_scan = 0.0;

        for event in &mut self.damage_events {
            event.triggered = false;
        }
        for event in &mut self.generic_events {
            event.triggered = false;
        }
    }
}
