//! Combo-execution engine.
//!
//! Matches a live stream of input tokens against authored key phrases, drives
//! a chain of animation segments in lock-step with the match, and emits timed
//! events synchronized to the playback host's normalized time.
//!
//! Control flow per tick:
//! input source → `KeySequencer` → `ComboExecutor` mode state machine →
//! (cross-fade request to the playback host) + (bus notifications) →
//! segment timeline scan → bus (hit-scan / cue events). The `SequencerHub`
//! gates which executor runs at all.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod executor;
pub mod host;
pub mod hub;
pub mod input;
pub mod systems;


// Re-export the engine surface
pub use components::{
    AttackSegment, ChainLink, DamageSpec, GenericSpec, InputToken, KeySequencer, SequenceMode,
    SequenceState, name_hash,
};
pub use events::{
    AttackTriggered, ComboCompleted, ComboCue, ComboEvent, EventBus, HandlerId, HitScan,
};
pub use executor::{ComboConfig, ComboError, ComboExecutor, PendingAction};
pub use host::{HostState, PlaybackHost, SimulatedHost};
pub use hub::SequencerHub;
pub use input::{InputSource, ScriptedInput};
pub use systems::{ComboHub, ComboInput, PlaybackHostHandle, drain_combo_input, tick_combos};

/// Combo engine plugin.
///
/// Registers the four combo events and the FixedUpdate tick chain:
/// 1. `tick_combos` — advance the host, run the hub, fan out bus events
/// 2. `drain_combo_input` — release this tick's tokens
///
/// The embedding game inserts `ComboHub` and `PlaybackHostHandle` resources
/// and feeds `ComboInput` from its own input layer.
pub struct ComboPlugin;

impl Plugin for ComboPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AttackTriggered>()
            .add_event::<ComboCompleted>()
            .add_event::<HitScan>()
            .add_event::<ComboCue>();

        app.init_resource::<ComboInput>();

        app.add_systems(FixedUpdate, (tick_combos, drain_combo_input).chain());
    }
}
