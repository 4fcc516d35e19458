//! STRIKECHAIN Simulation Core
//!
//! Combo-execution engine for action games: input-phrase matching, chain-link
//! execution in three sequencing modes, and timeline events synchronized to
//! an external playback host. Single-threaded and poll-driven — the engine is
//! ticked once per simulation step and completes synchronously.

use bevy::prelude::*;

// Public modules
pub mod combo;
pub mod logger;

// Re-export the engine surface for convenience
pub use combo::{
    AttackSegment, AttackTriggered, ChainLink, ComboCompleted, ComboConfig, ComboCue, ComboError,
    ComboEvent, ComboExecutor, ComboHub, ComboInput, ComboPlugin, DamageSpec, EventBus,
    GenericSpec, HandlerId, HitScan, HostState, InputSource, InputToken, KeySequencer,
    PendingAction, PlaybackHost, PlaybackHostHandle, ScriptedInput, SequenceMode, SequenceState,
    SequencerHub, SimulatedHost, drain_combo_input, name_hash, tick_combos,
};

/// Main simulation plugin: 60Hz fixed timestep + the combo engine.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_plugins(ComboPlugin);
    }
}

/// Minimal Bevy App for headless runs.
pub fn create_headless_app() -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(60.0));

    app
}
