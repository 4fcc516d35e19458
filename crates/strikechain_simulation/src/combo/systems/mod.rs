//! Bevy bridge: resources and FixedUpdate systems around the sequencer hub.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::combo::events::{AttackTriggered, ComboCompleted, ComboCue, ComboEvent, HitScan};
use crate::combo::host::PlaybackHost;
use crate::combo::hub::SequencerHub;
use crate::combo::input::InputSource;
use crate::combo::InputToken;


/// The sequencer hub as an ECS resource.
#[derive(Resource, Debug, Default)]
pub struct ComboHub(pub SequencerHub);

/// The shared playback host as an ECS resource.
#[derive(Resource)]
pub struct PlaybackHostHandle(pub Box<dyn PlaybackHost + Send + Sync>);

/// Token-level input for the current fixed tick.
///
/// Game systems press tokens before `tick_combos` runs;
/// `drain_combo_input` releases them and advances the clock afterwards.
#[derive(Resource, Debug, Default)]
pub struct ComboInput {
    pressed: HashSet<InputToken>,
    time: f32,
}

impl ComboInput {
    pub fn press(&mut self, token: InputToken) {
        self.pressed.insert(token);
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

impl InputSource for ComboInput {
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

/// System: advance the playback host, tick the hub, fan bus events out to
/// Bevy event writers.
///
/// Skips the tick quietly while the hub or host resource is missing — a
/// missed frame beats crashing the simulation loop.
pub fn tick_combos(
    hub: Option<ResMut<ComboHub>>,
    host: Option<ResMut<PlaybackHostHandle>>,
    input: Res<ComboInput>,
    time: Res<Time<Fixed>>,
    mut attacks: EventWriter<AttackTriggered>,
    mut completions: EventWriter<ComboCompleted>,
    mut hits: EventWriter<HitScan>,
    mut cues: EventWriter<ComboCue>,
) {
    let (Some(mut hub), Some(mut host)) = (hub, host) else {
        return;
    };

    let tick_delta = time.delta_secs();
    host.0.advance(tick_delta);
    hub.0.update(host.0.as_mut(), &*input, tick_delta);

    for event in hub.0.bus_mut().drain_pending() {
        match event {
            ComboEvent::Attack(attack) => {
                attacks.write(attack);
            }
            ComboEvent::Completed(completed) => {
                completions.write(completed);
            }
            ComboEvent::HitScan(hit) => {
                hits.write(hit);
            }
            ComboEvent::Cue(cue) => {
                cues.write(cue);
            }
        }
    }
}

/// System: release this tick's tokens and advance the input clock.
pub fn drain_combo_input(mut input: ResMut<ComboInput>, time: Res<Time<Fixed>>) {
    input.pressed.clear();
    input.time += time.delta_secs();
}
