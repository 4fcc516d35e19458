//! Playback host boundary.
//!
//! The engine never plays animation itself; it issues cross-fade requests to a
//! host (game engine animation controller) and polls the host's reported
//! state. `SimulatedHost` is a deterministic stand-in used by the headless
//! demo and the test suites.

use std::collections::HashMap;

use crate::combo::components::segment::name_hash;

/// Snapshot of one animation layer, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostState {
    /// Stable hash of the active state's name.
    pub name_hash: u64,
    /// Normalized playback position of the active state, in `[0, 1]`.
    pub normalized_time: f32,
    /// True while the layer is blending between states.
    pub in_transition: bool,
}

/// The four-method animation host boundary.
///
/// Substitutable with a deterministic double; the engine only ever calls these
/// methods plus the optional [`advance`](PlaybackHost::advance) hook.
pub trait PlaybackHost {
    /// Map a layer name to its index, if the host knows it.
    fn resolve_layer(&self, name: &str) -> Option<usize>;

    /// Current state of the given layer.
    fn state(&self, layer: usize) -> HostState;

    /// Request a cross-fade into `segment_name` over `transition_duration`
    /// seconds on `layer`.
    fn cross_fade(&mut self, segment_name: &str, transition_duration: f32, layer: usize);

    /// Advance host-side playback by one tick. Engine-backed hosts play on
    /// their own and ignore this; the simulated double advances here.
    fn advance(&mut self, _tick_delta: f32) {}
}

/// Blend time used when a clip runs out and the layer falls back to its exit
/// state.
const EXIT_TRANSITION: f32 = 0.2;

#[derive(Clone, Debug)]
struct SimLayer {
    current: u64,
    elapsed: f32,
    duration: f32,
    transition_remaining: f32,
    /// Set while the layer is blending out to the exit state.
    pending_exit: bool,
}

/// Deterministic playback host double.
///
/// Clips advance linearly with `advance`; a cross-fade switches the layer to
/// the new clip immediately and reports `in_transition` for the requested
/// duration. When a clip passes its end with no request pending, the layer
/// blends back to the exit state — during that blend the old clip is still
/// reported, clamped at normalized time 1.0, with `in_transition` set, which
/// is what the partial-mode completion predicates look for.
#[derive(Clone, Debug)]
pub struct SimulatedHost {
    layer_names: Vec<String>,
    layers: Vec<SimLayer>,
    /// Clip durations in seconds, keyed by name hash.
    clips: HashMap<u64, f32>,
    exit_hash: u64,
}

impl SimulatedHost {
    pub fn new(exit_clip: &str) -> Self {
        let exit_hash = name_hash(exit_clip);
        let mut clips = HashMap::new();
        clips.insert(exit_hash, 1.0);

        Self {
            layer_names: Vec::new(),
            layers: Vec::new(),
            clips,
            exit_hash,
        }
    }

    /// Register a layer; it starts on the exit state.
    pub fn add_layer(&mut self, name: &str) -> usize {
        self.layer_names.push(name.to_string());
        self.layers.push(SimLayer {
            current: self.exit_hash,
            elapsed: 0.0,
            duration: 1.0,
            transition_remaining: 0.0,
            pending_exit: false,
        });
        self.layers.len() - 1
    }

    /// Register a clip and its duration in seconds.
    pub fn add_clip(&mut self, name: &str, duration: f32) {
        self.clips.insert(name_hash(name), duration.max(f32::EPSILON));
    }

    /// True while the layer sits on the exit state with no blend running.
    pub fn is_idle(&self, layer: usize) -> bool {
        let layer = &self.layers[layer];
        layer.current == self.exit_hash && layer.transition_remaining <= 0.0
    }
}

impl PlaybackHost for SimulatedHost {
    fn resolve_layer(&self, name: &str) -> Option<usize> {
        self.layer_names.iter().position(|n| n == name)
    }

    fn state(&self, layer: usize) -> HostState {
        let layer = &self.layers[layer];
        HostState {
            name_hash: layer.current,
            normalized_time: (layer.elapsed / layer.duration).clamp(0.0, 1.0),
            in_transition: layer.transition_remaining > 0.0,
        }
    }

    fn cross_fade(&mut self, segment_name: &str, transition_duration: f32, layer: usize) {
        let hash = name_hash(segment_name);
        let duration = self.clips.get(&hash).copied().unwrap_or(1.0);

        let layer = &mut self.layers[layer];
        layer.current = hash;
        layer.elapsed = 0.0;
        layer.duration = duration;
        layer.transition_remaining = transition_duration.max(0.0);
        layer.pending_exit = false;
    }

    fn advance(&mut self, tick_delta: f32) {
        for layer in &mut self.layers {
            if layer.transition_remaining > 0.0 {
                layer.transition_remaining -= tick_delta;
                if layer.transition_remaining <= 0.0 && layer.pending_exit {
                    layer.current = self.exit_hash;
                    layer.elapsed = 0.0;
                    layer.duration = self.clips[&self.exit_hash];
                    layer.pending_exit = false;
                }
            }

            layer.elapsed += tick_delta;

            // Clip ran out with nothing requested: blend back to the exit
            // state. The outgoing clip stays reported during the blend.
            if layer.transition_remaining <= 0.0
                && layer.elapsed >= layer.duration
                && layer.current != self.exit_hash
            {
                layer.transition_remaining = EXIT_TRANSITION;
                layer.pending_exit = true;
            }
        }
    }
}
