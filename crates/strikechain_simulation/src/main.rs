//! Headless STRIKECHAIN demo.
//!
//! Runs a three-hit PartialTimed combo against the simulated playback host
//! with a scripted input stream and logs every bus event.

use strikechain_simulation::logger;
use strikechain_simulation::{
    AttackSegment, ComboConfig, ComboEvent, InputSource, InputToken, PlaybackHost, ScriptedInput,
    SequenceMode, SequencerHub, SimulatedHost,
};

const LIGHT_ATTACK: InputToken = InputToken(0);
const TICK_DELTA: f32 = 1.0 / 60.0;

fn main() {
    logger::init_logger();
    println!("Starting STRIKECHAIN headless demo (60Hz, 360 ticks)");

    let mut host = SimulatedHost::new("locomotion");
    host.add_layer("upper_body");
    host.add_clip("slash_1", 0.8);
    host.add_clip("slash_2", 0.8);
    host.add_clip("slash_3", 1.0);

    let mut hub = SequencerHub::new();
    hub.add_combo(ComboConfig {
        name: "triple_slash".into(),
        layer_name: "upper_body".into(),
        segments: vec![
            AttackSegment::new("slash_1", 0.2, 0.8)
                .with_damage_event(0.4, 12.0)
                .with_generic_event("swoosh", 0.1, "sfx_swoosh"),
            AttackSegment::new("slash_2", 0.2, 0.8).with_damage_event(0.45, 16.0),
            AttackSegment::new("slash_3", 0.2, 0.9)
                .with_damage_event(0.5, 24.0)
                .with_generic_event("finisher_shake", 0.55, "camera_shake"),
        ],
        input_phrase: vec![LIGHT_ATTACK, LIGHT_ATTACK, LIGHT_ATTACK],
        mode: SequenceMode::PartialTimed,
        time_limit_enabled: true,
        time_limit: 2.0,
    });

    hub.bus_mut().subscribe(|event| match event {
        ComboEvent::Attack(attack) => logger::log_info(&format!("attack: {}", attack.segment)),
        ComboEvent::HitScan(hit) => logger::log_info(&format!(
            "hit-scan: {} #{} ({} dmg)",
            hit.segment, hit.index, hit.damage
        )),
        ComboEvent::Cue(cue) => {
            logger::log_info(&format!("cue: {} -> {}", cue.segment, cue.key));
        }
        ComboEvent::Completed(completed) => {
            logger::log_info(&format!("combo completed: {}", completed.combo));
        }
    });

    let mut input = ScriptedInput::new();
    if !hub.initialise(&host, input.now()) {
        logger::log_error("demo combo failed to initialise");
        return;
    }

    // Press on tick 5, then twice more inside each segment's link window.
    let presses = [5usize, 35, 65];

    for tick in 0..360 {
        if presses.contains(&tick) {
            input.press(LIGHT_ATTACK);
        }

        host.advance(TICK_DELTA);
        hub.update(&mut host, &input, TICK_DELTA);
        hub.bus_mut().drain_pending();

        input.clear();
        input.advance(TICK_DELTA);
    }

    println!("Demo complete (executing at end: {})", hub.is_executing());
}
