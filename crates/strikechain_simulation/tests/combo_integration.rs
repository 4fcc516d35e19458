//! Combo integration test
//!
//! Full Bevy app: `SimulationPlugin` at 60Hz fixed timestep, the simulated
//! playback host behind `PlaybackHostHandle`, scripted token presses, and
//! assertions on the fanned-out Bevy events.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use strikechain_simulation::*;

const LIGHT: InputToken = InputToken(0);
const TICK: Duration = Duration::from_nanos(16_666_667);

/// Presses scheduled by fixed-tick index.
#[derive(Resource, Default)]
struct InputScript {
    presses: Vec<(u64, InputToken)>,
    tick: u64,
}

/// System: land this tick's scripted presses before the hub runs.
fn drive_script(mut script: ResMut<InputScript>, mut input: ResMut<ComboInput>) {
    let tick = script.tick;
    for &(at, token) in &script.presses {
        if at == tick {
            input.press(token);
        }
    }
    script.tick += 1;
}

/// Flat log of everything the bridge wrote, in emission order.
#[derive(Resource, Default)]
struct EventLog(Vec<String>);

fn collect_events(
    mut attacks: EventReader<AttackTriggered>,
    mut hits: EventReader<HitScan>,
    mut cues: EventReader<ComboCue>,
    mut completions: EventReader<ComboCompleted>,
    mut log: ResMut<EventLog>,
) {
    for attack in attacks.read() {
        log.0.push(format!("attack:{}", attack.segment));
    }
    for hit in hits.read() {
        log.0.push(format!("hit:{}:{}", hit.segment, hit.damage));
    }
    for cue in cues.read() {
        log.0.push(format!("cue:{}", cue.key));
    }
    for completed in completions.read() {
        log.0.push(format!("completed:{}", completed.combo));
    }
}

/// Helper: headless app + combo engine + scripted input.
fn create_combo_app(configs: Vec<ComboConfig>, presses: Vec<(u64, InputToken)>) -> App {
    let mut app = create_headless_app();
    app.add_plugins(SimulationPlugin);

    let mut host = SimulatedHost::new("locomotion");
    host.add_layer("upper_body");
    host.add_clip("slash_1", 1.0);
    host.add_clip("slash_2", 1.0);
    host.add_clip("slash_3", 1.0);

    let mut hub = SequencerHub::new();
    for config in configs {
        hub.add_combo(config);
    }
    assert!(hub.initialise(&host, 0.0));

    app.insert_resource(ComboHub(hub));
    app.insert_resource(PlaybackHostHandle(Box::new(host)));
    app.insert_resource(InputScript { presses, tick: 0 });
    app.init_resource::<EventLog>();

    // One fixed tick per update.
    app.insert_resource(TimeUpdateStrategy::ManualDuration(TICK));
    app.add_systems(
        FixedUpdate,
        (
            drive_script.before(tick_combos),
            collect_events.after(tick_combos),
        ),
    );

    app
}

fn triple_slash_config(mode: SequenceMode) -> ComboConfig {
    ComboConfig {
        name: "triple_slash".into(),
        layer_name: "upper_body".into(),
        segments: vec![
            AttackSegment::new("slash_1", 0.2, 0.8)
                .with_damage_event(0.4, 12.0)
                .with_generic_event("swoosh", 0.1, "sfx_swoosh"),
            AttackSegment::new("slash_2", 0.2, 0.8).with_damage_event(0.45, 16.0),
            AttackSegment::new("slash_3", 0.2, 0.8).with_damage_event(0.5, 24.0),
        ],
        input_phrase: vec![LIGHT, LIGHT, LIGHT],
        mode,
        time_limit_enabled: true,
        time_limit: 2.0,
    }
}

/// Test: a timed three-hit combo plays through the whole Bevy pipeline and
/// every event arrives in emission order.
#[test]
fn test_timed_combo_event_pipeline() {
    let mut app = create_combo_app(
        vec![triple_slash_config(SequenceMode::PartialTimed)],
        vec![(0, LIGHT), (30, LIGHT), (60, LIGHT)],
    );

    for _ in 0..400 {
        app.update();
    }

    let log = &app.world().resource::<EventLog>().0;
    assert_eq!(
        *log,
        vec![
            "attack:slash_1",
            "cue:sfx_swoosh",
            "hit:slash_1:12",
            "attack:slash_2",
            "hit:slash_2:16",
            "attack:slash_3",
            "hit:slash_3:24",
            "completed:triple_slash",
        ]
    );

    let hub = app.world().resource::<ComboHub>();
    assert!(!hub.0.is_executing());
}

/// Test: mashing the phrase into a buffered combo on consecutive ticks still
/// plays every segment exactly once.
#[test]
fn test_buffered_combo_survives_mashed_input() {
    let mut app = create_combo_app(
        vec![triple_slash_config(SequenceMode::PartialBuffered)],
        vec![(0, LIGHT), (1, LIGHT), (2, LIGHT)],
    );

    for _ in 0..400 {
        app.update();
    }

    let log = &app.world().resource::<EventLog>().0;
    let attacks = log.iter().filter(|line| line.starts_with("attack:")).count();
    let completions = log
        .iter()
        .filter(|line| line.starts_with("completed:"))
        .count();
    let hits = log.iter().filter(|line| line.starts_with("hit:")).count();

    assert_eq!(attacks, 3);
    assert_eq!(hits, 3);
    assert_eq!(completions, 1);

    let hub = app.world().resource::<ComboHub>();
    assert!(!hub.0.is_executing());
}

/// Test: no press, no events, hub stays idle for a long run.
#[test]
fn test_idle_app_emits_nothing() {
    let mut app = create_combo_app(
        vec![triple_slash_config(SequenceMode::PartialTimed)],
        Vec::new(),
    );

    for _ in 0..300 {
        app.update();
    }

    assert!(app.world().resource::<EventLog>().0.is_empty());
    assert!(!app.world().resource::<ComboHub>().0.is_executing());
}
