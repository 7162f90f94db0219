use std::f64::consts::TAU;

use bevy_math::Vec2;
use radar_viewer::core::{FrameConfig, SimConfig, ViewerConfig};
use radar_viewer::lifecycle::{Detached, MountDecision};
use radar_viewer::sim::{BlipField, BlipSpawn, DragController, RotationState, SimClock};
use radar_viewer::viewer::ViewerState;

fn seeded(seed: u64) -> ViewerConfig {
    let mut config = ViewerConfig::default();
    config.sim.seed = Some(seed);
    config
}

fn mounted(seed: u64) -> ViewerState {
    let mut state = ViewerState::new(seeded(seed)).expect("valid config");
    assert_eq!(state.mount(1280.0, 720.0), MountDecision::Build);
    state
}

#[test]
fn population_starts_at_six_and_never_exceeds_cap() {
    for seed in [1, 7, 42, 1234] {
        let mut state = mounted(seed);
        assert_eq!(state.live_count(), 6);
        for _ in 0..3_000 {
            state.tick();
            assert!(state.live_count() <= 12, "seed {seed}: {}", state.live_count());
        }
    }
}

#[test]
fn cadence_spawns_are_spaced_by_interval() {
    let mut state = mounted(5);
    let mut spawn_times = vec![0.0];
    for _ in 0..3_000 {
        let report = state.tick();
        if !report.population.spawned.is_empty() {
            assert_eq!(report.population.spawned.len(), 1);
            spawn_times.push(state.clock().time());
        }
    }
    assert!(spawn_times.len() > 5);
    for pair in spawn_times.windows(2) {
        assert!(pair[1] - pair[0] > 1.5, "spawns at {} and {}", pair[0], pair[1]);
    }
}

#[test]
fn expired_blip_fades_out_within_window() {
    for (lifetime, velocity) in [(1.0, Vec2::ZERO), (100.0, Vec2::new(2.0, 0.0))] {
        let config = SimConfig {
            initial_blips: 0,
            spawn_interval: 1.0e6,
            ..SimConfig::default()
        };
        let window = config.fade_window;
        let mut field = BlipField::new(config, 3);
        let id = field
            .insert(BlipSpawn {
                position: Vec2::new(3.0, 0.0),
                velocity,
                phase: 0.0,
                max_lifetime: lifetime,
            })
            .expect("room");

        let dt = 0.016_f32;
        let mut fade_start_frame = None;
        let mut last_fade = 1.0;
        let mut removed_at = None;
        for frame in 1..=2_000u32 {
            let change = field.advance(dt, f64::from(frame) * f64::from(dt));
            if change.retired.contains(&id) {
                removed_at = Some(frame);
                break;
            }
            let blip = field.get(id).expect("alive until retired");
            if blip.is_fading() && fade_start_frame.is_none() {
                fade_start_frame = Some(frame);
            }
            if fade_start_frame.is_some() {
                assert!(blip.visual.fade <= last_fade);
            }
            last_fade = blip.visual.fade;
        }

        let start = fade_start_frame.expect("blip expired");
        let end = removed_at.expect("blip removed");
        assert!(last_fade < 1.0, "removed while fully opaque");
        let fading_for = (end - start) as f32 * dt;
        assert!(fading_for <= window + 2.0 * dt, "fade took {fading_for}s");
        assert!(fading_for >= window - 2.0 * dt, "fade cut short: {fading_for}s");
        assert!(!field.contains(id));
    }
}

#[test]
fn drag_targets_are_clamped() {
    let mut drag = DragController::new(Default::default());
    let mut rot = RotationState::default();
    drag.drag_start();
    for _ in 0..100 {
        drag.drag_move(1_000.0, -1_000.0, &mut rot);
        assert!(rot.target_x.abs() <= 0.6 && rot.target_y.abs() <= 0.6);
    }
    assert_eq!(rot.target_x, 0.6);
    assert_eq!(rot.target_y, -0.6);
}

#[test]
fn easing_converges_within_twenty_nine_frames() {
    let drag = DragController::new(Default::default());
    let mut rot = RotationState {
        target_x: 0.6,
        target_y: -0.6,
        ..Default::default()
    };
    let start = rot.distance_to_target();
    let mut previous = start;
    for _ in 0..29 {
        drag.ease(&mut rot);
        let d = rot.distance_to_target();
        assert!(d < previous);
        previous = d;
    }
    assert!(previous <= start * 0.01);
}

#[test]
fn sweep_matches_wrapped_frame_count() {
    let frame = FrameConfig::default();
    let mut clock = SimClock::new(&frame);
    for n in 1..=20_000u64 {
        clock.tick();
        let expected = (n as f64 * frame.sweep_step).rem_euclid(TAU);
        let sweep = clock.sweep_angle();
        assert!((0.0..TAU).contains(&sweep));
        assert!((sweep - expected).abs() < 1e-9);
    }
}

#[test]
fn mount_then_immediate_unmount_is_clean() {
    let mut state = mounted(8);
    assert!(state.teardown(&mut Detached));
    let frames = state.clock().frames();
    for _ in 0..10 {
        state.handle().toggle_pause();
        assert!(!state.tick().advanced);
    }
    assert_eq!(state.clock().frames(), frames);
    assert_eq!(state.live_count(), 0);
    assert!(!state.teardown(&mut Detached));
}

#[test]
fn unmount_through_the_handle_is_clean() {
    let mut state = mounted(8);
    state.handle().unmount();
    assert!(state.tick().unmount_requested);
    assert!(!state.tick().advanced);
    assert!(state.teardown(&mut Detached));
}

#[test]
fn pause_freezes_time_sweep_and_blips() {
    let mut state = mounted(21);
    for _ in 0..120 {
        state.tick();
    }
    state.handle().toggle_pause();
    state.tick();
    assert!(state.is_paused());

    let time = state.clock().time();
    let sweep = state.clock().sweep_angle();
    let snapshot: Vec<_> = state.blips().iter().map(|b| (b.id, b.position, b.age)).collect();

    state.handle().intents.push(radar_viewer::sim::ViewerIntent::DragStart);
    state
        .handle()
        .intents
        .push(radar_viewer::sim::ViewerIntent::DragMove { dx: 40.0, dy: 0.0 });
    for _ in 0..200 {
        assert!(!state.tick().advanced);
    }

    assert_eq!(state.clock().time(), time);
    assert_eq!(state.clock().sweep_angle(), sweep);
    let after: Vec<_> = state.blips().iter().map(|b| (b.id, b.position, b.age)).collect();
    assert_eq!(snapshot, after);
    // Drag still eases while paused.
    assert!(state.rotation().x > 0.1);
}
