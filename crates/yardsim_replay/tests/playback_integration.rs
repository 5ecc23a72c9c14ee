//! Integration tests for the player and frame scheduler
//!
//! These tests verify that:
//! - Seeking to a time and ticking up to it produce the same derived state
//! - Both end-of-timeline policies behave as configured
//! - Loading a scenario discards everything derived from the previous one
//! - The scheduler drives a whole scenario to completion

use std::sync::Arc;

use pretty_assertions::assert_eq;
use yardsim_core::{
    ActorKind, Door, EventType, Scenario, SimActor, SimEvent, SimMode, SimTab,
};
use yardsim_replay::{
    Command, EndPolicy, FrameScheduler, ManualClock, PlaybackConfig, PlaybackError,
    PlaybackStatus, Player,
};

fn driver_scenario() -> Arc<Scenario> {
    Arc::new(
        Scenario::new("driver_after", SimTab::Driver, SimMode::After, 165.0)
            .actor(SimActor::new("truck_main", ActorKind::Truck, "Driver"))
            .events([
                SimEvent::new("arrive", 0.0, EventType::Arrive),
                SimEvent::new("qr", 3.0, EventType::QrScan).touchpoint(),
                SimEvent::new("verified", 5.0, EventType::Verified),
                SimEvent::new("door", 12.0, EventType::AssignedDoor),
                SimEvent::new("dock", 40.0, EventType::Docked),
                SimEvent::new("exit", 150.0, EventType::ExitRoad),
            ]),
    )
}

fn ops_scenario() -> Arc<Scenario> {
    Arc::new(
        Scenario::new("ops_before", SimTab::Ops, SimMode::Before, 300.0)
            .actor(SimActor::new("t1", ActorKind::Truck, "Truck 1"))
            .door(Door::new("D1", "Door 1", Default::default()))
            .door(Door::new("D2", "Door 2", Default::default()))
            .events([
                SimEvent::new("ob0", 0.0, EventType::Arrive).actor("t1"),
                SimEvent::new("ob1", 10.0, EventType::QueueStart).actor("t1"),
                SimEvent::new("ob2", 60.0, EventType::LoadingStart)
                    .actor("t1")
                    .door("D1"),
            ]),
    )
}

fn player(policy: EndPolicy) -> Player {
    Player::new(
        driver_scenario(),
        PlaybackConfig::default().with_end_policy(policy),
    )
    .unwrap()
}

/// Ticks that sum to T leave the same derived state as a direct seek to T
#[test]
fn test_seek_matches_accumulated_ticks() {
    for target in [0.5, 3.0, 12.0, 77.5, 150.0] {
        let mut ticked = player(EndPolicy::ClampAndStop);
        ticked.apply(Command::Play).unwrap();
        let steps = (target / 0.5) as usize;
        for _ in 0..steps {
            ticked.apply(Command::Tick(0.5)).unwrap();
        }

        let mut sought = player(EndPolicy::ClampAndStop);
        sought.apply(Command::Seek(target)).unwrap();

        assert_eq!(ticked.time(), sought.time(), "time at {target}");
        assert_eq!(ticked.fired_events(), sought.fired_events(), "events at {target}");
        assert_eq!(ticked.metrics(), sought.metrics(), "metrics at {target}");
        assert_eq!(ticked.snapshot(), sought.snapshot());
    }
}

/// Under wrap, running past the end restarts the timeline and keeps playing
#[test]
fn test_wrap_from_last_second() {
    let mut player = player(EndPolicy::Wrap);
    player.apply(Command::Seek(164.0)).unwrap();
    player.apply(Command::Play).unwrap();
    let update = player.apply(Command::Tick(5.0)).unwrap();

    assert_eq!(player.time(), 0.0);
    assert!(player.is_playing());
    assert!(update.rewound);
    assert_eq!(player.fired_events().len(), 1);
}

/// Under clamp-and-stop, running past the end pins the time and pauses
#[test]
fn test_clamp_from_last_second() {
    let mut player = player(EndPolicy::ClampAndStop);
    player.apply(Command::Seek(164.0)).unwrap();
    player.apply(Command::Play).unwrap();
    let update = player.apply(Command::Tick(5.0)).unwrap();

    assert_eq!(player.time(), 165.0);
    assert!(!player.is_playing());
    assert!(update.finished);
    assert_eq!(player.status(), PlaybackStatus::Finished);
    assert_eq!(player.metrics()["completed"].as_flag(), Some(true));
}

/// Seeking outside the timeline clamps silently
#[test]
fn test_seek_out_of_bounds() {
    let mut player = player(EndPolicy::ClampAndStop);
    player.apply(Command::Seek(200.0)).unwrap();
    assert_eq!(player.time(), 165.0);
    assert_eq!(player.metrics()["gateTimeSec"].as_number(), Some(12.0));
    assert_eq!(player.metrics()["dwellSec"].as_number(), Some(150.0));
    assert_eq!(player.metrics()["detentionRisk"].as_flag(), Some(false));

    player.apply(Command::Seek(-10.0)).unwrap();
    assert_eq!(player.time(), 0.0);
}

/// Zero, negative and non-finite speeds are refused, the old speed stays
#[test]
fn test_speed_rejection() {
    let mut player = player(EndPolicy::ClampAndStop);
    player.apply(Command::SetSpeed(1.5)).unwrap();

    for bad in [0.0, -2.0, f64::INFINITY, f64::NAN] {
        let err = player.apply(Command::SetSpeed(bad)).unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidSpeed(_)));
    }
    assert_eq!(player.speed(), 1.5);
}

/// Switching scenario resets time, run flag and derived state
#[test]
fn test_load_scenario_resets_state() {
    let mut player = player(EndPolicy::ClampAndStop);
    player.apply(Command::Play).unwrap();
    player.apply(Command::Tick(100.0)).unwrap();
    assert!(player.is_fired("dock"));

    let update = player.apply(Command::LoadScenario(ops_scenario())).unwrap();
    assert!(update.rewound);
    assert_eq!(player.time(), 0.0);
    assert!(!player.is_playing());
    assert_eq!(player.duration(), 300.0);
    assert!(!player.is_fired("dock"));
    assert!(player.metrics().contains_key("doorUtilPct"));
    assert!(!player.metrics().contains_key("gateTimeSec"));

    player.apply(Command::Seek(70.0)).unwrap();
    assert_eq!(player.metrics()["queueing"].as_number(), Some(1.0));
    assert_eq!(player.metrics()["doorUtilPct"].as_number(), Some(50.0));
}

/// An invalid scenario is refused and the current one stays loaded
#[test]
fn test_load_invalid_scenario_keeps_current() {
    let mut player = player(EndPolicy::ClampAndStop);
    player.apply(Command::Seek(20.0)).unwrap();

    let broken = Scenario::new("broken", SimTab::Ops, SimMode::After, 10.0)
        .event(SimEvent::new("late", 11.0, EventType::Arrive));
    let result = player.apply(Command::LoadScenario(Arc::new(broken)));

    assert!(matches!(result, Err(PlaybackError::Scenario(_))));
    assert_eq!(player.scenario().id, "driver_after");
    assert_eq!(player.time(), 20.0);
}

/// Toggle alternates between playing and paused
#[test]
fn test_toggle() {
    let mut player = player(EndPolicy::ClampAndStop);
    player.apply(Command::Toggle).unwrap();
    assert_eq!(player.status(), PlaybackStatus::Playing);
    player.apply(Command::Tick(2.0)).unwrap();
    player.apply(Command::Toggle).unwrap();
    assert_eq!(player.status(), PlaybackStatus::Paused);
}

/// Driving the scheduler at 60 fps plays a scenario through to the end
#[test]
fn test_scheduler_runs_to_completion() {
    let clock = ManualClock::new();
    let mut scheduler = FrameScheduler::with_clock(&clock);
    let mut player = Player::new(
        driver_scenario(),
        PlaybackConfig::default().with_speed(10.0),
    )
    .unwrap();

    let mut fired = Vec::new();
    player.play();
    while scheduler.is_active(&player) {
        if let Some(update) = scheduler.frame(&mut player) {
            fired.extend(
                player
                    .events_in(update.newly_fired.clone())
                    .iter()
                    .map(|e| e.id.clone()),
            );
        }
        clock.advance_secs(1.0 / 60.0);
    }

    assert_eq!(player.status(), PlaybackStatus::Finished);
    assert_eq!(fired, vec!["qr", "verified", "door", "dock", "exit"]);
}
