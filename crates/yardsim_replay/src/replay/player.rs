//! Playback state machine.
//!
//! The player exclusively owns the playback state (time, run flag, speed) and
//! changes it only through [`Command`]s. After every command the fired-event
//! cursor and metrics are recomputed from the new time, so the cached view is
//! always exactly the projection of the current time and never an
//! incrementally patched one.

use std::ops::Range;
use std::sync::Arc;

use yardsim_core::metrics::{definitions_for, evaluate, MetricContext, MetricRecord};
use yardsim_core::{EventIndex, Scenario, SimEvent, Snapshot};

use super::clock::{Advance, VirtualClock};
use crate::config::PlaybackConfig;
use crate::error::PlaybackError;

/// The observable playback state, derived from the clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Paused at zero (fresh load or restart)
    Stopped,
    Playing,
    /// Paused somewhere inside the timeline
    Paused,
    /// Paused at the end of the timeline
    Finished,
}

/// The complete set of mutations a UI can request
#[derive(Clone, Debug)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    Restart,
    Seek(f64),
    SetSpeed(f64),
    StepForward,
    StepBack,
    /// Elapsed wall-clock seconds since the previous frame
    Tick(f64),
    LoadScenario(Arc<Scenario>),
    SetFacilities(u32),
}

/// What a command changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameUpdate {
    pub previous_time: f64,
    pub time: f64,
    /// Sorted-log positions of events that fired during this update
    pub newly_fired: Range<usize>,
    /// The fired set was rebuilt from an earlier time (seek back, wrap, restart, load)
    pub rewound: bool,
    /// A tick ran into the end of the timeline and stopped
    pub finished: bool,
}

impl FrameUpdate {
    pub fn has_events(&self) -> bool {
        !self.newly_fired.is_empty()
    }
}

pub struct Player {
    scenario: Arc<Scenario>,
    index: EventIndex,
    clock: VirtualClock,
    config: PlaybackConfig,
    facilities: u32,
    /// Number of sorted events fired at the clock position
    fired_count: usize,
    metrics: MetricRecord,
    /// Incremented every time playback (re)starts
    play_epoch: u64,
}

impl Player {
    /// Load a scenario, rejecting it or the config if either fails validation.
    pub fn new(scenario: Arc<Scenario>, config: PlaybackConfig) -> Result<Self, PlaybackError> {
        config.validate()?;
        scenario.validate()?;
        let speed = validate_speed(config.initial_speed, &config)?;

        let mut clock = VirtualClock::new(scenario.duration_sec);
        clock.set_speed(speed);

        let mut player = Self {
            index: EventIndex::new(&scenario),
            scenario,
            clock,
            facilities: config.facilities,
            config,
            fired_count: 0,
            metrics: MetricRecord::default(),
            play_epoch: 0,
        };
        player.sync();
        Ok(player)
    }

    pub fn scenario(&self) -> &Arc<Scenario> {
        &self.scenario
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn index(&self) -> &EventIndex {
        &self.index
    }

    pub fn time(&self) -> f64 {
        self.clock.position()
    }

    pub fn duration(&self) -> f64 {
        self.clock.duration()
    }

    pub fn speed(&self) -> f64 {
        self.clock.speed()
    }

    pub fn facilities(&self) -> u32 {
        self.facilities
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_running()
    }

    pub fn progress(&self) -> f64 {
        self.clock.progress()
    }

    pub fn play_epoch(&self) -> u64 {
        self.play_epoch
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.clock.is_running() {
            PlaybackStatus::Playing
        } else if self.clock.is_at_start() {
            PlaybackStatus::Stopped
        } else if self.clock.is_at_end() {
            PlaybackStatus::Finished
        } else {
            PlaybackStatus::Paused
        }
    }

    /// Events fired by the current time, ascending by `t`
    pub fn fired_events(&self) -> &[SimEvent] {
        &self.index.events()[..self.fired_count]
    }

    pub fn is_fired(&self, event_id: &str) -> bool {
        self.index.is_fired(event_id, self.fired_count)
    }

    /// The last `count` fired events, oldest first
    pub fn recent_events(&self, count: usize) -> &[SimEvent] {
        let fired = self.fired_events();
        &fired[fired.len().saturating_sub(count)..]
    }

    /// Events at the given sorted-log positions
    pub fn events_in(&self, range: Range<usize>) -> &[SimEvent] {
        &self.index.events()[range]
    }

    pub fn metrics(&self) -> &MetricRecord {
        &self.metrics
    }

    /// Full derived state at the current time
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::at(&self.scenario, &self.index, self.time(), self.facilities)
    }

    /// Apply one command.
    pub fn apply(&mut self, command: Command) -> Result<FrameUpdate, PlaybackError> {
        let update = match command {
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Toggle => self.toggle(),
            Command::Restart => self.restart(),
            Command::Seek(t) => self.seek(t),
            Command::SetSpeed(speed) => return self.set_speed(speed),
            Command::StepForward => self.step_forward(),
            Command::StepBack => self.step_back(),
            Command::Tick(delta) => self.tick(delta),
            Command::LoadScenario(scenario) => return self.load_scenario(scenario),
            Command::SetFacilities(n) => self.set_facilities(n),
        };
        Ok(update)
    }

    /// Start or resume playback.
    ///
    /// At the end of the timeline this rewinds to zero first.
    pub fn play(&mut self) -> FrameUpdate {
        if self.clock.is_running() {
            return self.unchanged();
        }
        let before = self.mark();
        if self.clock.is_at_end() {
            tracing::debug!(scenario = %self.scenario.id, "play at end, rewinding");
            self.clock.seek(0.0);
        }
        self.clock.play();
        self.play_epoch += 1;
        self.finish(before, false)
    }

    pub fn pause(&mut self) -> FrameUpdate {
        let before = self.mark();
        self.clock.pause();
        self.finish(before, false)
    }

    pub fn toggle(&mut self) -> FrameUpdate {
        if self.clock.is_running() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Back to zero, paused
    pub fn restart(&mut self) -> FrameUpdate {
        let before = self.mark();
        self.clock.reset();
        tracing::debug!(scenario = %self.scenario.id, "restart");
        self.finish(before, false)
    }

    /// Jump to a time, clamped into the timeline. Keeps the run flag.
    pub fn seek(&mut self, time_sec: f64) -> FrameUpdate {
        let before = self.mark();
        self.clock.seek(time_sec);
        tracing::debug!(requested = time_sec, time = self.clock.position(), "seek");
        self.finish(before, false)
    }

    /// Change speed; takes effect on the next tick.
    ///
    /// Rejects non-positive or non-finite speeds and clamps the rest into the
    /// configured range.
    pub fn set_speed(&mut self, speed: f64) -> Result<FrameUpdate, PlaybackError> {
        let speed = validate_speed(speed, &self.config).map_err(|err| {
            tracing::warn!(speed, "rejected playback speed");
            err
        })?;
        self.clock.set_speed(speed);
        Ok(self.unchanged())
    }

    pub fn step_forward(&mut self) -> FrameUpdate {
        self.step(self.config.step_sec)
    }

    pub fn step_back(&mut self) -> FrameUpdate {
        self.step(-self.config.step_sec)
    }

    fn step(&mut self, delta: f64) -> FrameUpdate {
        let before = self.mark();
        self.clock.pause();
        self.clock.seek_by(delta);
        self.finish(before, false)
    }

    /// Advance by `delta_sec` of wall-clock time; no-op while paused.
    pub fn tick(&mut self, delta_sec: f64) -> FrameUpdate {
        if !self.clock.is_running() {
            return self.unchanged();
        }
        if !delta_sec.is_finite() || delta_sec < 0.0 {
            tracing::warn!(delta_sec, "ignoring invalid tick delta");
            return self.unchanged();
        }

        let before = self.mark();
        let outcome = self.clock.advance(delta_sec, self.config.end_policy);
        tracing::trace!(delta_sec, time = self.clock.position(), ?outcome, "tick");

        match outcome {
            Advance::Wrapped => {
                tracing::debug!(scenario = %self.scenario.id, "timeline wrapped");
            }
            Advance::Finished => {
                tracing::debug!(scenario = %self.scenario.id, "timeline finished");
            }
            Advance::Idle | Advance::Moved => {}
        }
        self.finish(before, outcome == Advance::Finished)
    }

    /// Replace the scenario and reset all playback state.
    ///
    /// Nothing derived from the previous scenario survives. An invalid scenario
    /// is rejected and the current one stays loaded.
    pub fn load_scenario(&mut self, scenario: Arc<Scenario>) -> Result<FrameUpdate, PlaybackError> {
        scenario.validate()?;
        let before = self.mark();
        let speed = self.clock.speed();

        self.index = EventIndex::new(&scenario);
        self.clock = VirtualClock::new(scenario.duration_sec);
        self.clock.set_speed(speed);
        self.scenario = scenario;
        tracing::debug!(scenario = %self.scenario.id, events = self.index.len(), "scenario loaded");

        let mut update = self.finish(before, false);
        update.rewound = true;
        update.newly_fired = 0..self.fired_count;
        Ok(update)
    }

    pub fn set_facilities(&mut self, facilities: u32) -> FrameUpdate {
        let before = self.mark();
        self.facilities = facilities;
        self.finish(before, false)
    }

    fn mark(&self) -> (f64, usize) {
        (self.clock.position(), self.fired_count)
    }

    fn unchanged(&self) -> FrameUpdate {
        let time = self.clock.position();
        FrameUpdate {
            previous_time: time,
            time,
            newly_fired: self.fired_count..self.fired_count,
            rewound: false,
            finished: false,
        }
    }

    /// Recompute derived state and describe the change from `before`
    fn finish(&mut self, before: (f64, usize), finished: bool) -> FrameUpdate {
        let (previous_time, previous_count) = before;
        self.sync();

        let rewound = self.clock.position() < previous_time;
        let start = if rewound {
            0
        } else {
            previous_count.min(self.fired_count)
        };

        FrameUpdate {
            previous_time,
            time: self.clock.position(),
            newly_fired: start..self.fired_count,
            rewound,
            finished,
        }
    }

    fn sync(&mut self) {
        let time = self.clock.position();
        self.fired_count = self.index.fired_count(time);
        let log = &self.index.events()[..self.fired_count];
        let ctx = MetricContext::new(&self.scenario, log, time).with_facilities(self.facilities);
        self.metrics = evaluate(definitions_for(self.scenario.tab), &ctx);
    }
}

fn validate_speed(speed: f64, config: &PlaybackConfig) -> Result<f64, PlaybackError> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(PlaybackError::InvalidSpeed(speed));
    }
    Ok(speed.clamp(config.min_speed, config.max_speed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndPolicy;
    use yardsim_core::{EventType, SimMode, SimTab};

    fn scenario() -> Arc<Scenario> {
        Arc::new(
            Scenario::new("driver_after", SimTab::Driver, SimMode::After, 10.0).events([
                SimEvent::new("a0", 0.0, EventType::Arrive),
                SimEvent::new("a1", 3.0, EventType::QrScan).touchpoint(),
                SimEvent::new("a4", 6.0, EventType::AssignedDoor),
                SimEvent::new("a10", 9.0, EventType::ExitRoad),
            ]),
        )
    }

    fn player(policy: EndPolicy) -> Player {
        Player::new(scenario(), PlaybackConfig::default().with_end_policy(policy)).unwrap()
    }

    #[test]
    fn test_player_creation() {
        let player = player(EndPolicy::ClampAndStop);
        assert_eq!(player.status(), PlaybackStatus::Stopped);
        assert_eq!(player.time(), 0.0);
        assert_eq!(player.duration(), 10.0);
        assert_eq!(player.fired_events().len(), 1);
        assert!(player.is_fired("a0"));
    }

    #[test]
    fn test_tick_ignored_while_paused() {
        let mut player = player(EndPolicy::ClampAndStop);
        let update = player.tick(5.0);
        assert_eq!(player.time(), 0.0);
        assert!(!update.has_events());
    }

    #[test]
    fn test_tick_reports_new_events() {
        let mut player = player(EndPolicy::ClampAndStop);
        player.play();
        let update = player.tick(4.0);
        assert_eq!(update.newly_fired, 1..2);
        assert_eq!(player.events_in(update.newly_fired)[0].id, "a1");
    }

    #[test]
    fn test_speed_scales_ticks() {
        let mut player = player(EndPolicy::ClampAndStop);
        player.set_speed(2.0).unwrap();
        player.play();
        player.tick(1.5);
        assert_eq!(player.time(), 3.0);
    }

    #[test]
    fn test_invalid_speed_rejected() {
        let mut player = player(EndPolicy::ClampAndStop);
        assert!(matches!(
            player.set_speed(0.0),
            Err(PlaybackError::InvalidSpeed(_))
        ));
        assert!(player.set_speed(-1.0).is_err());
        assert!(player.set_speed(f64::NAN).is_err());
        assert_eq!(player.speed(), 1.0);

        player.set_speed(50.0).unwrap();
        assert_eq!(player.speed(), 10.0);
    }

    #[test]
    fn test_inverted_speed_bounds_rejected() {
        let config: PlaybackConfig = toml::from_str("min_speed = 5.0\nmax_speed = 1.0").unwrap();
        assert!(matches!(
            Player::new(scenario(), config),
            Err(PlaybackError::InvalidConfig(_))
        ));

        let config = PlaybackConfig {
            min_speed: f64::NAN,
            ..PlaybackConfig::default()
        };
        assert!(Player::new(scenario(), config).is_err());
    }

    #[test]
    fn test_seek_keeps_run_flag() {
        let mut player = player(EndPolicy::ClampAndStop);
        player.seek(7.0);
        assert!(!player.is_playing());
        assert_eq!(player.status(), PlaybackStatus::Paused);

        player.play();
        player.seek(2.0);
        assert!(player.is_playing());
        assert_eq!(player.fired_events().len(), 1);
    }

    #[test]
    fn test_seek_back_rebuilds_fired_set() {
        let mut player = player(EndPolicy::ClampAndStop);
        player.seek(9.5);
        let update = player.seek(4.0);
        assert!(update.rewound);
        assert_eq!(update.newly_fired, 0..2);
        assert!(!player.is_fired("a4"));
    }

    #[test]
    fn test_clamp_policy_stops_at_end() {
        let mut player = player(EndPolicy::ClampAndStop);
        player.seek(9.0);
        player.play();
        let update = player.tick(5.0);
        assert!(update.finished);
        assert_eq!(player.time(), 10.0);
        assert!(!player.is_playing());
        assert_eq!(player.status(), PlaybackStatus::Finished);
        assert_eq!(player.fired_events().len(), 4);
    }

    #[test]
    fn test_wrap_policy_loops() {
        let mut player = player(EndPolicy::Wrap);
        player.seek(9.0);
        player.play();
        let update = player.tick(5.0);
        assert!(update.rewound);
        assert!(!update.finished);
        assert_eq!(player.time(), 0.0);
        assert!(player.is_playing());
        assert_eq!(player.fired_events().len(), 1);
    }

    #[test]
    fn test_play_at_end_rewinds() {
        let mut player = player(EndPolicy::ClampAndStop);
        player.seek(10.0);
        assert_eq!(player.status(), PlaybackStatus::Finished);
        player.play();
        assert!(player.is_playing());
        assert_eq!(player.time(), 0.0);
    }

    #[test]
    fn test_restart() {
        let mut player = player(EndPolicy::ClampAndStop);
        player.play();
        player.tick(7.0);
        player.restart();
        assert_eq!(player.status(), PlaybackStatus::Stopped);
        assert_eq!(player.fired_events().len(), 1);
    }

    #[test]
    fn test_step_pauses() {
        let mut player = player(EndPolicy::ClampAndStop);
        player.play();
        player.step_forward();
        assert!(!player.is_playing());
        assert_eq!(player.time(), 1.0);
        player.step_back();
        player.step_back();
        assert_eq!(player.time(), 0.0);
    }

    #[test]
    fn test_recent_events() {
        let mut player = player(EndPolicy::ClampAndStop);
        player.seek(10.0);
        let ids: Vec<&str> = player.recent_events(2).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a4", "a10"]);
        assert_eq!(player.recent_events(10).len(), 4);
    }

    #[test]
    fn test_metrics_follow_time() {
        let mut player = player(EndPolicy::ClampAndStop);
        player.seek(5.0);
        assert_eq!(player.metrics()["touchpoints"].as_number(), Some(1.0));
        assert_eq!(player.metrics()["gateTimeSec"].as_number(), Some(5.0));
        player.seek(0.0);
        assert_eq!(player.metrics()["touchpoints"].as_number(), Some(0.0));
    }

    #[test]
    fn test_play_epoch_advances_on_start() {
        let mut player = player(EndPolicy::ClampAndStop);
        player.play();
        player.play();
        assert_eq!(player.play_epoch(), 1);
        player.pause();
        player.play();
        assert_eq!(player.play_epoch(), 2);
    }

    #[test]
    fn test_invalid_initial_config() {
        let config = PlaybackConfig::default().with_speed(0.0);
        assert!(matches!(
            Player::new(scenario(), config),
            Err(PlaybackError::InvalidSpeed(_))
        ));
    }
}
