//! Virtual clock for deterministic replay timing.
//!
//! Holds the timeline position, run flag and speed. The clock never reads wall
//! time: it only moves when told to, by a seek or by an explicit elapsed delta
//! from the frame scheduler.

use crate::config::EndPolicy;

/// What advancing the clock did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Not running, nothing changed
    Idle,
    /// Moved forward within the timeline
    Moved,
    /// Ran past the end and jumped back to zero, still running
    Wrapped,
    /// Reached the end and stopped
    Finished,
}

/// A virtual clock for controlling replay timing.
///
/// The position is always within `[0, duration]`.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    /// Current virtual time position (seconds).
    position: f64,
    running: bool,
    /// Playback speed multiplier (1.0 = normal, 2.0 = 2x speed).
    speed: f64,
    duration: f64,
}

impl VirtualClock {
    pub fn new(duration: f64) -> Self {
        Self {
            position: 0.0,
            running: false,
            speed: 1.0,
            duration: duration.max(0.0),
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the speed. Callers validate and clamp; this only stores it.
    pub(crate) fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn play(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Seek to a position, clamped into the timeline. Does not change the run flag.
    pub fn seek(&mut self, position: f64) {
        self.position = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, self.duration)
        };
    }

    /// Seek by a relative amount.
    pub fn seek_by(&mut self, delta: f64) {
        self.seek(self.position + delta);
    }

    /// Advance by `elapsed` wall-clock seconds scaled by the speed.
    pub fn advance(&mut self, elapsed: f64, policy: EndPolicy) -> Advance {
        if !self.running {
            return Advance::Idle;
        }

        let proposed = self.position + elapsed * self.speed;
        match policy {
            EndPolicy::Wrap if proposed > self.duration => {
                self.position = 0.0;
                Advance::Wrapped
            }
            EndPolicy::Wrap => {
                self.position = proposed;
                Advance::Moved
            }
            EndPolicy::ClampAndStop if proposed >= self.duration => {
                self.position = self.duration;
                self.running = false;
                Advance::Finished
            }
            EndPolicy::ClampAndStop => {
                self.position = proposed;
                Advance::Moved
            }
        }
    }

    /// Get the progress as a fraction (0.0 to 1.0).
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        self.position / self.duration
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.duration
    }

    pub fn is_at_start(&self) -> bool {
        self.position == 0.0
    }

    /// Reset the clock to the beginning and stop.
    pub fn reset(&mut self) {
        self.position = 0.0;
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_creation() {
        let clock = VirtualClock::new(165.0);
        assert!(!clock.is_running());
        assert_eq!(clock.position(), 0.0);
        assert_eq!(clock.speed(), 1.0);
        assert!(clock.is_at_start());
    }

    #[test]
    fn test_seek() {
        let mut clock = VirtualClock::new(100.0);

        clock.seek(50.0);
        assert_eq!(clock.position(), 50.0);

        // Seek beyond duration should clamp
        clock.seek(200.0);
        assert_eq!(clock.position(), 100.0);

        clock.seek(-3.0);
        assert_eq!(clock.position(), 0.0);
    }

    #[test]
    fn test_seek_by() {
        let mut clock = VirtualClock::new(100.0);
        clock.seek(50.0);
        clock.seek_by(10.0);
        assert_eq!(clock.position(), 60.0);
        clock.seek_by(-100.0);
        assert_eq!(clock.position(), 0.0);
    }

    #[test]
    fn test_advance_is_noop_when_paused() {
        let mut clock = VirtualClock::new(100.0);
        assert_eq!(clock.advance(5.0, EndPolicy::ClampAndStop), Advance::Idle);
        assert_eq!(clock.position(), 0.0);
    }

    #[test]
    fn test_advance_scales_by_speed() {
        let mut clock = VirtualClock::new(100.0);
        clock.set_speed(2.0);
        clock.play();
        assert_eq!(clock.advance(1.5, EndPolicy::ClampAndStop), Advance::Moved);
        assert_eq!(clock.position(), 3.0);
    }

    #[test]
    fn test_clamp_and_stop_at_end() {
        let mut clock = VirtualClock::new(100.0);
        clock.seek(99.0);
        clock.play();
        assert_eq!(clock.advance(5.0, EndPolicy::ClampAndStop), Advance::Finished);
        assert_eq!(clock.position(), 100.0);
        assert!(!clock.is_running());
        assert!(clock.is_at_end());
    }

    #[test]
    fn test_wrap_at_end() {
        let mut clock = VirtualClock::new(100.0);
        clock.seek(99.0);
        clock.play();
        assert_eq!(clock.advance(5.0, EndPolicy::Wrap), Advance::Wrapped);
        assert_eq!(clock.position(), 0.0);
        assert!(clock.is_running());
    }

    #[test]
    fn test_progress() {
        let mut clock = VirtualClock::new(200.0);
        assert_eq!(clock.progress(), 0.0);
        clock.seek(50.0);
        assert!((clock.progress() - 0.25).abs() < 1e-12);
    }
}
