//! Playback configuration
//!
//! Deserializable from the `[playback]` table of a `yardsim.toml`; every field
//! has a default so partial tables are fine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use yardsim_core::metrics::DEFAULT_FACILITIES;

use crate::error::PlaybackError;

/// Shortest frame period handed to a timer
pub const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

/// What a tick does when it would run past the end of the timeline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndPolicy {
    /// Stop exactly at the end and pause
    #[default]
    #[serde(alias = "clamp")]
    ClampAndStop,
    /// Jump back to zero and keep playing
    #[serde(alias = "loop")]
    Wrap,
}

/// Configuration for the playback engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial playback speed (1.0 = real time)
    pub initial_speed: f64,
    pub end_policy: EndPolicy,
    /// Speeds offered to the user
    pub speed_presets: Vec<f64>,
    /// Lower clamp for accepted speeds
    pub min_speed: f64,
    /// Upper clamp for accepted speeds
    pub max_speed: f64,
    /// Frame cadence for hosts that drive the scheduler on a timer
    pub target_fps: u32,
    /// Seek distance for frame stepping (seconds)
    pub step_sec: f64,
    /// Network size fed to network-effect metrics
    pub facilities: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_speed: 1.0,
            end_policy: EndPolicy::ClampAndStop,
            speed_presets: vec![0.5, 1.0, 1.5, 2.0],
            min_speed: 0.1,
            max_speed: 10.0,
            target_fps: 60,
            step_sec: 1.0,
            facilities: DEFAULT_FACILITIES,
        }
    }
}

impl PlaybackConfig {
    /// Create a config for testing (clamp at the end, normal speed).
    pub fn testing() -> Self {
        Self::default()
    }

    /// Create a config for interactive viewing (loops forever).
    pub fn interactive() -> Self {
        Self {
            end_policy: EndPolicy::Wrap,
            ..Self::default()
        }
    }

    /// Set the initial playback speed.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.initial_speed = speed;
        self
    }

    pub fn with_end_policy(mut self, end_policy: EndPolicy) -> Self {
        self.end_policy = end_policy;
        self
    }

    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    pub fn with_facilities(mut self, facilities: u32) -> Self {
        self.facilities = facilities;
        self
    }

    /// Wall-clock time between frames at `target_fps`, never below
    /// [`MIN_FRAME_INTERVAL`]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1))).max(MIN_FRAME_INTERVAL)
    }

    /// Check the speed bounds and step size.
    ///
    /// The speed bounds must be finite with `0 < min_speed <= max_speed`, and
    /// `step_sec` must be finite.
    pub fn validate(&self) -> Result<(), PlaybackError> {
        let invalid = |msg: String| Err(PlaybackError::InvalidConfig(msg));

        if !self.min_speed.is_finite() || !self.max_speed.is_finite() {
            return invalid(format!(
                "speed bounds must be finite, got {}..{}",
                self.min_speed, self.max_speed
            ));
        }
        if self.min_speed <= 0.0 {
            return invalid(format!("min_speed must be positive, got {}", self.min_speed));
        }
        if self.min_speed > self.max_speed {
            return invalid(format!(
                "min_speed {} exceeds max_speed {}",
                self.min_speed, self.max_speed
            ));
        }
        if !self.step_sec.is_finite() {
            return invalid(format!("step_sec must be finite, got {}", self.step_sec));
        }
        Ok(())
    }

    /// Next preset above `current`, wrapping to the slowest
    pub fn next_preset(&self, current: f64) -> Option<f64> {
        self.speed_presets
            .iter()
            .copied()
            .find(|&s| s > current + 1e-9)
            .or_else(|| self.speed_presets.first().copied())
    }
}
