//! Piecewise motion paths
//!
//! A motion path is an ordered list of segments, each moving an actor from one
//! scene point to another over a `[t0, t1]` window. Sampling a path is a pure
//! function of the query time, so scrubbing and replaying always agree.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::easing::{lerp, Easing};

/// A point in scene coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Interpolate towards `to` with an already-eased progress value
    pub fn lerp(self, to: Point, t: f32) -> Point {
        Point::new(lerp(self.x, to.x, t), lerp(self.y, to.y, t))
    }
}

/// A single timed segment of a motion path
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    /// Segment start (seconds)
    pub t0: f64,
    /// Segment end (seconds)
    pub t1: f64,
    pub from: Point,
    pub to: Point,
    #[serde(default)]
    pub ease: Easing,
}

impl PathSegment {
    pub fn new(t0: f64, t1: f64, from: Point, to: Point) -> Self {
        Self {
            t0,
            t1,
            from,
            to,
            ease: Easing::Linear,
        }
    }

    /// A segment that holds an actor in place for the window
    pub fn hold(t0: f64, t1: f64, at: Point) -> Self {
        Self::new(t0, t1, at, at)
    }

    pub fn with_ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    pub fn contains(&self, time_sec: f64) -> bool {
        time_sec >= self.t0 && time_sec <= self.t1
    }

    /// Sample this segment at `time_sec`, clamping progress to the segment window
    pub fn sample(&self, time_sec: f64) -> Point {
        let span = self.t1 - self.t0;
        if span <= 1e-6 {
            return self.to;
        }

        let progress = ((time_sec - self.t0) / span).clamp(0.0, 1.0) as f32;
        self.from.lerp(self.to, self.ease.apply(progress))
    }
}

/// The motion of one actor across a scenario
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionPath {
    pub actor_id: String,
    pub segments: SmallVec<[PathSegment; 8]>,
}

impl MotionPath {
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            segments: SmallVec::new(),
        }
    }

    /// Append a segment
    pub fn segment(mut self, segment: PathSegment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Get the actor position at `time_sec`.
    ///
    /// Uses the first segment whose window contains the time. Before the first
    /// segment the first one is used, past the last segment the last one is.
    /// Returns `None` for an empty path.
    pub fn position_at(&self, time_sec: f64) -> Option<Point> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;

        let segment = self
            .segments
            .iter()
            .find(|s| s.contains(time_sec))
            .unwrap_or(if time_sec < first.t0 { first } else { last });

        Some(segment.sample(time_sec))
    }

    /// Latest segment end, or 0 for an empty path
    pub fn end_time(&self) -> f64 {
        self.segments.iter().map(|s| s.t1).fold(0.0, f64::max)
    }
}
