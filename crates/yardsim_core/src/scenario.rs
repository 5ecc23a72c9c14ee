//! Scenario data model
//!
//! A scenario is authored once and never mutated: switching scenarios replaces
//! it wholesale. [`Scenario::validate`] rejects authoring mistakes at load time
//! so derived state never has to cope with dangling references or events
//! outside the timeline.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use yardsim_animation::{MotionPath, Point};

use crate::error::ScenarioError;
use crate::event::SimEvent;

/// Which simulation family a scenario belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimTab {
    Driver,
    Ops,
    Network,
}

/// Before/after comparison side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimMode {
    Before,
    After,
}

impl SimMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimMode::Before => "before",
            SimMode::After => "after",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Truck,
    Spotter,
    Staff,
    Door,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimActor {
    pub id: String,
    pub kind: ActorKind,
    #[serde(default)]
    pub label: String,
}

impl SimActor {
    pub fn new(id: impl Into<String>, kind: ActorKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
        }
    }
}

/// A loading door referenced by events through `doorId`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub at: Point,
}

impl Door {
    pub fn new(id: impl Into<String>, label: impl Into<String>, at: Point) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            at,
        }
    }
}

/// A labelled modelling assumption shown next to the metrics
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    pub label: String,
    pub value: String,
}

/// An immutable, pre-authored timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub tab: SimTab,
    pub mode: SimMode,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Maximum valid query time (seconds)
    pub duration_sec: f64,
    #[serde(default)]
    pub actors: Vec<SimActor>,
    #[serde(default)]
    pub doors: Vec<Door>,
    #[serde(default)]
    pub motions: Vec<MotionPath>,
    #[serde(default)]
    pub route_hint: Vec<Point>,
    /// Authoring order is arbitrary; consumers sort by `t`
    #[serde(default)]
    pub events: Vec<SimEvent>,
    #[serde(default)]
    pub assumptions: Vec<Assumption>,
}

impl Scenario {
    pub fn new(id: impl Into<String>, tab: SimTab, mode: SimMode, duration_sec: f64) -> Self {
        Self {
            id: id.into(),
            tab,
            mode,
            title: String::new(),
            description: String::new(),
            duration_sec,
            actors: Vec::new(),
            doors: Vec::new(),
            motions: Vec::new(),
            route_hint: Vec::new(),
            events: Vec::new(),
            assumptions: Vec::new(),
        }
    }

    /// Parse a scenario from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn actor(mut self, actor: SimActor) -> Self {
        self.actors.push(actor);
        self
    }

    pub fn door(mut self, door: Door) -> Self {
        self.doors.push(door);
        self
    }

    pub fn motion(mut self, motion: MotionPath) -> Self {
        self.motions.push(motion);
        self
    }

    pub fn event(mut self, event: SimEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn events(mut self, events: impl IntoIterator<Item = SimEvent>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn assumption(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.assumptions.push(Assumption {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    /// Clamp a query time into `[0, duration_sec]`
    pub fn clamp_time(&self, time_sec: f64) -> f64 {
        if time_sec.is_nan() {
            return 0.0;
        }
        time_sec.clamp(0.0, self.duration_sec)
    }

    pub fn actor_by_id(&self, id: &str) -> Option<&SimActor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn motion_for(&self, actor_id: &str) -> Option<&MotionPath> {
        self.motions.iter().find(|m| m.actor_id == actor_id)
    }

    /// Ids of all truck actors, in authored order
    pub fn truck_ids(&self) -> impl Iterator<Item = &str> {
        self.actors
            .iter()
            .filter(|a| a.kind == ActorKind::Truck)
            .map(|a| a.id.as_str())
    }

    /// Check the load-time preconditions the engine relies on.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !self.duration_sec.is_finite() || self.duration_sec <= 0.0 {
            return Err(ScenarioError::InvalidDuration {
                scenario: self.id.clone(),
                duration: self.duration_sec,
            });
        }

        let mut actors = FxHashSet::default();
        for actor in &self.actors {
            if !actors.insert(actor.id.as_str()) {
                return Err(ScenarioError::DuplicateActor(actor.id.clone()));
            }
        }

        let mut doors = FxHashSet::default();
        for door in &self.doors {
            if !doors.insert(door.id.as_str()) {
                return Err(ScenarioError::DuplicateDoor(door.id.clone()));
            }
        }

        let mut events = FxHashSet::default();
        for event in &self.events {
            if !events.insert(event.id.as_str()) {
                return Err(ScenarioError::DuplicateEvent(event.id.clone()));
            }
            // `!(a <= b)` also rejects NaN
            if !(event.t >= 0.0 && event.t <= self.duration_sec) {
                return Err(ScenarioError::EventOutOfRange {
                    event: event.id.clone(),
                    t: event.t,
                    duration: self.duration_sec,
                });
            }
            if let Some(actor) = &event.actor_id {
                if !actors.contains(actor.as_str()) {
                    return Err(ScenarioError::UnknownActor {
                        event: event.id.clone(),
                        actor: actor.clone(),
                    });
                }
            }
            if let Some(door) = &event.door_id {
                if !doors.contains(door.as_str()) {
                    return Err(ScenarioError::UnknownDoor {
                        event: event.id.clone(),
                        door: door.clone(),
                    });
                }
            }
        }

        for motion in &self.motions {
            if !actors.contains(motion.actor_id.as_str()) {
                return Err(ScenarioError::UnknownMotionActor(motion.actor_id.clone()));
            }
            if let Some(bad) = motion.segments.iter().find(|s| !(s.t0 <= s.t1)) {
                return Err(ScenarioError::InvalidSegment {
                    actor: motion.actor_id.clone(),
                    t0: bad.t0,
                    t1: bad.t1,
                });
            }
        }

        tracing::debug!(
            scenario = %self.id,
            events = self.events.len(),
            actors = self.actors.len(),
            doors = self.doors.len(),
            "scenario validated"
        );
        Ok(())
    }
}
