//! Event projection
//!
//! Projection answers "which events have fired by time T". [`project`] is the
//! reference linear scan; [`EventIndex`] sorts once and answers the same query
//! with a binary search. Both order ties by authored position, so the result is
//! identical whichever is used.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::event::SimEvent;
use crate::scenario::Scenario;

/// Events fired by a query time
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
    /// Fired events, ascending by `t`
    pub log: Vec<SimEvent>,
    /// Ids of fired events
    pub fired: FxHashSet<String>,
}

impl Projection {
    pub fn has_fired(&self, event_id: &str) -> bool {
        self.fired.contains(event_id)
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    fn from_sorted(log: Vec<SimEvent>) -> Self {
        let fired = log.iter().map(|e| e.id.clone()).collect();
        Self { log, fired }
    }
}

/// Stable sort by time; equal times keep their authored order
pub fn sort_events(events: &mut [SimEvent]) {
    events.sort_by(|a, b| a.t.total_cmp(&b.t));
}

/// Compute the events with `t <= time_sec`.
///
/// Callers clamp `time_sec` to the scenario bounds; the projection itself is a
/// plain filter and holds no state between calls.
pub fn project(scenario: &Scenario, time_sec: f64) -> Projection {
    let mut log: Vec<SimEvent> = scenario
        .events
        .iter()
        .filter(|e| e.fired_by(time_sec))
        .cloned()
        .collect();
    sort_events(&mut log);
    Projection::from_sorted(log)
}

/// Events of one scenario, sorted once for repeated per-frame queries
#[derive(Clone, Debug, Default)]
pub struct EventIndex {
    events: Vec<SimEvent>,
    positions: FxHashMap<String, usize>,
}

impl EventIndex {
    pub fn new(scenario: &Scenario) -> Self {
        let mut events = scenario.events.clone();
        sort_events(&mut events);
        let positions = events
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        Self { events, positions }
    }

    /// All events, ascending by `t`
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events fired by `time_sec`
    pub fn fired_count(&self, time_sec: f64) -> usize {
        self.events.partition_point(|e| e.fired_by(time_sec))
    }

    /// The fired prefix of the sorted events
    pub fn log_at(&self, time_sec: f64) -> &[SimEvent] {
        &self.events[..self.fired_count(time_sec)]
    }

    /// Sorted position of an event
    pub fn position(&self, event_id: &str) -> Option<usize> {
        self.positions.get(event_id).copied()
    }

    /// O(1) membership test against a fired prefix length
    pub fn is_fired(&self, event_id: &str, fired_count: usize) -> bool {
        self.position(event_id).is_some_and(|pos| pos < fired_count)
    }

    /// Same result as [`project`], computed from the sorted index
    pub fn project(&self, time_sec: f64) -> Projection {
        Projection::from_sorted(self.log_at(time_sec).to_vec())
    }
}
