//! Single-driver journey metrics

use serde::Serialize;

use super::{count_touchpoints, first_milestone, ActorScope};
use crate::event::{Milestone, SimEvent};
use crate::scenario::Scenario;

/// Dwell at or above this is flagged as detention risk (4 hours, illustrative)
pub const DETENTION_THRESHOLD_SEC: f64 = 4.0 * 3600.0;

/// An elapsed time measured from an anchor event.
///
/// While the closing event has not fired, `secs` is the live elapsed time up to
/// the query time and `completed` is false.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Span {
    pub secs: f64,
    pub completed: bool,
}

impl Span {
    fn between(start: &SimEvent, end: Option<&SimEvent>, time_sec: f64) -> Self {
        match end {
            Some(end) => Span {
                secs: end.t - start.t,
                completed: true,
            },
            None => Span {
                secs: (time_sec - start.t).max(0.0),
                completed: false,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DriverMetrics {
    /// Arrival to door (or lane) assignment; `None` before arrival
    pub gate: Option<Span>,
    /// Arrival to leaving on the exit road; `None` before arrival
    pub dwell: Option<Span>,
    pub touchpoints: usize,
    pub detention_risk: bool,
    /// The driver has left on the exit road
    pub completed: bool,
}

/// The first truck in the scenario, which driver metrics follow
pub fn primary_actor(scenario: &Scenario) -> Option<&str> {
    scenario.truck_ids().next()
}

/// Compute driver metrics at `time_sec`.
///
/// Events without an actor are attributed to the primary truck. Gate time
/// closes on the first door assignment, falling back to a lane assignment.
pub fn driver_metrics(scenario: &Scenario, log: &[SimEvent], time_sec: f64) -> DriverMetrics {
    let scope = primary_actor(scenario).map_or(ActorScope::All, ActorScope::Primary);

    let arrive = first_milestone(log, time_sec, Milestone::Arrival, scope);
    let assigned = first_milestone(log, time_sec, Milestone::DoorAssignment, scope)
        .or_else(|| first_milestone(log, time_sec, Milestone::LaneAssignment, scope));
    let exit = first_milestone(log, time_sec, Milestone::Exit, scope);

    let gate = arrive.map(|a| Span::between(a, assigned, time_sec));
    let dwell = arrive.map(|a| Span::between(a, exit, time_sec));

    DriverMetrics {
        gate,
        dwell,
        touchpoints: count_touchpoints(log, time_sec, scope),
        detention_risk: dwell.is_some_and(|d| d.secs >= DETENTION_THRESHOLD_SEC),
        completed: exit.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use crate::scenario::{ActorKind, SimActor, SimMode, SimTab};

    fn driver_after() -> Scenario {
        Scenario::new("driver_after", SimTab::Driver, SimMode::After, 170.0)
            .actor(SimActor::new("truck_main", ActorKind::Truck, "Driver"))
            .actor(SimActor::new("truck_q1", ActorKind::Truck, "Queue"))
            .events([
                SimEvent::new("a0", 0.0, EventType::Arrive),
                SimEvent::new("a1", 3.0, EventType::QrScan).touchpoint(),
                SimEvent::new("a3", 8.0, EventType::AssignedLane),
                SimEvent::new("a4", 12.0, EventType::AssignedDoor),
                SimEvent::new("a10", 165.0, EventType::ExitRoad),
            ])
    }

    #[test]
    fn test_before_arrival_everything_is_missing() {
        let s = Scenario::new("d", SimTab::Driver, SimMode::Before, 100.0)
            .event(SimEvent::new("a", 10.0, EventType::Arrive));
        let m = driver_metrics(&s, &s.events, 5.0);
        assert_eq!(m.gate, None);
        assert_eq!(m.dwell, None);
        assert!(!m.detention_risk);
        assert!(!m.completed);
    }

    #[test]
    fn test_in_progress_values_are_live() {
        let s = driver_after();
        let m = driver_metrics(&s, &s.events, 5.0);
        assert_eq!(
            m.gate,
            Some(Span {
                secs: 5.0,
                completed: false
            })
        );
        assert_eq!(m.touchpoints, 1);
    }

    #[test]
    fn test_lane_assignment_is_fallback() {
        let s = driver_after();
        let m = driver_metrics(&s, &s.events, 10.0);
        assert_eq!(
            m.gate,
            Some(Span {
                secs: 8.0,
                completed: true
            })
        );

        // Once the door assignment fires it takes precedence
        let m = driver_metrics(&s, &s.events, 12.0);
        assert_eq!(m.gate.map(|g| g.secs), Some(12.0));
    }

    #[test]
    fn test_completed_journey() {
        let s = driver_after();
        let m = driver_metrics(&s, &s.events, 170.0);
        assert_eq!(m.dwell.map(|d| d.secs), Some(165.0));
        assert!(m.completed);
        assert!(!m.detention_risk);
    }

    #[test]
    fn test_detention_threshold() {
        let s = Scenario::new("long", SimTab::Driver, SimMode::Before, 20_000.0)
            .actor(SimActor::new("t", ActorKind::Truck, "Driver"))
            .event(SimEvent::new("a", 0.0, EventType::Arrive).actor("t"));
        assert!(!driver_metrics(&s, &s.events, DETENTION_THRESHOLD_SEC - 1.0).detention_risk);
        assert!(driver_metrics(&s, &s.events, DETENTION_THRESHOLD_SEC).detention_risk);
    }

    #[test]
    fn test_other_trucks_are_ignored() {
        let s = driver_after().event(
            SimEvent::new("q", 1.0, EventType::RerouteManual)
                .actor("truck_q1")
                .touchpoint(),
        );
        assert_eq!(driver_metrics(&s, &s.events, 170.0).touchpoints, 1);
    }
}
