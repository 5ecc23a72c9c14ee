//! Derived state at a query time
//!
//! A [`Snapshot`] is the read-only triple handed to renderers (time, fired
//! events, metrics) plus derived actor and door state. It is rebuilt from the
//! scenario for every query and carries nothing over from earlier queries.

use serde::Serialize;
use yardsim_animation::Point;

use crate::event::{EventType, SimEvent};
use crate::metrics::{definitions_for, evaluate, is_door_occupied, MetricContext, MetricRecord};
use crate::projector::EventIndex;
use crate::scenario::{ActorKind, Scenario};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorState {
    pub id: String,
    pub kind: ActorKind,
    /// Sampled from the actor's motion path, if it has one
    pub position: Option<Point>,
    /// Type of the latest fired event attributed to the actor
    pub status: Option<EventType>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DoorState {
    pub id: String,
    pub occupied: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub time_sec: f64,
    pub fired_events: Vec<SimEvent>,
    pub metrics: MetricRecord,
    pub actors: Vec<ActorState>,
    pub doors: Vec<DoorState>,
}

impl Snapshot {
    /// Build the snapshot for `time_sec`, clamped to the scenario bounds
    pub fn at(scenario: &Scenario, index: &EventIndex, time_sec: f64, facilities: u32) -> Self {
        let time_sec = scenario.clamp_time(time_sec);
        let log = index.log_at(time_sec);
        let ctx = MetricContext::new(scenario, log, time_sec).with_facilities(facilities);

        Self {
            time_sec,
            fired_events: log.to_vec(),
            metrics: evaluate(definitions_for(scenario.tab), &ctx),
            actors: actor_states(scenario, log, time_sec),
            doors: door_states(scenario, log, time_sec),
        }
    }
}

/// Position and status for every actor at `time_sec`.
///
/// `log` must be sorted ascending by `t`.
pub fn actor_states(scenario: &Scenario, log: &[SimEvent], time_sec: f64) -> Vec<ActorState> {
    scenario
        .actors
        .iter()
        .map(|actor| ActorState {
            id: actor.id.clone(),
            kind: actor.kind,
            position: scenario
                .motion_for(&actor.id)
                .and_then(|m| m.position_at(time_sec)),
            status: log
                .iter()
                .rev()
                .filter(|e| e.fired_by(time_sec))
                .find(|e| e.actor_id.as_deref() == Some(actor.id.as_str()))
                .map(|e| e.kind),
        })
        .collect()
}

pub fn door_states(scenario: &Scenario, log: &[SimEvent], time_sec: f64) -> Vec<DoorState> {
    scenario
        .doors
        .iter()
        .map(|door| DoorState {
            id: door.id.clone(),
            occupied: is_door_occupied(log, &door.id, time_sec),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{MetricValue, DEFAULT_FACILITIES};
    use crate::scenario::{Door, SimActor, SimMode, SimTab};
    use yardsim_animation::{MotionPath, PathSegment};

    fn scenario() -> Scenario {
        Scenario::new("ops_after", SimTab::Ops, SimMode::After, 300.0)
            .actor(SimActor::new("t1", ActorKind::Truck, "Truck 1"))
            .door(Door::new("D1", "Door 1", Point::new(820.0, 190.0)))
            .motion(MotionPath::new("t1").segment(PathSegment::new(
                0.0,
                20.0,
                Point::new(80.0, 360.0),
                Point::new(820.0, 190.0),
            )))
            .events([
                SimEvent::new("oa0", 0.0, EventType::Arrive).actor("t1"),
                SimEvent::new("oa3", 20.0, EventType::LoadingStart).actor("t1").door("D1"),
                SimEvent::new("oa4", 120.0, EventType::LoadingEnd).actor("t1").door("D1"),
            ])
    }

    #[test]
    fn test_snapshot_clamps_time() {
        let s = scenario();
        let index = EventIndex::new(&s);
        let snap = Snapshot::at(&s, &index, 999.0, DEFAULT_FACILITIES);
        assert_eq!(snap.time_sec, 300.0);
        assert_eq!(snap.fired_events.len(), 3);
    }

    #[test]
    fn test_actor_and_door_state() {
        let s = scenario();
        let index = EventIndex::new(&s);

        let snap = Snapshot::at(&s, &index, 50.0, DEFAULT_FACILITIES);
        assert_eq!(snap.actors[0].status, Some(EventType::LoadingStart));
        assert_eq!(snap.actors[0].position, Some(Point::new(820.0, 190.0)));
        assert!(snap.doors[0].occupied);
        assert_eq!(snap.metrics["doorUtilPct"], MetricValue::Number(100.0));

        let snap = Snapshot::at(&s, &index, 10.0, DEFAULT_FACILITIES);
        assert_eq!(snap.actors[0].status, Some(EventType::Arrive));
        assert_eq!(snap.actors[0].position, Some(Point::new(450.0, 275.0)));
        assert!(!snap.doors[0].occupied);
    }

    #[test]
    fn test_snapshot_serializes() {
        let s = scenario();
        let index = EventIndex::new(&s);
        let json = serde_json::to_value(Snapshot::at(&s, &index, 0.0, 1)).unwrap();
        assert_eq!(json["timeSec"], 0.0);
        assert_eq!(json["metrics"]["queueing"], 0.0);
        assert_eq!(json["actors"][0]["status"], "arrive");
    }
}
