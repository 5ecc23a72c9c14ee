//! Facility operations metrics

use serde::Serialize;

use super::{fired, first_milestone, first_of, ActorScope};
use crate::event::{DoorTransition, EventType, Milestone, SimEvent};
use crate::scenario::Scenario;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OpsMetrics {
    /// Trucks queued and not yet assigned a door
    pub queueing: usize,
    /// Occupied doors as a whole percentage of all doors
    pub door_util_pct: u32,
    /// Spotter moves extrapolated to an hourly rate
    pub moves_per_hour: u32,
    pub exceptions: usize,
    /// Mean dwell across arrived trucks, in-progress visits measured to now
    pub avg_dwell_sec: f64,
}

/// Whether `door_id` is mid loading-cycle at `time_sec`.
///
/// Compares the latest fired `loading_start` against the latest fired
/// `loading_end` for the door, so repeated cycles on one door are handled.
/// Events after `time_sec` are ignored.
pub fn is_door_occupied(log: &[SimEvent], door_id: &str, time_sec: f64) -> bool {
    let mut last_start: Option<f64> = None;
    let mut last_end: Option<f64> = None;

    for event in fired(log, time_sec).filter(|e| e.is_door(door_id)) {
        let slot = match event.kind.door_transition() {
            Some(DoorTransition::Start) => &mut last_start,
            Some(DoorTransition::End) => &mut last_end,
            None => continue,
        };
        *slot = Some(slot.map_or(event.t, |t: f64| t.max(event.t)));
    }

    match (last_start, last_end) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(start), Some(end)) => start > end,
    }
}

/// Number of scenario doors occupied at `time_sec`
pub fn occupied_doors(scenario: &Scenario, log: &[SimEvent], time_sec: f64) -> usize {
    scenario
        .doors
        .iter()
        .filter(|d| is_door_occupied(log, &d.id, time_sec))
        .count()
}

/// A truck is queueing once `queue_start` fires and until an `assigned_door`
/// at or after it fires.
fn is_queueing(log: &[SimEvent], truck: &str, time_sec: f64) -> bool {
    let scope = ActorScope::Only(truck);
    let Some(queued) = first_of(log, time_sec, EventType::QueueStart, scope) else {
        return false;
    };
    !fired(log, time_sec)
        .any(|e| e.kind == EventType::AssignedDoor && scope.matches(e) && e.t >= queued.t)
}

fn truck_dwell(log: &[SimEvent], truck: &str, time_sec: f64) -> Option<f64> {
    let scope = ActorScope::Only(truck);
    let arrive = first_milestone(log, time_sec, Milestone::Arrival, scope)?;
    let end = first_milestone(log, time_sec, Milestone::Exit, scope).map_or(time_sec, |e| e.t);
    Some((end - arrive.t).max(0.0))
}

pub fn ops_metrics(scenario: &Scenario, log: &[SimEvent], time_sec: f64) -> OpsMetrics {
    let queueing = scenario
        .truck_ids()
        .filter(|id| is_queueing(log, id, time_sec))
        .count();

    let door_util_pct = if scenario.doors.is_empty() {
        0
    } else {
        let occupied = occupied_doors(scenario, log, time_sec) as f64;
        (100.0 * occupied / scenario.doors.len() as f64).round() as u32
    };

    let moves = fired(log, time_sec)
        .filter(|e| e.kind == EventType::YardMove)
        .count();
    let moves_per_hour = if time_sec > 0.0 {
        (moves as f64 / time_sec * 3600.0).round() as u32
    } else {
        0
    };

    let exceptions = fired(log, time_sec)
        .filter(|e| e.kind == EventType::Exception)
        .count();

    let dwells: Vec<f64> = scenario
        .truck_ids()
        .filter_map(|id| truck_dwell(log, id, time_sec))
        .collect();
    let avg_dwell_sec = if dwells.is_empty() {
        0.0
    } else {
        dwells.iter().sum::<f64>() / dwells.len() as f64
    };

    OpsMetrics {
        queueing,
        door_util_pct,
        moves_per_hour,
        exceptions,
        avg_dwell_sec,
    }
}
