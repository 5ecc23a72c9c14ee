//! Derived metrics
//!
//! Every metric is a pure function of a projected event log and a query time.
//! Helpers here only look at events with `t <= time_sec`, so passing a
//! full, unprojected log gives the same answer as passing the projection.
//!
//! A metric whose prerequisite event has not fired yet is a valid state:
//! time spans come back as `None` and counts as zero, never as an error.

mod driver;
mod network;
mod ops;
mod registry;

pub use driver::{driver_metrics, primary_actor, DriverMetrics, Span, DETENTION_THRESHOLD_SEC};
pub use network::{
    eta_accuracy, network_metrics, saturation, NetworkMetrics, NetworkModel, SaturationCurve,
    BASELINE_DWELL_MINS, MAX_FACILITIES, MIN_FACILITIES,
};
pub use ops::{is_door_occupied, occupied_doors, ops_metrics, OpsMetrics};
pub use registry::{
    definitions_for, evaluate, MetricContext, MetricDef, MetricInputs, MetricRecord, MetricValue,
    DEFAULT_FACILITIES,
};

use crate::event::{EventType, Milestone, SimEvent};

/// Which events count towards an actor-scoped metric
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorScope<'a> {
    /// Every event
    All,
    /// Only events attributed to this actor
    Only(&'a str),
    /// Events attributed to this actor plus unattributed ones
    Primary(&'a str),
}

impl ActorScope<'_> {
    pub fn matches(&self, event: &SimEvent) -> bool {
        match self {
            ActorScope::All => true,
            ActorScope::Only(id) => event.actor_id.as_deref() == Some(*id),
            ActorScope::Primary(id) => event.actor_id.as_deref().map_or(true, |a| a == *id),
        }
    }
}

/// Events fired by `time_sec`
pub(crate) fn fired<'a>(
    log: &'a [SimEvent],
    time_sec: f64,
) -> impl Iterator<Item = &'a SimEvent> + 'a {
    log.iter().filter(move |e| e.fired_by(time_sec))
}

/// Earliest fired event of a type within a scope
pub(crate) fn first_of<'a>(
    log: &'a [SimEvent],
    time_sec: f64,
    kind: EventType,
    scope: ActorScope<'_>,
) -> Option<&'a SimEvent> {
    fired(log, time_sec)
        .filter(|e| e.kind == kind && scope.matches(e))
        .min_by(|a, b| a.t.total_cmp(&b.t))
}

/// Earliest fired event marking a milestone within a scope
pub(crate) fn first_milestone<'a>(
    log: &'a [SimEvent],
    time_sec: f64,
    milestone: Milestone,
    scope: ActorScope<'_>,
) -> Option<&'a SimEvent> {
    fired(log, time_sec)
        .filter(|e| e.kind.milestone() == Some(milestone) && scope.matches(e))
        .min_by(|a, b| a.t.total_cmp(&b.t))
}

/// Count of fired events flagged as touchpoints
pub fn count_touchpoints(log: &[SimEvent], time_sec: f64, scope: ActorScope<'_>) -> usize {
    fired(log, time_sec)
        .filter(|e| e.touchpoint && scope.matches(e))
        .count()
}
