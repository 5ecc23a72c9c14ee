//! Named metric definitions per simulation tab
//!
//! The telemetry record is an ordered map from metric id to value, evaluated
//! from a [`MetricContext`]. Definitions are plain function pointers so the
//! tables can live in statics.

use std::cell::OnceCell;

use indexmap::IndexMap;
use serde::Serialize;

use super::{
    driver_metrics, network_metrics, ops_metrics, DriverMetrics, NetworkMetrics, OpsMetrics,
};
use crate::event::SimEvent;
use crate::format::{fmt_hms, fmt_money_m, fmt_pct};
use crate::scenario::{Scenario, SimTab};

/// Facility count used when none is supplied
pub const DEFAULT_FACILITIES: u32 = 12;

/// A metric value as handed to the telemetry collaborator
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    Flag(bool),
    /// The prerequisite event has not fired yet
    Missing,
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            MetricValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, MetricValue::Missing)
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(MetricValue::Missing, MetricValue::Number)
    }
}

/// Everything a metric may depend on
#[derive(Clone, Copy, Debug)]
pub struct MetricContext<'a> {
    pub scenario: &'a Scenario,
    /// Projected log, ascending by `t`
    pub log: &'a [SimEvent],
    pub time_sec: f64,
    /// Network size for network-effect metrics
    pub facilities: u32,
}

impl<'a> MetricContext<'a> {
    pub fn new(scenario: &'a Scenario, log: &'a [SimEvent], time_sec: f64) -> Self {
        Self {
            scenario,
            log,
            time_sec,
            facilities: DEFAULT_FACILITIES,
        }
    }

    pub fn with_facilities(mut self, facilities: u32) -> Self {
        self.facilities = facilities;
        self
    }
}

/// Metric structs for one context, each computed at most once.
///
/// A table evaluates several metrics off the same struct, so the struct is
/// shared across the whole table instead of recomputed per entry.
pub struct MetricInputs<'c, 'a> {
    ctx: &'c MetricContext<'a>,
    driver: OnceCell<DriverMetrics>,
    ops: OnceCell<OpsMetrics>,
    network: OnceCell<NetworkMetrics>,
}

impl<'c, 'a> MetricInputs<'c, 'a> {
    pub fn new(ctx: &'c MetricContext<'a>) -> Self {
        Self {
            ctx,
            driver: OnceCell::new(),
            ops: OnceCell::new(),
            network: OnceCell::new(),
        }
    }

    pub fn context(&self) -> &MetricContext<'a> {
        self.ctx
    }

    pub fn driver(&self) -> &DriverMetrics {
        self.driver
            .get_or_init(|| driver_metrics(self.ctx.scenario, self.ctx.log, self.ctx.time_sec))
    }

    pub fn ops(&self) -> &OpsMetrics {
        self.ops
            .get_or_init(|| ops_metrics(self.ctx.scenario, self.ctx.log, self.ctx.time_sec))
    }

    pub fn network(&self) -> &NetworkMetrics {
        self.network
            .get_or_init(|| network_metrics(self.ctx.scenario.mode, self.ctx.facilities))
    }
}

pub struct MetricDef {
    pub id: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub hint: &'static str,
    pub compute: fn(&MetricInputs<'_, '_>) -> MetricValue,
    pub format: fn(&MetricValue) -> String,
}

impl MetricDef {
    pub fn display(&self, ctx: &MetricContext<'_>) -> String {
        (self.format)(&(self.compute)(&MetricInputs::new(ctx)))
    }
}

impl std::fmt::Debug for MetricDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricDef")
            .field("id", &self.id)
            .field("unit", &self.unit)
            .finish()
    }
}

/// Ordered metric id -> value record
pub type MetricRecord = IndexMap<&'static str, MetricValue>;

pub fn evaluate(defs: &[MetricDef], ctx: &MetricContext<'_>) -> MetricRecord {
    let inputs = MetricInputs::new(ctx);
    defs.iter().map(|def| (def.id, (def.compute)(&inputs))).collect()
}

pub fn definitions_for(tab: SimTab) -> &'static [MetricDef] {
    match tab {
        SimTab::Driver => DRIVER_METRICS,
        SimTab::Ops => OPS_METRICS,
        SimTab::Network => NETWORK_METRICS,
    }
}

fn fmt_duration(v: &MetricValue) -> String {
    fmt_hms(v.as_number())
}

fn fmt_count(v: &MetricValue) -> String {
    match v {
        MetricValue::Number(n) => format!("{}", n.round()),
        MetricValue::Text(s) => s.clone(),
        MetricValue::Flag(b) => b.to_string(),
        MetricValue::Missing => "—".to_string(),
    }
}

fn fmt_risk(v: &MetricValue) -> String {
    match v.as_flag() {
        Some(true) => "HIGH".to_string(),
        Some(false) => "LOW".to_string(),
        None => "—".to_string(),
    }
}

fn fmt_yes_no(v: &MetricValue) -> String {
    match v.as_flag() {
        Some(true) => "yes".to_string(),
        Some(false) => "no".to_string(),
        None => "—".to_string(),
    }
}

fn fmt_whole_pct(v: &MetricValue) -> String {
    v.as_number()
        .map_or_else(|| "—".to_string(), |n| format!("{}%", n.round()))
}

fn fmt_fraction_pct(v: &MetricValue) -> String {
    v.as_number().map_or_else(|| "—".to_string(), fmt_pct)
}

fn fmt_minutes(v: &MetricValue) -> String {
    v.as_number()
        .map_or_else(|| "—".to_string(), |n| format!("{} min", n.round()))
}

fn fmt_multiplier(v: &MetricValue) -> String {
    v.as_number()
        .map_or_else(|| "—".to_string(), |n| format!("{n:.2}x"))
}

fn fmt_money(v: &MetricValue) -> String {
    v.as_number()
        .map_or_else(|| "—".to_string(), fmt_money_m)
}

fn gate_time(m: &MetricInputs<'_, '_>) -> MetricValue {
    m.driver().gate.map(|s| s.secs).into()
}

/// `Missing` before arrival, like the span it describes
fn gate_completed(m: &MetricInputs<'_, '_>) -> MetricValue {
    m.driver()
        .gate
        .map_or(MetricValue::Missing, |s| MetricValue::Flag(s.completed))
}

fn dwell(m: &MetricInputs<'_, '_>) -> MetricValue {
    m.driver().dwell.map(|s| s.secs).into()
}

fn touchpoints(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Number(m.driver().touchpoints as f64)
}

fn detention_risk(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Flag(m.driver().detention_risk)
}

fn completed(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Flag(m.driver().completed)
}

fn queueing(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Number(m.ops().queueing as f64)
}

fn door_util(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Number(f64::from(m.ops().door_util_pct))
}

fn moves_per_hour(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Number(f64::from(m.ops().moves_per_hour))
}

fn exceptions(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Number(m.ops().exceptions as f64)
}

fn avg_dwell(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Number(m.ops().avg_dwell_sec)
}

fn facilities(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Number(f64::from(m.network().facilities))
}

fn eta_accuracy(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Number(m.network().eta_accuracy)
}

fn network_dwell(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Number(m.network().avg_dwell_mins)
}

fn turn_index(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Number(m.network().turn_index)
}

fn cash_released(m: &MetricInputs<'_, '_>) -> MetricValue {
    MetricValue::Number(m.network().cash_released_m)
}

static DRIVER_METRICS: &[MetricDef] = &[
    MetricDef {
        id: "gateTimeSec",
        label: "Gate Time",
        unit: "s",
        hint: "arrive → assigned",
        compute: gate_time,
        format: fmt_duration,
    },
    MetricDef {
        id: "gateCompleted",
        label: "Gate Cleared",
        unit: "",
        hint: "door or lane assigned",
        compute: gate_completed,
        format: fmt_yes_no,
    },
    MetricDef {
        id: "dwellSec",
        label: "Total Dwell",
        unit: "s",
        hint: "arrive → exit road",
        compute: dwell,
        format: fmt_duration,
    },
    MetricDef {
        id: "touchpoints",
        label: "Driver Touchpoints",
        unit: "",
        hint: "count of human interactions",
        compute: touchpoints,
        format: fmt_count,
    },
    MetricDef {
        id: "detentionRisk",
        label: "Detention Risk",
        unit: "",
        hint: "illustrative threshold at 4+ hours",
        compute: detention_risk,
        format: fmt_risk,
    },
    MetricDef {
        id: "completed",
        label: "Trip Completed",
        unit: "",
        hint: "exit road reached",
        compute: completed,
        format: fmt_yes_no,
    },
];

static OPS_METRICS: &[MetricDef] = &[
    MetricDef {
        id: "queueing",
        label: "Queueing Trucks",
        unit: "",
        hint: "queued and not assigned",
        compute: queueing,
        format: fmt_count,
    },
    MetricDef {
        id: "doorUtilPct",
        label: "Door Utilization",
        unit: "%",
        hint: "occupied doors / total doors",
        compute: door_util,
        format: fmt_whole_pct,
    },
    MetricDef {
        id: "movesPerHour",
        label: "Moves / Hour",
        unit: "/h",
        hint: "spotter moves rate",
        compute: moves_per_hour,
        format: fmt_count,
    },
    MetricDef {
        id: "exceptions",
        label: "Exceptions",
        unit: "",
        hint: "issues surfaced",
        compute: exceptions,
        format: fmt_count,
    },
    MetricDef {
        id: "avgDwellSec",
        label: "Avg Dwell",
        unit: "s",
        hint: "avg across trucks (to now)",
        compute: avg_dwell,
        format: fmt_duration,
    },
];

static NETWORK_METRICS: &[MetricDef] = &[
    MetricDef {
        id: "facilities",
        label: "Facilities in Network",
        unit: "",
        hint: "network size",
        compute: facilities,
        format: fmt_count,
    },
    MetricDef {
        id: "etaAccuracy",
        label: "ETA Accuracy",
        unit: "%",
        hint: "saturation curve",
        compute: eta_accuracy,
        format: fmt_fraction_pct,
    },
    MetricDef {
        id: "avgDwellMins",
        label: "Avg Dwell",
        unit: "min",
        hint: "modeled",
        compute: network_dwell,
        format: fmt_minutes,
    },
    MetricDef {
        id: "turnIndex",
        label: "Turn Index",
        unit: "x",
        hint: "modeled productivity",
        compute: turn_index,
        format: fmt_multiplier,
    },
    MetricDef {
        id: "cashReleasedM",
        label: "Cash Released",
        unit: "$M",
        hint: "dwell reduction × sites",
        compute: cash_released,
        format: fmt_money,
    },
];
