//! Plain-text rendering of scenarios, events and snapshots

use std::fmt::Write;

use yardsim_core::format::fmt_clock;
use yardsim_core::metrics::{definitions_for, MetricRecord};
use yardsim_core::{Scenario, Severity, SimEvent, SimTab, Snapshot};

use crate::catalog::tab_name;

fn severity_marker(severity: Option<Severity>) -> &'static str {
    match severity.unwrap_or_default() {
        Severity::Info => " ",
        Severity::Good => "+",
        Severity::Warn => "!",
        Severity::Bad => "x",
    }
}

/// One log line: `[mm:ss] ! label`
pub fn event_line(event: &SimEvent) -> String {
    let label = if event.label.is_empty() {
        event.kind.as_str()
    } else {
        event.label.as_str()
    };
    let touch = if event.touchpoint { " (touchpoint)" } else { "" };
    format!(
        "[{}] {} {label}{touch}",
        fmt_clock(event.t),
        severity_marker(event.severity)
    )
}

pub fn scenario_summary(scenario: &Scenario) -> String {
    format!(
        "{:<16} {:<8} {:<7} {:>6}  {}",
        scenario.id,
        tab_name(scenario.tab),
        scenario.mode.as_str(),
        fmt_clock(scenario.duration_sec),
        scenario.title
    )
}

/// Metric table in definition order, using each metric's display format
pub fn metrics_table(tab: SimTab, record: &MetricRecord) -> String {
    let mut out = String::new();
    for def in definitions_for(tab) {
        let Some(value) = record.get(def.id) else {
            continue;
        };
        let _ = writeln!(out, "  {:<22} {:>10}", def.label, (def.format)(value));
    }
    out
}

pub fn snapshot_text(scenario: &Scenario, snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} at {} / {}",
        scenario.title,
        fmt_clock(snapshot.time_sec),
        fmt_clock(scenario.duration_sec)
    );

    let _ = writeln!(out, "\nEvents ({} fired)", snapshot.fired_events.len());
    for event in &snapshot.fired_events {
        let _ = writeln!(out, "  {}", event_line(event));
    }

    let _ = writeln!(out, "\nMetrics");
    out.push_str(&metrics_table(scenario.tab, &snapshot.metrics));

    if !snapshot.actors.is_empty() {
        let _ = writeln!(out, "\nActors");
        for actor in &snapshot.actors {
            let position = actor
                .position
                .map_or_else(|| "-".to_string(), |p| format!("({:.0}, {:.0})", p.x, p.y));
            let status = actor.status.map_or("-", |s| s.as_str());
            let _ = writeln!(out, "  {:<12} {:<14} {status}", actor.id, position);
        }
    }

    if !snapshot.doors.is_empty() {
        let _ = writeln!(out, "\nDoors");
        for door in &snapshot.doors {
            let state = if door.occupied { "occupied" } else { "free" };
            let _ = writeln!(out, "  {:<4} {state}", door.id);
        }
    }

    if !scenario.assumptions.is_empty() {
        let _ = writeln!(out, "\nAssumptions");
        for assumption in &scenario.assumptions {
            let _ = writeln!(out, "  {}: {}", assumption.label, assumption.value);
        }
    }
    out
}
