//! Timestamped scenario events
//!
//! Event types form a closed enumeration. Metric code classifies them with
//! exhaustive matches ([`EventType::milestone`], [`EventType::door_transition`])
//! so adding a variant forces every classifier to be revisited.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every kind of occurrence a scenario can author
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Arrive,
    QueueStart,
    PaperworkStart,
    PaperworkEnd,
    QrScan,
    Verified,
    AssignedLane,
    AssignedDoor,
    WrongTurn,
    RerouteManual,
    Docked,
    LoadingStart,
    LoadingEnd,
    CheckoutStart,
    CheckoutEnd,
    ExitGate,
    ExitRoad,
    YardMove,
    Exception,
    Pulse,
    Note,
}

/// Points in a truck visit that time-span metrics are anchored on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Milestone {
    Arrival,
    /// Door assignment (preferred anchor for gate time)
    DoorAssignment,
    /// Lane assignment (fallback anchor for gate time)
    LaneAssignment,
    Exit,
}

/// Loading cycle edges used for door occupancy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorTransition {
    Start,
    End,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Arrive => "arrive",
            EventType::QueueStart => "queue_start",
            EventType::PaperworkStart => "paperwork_start",
            EventType::PaperworkEnd => "paperwork_end",
            EventType::QrScan => "qr_scan",
            EventType::Verified => "verified",
            EventType::AssignedLane => "assigned_lane",
            EventType::AssignedDoor => "assigned_door",
            EventType::WrongTurn => "wrong_turn",
            EventType::RerouteManual => "reroute_manual",
            EventType::Docked => "docked",
            EventType::LoadingStart => "loading_start",
            EventType::LoadingEnd => "loading_end",
            EventType::CheckoutStart => "checkout_start",
            EventType::CheckoutEnd => "checkout_end",
            EventType::ExitGate => "exit_gate",
            EventType::ExitRoad => "exit_road",
            EventType::YardMove => "yard_move",
            EventType::Exception => "exception",
            EventType::Pulse => "pulse",
            EventType::Note => "note",
        }
    }

    /// Which visit milestone, if any, this event marks
    pub fn milestone(&self) -> Option<Milestone> {
        match self {
            EventType::Arrive => Some(Milestone::Arrival),
            EventType::AssignedDoor => Some(Milestone::DoorAssignment),
            EventType::AssignedLane => Some(Milestone::LaneAssignment),
            EventType::ExitRoad => Some(Milestone::Exit),
            EventType::QueueStart
            | EventType::PaperworkStart
            | EventType::PaperworkEnd
            | EventType::QrScan
            | EventType::Verified
            | EventType::WrongTurn
            | EventType::RerouteManual
            | EventType::Docked
            | EventType::LoadingStart
            | EventType::LoadingEnd
            | EventType::CheckoutStart
            | EventType::CheckoutEnd
            | EventType::ExitGate
            | EventType::YardMove
            | EventType::Exception
            | EventType::Pulse
            | EventType::Note => None,
        }
    }

    /// Which loading-cycle edge, if any, this event marks for its door
    pub fn door_transition(&self) -> Option<DoorTransition> {
        match self {
            EventType::LoadingStart => Some(DoorTransition::Start),
            EventType::LoadingEnd => Some(DoorTransition::End),
            EventType::Arrive
            | EventType::QueueStart
            | EventType::PaperworkStart
            | EventType::PaperworkEnd
            | EventType::QrScan
            | EventType::Verified
            | EventType::AssignedLane
            | EventType::AssignedDoor
            | EventType::WrongTurn
            | EventType::RerouteManual
            | EventType::Docked
            | EventType::CheckoutStart
            | EventType::CheckoutEnd
            | EventType::ExitGate
            | EventType::ExitRoad
            | EventType::YardMove
            | EventType::Exception
            | EventType::Pulse
            | EventType::Note => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation-only classification
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Good,
    Warn,
    Bad,
}

/// A timestamped, typed occurrence in a scenario
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimEvent {
    /// Unique within the scenario
    pub id: String,
    /// Seconds from scenario start
    pub t: f64,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default)]
    pub label: String,
    /// Absent for scenario-global events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_id: Option<String>,
    /// Marks a manual, human interaction
    #[serde(default)]
    pub touchpoint: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl SimEvent {
    pub fn new(id: impl Into<String>, t: f64, kind: EventType) -> Self {
        Self {
            id: id.into(),
            t,
            kind,
            label: String::new(),
            actor_id: None,
            door_id: None,
            touchpoint: false,
            severity: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn door(mut self, door_id: impl Into<String>) -> Self {
        self.door_id = Some(door_id.into());
        self
    }

    pub fn touchpoint(mut self) -> Self {
        self.touchpoint = true;
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Whether this event has fired by `time_sec`
    #[inline]
    pub fn fired_by(&self, time_sec: f64) -> bool {
        self.t <= time_sec
    }

    pub fn is_door(&self, door_id: &str) -> bool {
        self.door_id.as_deref() == Some(door_id)
    }
}
