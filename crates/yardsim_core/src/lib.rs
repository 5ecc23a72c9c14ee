//! Yardsim Core
//!
//! Deterministic replay of scripted yard operations. Given an immutable
//! [`Scenario`] and a query time, this crate computes which events have fired,
//! derived actor and door state, and telemetry metrics. Every result is a pure
//! function of `(scenario, time)`: the same time always yields the same state,
//! however playback got there.
//!
//! - **Scenario**: authored data plus load-time validation
//! - **Projector**: the fired-event log at a time
//! - **Metrics**: driver, facility and network-effect telemetry
//! - **Snapshot**: the combined read-only view handed to renderers
//!
//! # Example
//!
//! ```rust
//! use yardsim_core::{project, EventType, Scenario, SimEvent, SimMode, SimTab};
//!
//! let scenario = Scenario::new("driver", SimTab::Driver, SimMode::After, 170.0)
//!     .event(SimEvent::new("exit", 165.0, EventType::ExitRoad))
//!     .event(SimEvent::new("arrive", 0.0, EventType::Arrive));
//!
//! let projection = project(&scenario, 10.0);
//! assert!(projection.has_fired("arrive"));
//! assert!(!projection.has_fired("exit"));
//! ```

pub mod error;
pub mod event;
pub mod format;
pub mod metrics;
pub mod projector;
pub mod scenario;
pub mod snapshot;

pub use error::ScenarioError;
pub use event::{EventType, Severity, SimEvent};
pub use metrics::{MetricContext, MetricRecord, MetricValue};
pub use projector::{project, EventIndex, Projection};
pub use scenario::{ActorKind, Door, Scenario, SimActor, SimMode, SimTab};
pub use snapshot::{ActorState, DoorState, Snapshot};
