//! Playback of a loaded scenario.
//!
//! This module provides:
//! - `VirtualClock` - timeline position, run flag and speed
//! - `Player` - the command-driven playback state machine
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use yardsim_core::{EventType, Scenario, SimEvent, SimMode, SimTab};
//! use yardsim_replay::{Command, PlaybackConfig, Player};
//!
//! let scenario = Scenario::new("driver_after", SimTab::Driver, SimMode::After, 170.0)
//!     .event(SimEvent::new("arrive", 0.0, EventType::Arrive))
//!     .event(SimEvent::new("exit", 165.0, EventType::ExitRoad));
//!
//! let mut player = Player::new(Arc::new(scenario), PlaybackConfig::default()).unwrap();
//! player.apply(Command::SetSpeed(2.0)).unwrap();
//! player.apply(Command::Play).unwrap();
//! player.apply(Command::Tick(10.0)).unwrap();
//!
//! assert_eq!(player.time(), 20.0);
//! assert_eq!(player.fired_events().len(), 1);
//! ```

mod clock;
mod player;

pub use clock::{Advance, VirtualClock};
pub use player::{Command, FrameUpdate, PlaybackStatus, Player};
