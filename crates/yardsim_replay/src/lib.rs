//! Yardsim Replay
//!
//! Interactive playback over `yardsim_core`. A [`Player`] owns the playback
//! state and changes it only through [`Command`]s; a [`FrameScheduler`] turns
//! host frames into ticks while the player runs.
//!
//! Derived state (fired events, metrics) is recomputed from the playback time
//! after every command, so seeking to a time and ticking up to it always give
//! the same view.

pub mod config;
pub mod error;
pub mod replay;
pub mod scheduler;

pub use config::{EndPolicy, PlaybackConfig};
pub use error::PlaybackError;
pub use replay::{Advance, Command, FrameUpdate, PlaybackStatus, Player, VirtualClock};
pub use scheduler::{FrameClock, FrameListener, FrameScheduler, ListenerId, ManualClock, SystemClock};
