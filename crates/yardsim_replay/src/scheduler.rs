//! Frame scheduler
//!
//! Turns wall-clock frames into `Tick` commands while the player is running.
//! The host calls [`FrameScheduler::frame`] at its natural cadence (a render
//! loop, a timer); the scheduler measures the time since the previous frame
//! and feeds it to the player.
//!
//! The elapsed-time baseline is dropped whenever playback stops and
//! re-anchored on the first frame after it starts again, so a long pause never
//! turns into one large catch-up tick.

use std::cell::Cell;
use std::sync::Arc;
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};
use yardsim_core::Scenario;

use crate::error::PlaybackError;
use crate::replay::{FrameUpdate, Player};

new_key_type! {
    pub struct ListenerId;
}

/// Source of frame timestamps
pub trait FrameClock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl FrameClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Useful for tests and offline renders.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl<C: FrameClock + ?Sized> FrameClock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Called after every frame that ticked the player
pub type FrameListener = Box<dyn FnMut(&Player, &FrameUpdate)>;

#[derive(Clone, Copy, Debug)]
struct Anchor {
    last_frame: Instant,
    /// Player play epoch the anchor was taken in
    epoch: u64,
}

pub struct FrameScheduler<C: FrameClock = SystemClock> {
    clock: C,
    anchor: Option<Anchor>,
    listeners: SlotMap<ListenerId, FrameListener>,
    frames: u64,
    cancelled: bool,
}

impl FrameScheduler<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for FrameScheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: FrameClock> FrameScheduler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            anchor: None,
            listeners: SlotMap::with_key(),
            frames: 0,
            cancelled: false,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Player, &FrameUpdate) + 'static) -> ListenerId {
        self.listeners.insert(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Frames that ticked the player so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Whether the host should keep requesting frames
    pub fn is_active(&self, player: &Player) -> bool {
        !self.cancelled && player.is_playing()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Run one frame.
    ///
    /// Returns `None` without touching the player when paused or cancelled.
    /// The first frame after playback starts ticks by zero and only anchors
    /// the baseline.
    pub fn frame(&mut self, player: &mut Player) -> Option<FrameUpdate> {
        if !self.is_active(player) {
            self.anchor = None;
            return None;
        }

        let now = self.clock.now();
        let epoch = player.play_epoch();
        let elapsed = match self.anchor {
            Some(anchor) if anchor.epoch == epoch => {
                now.saturating_duration_since(anchor.last_frame).as_secs_f64()
            }
            _ => {
                tracing::trace!(epoch, "frame baseline anchored");
                0.0
            }
        };
        self.anchor = Some(Anchor {
            last_frame: now,
            epoch,
        });

        let update = player.tick(elapsed);
        self.frames += 1;

        if !player.is_playing() {
            self.anchor = None;
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener(player, &update);
        }
        Some(update)
    }

    /// Swap the player's scenario. Playback stops, so no further frames tick
    /// until the player is started again.
    pub fn load_scenario(
        &mut self,
        player: &mut Player,
        scenario: Arc<Scenario>,
    ) -> Result<FrameUpdate, PlaybackError> {
        self.anchor = None;
        player.load_scenario(scenario)
    }

    /// Stop scheduling for good. Later frames are no-ops.
    pub fn cancel(&mut self) {
        if !self.cancelled {
            tracing::debug!(frames = self.frames, "frame scheduler cancelled");
        }
        self.cancelled = true;
        self.anchor = None;
    }
}
