//! Real-time playback in the terminal
//!
//! Drives a [`FrameScheduler`] from a tokio interval at the configured frame
//! rate and prints events as they fire.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::time::{interval, MissedTickBehavior};
use yardsim_core::format::fmt_clock;
use yardsim_core::Scenario;
use yardsim_replay::{FrameScheduler, FrameUpdate, PlaybackConfig, Player};

use crate::render::{event_line, metrics_table};

/// Passes through the timeline before stopping; 0 plays until interrupted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Loops(pub u32);

impl Loops {
    fn done(self, completed: u32) -> bool {
        self.0 != 0 && completed >= self.0
    }
}

pub fn run(scenario: Scenario, config: PlaybackConfig, loops: Loops) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start runtime")?;
    runtime.block_on(play(scenario, config, loops))
}

async fn play(scenario: Scenario, config: PlaybackConfig, loops: Loops) -> Result<()> {
    let mut player = Player::new(Arc::new(scenario), config.clone())?;
    let mut scheduler = FrameScheduler::new();

    println!(
        "{} ({}, {}x, {:?})",
        player.scenario().title,
        fmt_clock(player.duration()),
        player.speed(),
        config.end_policy
    );
    for event in player.fired_events() {
        println!("{}", event_line(event));
    }

    let mut frames = interval(config.frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);

    player.play();
    let mut completed = 0;
    while scheduler.is_active(&player) {
        frames.tick().await;
        let Some(update) = scheduler.frame(&mut player) else {
            break;
        };

        if update.rewound {
            completed += 1;
            if loops.done(completed) {
                break;
            }
            println!("-- loop {} --", completed + 1);
        }
        print_update(&player, &update);
        if update.finished {
            completed += 1;
        }
    }
    scheduler.cancel();

    tracing::debug!(frames = scheduler.frame_count(), completed, "playback stopped");
    println!("\nAt {}", fmt_clock(player.time()));
    print!("{}", metrics_table(player.scenario().tab, player.metrics()));
    Ok(())
}

fn print_update(player: &Player, update: &FrameUpdate) {
    for event in player.events_in(update.newly_fired.clone()) {
        println!("{}", event_line(event));
    }
}
