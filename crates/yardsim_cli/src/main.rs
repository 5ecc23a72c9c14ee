//! Yardsim CLI
//!
//! Inspect, play back and validate yard operation scenarios.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use yardsim_core::format::{fmt_money_m, fmt_pct};
use yardsim_core::metrics::{
    definitions_for, evaluate, network_metrics, MetricContext, MAX_FACILITIES, MIN_FACILITIES,
};
use yardsim_core::{EventIndex, SimMode, SimTab, Snapshot};
use yardsim_replay::EndPolicy;

mod catalog;
mod config;
mod play;
mod render;

use config::YardsimConfig;

#[derive(Parser)]
#[command(name = "yardsim")]
#[command(about = "Deterministic replay of scripted yard operations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "yardsim.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in scenarios
    List,

    /// Show the derived state of a scenario at a point in time
    Inspect {
        /// Built-in scenario id or path to a scenario JSON file
        scenario: String,

        /// Query time in seconds (clamped to the scenario)
        #[arg(short, long, default_value = "0")]
        at: f64,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play a scenario in real time
    Play {
        /// Built-in scenario id or path to a scenario JSON file
        scenario: String,

        /// Playback speed multiplier
        #[arg(short, long)]
        speed: Option<f64>,

        /// What to do at the end of the timeline
        #[arg(short, long, value_enum)]
        end_policy: Option<EndPolicyArg>,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Passes through the timeline when looping (0 = forever)
        #[arg(short, long, default_value = "1")]
        loops: u32,
    },

    /// Network-effect metrics by facility count
    Network {
        /// Before or after the shared protocol
        #[arg(short, long, value_enum, default_value = "after")]
        mode: ModeArg,

        /// Number of facilities in the network
        #[arg(short, long)]
        facilities: Option<u32>,

        /// Print every facility count from 1 to 30
        #[arg(long, conflicts_with = "facilities")]
        sweep: bool,
    },

    /// Check a scenario file for authoring errors
    Validate {
        /// Scenario JSON file
        file: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum EndPolicyArg {
    /// Stop at the end
    Clamp,
    /// Jump back to the start and keep playing
    Wrap,
}

impl From<EndPolicyArg> for EndPolicy {
    fn from(arg: EndPolicyArg) -> Self {
        match arg {
            EndPolicyArg::Clamp => EndPolicy::ClampAndStop,
            EndPolicyArg::Wrap => EndPolicy::Wrap,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Before,
    After,
}

impl From<ModeArg> for SimMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Before => SimMode::Before,
            ModeArg::After => SimMode::After,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = YardsimConfig::load_or_default(&cli.config)?;
    let scenario_dir = Path::new(&config.catalog.scenario_dir);

    match cli.command {
        Commands::List => cmd_list(),
        Commands::Inspect { scenario, at, json } => {
            cmd_inspect(&scenario, scenario_dir, at, json, &config)
        }
        Commands::Play {
            scenario,
            speed,
            end_policy,
            fps,
            loops,
        } => {
            let mut playback = config.playback.clone();
            if let Some(speed) = speed {
                playback = playback.with_speed(speed);
            }
            if let Some(policy) = end_policy {
                playback = playback.with_end_policy(policy.into());
            }
            if let Some(fps) = fps {
                playback = playback.with_target_fps(fps);
            }
            let scenario = catalog::resolve(&scenario, scenario_dir)?;
            play::run(scenario, playback, play::Loops(loops))
        }
        Commands::Network {
            mode,
            facilities,
            sweep,
        } => cmd_network(
            mode.into(),
            facilities.unwrap_or(config.playback.facilities),
            sweep,
        ),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn cmd_list() -> Result<()> {
    for id in catalog::builtin_ids() {
        if let Some(scenario) = catalog::builtin(id)? {
            println!("{}", render::scenario_summary(&scenario));
        }
    }
    Ok(())
}

fn cmd_inspect(
    name: &str,
    scenario_dir: &Path,
    at: f64,
    json: bool,
    config: &YardsimConfig,
) -> Result<()> {
    let scenario = catalog::resolve(name, scenario_dir)?;
    let index = EventIndex::new(&scenario);
    let snapshot = Snapshot::at(&scenario, &index, at, config.playback.facilities);

    if json {
        let text = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
        println!("{text}");
    } else {
        print!("{}", render::snapshot_text(&scenario, &snapshot));
    }
    Ok(())
}

fn cmd_network(mode: SimMode, facilities: u32, sweep: bool) -> Result<()> {
    if sweep {
        println!("{:>4} {:>8} {:>10} {:>8} {:>10}", "N", "ETA", "Dwell", "Turn", "Cash");
        for n in MIN_FACILITIES..=MAX_FACILITIES {
            let m = network_metrics(mode, n);
            println!(
                "{:>4} {:>8} {:>10} {:>8} {:>10}",
                m.facilities,
                fmt_pct(m.eta_accuracy),
                format!("{:.0} min", m.avg_dwell_mins),
                format!("{:.2}x", m.turn_index),
                fmt_money_m(m.cash_released_m)
            );
        }
        return Ok(());
    }

    let scenario = catalog::for_tab(SimTab::Network, mode)?;
    let index = EventIndex::new(&scenario);
    let ctx = MetricContext::new(&scenario, index.events(), scenario.duration_sec)
        .with_facilities(facilities);
    let record = evaluate(definitions_for(SimTab::Network), &ctx);

    println!("{}", scenario.title);
    print!("{}", render::metrics_table(SimTab::Network, &record));
    Ok(())
}

fn cmd_validate(path: &Path) -> Result<()> {
    let scenario = catalog::load_file(path)?;
    println!(
        "ok: {} ({} events, {} actors, {} doors, {}s)",
        scenario.id,
        scenario.events.len(),
        scenario.actors.len(),
        scenario.doors.len(),
        scenario.duration_sec
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_play() {
        let cli = Cli::parse_from([
            "yardsim", "play", "ops_after", "--speed", "2", "--end-policy", "wrap", "--loops", "3",
        ]);
        match cli.command {
            Commands::Play {
                scenario,
                speed,
                end_policy,
                loops,
                ..
            } => {
                assert_eq!(scenario, "ops_after");
                assert_eq!(speed, Some(2.0));
                assert!(matches!(end_policy, Some(EndPolicyArg::Wrap)));
                assert_eq!(loops, 3);
            }
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn test_sweep_conflicts_with_facilities() {
        let result = Cli::try_parse_from(["yardsim", "network", "--sweep", "--facilities", "4"]);
        assert!(result.is_err());
    }
}
