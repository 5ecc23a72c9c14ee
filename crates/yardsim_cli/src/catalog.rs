//! Built-in scenarios and scenario lookup

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use yardsim_core::{Scenario, SimMode, SimTab};

const BUILTIN: &[(&str, &str)] = &[
    ("driver_before", include_str!("../scenarios/driver_before.json")),
    ("driver_after", include_str!("../scenarios/driver_after.json")),
    ("ops_before", include_str!("../scenarios/ops_before.json")),
    ("ops_after", include_str!("../scenarios/ops_after.json")),
    ("network_before", include_str!("../scenarios/network_before.json")),
    ("network_after", include_str!("../scenarios/network_after.json")),
];

pub fn builtin_ids() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(id, _)| *id)
}

/// Parse and validate a built-in scenario
pub fn builtin(id: &str) -> Result<Option<Scenario>> {
    let Some((_, json)) = BUILTIN.iter().find(|(builtin_id, _)| *builtin_id == id) else {
        return Ok(None);
    };
    let scenario =
        Scenario::from_json(json).with_context(|| format!("Built-in scenario {id} is invalid"))?;
    Ok(Some(scenario))
}

/// The built-in scenario for a tab and mode
pub fn for_tab(tab: SimTab, mode: SimMode) -> Result<Scenario> {
    let id = format!("{}_{}", tab_name(tab), mode.as_str());
    builtin(&id)?.with_context(|| format!("No built-in scenario {id}"))
}

pub fn tab_name(tab: SimTab) -> &'static str {
    match tab {
        SimTab::Driver => "driver",
        SimTab::Ops => "ops",
        SimTab::Network => "network",
    }
}

/// Load and validate a scenario JSON file
pub fn load_file(path: &Path) -> Result<Scenario> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Scenario::from_json(&content).with_context(|| format!("Invalid scenario {}", path.display()))
}

/// Resolve a scenario argument.
///
/// Tries, in order: an existing file path, `<scenario_dir>/<name>.json`, a
/// built-in id.
pub fn resolve(name: &str, scenario_dir: &Path) -> Result<Scenario> {
    let path = Path::new(name);
    if path.is_file() {
        return load_file(path);
    }

    let local = scenario_dir.join(format!("{name}.json"));
    if local.is_file() {
        return load_file(&local);
    }

    builtin(name)?.with_context(|| {
        format!(
            "Unknown scenario {name}. Built-in scenarios: {}",
            builtin_ids().collect::<Vec<_>>().join(", ")
        )
    })
}
