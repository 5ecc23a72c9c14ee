use thiserror::Error;
use yardsim_core::ScenarioError;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("playback speed must be positive and finite, got {0}")]
    InvalidSpeed(f64),

    #[error("invalid playback config: {0}")]
    InvalidConfig(String),

    #[error("invalid scenario: {0}")]
    Scenario(#[from] ScenarioError),
}
