use thiserror::Error;

/// Authoring mistakes caught when a scenario is loaded.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario `{scenario}` has invalid duration {duration} (must be positive and finite)")]
    InvalidDuration { scenario: String, duration: f64 },

    #[error("event `{event}` at t={t} is outside [0, {duration}]")]
    EventOutOfRange { event: String, t: f64, duration: f64 },

    #[error("duplicate event id `{0}`")]
    DuplicateEvent(String),

    #[error("duplicate actor id `{0}`")]
    DuplicateActor(String),

    #[error("duplicate door id `{0}`")]
    DuplicateDoor(String),

    #[error("event `{event}` references unknown actor `{actor}`")]
    UnknownActor { event: String, actor: String },

    #[error("event `{event}` references unknown door `{door}`")]
    UnknownDoor { event: String, door: String },

    #[error("motion path references unknown actor `{0}`")]
    UnknownMotionActor(String),

    #[error("motion segment for `{actor}` ends before it starts ({t0} > {t1})")]
    InvalidSegment { actor: String, t0: f64, t1: f64 },

    #[error("invalid scenario json: {0}")]
    Json(#[from] serde_json::Error),
}
