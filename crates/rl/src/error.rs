use physics::PhysicsError;
use thiserror::Error;

/// Failures inside a single control tick. None of them end the episode.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("action has {actual} components, agent expects {expected}")]
    MalformedAction { expected: usize, actual: usize },
    #[error("observation has {actual} values, agent declares {expected}")]
    MalformedObservation { expected: usize, actual: usize },
    #[error("control loop ticked before initialize")]
    Uninitialized,
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("`{0}` must be finite")]
    NonFinite(&'static str),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Reject a non-finite configuration value.
pub(crate) fn ensure_finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite(name))
    }
}
