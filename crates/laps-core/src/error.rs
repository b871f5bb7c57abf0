use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LapsError {
    #[error("malformed directory timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("invalid password length: {0} (must be at least 1)")]
    InvalidLength(u32),

    #[error("cannot reach directory: {0}")]
    DirectoryConnection(String),

    #[error("failed to read attribute '{attribute}': {reason}")]
    AttributeRead { attribute: String, reason: String },

    #[error("rotation step '{step}' failed: {reason}")]
    RotationStep { step: String, reason: String },

    #[error("failed to persist settings to {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },

    #[error("command failed: {0}")]
    Command(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl LapsError {
    /// Wrap a gateway failure as a named rotation step.
    pub fn rotation_step(step: &str, source: impl std::fmt::Display) -> Self {
        LapsError::RotationStep {
            step: step.to_string(),
            reason: source.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LapsError>;
