use thiserror::Error;

/// Errors produced by the progression engine.
///
/// Both variants are deterministic: retrying the same call with the same
/// inputs fails the same way, so callers surface them instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    /// Malformed thresholds, catalog or XP value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The mission id is not part of the catalog.
    #[error("Unknown mission: {0}")]
    UnknownMission(String),
}

impl ProgressionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
