//! Error types for reward-reveal.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised while building a custom schedule.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Phase {phase} is scheduled more than once")]
    DuplicatePhase { phase: u32 },

    #[error("Phase {missing} is never scheduled (schedule has {len} steps)")]
    MissingPhase { missing: u32, len: usize },

    #[error("Phase {phase} at {delay:?} would fire before phase {previous}")]
    OutOfOrder {
        phase: u32,
        previous: u32,
        delay: Duration,
    },

    #[error("Completion at {completion:?} precedes terminal phase at {terminal:?}")]
    CompletionTooEarly {
        completion: Duration,
        terminal: Duration,
    },
}

/// Rendering surface errors.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to encode render plan: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
