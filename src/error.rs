//! Error types shared by the catalog, favorites and playback services

use std::fmt;

/// Result type alias for podcast-rs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core services
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote catalog could not be reached or answered with a non-2xx status
    #[error("Catalog unavailable{}: {message}", status_suffix(.status))]
    CatalogUnavailable {
        status: Option<u16>,
        message: String,
    },

    /// An episode's audio resource could not be resolved
    #[error("Audio resource unavailable: {0}")]
    ResourceUnavailable(ResolveFailure),

    /// Malformed persisted data or a malformed podcast handed to the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// The episode cannot be played (no audio file) or the output failed
    #[error("Playback error: {0}")]
    Playback(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn catalog(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::CatalogUnavailable {
            status,
            message: message.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

/// Why an audio resource could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveFailure {
    /// The episode has no file URL, or it does not parse
    Missing,
    /// Transport failure or non-2xx answer
    Unreachable(String),
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveFailure::Missing => write!(f, "missing"),
            ResolveFailure::Unreachable(reason) => write!(f, "unreachable ({})", reason),
        }
    }
}
