use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while persisting [`crate::settings::Settings`].
///
/// Loading never returns one of these, it falls back to defaults instead.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to create settings directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write settings file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A hostname could not be turned into an address. Reported per target, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ResolutionFailure {
    pub hostname: String,
    pub reason: String,
}

impl ResolutionFailure {
    pub fn new(hostname: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Probe error, timeout, or unknown name.
    #[error(transparent)]
    Failure(#[from] ResolutionFailure),
    /// Anything the resolver could not classify. Stops the run.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Run-level errors. Per-target failures never show up here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("a configuration run is already in progress")]
    AlreadyRunning,
    #[error("'{0}' is not a valid IPv4 interface address")]
    InvalidInterface(String),
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}
