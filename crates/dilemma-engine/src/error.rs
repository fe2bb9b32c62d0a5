//! Error types for the turn engine

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or write the persisted career record
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("career record {path} could not be accessed")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("career record is malformed: {reason}")]
    Malformed { reason: String },
}

/// Errors surfaced by the turn engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// A strategy identifier outside the six known strategies.
    #[error("unknown strategy identifier `{0}`")]
    InvalidStrategy(String),

    /// A session operation was invoked in the wrong state.
    #[error("session is {found}, expected {expected}")]
    InvalidPhase {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The input/display collaborator failed.
    #[error("front-end I/O failed")]
    Port(#[from] std::io::Error),

    #[error("session transcript could not be serialized")]
    Transcript(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
