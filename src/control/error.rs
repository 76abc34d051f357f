use crate::io::SinkError;
use std::io;
use thiserror::Error;

/// Error type for reasoner operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReasonerError {
    /// Configuration failed validation.
    #[error("invalid reasoner configuration: {reason}")]
    InvalidConfig {
        /// Which bound was violated.
        reason: String,
    },

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] io::Error),

    /// Configuration text is not valid JSON for the config shape.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The inference worker thread could not be spawned.
    #[error("failed to spawn inference worker: {0}")]
    WorkerSpawn(#[source] io::Error),

    /// An output sink refused a broadcast event.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Result type for reasoner operations.
pub type ReasonerResult<T> = Result<T, ReasonerError>;
