use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification tag carried by every broadcast event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputCategory {
    /// Input accepted by the reasoner
    In,
    /// Regular reasoner output
    Out,
    /// A fault caught by the reasoner
    Err,
    /// Operator execution
    Exe,
    /// Text echoed back to observers
    Echo,
}

impl fmt::Display for OutputCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            OutputCategory::In => "IN",
            OutputCategory::Out => "OUT",
            OutputCategory::Err => "ERR",
            OutputCategory::Exe => "EXE",
            OutputCategory::Echo => "ECHO",
        };
        f.write_str(tag)
    }
}

/// One broadcast event, as delivered to queue-backed sinks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEvent {
    pub category: OutputCategory,
    pub payload: String,
}

impl OutputEvent {
    pub fn new(category: OutputCategory, payload: impl Into<String>) -> Self {
        Self {
            category,
            payload: payload.into(),
        }
    }
}

/// An output sink refused an event
#[derive(Debug, Error)]
#[error("output sink {sink} rejected {category} event: {reason}")]
pub struct SinkError {
    pub sink: String,
    pub category: OutputCategory,
    pub reason: String,
}

/// A source of work the reasoner polls once per cycle.
///
/// Sources are polled, never pushed to. A source reporting closed is dropped
/// from the reasoner after the poll in which it was seen closed.
pub trait InputChannel: Send + Sync {
    /// Whether the source will never produce again
    fn is_closed(&self) -> bool;

    /// Accepts at most one pending unit of work; returns whether any was accepted
    fn poll_next(&self) -> bool;
}

/// A consumer notified synchronously of every broadcast event
pub trait OutputChannel: Send + Sync {
    fn notify(&self, category: OutputCategory, payload: &str) -> Result<(), SinkError>;
}
