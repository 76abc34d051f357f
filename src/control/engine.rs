use crate::io::Outputs;
use std::any::Any;
use thiserror::Error;

/// A single inference cycle failed.
///
/// The reasoner turns a fault into an `Err` broadcast and keeps cycling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cycle {clock} failed: {message}")]
pub struct CycleFault {
    pub clock: u64,
    pub message: String,
}

impl CycleFault {
    pub fn new(clock: u64, message: impl Into<String>) -> Self {
        Self {
            clock,
            message: message.into(),
        }
    }

    pub(crate) fn from_panic(clock: u64, payload: &(dyn Any + Send)) -> Self {
        Self::new(clock, panic_message(payload))
    }
}

/// The inference machinery driven by the reasoner, one bounded cycle at a time.
pub trait InferenceEngine: Send + 'static {
    /// Clears all engine state; called when the reasoner resets.
    fn init(&mut self);

    /// Runs one cycle at logical time `clock`, broadcasting any results.
    fn work_cycle(&mut self, clock: u64, outputs: &Outputs) -> Result<(), CycleFault>;
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
