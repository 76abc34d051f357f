//! Scheduling of inference cycles.

pub mod config;
pub mod engine;
pub mod error;
pub mod reasoner;
mod worker;

pub use config::ReasonerConfig;
pub use engine::{CycleFault, InferenceEngine};
pub use error::{ReasonerError, ReasonerResult};
pub use reasoner::{Reasoner, RunMode, RESET_MESSAGE};
