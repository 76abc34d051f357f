//! narcore - execution core of a cognitive-cycle reasoner
//!
//! Two pieces keep a reasoner from wasting work under bounded resources:
//!
//! - **Reasoner**: a scheduler that polls input sources, runs one bounded
//!   inference cycle per tick on a logical clock, and broadcasts results to
//!   output sinks. It can run continuously on a worker, pause, walk a fixed
//!   number of cycles, or run synchronously on the caller's thread. A faulting
//!   cycle becomes an `Err` event instead of ending the session.
//! - **LinkNoveltyTracker**: a bounded recency cache owned by each task link
//!   that decides whether pairing it with a term link is worth doing now.
//!
//! The inference rules themselves live behind [`InferenceEngine`].

pub mod control;
pub mod entity;
pub mod io;

pub use control::{CycleFault, InferenceEngine, Reasoner, ReasonerConfig, ReasonerError, ReasonerResult, RunMode};
pub use entity::{BudgetValue, LinkNoveltyTracker, Recording, TaskLink};
pub use io::{InputChannel, OutputCategory, OutputChannel, OutputEvent, Outputs};
