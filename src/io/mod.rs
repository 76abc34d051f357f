//! Input sources the reasoner polls and output sinks it broadcasts to.

pub mod channel;
pub mod input;
pub mod registry;
pub mod sinks;

pub use channel::{InputChannel, OutputCategory, OutputChannel, OutputEvent, SinkError};
pub use input::QueueInput;
pub use registry::{ChannelRegistry, Outputs};
pub use sinks::{ChannelSink, FnSink, TracingSink, SILENT_LEVEL};
