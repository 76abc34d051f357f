use super::channel::{OutputCategory, OutputChannel, OutputEvent, SinkError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Silence level at which regular output is muted
pub const SILENT_LEVEL: u32 = 100;

/// Function-based sink for simple cases
pub struct FnSink<F: Fn(OutputCategory, &str) + Send + Sync>(pub F);

impl<F: Fn(OutputCategory, &str) + Send + Sync> OutputChannel for FnSink<F> {
    fn notify(&self, category: OutputCategory, payload: &str) -> Result<(), SinkError> {
        (self.0)(category, payload);
        Ok(())
    }
}

/// Channel-based sink - sends events to an mpsc queue
pub struct ChannelSink {
    name: String,
    sender: Mutex<Sender<OutputEvent>>,
}

impl ChannelSink {
    pub fn new(name: impl Into<String>, sender: Sender<OutputEvent>) -> Self {
        Self {
            name: name.into(),
            sender: Mutex::new(sender),
        }
    }
}

impl OutputChannel for ChannelSink {
    fn notify(&self, category: OutputCategory, payload: &str) -> Result<(), SinkError> {
        self.sender
            .lock()
            .send(OutputEvent::new(category, payload))
            .map_err(|_| SinkError {
                sink: self.name.clone(),
                category,
                reason: "receiver dropped".to_string(),
            })
    }
}

/// Forwards broadcast events into `tracing`.
///
/// `Out` and `Exe` events are muted once the shared silence level reaches
/// [`SILENT_LEVEL`]; errors are always logged.
pub struct TracingSink {
    name: String,
    silence: Arc<AtomicU32>,
}

impl TracingSink {
    pub fn new(name: impl Into<String>, silence: Arc<AtomicU32>) -> Self {
        Self {
            name: name.into(),
            silence,
        }
    }

    fn muted(&self) -> bool {
        self.silence.load(Ordering::Relaxed) >= SILENT_LEVEL
    }
}

impl OutputChannel for TracingSink {
    fn notify(&self, category: OutputCategory, payload: &str) -> Result<(), SinkError> {
        match category {
            OutputCategory::Err => warn!(reasoner = %self.name, %category, payload, "reasoner error"),
            OutputCategory::Out | OutputCategory::Exe => {
                if !self.muted() {
                    info!(reasoner = %self.name, %category, payload, "reasoner output");
                }
            }
            OutputCategory::In | OutputCategory::Echo => {
                debug!(reasoner = %self.name, %category, payload, "reasoner input")
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_fn_sink_receives_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let sink = FnSink(move |category: OutputCategory, payload: &str| {
            log.lock().push((category, payload.to_string()))
        });
        sink.notify(OutputCategory::Out, "done").unwrap();
        assert_eq!(*seen.lock(), vec![(OutputCategory::Out, "done".to_string())]);
    }

    #[test]
    fn test_channel_sink_forwards_and_reports_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new("queue", tx);
        sink.notify(OutputCategory::Err, "bad cycle").unwrap();
        assert_eq!(rx.recv().unwrap(), OutputEvent::new(OutputCategory::Err, "bad cycle"));

        drop(rx);
        let err = sink.notify(OutputCategory::Out, "lost").unwrap_err();
        assert_eq!(err.sink, "queue");
        assert_eq!(err.category, OutputCategory::Out);
    }

    #[test]
    fn test_tracing_sink_follows_silence_level() {
        let silence = Arc::new(AtomicU32::new(0));
        let sink = TracingSink::new("nar", Arc::clone(&silence));
        assert!(!sink.muted());
        silence.store(SILENT_LEVEL, Ordering::Relaxed);
        assert!(sink.muted());
        assert!(sink.notify(OutputCategory::Out, "quiet").is_ok());
    }
}
