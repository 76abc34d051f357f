//! Copy-on-write channel sets.
//!
//! Readers take a snapshot and iterate it without holding the lock, so a
//! channel can be registered or removed from another thread while a poll or
//! broadcast is in flight. The change becomes visible on the next snapshot.

use super::channel::{OutputCategory, OutputChannel, SinkError};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

pub struct ChannelRegistry<T: ?Sized> {
    channels: RwLock<Arc<Vec<Arc<T>>>>,
}

impl<T: ?Sized> ChannelRegistry<T> {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Current channels in registration order
    pub fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        Arc::clone(&self.channels.read())
    }

    pub fn add(&self, channel: Arc<T>) {
        let mut guard = self.channels.write();
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(channel);
        *guard = Arc::new(next);
    }

    /// Removes `channel` by identity; returns whether it was registered
    pub fn remove(&self, channel: &Arc<T>) -> bool {
        self.remove_all(std::slice::from_ref(channel)) > 0
    }

    /// Removes every listed channel by identity; returns how many were dropped
    pub fn remove_all(&self, channels: &[Arc<T>]) -> usize {
        if channels.is_empty() {
            return 0;
        }
        let mut guard = self.channels.write();
        let next: Vec<Arc<T>> = guard
            .iter()
            .filter(|c| !channels.iter().any(|gone| same_channel(c, gone)))
            .cloned()
            .collect();
        let removed = guard.len() - next.len();
        if removed > 0 {
            *guard = Arc::new(next);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized> Default for ChannelRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for ChannelRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("len", &self.len())
            .finish()
    }
}

// Compares data addresses only; vtable pointers of the same object may differ
fn same_channel<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// The set of output sinks events are broadcast to
#[derive(Debug, Default)]
pub struct Outputs {
    sinks: ChannelRegistry<dyn OutputChannel>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, sink: Arc<dyn OutputChannel>) {
        self.sinks.add(sink);
    }

    pub fn remove(&self, sink: &Arc<dyn OutputChannel>) -> bool {
        self.sinks.remove(sink)
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Notifies every sink in registration order, stopping at the first failure
    pub fn output(&self, category: OutputCategory, payload: &str) -> Result<(), SinkError> {
        for sink in self.sinks.snapshot().iter() {
            sink.notify(category, payload)?;
        }
        Ok(())
    }
}
